//! File upload endpoint.
//!
//! `POST /api/uploads` — multipart form with a `file` part and an
//! optional `provider` query parameter. The file is forwarded to the
//! provider's files endpoint; metadata lands in the local store.

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use crate::api::error_response;
use crate::state::AppState;

/// Hard cap on the request body. Spreadsheet exports run a few
/// megabytes; anything larger is rejected before buffering.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// CSV and Excel exports only.
const ALLOWED_CONTENT_TYPES: [&str; 3] = [
    "text/csv",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    /// Optional hint about the system that produced the file
    /// (e.g. `quickbooks`). Stored verbatim, never interpreted.
    #[serde(default)]
    pub provider: Option<String>,
}

pub async fn upload_file(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Response {
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(f)) if f.name() == Some("file") => break f,
            Ok(Some(_)) => continue,
            Ok(None) => {
                return (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(serde_json::json!({ "error": "multipart field 'file' is required" })),
                )
                    .into_response();
            }
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({ "error": format!("malformed multipart body: {e}") })),
                )
                    .into_response();
            }
        }
    };

    let filename = field
        .file_name()
        .map(str::to_owned)
        .unwrap_or_else(|| "upload".to_owned());
    let content_type = field
        .content_type()
        .map(str::to_owned)
        .unwrap_or_else(|| "application/octet-stream".to_owned());

    if !is_allowed_content_type(&content_type) {
        return (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Json(serde_json::json!({ "error": "only CSV or XLSX files are supported" })),
        )
            .into_response();
    }

    // Whole payload buffered before transmission; there is no
    // streaming pass-through to the provider.
    let bytes = match field.bytes().await {
        Ok(b) => b.to_vec(),
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": format!("reading upload body: {e}") })),
            )
                .into_response();
        }
    };

    match state
        .orchestrator
        .upload_source(bytes, &filename, &content_type, params.provider)
        .await
    {
        Ok(outcome) => (StatusCode::CREATED, Json(outcome)).into_response(),
        Err(err) => error_response(&err),
    }
}

fn is_allowed_content_type(content_type: &str) -> bool {
    ALLOWED_CONTENT_TYPES.contains(&content_type)
}
