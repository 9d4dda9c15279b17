pub mod auth;
pub mod health;
pub mod runs;
pub mod uploads;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;

use lg_domain::Error;

use crate::state::AppState;

/// Build the full API router.
///
/// The health probe is public; upload, run, and status endpoints sit
/// behind the bearer-token middleware. `state` is needed to wire up
/// the auth middleware at build time.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new().route("/health", get(health::health));

    let protected = Router::new()
        .route("/api/uploads", post(uploads::upload_file))
        .route("/api/runs", post(runs::create_run))
        .route("/api/runs/:run_id/status", post(runs::update_run_status))
        .layer(middleware::from_fn_with_state(
            state,
            auth::require_api_token,
        ))
        .layer(DefaultBodyLimit::max(uploads::MAX_UPLOAD_BYTES));

    public.merge(protected)
}

/// Map a domain error onto an HTTP response.
///
/// Misconfiguration is this service's own fault (500); everything that
/// went wrong on the provider side of the proxy — upstream status,
/// network, contract violations, undecodable 2xx bodies — reports as
/// a bad gateway (502).
pub(crate) fn error_response(err: &Error) -> Response {
    let status = match err {
        Error::UpstreamStatus { .. }
        | Error::Timeout(_)
        | Error::Connectivity(_)
        | Error::Protocol(_)
        | Error::Json(_) => StatusCode::BAD_GATEWAY,
        Error::Config(_) | Error::Storage(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({ "error": err.to_string() }))).into_response()
}
