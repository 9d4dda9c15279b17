//! Agent run endpoints.
//!
//! - `POST /api/runs`                  — create a thread + run from uploaded files
//! - `POST /api/runs/:run_id/status`   — out-of-band status point-write

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;

use lg_provider::schemas;
use lg_provider::RunOptions;
use lg_store::RunStatus;

use crate::api::error_response;
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/runs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct AgentRunRequest {
    /// Files previously uploaded via `/api/uploads`, in the order they
    /// should be attached.
    pub file_ids: Vec<String>,
    /// Custom instructions; blank input falls back to the fixed
    /// default on the provider call.
    #[serde(default)]
    pub instructions: String,
    /// Structured-output profile. Unrecognized names create the run
    /// without an output constraint.
    #[serde(default = "default_schema_profile")]
    pub schema_profile: String,
    /// Opaque key/value pairs stored alongside the run.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

fn default_schema_profile() -> String {
    schemas::DEFAULT_PROFILE.to_owned()
}

pub async fn create_run(
    State(state): State<AppState>,
    Json(req): Json<AgentRunRequest>,
) -> Response {
    if req.file_ids.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": "file_ids must not be empty" })),
        )
            .into_response();
    }

    let opts = RunOptions {
        schema_profile: req.schema_profile,
        instructions: req.instructions,
        metadata: req.metadata,
    };

    match state.orchestrator.start_agent_run(&req.file_ids, opts).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => error_response(&err),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/runs/:run_id/status
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: RunStatus,
}

/// Single point-write for out-of-band status reporters. No existence
/// check: an unknown run id affects zero rows and still answers 202.
pub async fn update_run_status(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
    Json(req): Json<StatusUpdateRequest>,
) -> Response {
    match state.store.update_run_status(&run_id, req.status).await {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({ "run_id": run_id, "status": req.status })),
        )
            .into_response(),
        Err(err) => error_response(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_request_defaults_apply() {
        let req: AgentRunRequest =
            serde_json::from_str(r#"{ "file_ids": ["file_abc"] }"#).unwrap();
        assert_eq!(req.schema_profile, "income_cashflow_expense");
        assert_eq!(req.instructions, "");
        assert!(req.metadata.is_empty());
    }

    #[test]
    fn run_request_accepts_full_payload() {
        let req: AgentRunRequest = serde_json::from_str(
            r#"{
                "file_ids": ["file_a", "file_b"],
                "instructions": "focus on Q3",
                "schema_profile": "default",
                "metadata": { "client": "acme" }
            }"#,
        )
        .unwrap();
        assert_eq!(req.file_ids.len(), 2);
        assert_eq!(req.schema_profile, "default");
        assert_eq!(req.metadata["client"], "acme");
    }

    #[test]
    fn status_update_rejects_unknown_states() {
        let err = serde_json::from_str::<StatusUpdateRequest>(r#"{ "status": "paused" }"#);
        assert!(err.is_err());

        let ok: StatusUpdateRequest =
            serde_json::from_str(r#"{ "status": "completed" }"#).unwrap();
        assert_eq!(ok.status, RunStatus::Completed);
    }
}
