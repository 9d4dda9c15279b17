//! Public liveness probe.

use axum::extract::State;
use axum::response::Json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "environment": state.config.environment,
    }))
}
