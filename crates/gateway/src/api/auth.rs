//! API authentication middleware.
//!
//! The env var named by `config.server.api_token_env` (default
//! `LG_API_TOKEN`) is read **once at startup** and its SHA-256 digest
//! cached in `AppState`.
//! - If the env var is set and non-empty, every protected request must
//!   carry `Authorization: Bearer <token>`.
//! - If the env var is unset or empty, the server logs a warning at
//!   startup and allows unauthenticated access (dev mode).

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::state::AppState;

/// Axum middleware enforcing bearer-token authentication on protected
/// routes. Attach via `axum::middleware::from_fn_with_state`.
pub async fn require_api_token(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let expected_hash = match &state.api_token_hash {
        Some(h) => h,
        None => return next.run(req).await,
    };

    let provided = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or("");

    // Hashing the provided token first gives both sides a fixed
    // length, so the constant-time comparison leaks nothing about
    // the real token.
    let provided_hash = Sha256::digest(provided.as_bytes());

    if !bool::from(provided_hash.ct_eq(expected_hash.as_slice())) {
        return (
            axum::http::StatusCode::UNAUTHORIZED,
            axum::Json(serde_json::json!({ "error": "invalid or missing API token" })),
        )
            .into_response();
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use sha2::{Digest, Sha256};
    use subtle::ConstantTimeEq;

    #[test]
    fn digests_of_equal_tokens_compare_equal() {
        let expected = Sha256::digest(b"secret-token").to_vec();
        let provided = Sha256::digest(b"secret-token");
        assert!(bool::from(provided.ct_eq(expected.as_slice())));
    }

    #[test]
    fn digests_of_different_tokens_compare_unequal() {
        let expected = Sha256::digest(b"secret-token").to_vec();
        let provided = Sha256::digest(b"wrong-token");
        assert!(!bool::from(provided.ct_eq(expected.as_slice())));
    }
}
