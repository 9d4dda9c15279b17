use std::sync::Arc;

use lg_domain::config::Config;
use lg_store::MetadataStore;

use crate::runtime::orchestrator::AgentOrchestrator;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Upload/run coordination against the provider and the store.
    pub orchestrator: Arc<AgentOrchestrator>,
    /// Metadata store, reachable directly for the status update hook.
    pub store: Arc<MetadataStore>,
    /// SHA-256 hash of the API bearer token (read once at startup).
    /// `None` = dev mode (no auth enforced).
    pub api_token_hash: Option<Vec<u8>>,
}
