//! AppState construction extracted from `main.rs`.

use std::sync::Arc;

use anyhow::Context;
use sha2::{Digest, Sha256};

use lg_domain::config::{Config, ConfigSeverity};
use lg_provider::ProviderClient;
use lg_store::MetadataStore;

use crate::runtime::orchestrator::AgentOrchestrator;
use crate::state::AppState;

/// Validate config and initialize every subsystem: metadata store,
/// provider client, orchestrator, and the cached API token digest.
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Metadata store ───────────────────────────────────────────────
    std::fs::create_dir_all(&config.storage.data_dir)
        .with_context(|| format!("creating {}", config.storage.data_dir.display()))?;
    let store = Arc::new(
        MetadataStore::open(config.storage.database_path()).context("opening metadata store")?,
    );

    // ── Provider client + orchestrator ───────────────────────────────
    let provider = Arc::new(
        ProviderClient::from_config(&config.provider).context("building provider client")?,
    );
    let orchestrator = Arc::new(AgentOrchestrator::new(provider, store.clone()));

    // ── API token digest ─────────────────────────────────────────────
    let api_token_hash = read_api_token_hash(&config.server.api_token_env);

    Ok(AppState {
        config,
        orchestrator,
        store,
        api_token_hash,
    })
}

/// Read the API bearer token env var once and cache its SHA-256
/// digest. Unset or empty means dev mode.
fn read_api_token_hash(env_name: &str) -> Option<Vec<u8>> {
    match std::env::var(env_name) {
        Ok(token) if !token.trim().is_empty() => Some(Sha256::digest(token.as_bytes()).to_vec()),
        _ => {
            tracing::warn!(
                env = env_name,
                "API token not set — protected endpoints accept unauthenticated requests"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lg_domain::config::StorageConfig;

    #[test]
    fn unset_token_env_means_dev_mode() {
        assert!(read_api_token_hash("LG_TEST_UNSET_TOKEN_1234").is_none());
    }

    #[test]
    fn set_token_env_yields_a_sha256_digest() {
        let env_var = "LG_TEST_TOKEN_DIGEST_5678";
        std::env::set_var(env_var, "hunter2");
        let hash = read_api_token_hash(env_var).unwrap();
        assert_eq!(hash.len(), 32);
        assert_eq!(hash, Sha256::digest(b"hunter2").to_vec());
        std::env::remove_var(env_var);
    }

    #[test]
    fn build_app_state_wires_the_store_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            storage: StorageConfig {
                data_dir: dir.path().join("state"),
                database_path: None,
            },
            ..Config::default()
        };
        let state = build_app_state(Arc::new(config)).unwrap();
        assert!(state.store.path().starts_with(dir.path()));
        assert!(dir.path().join("state").is_dir());
    }
}
