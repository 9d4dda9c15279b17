use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Provider
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Connection settings for the external Files/Threads/Runs API.
///
/// The credential and the assistant id are read from environment
/// variables so they never live in the config file. `assistant_id`
/// may alternatively be set inline for single-assistant deployments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// Environment variable holding the API credential.
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    /// Assistant to run against, inline. Takes precedence over
    /// `assistant_id_env`.
    #[serde(default)]
    pub assistant_id: Option<String>,
    /// Environment variable holding the assistant id.
    #[serde(default = "d_assistant_id_env")]
    pub assistant_id_env: String,
    /// Per-attempt request timeout in seconds. There is no retry: a
    /// single failed attempt surfaces as an error to the caller.
    #[serde(default = "d_timeout_secs")]
    pub timeout_secs: u64,
    /// Value of the `OpenAI-Beta` feature header sent on every call.
    #[serde(default = "d_beta_header")]
    pub beta_header: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            api_key_env: d_api_key_env(),
            assistant_id: None,
            assistant_id_env: d_assistant_id_env(),
            timeout_secs: d_timeout_secs(),
            beta_header: d_beta_header(),
        }
    }
}

impl ProviderConfig {
    /// Resolve the assistant id: inline config first, then the
    /// configured environment variable. `None` when neither is set.
    pub fn resolve_assistant_id(&self) -> Option<String> {
        if let Some(ref id) = self.assistant_id {
            if !id.trim().is_empty() {
                return Some(id.clone());
            }
        }
        std::env::var(&self.assistant_id_env)
            .ok()
            .filter(|v| !v.trim().is_empty())
    }

    /// Resolve the API credential from the configured environment
    /// variable. `None` when unset or empty.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|v| !v.trim().is_empty())
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn d_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn d_assistant_id_env() -> String {
    "OPENAI_ASSISTANT_ID".into()
}
fn d_timeout_secs() -> u64 {
    60
}
fn d_beta_header() -> String {
    "assistants=v2".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_all_defaults() {
        let cfg: ProviderConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.base_url, "https://api.openai.com/v1");
        assert_eq!(cfg.api_key_env, "OPENAI_API_KEY");
        assert_eq!(cfg.timeout_secs, 60);
        assert_eq!(cfg.beta_header, "assistants=v2");
        assert!(cfg.assistant_id.is_none());
    }

    #[test]
    fn inline_assistant_id_takes_precedence() {
        let env_var = "LG_TEST_ASSISTANT_PRECEDENCE";
        std::env::set_var(env_var, "asst_from_env");
        let cfg = ProviderConfig {
            assistant_id: Some("asst_inline".into()),
            assistant_id_env: env_var.into(),
            ..ProviderConfig::default()
        };
        assert_eq!(cfg.resolve_assistant_id().as_deref(), Some("asst_inline"));
        std::env::remove_var(env_var);
    }

    #[test]
    fn blank_inline_assistant_id_falls_through_to_env() {
        let env_var = "LG_TEST_ASSISTANT_FALLTHROUGH";
        std::env::set_var(env_var, "asst_from_env");
        let cfg = ProviderConfig {
            assistant_id: Some("   ".into()),
            assistant_id_env: env_var.into(),
            ..ProviderConfig::default()
        };
        assert_eq!(cfg.resolve_assistant_id().as_deref(), Some("asst_from_env"));
        std::env::remove_var(env_var);
    }

    #[test]
    fn unset_credential_resolves_to_none() {
        let cfg = ProviderConfig {
            api_key_env: "LG_TEST_NONEXISTENT_KEY_4242".into(),
            ..ProviderConfig::default()
        };
        assert!(cfg.resolve_api_key().is_none());
    }
}
