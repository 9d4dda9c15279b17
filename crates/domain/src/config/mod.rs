mod provider;
mod server;
mod storage;

pub use provider::*;
pub use server::*;
pub use storage::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Free-form deployment label echoed by the health endpoint
    /// (`local`, `staging`, `production`, ...).
    #[serde(default = "d_environment")]
    pub environment: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: d_environment(),
            server: ServerConfig::default(),
            provider: ProviderConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

fn d_environment() -> String {
    "staging".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Errors make the server refuse to start; warnings are logged and
    /// startup proceeds.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.server.port == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be non-zero".into(),
            });
        }

        if self.provider.base_url.trim().is_empty() {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "provider.base_url".into(),
                message: "base URL must not be empty".into(),
            });
        }

        if self.provider.timeout_secs == 0 {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Error,
                field: "provider.timeout_secs".into(),
                message: "request timeout must be non-zero".into(),
            });
        }

        if std::env::var(&self.provider.api_key_env)
            .map(|v| v.trim().is_empty())
            .unwrap_or(true)
        {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                field: "provider.api_key_env".into(),
                message: format!(
                    "environment variable '{}' is unset — upload and run \
                     requests will fail until a credential is provided",
                    self.provider.api_key_env
                ),
            });
        }

        if self.provider.assistant_id.is_none()
            && std::env::var(&self.provider.assistant_id_env)
                .map(|v| v.trim().is_empty())
                .unwrap_or(true)
        {
            issues.push(ConfigIssue {
                severity: ConfigSeverity::Warning,
                field: "provider.assistant_id".into(),
                message: format!(
                    "no assistant id configured (set provider.assistant_id or \
                     the '{}' environment variable) — run requests will fail",
                    self.provider.assistant_id_env
                ),
            });
        }

        issues
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_uses_all_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.environment, "staging");
        assert_eq!(cfg.server.port, 3410);
        assert_eq!(cfg.provider.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn sections_parse_independently() {
        let cfg: Config = toml::from_str(
            r#"
            environment = "production"

            [server]
            port = 8080

            [provider]
            timeout_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(cfg.environment, "production");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.provider.timeout_secs, 30);
        // Untouched sections keep their defaults.
        assert_eq!(cfg.storage.data_dir.to_str().unwrap(), "./data");
    }

    #[test]
    fn zero_port_is_a_validation_error() {
        let cfg = Config {
            server: ServerConfig {
                port: 0,
                ..ServerConfig::default()
            },
            ..Config::default()
        };
        let issues = cfg.validate();
        assert!(issues
            .iter()
            .any(|i| i.severity == ConfigSeverity::Error && i.field == "server.port"));
    }

    #[test]
    fn empty_base_url_is_a_validation_error() {
        let cfg = Config {
            provider: ProviderConfig {
                base_url: "  ".into(),
                ..ProviderConfig::default()
            },
            ..Config::default()
        };
        let issues = cfg.validate();
        assert!(issues
            .iter()
            .any(|i| i.severity == ConfigSeverity::Error && i.field == "provider.base_url"));
    }

    #[test]
    fn issue_display_includes_severity_tag() {
        let issue = ConfigIssue {
            severity: ConfigSeverity::Warning,
            field: "provider.api_key_env".into(),
            message: "unset".into(),
        };
        assert!(issue.to_string().starts_with("[WARN]"));
    }
}
