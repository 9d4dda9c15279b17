/// Shared error type used across all LedgerGate crates.
///
/// `UpstreamStatus` carries the provider's status code and a truncated
/// response body; `Timeout` and `Connectivity` split network-level
/// failures; `Protocol` marks a 2xx response missing a field the wire
/// contract requires.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config: {0}")]
    Config(String),

    #[error("provider returned HTTP {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("connectivity: {0}")]
    Connectivity(String),

    #[error("protocol: {0}")]
    Protocol(String),

    #[error("storage: {0}")]
    Storage(String),
}

impl Error {
    /// True for failures that originate on the provider side of the
    /// proxy (upstream status, network, contract violations) rather
    /// than in this service.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Error::UpstreamStatus { .. }
                | Error::Timeout(_)
                | Error::Connectivity(_)
                | Error::Protocol(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_formats_code_and_body() {
        let err = Error::UpstreamStatus {
            status: 503,
            body: "overloaded".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("overloaded"));
    }

    #[test]
    fn config_errors_are_not_upstream() {
        assert!(!Error::Config("missing key".into()).is_upstream());
        assert!(!Error::Storage("disk full".into()).is_upstream());
    }

    #[test]
    fn network_and_contract_errors_are_upstream() {
        assert!(Error::Timeout("60s elapsed".into()).is_upstream());
        assert!(Error::Connectivity("dns failure".into()).is_upstream());
        assert!(Error::Protocol("no file id".into()).is_upstream());
        assert!(Error::UpstreamStatus { status: 400, body: String::new() }.is_upstream());
    }
}
