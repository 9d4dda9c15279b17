//! Record types persisted by the metadata store.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Run status
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Lifecycle states a run moves through on the provider side.
///
/// This service only ever writes the initial status at creation time
/// and applies single point-writes on behalf of out-of-band callers —
/// it does not poll or drive transitions itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
        }
    }

    /// Parse a provider-reported status string. Unknown strings map to
    /// `None` so callers can decide on a fallback.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "queued" => Some(RunStatus::Queued),
            "running" => Some(RunStatus::Running),
            "completed" => Some(RunStatus::Completed),
            "failed" => Some(RunStatus::Failed),
            "cancelled" => Some(RunStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Records
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One successful file upload, keyed by the provider-assigned file id.
/// Logging the same `file_id` again replaces the earlier row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRecord {
    pub file_id: String,
    pub filename: String,
    /// Optional caller-supplied hint about where the file came from.
    pub provider: Option<String>,
    pub content_type: String,
    pub bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// One accepted agent run, keyed by the provider-assigned run id.
/// `status` is the only field ever updated after insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub thread_id: String,
    pub assistant_id: Option<String>,
    pub status: RunStatus,
    pub schema_profile: Option<String>,
    /// Caller-supplied key/value pairs, opaque to this service.
    pub metadata: BTreeMap<String, String>,
    pub started_at: DateTime<Utc>,
}
