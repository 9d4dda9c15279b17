//! Upload and run orchestration.
//!
//! Each flow makes its outbound provider calls in sequence, then logs
//! the outcome to the metadata store as a best-effort side-write: a
//! failed write is logged at `warn` and the caller still receives the
//! successful result. Nothing here retries, and a thread that was
//! created before a failed run creation is left as-is.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use lg_domain::Result;
use lg_provider::{ProviderClient, RunOptions};
use lg_store::{MetadataStore, RunRecord, RunStatus, UploadRecord};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Outcomes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Normalized result of a completed upload, returned to the HTTP
/// caller verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub file_id: String,
    pub filename: String,
    pub provider: Option<String>,
    pub content_type: String,
    pub bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// Normalized result of an accepted run.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub run_id: String,
    pub status: RunStatus,
    pub thread_id: String,
    pub started_at: DateTime<Utc>,
    pub dashboard_url: Option<String>,
    pub assistant_id: Option<String>,
    /// The schema profile the caller asked for, echoed back.
    pub requested_schema: String,
    pub metadata: BTreeMap<String, String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Orchestrator
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Coordinates provider calls with metadata persistence.
pub struct AgentOrchestrator {
    provider: Arc<ProviderClient>,
    store: Arc<MetadataStore>,
}

impl AgentOrchestrator {
    pub fn new(provider: Arc<ProviderClient>, store: Arc<MetadataStore>) -> Self {
        Self { provider, store }
    }

    /// Forward a file to the provider's files endpoint and log the
    /// result.
    ///
    /// The reported byte count is the length of the submitted payload,
    /// and `uploaded_at` is stamped here — neither is taken from the
    /// upstream response. The provider-echoed filename wins over the
    /// caller-supplied one when present.
    pub async fn upload_source(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
        provider_hint: Option<String>,
    ) -> Result<UploadOutcome> {
        let byte_count = bytes.len() as u64;
        let file = self.provider.upload_file(filename, content_type, bytes).await?;
        let uploaded_at = Utc::now();

        let outcome = UploadOutcome {
            file_id: file.id,
            filename: file.filename.unwrap_or_else(|| filename.to_owned()),
            provider: provider_hint,
            content_type: content_type.to_owned(),
            bytes: byte_count,
            uploaded_at,
        };

        let record = UploadRecord {
            file_id: outcome.file_id.clone(),
            filename: outcome.filename.clone(),
            provider: outcome.provider.clone(),
            content_type: outcome.content_type.clone(),
            bytes: outcome.bytes,
            uploaded_at: outcome.uploaded_at,
        };
        if let Err(e) = self.store.log_upload(&record).await {
            tracing::warn!(file_id = %record.file_id, error = %e, "upload metadata write failed");
        }

        Ok(outcome)
    }

    /// Create a thread seeded with the given file ids, then a run on
    /// that thread, and log the accepted run.
    ///
    /// The assistant id is checked before any network call. A thread
    /// created before a failed run creation is not cleaned up.
    pub async fn start_agent_run(
        &self,
        file_ids: &[String],
        opts: RunOptions,
    ) -> Result<RunOutcome> {
        let configured_assistant = self.provider.assistant_id()?.to_owned();

        let thread = self.provider.create_thread(file_ids).await?;
        let run = self.provider.create_run(&thread.id, &opts).await?;

        let started_at = started_at_from(run.created_at);
        let status = RunStatus::parse(&run.status).unwrap_or_else(|| {
            tracing::warn!(status = %run.status, run_id = %run.id, "unknown provider run status, recording as queued");
            RunStatus::Queued
        });
        let assistant_id = run.assistant_id.or(Some(configured_assistant));

        let outcome = RunOutcome {
            run_id: run.id,
            status,
            thread_id: thread.id,
            started_at,
            dashboard_url: run.dashboard_url,
            assistant_id,
            requested_schema: opts.schema_profile.clone(),
            metadata: opts.metadata,
        };

        let record = RunRecord {
            run_id: outcome.run_id.clone(),
            thread_id: outcome.thread_id.clone(),
            assistant_id: outcome.assistant_id.clone(),
            status: outcome.status,
            schema_profile: Some(outcome.requested_schema.clone()),
            metadata: outcome.metadata.clone(),
            started_at: outcome.started_at,
        };
        if let Err(e) = self.store.log_run(&record).await {
            tracing::warn!(run_id = %record.run_id, error = %e, "run metadata write failed");
        }

        Ok(outcome)
    }
}

/// Interpret a provider-reported epoch as the run start time, falling
/// back to the current time when absent or out of range.
fn started_at_from(created_at: Option<i64>) -> DateTime<Utc> {
    created_at
        .and_then(|epoch| DateTime::from_timestamp(epoch, 0))
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn started_at_uses_the_provider_epoch_when_present() {
        let stamped = started_at_from(Some(1_700_000_000));
        assert_eq!(
            stamped,
            Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap()
        );
    }

    #[test]
    fn started_at_falls_back_to_now_when_absent() {
        let before = Utc::now();
        let stamped = started_at_from(None);
        assert!(stamped >= before);
        assert!(stamped <= Utc::now());
    }

    #[test]
    fn started_at_rejects_out_of_range_epochs() {
        let before = Utc::now();
        let stamped = started_at_from(Some(i64::MAX));
        assert!(stamped >= before);
    }
}
