//! SQLite-backed metadata store.
//!
//! Connections are opened fresh for every write and closed as soon as
//! the statement commits — there is no long-lived handle to share, so
//! concurrent writers coordinate only through SQLite's own file
//! locking. Writes run on the blocking pool so a slow disk never
//! occupies an executor thread.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection};

use lg_domain::{Error, Result};

use crate::record::{RunRecord, RunStatus, UploadRecord};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS uploads (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    file_id TEXT UNIQUE NOT NULL,
    filename TEXT NOT NULL,
    provider TEXT,
    content_type TEXT NOT NULL,
    bytes INTEGER NOT NULL,
    uploaded_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id TEXT UNIQUE NOT NULL,
    thread_id TEXT NOT NULL,
    assistant_id TEXT,
    status TEXT NOT NULL,
    schema_profile TEXT,
    metadata_json TEXT,
    started_at TEXT NOT NULL
);
"#;

/// Write-only log of upload and run events.
///
/// Constructed once at startup and handed to the orchestration flows
/// by `Arc` — there is no process-global instance.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    db_path: PathBuf,
}

impl MetadataStore {
    /// Open (or create) the store at `path`, creating parent
    /// directories and running the idempotent schema setup.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let db_path: PathBuf = path.into();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = connect(&db_path)?;
        conn.execute_batch(SCHEMA).map_err(from_sqlite)?;
        tracing::info!(path = %db_path.display(), "metadata store ready");
        Ok(Self { db_path })
    }

    /// Insert or replace the upload row keyed by `file_id`.
    pub async fn log_upload(&self, record: &UploadRecord) -> Result<()> {
        let record = record.clone();
        let db_path = self.db_path.clone();
        tracing::debug!(file_id = %record.file_id, "persisting upload metadata");
        run_blocking(move || {
            let conn = connect(&db_path)?;
            conn.execute(
                "INSERT OR REPLACE INTO uploads
                     (file_id, filename, provider, content_type, bytes, uploaded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.file_id,
                    record.filename,
                    record.provider,
                    record.content_type,
                    record.bytes as i64,
                    record.uploaded_at.to_rfc3339(),
                ],
            )
            .map_err(from_sqlite)?;
            Ok(())
        })
        .await
    }

    /// Insert or replace the run row keyed by `run_id`. The metadata
    /// map is serialized as a compact JSON string in a single column.
    pub async fn log_run(&self, record: &RunRecord) -> Result<()> {
        let record = record.clone();
        let db_path = self.db_path.clone();
        tracing::debug!(run_id = %record.run_id, "persisting run metadata");
        run_blocking(move || {
            let metadata_json = serde_json::to_string(&record.metadata)?;
            let conn = connect(&db_path)?;
            conn.execute(
                "INSERT OR REPLACE INTO runs
                     (run_id, thread_id, assistant_id, status, schema_profile, metadata_json, started_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.run_id,
                    record.thread_id,
                    record.assistant_id,
                    record.status.as_str(),
                    record.schema_profile,
                    metadata_json,
                    record.started_at.to_rfc3339(),
                ],
            )
            .map_err(from_sqlite)?;
            Ok(())
        })
        .await
    }

    /// Point-write of the `status` column for an existing run.
    /// A `run_id` with no row affects zero rows and is not an error.
    pub async fn update_run_status(&self, run_id: &str, status: RunStatus) -> Result<()> {
        let run_id = run_id.to_owned();
        let db_path = self.db_path.clone();
        tracing::debug!(run_id = %run_id, status = %status, "updating run status");
        run_blocking(move || {
            let conn = connect(&db_path)?;
            conn.execute(
                "UPDATE runs SET status = ?1 WHERE run_id = ?2",
                params![status.as_str(), run_id],
            )
            .map_err(from_sqlite)?;
            Ok(())
        })
        .await
    }

    /// Path of the underlying database file.
    pub fn path(&self) -> &Path {
        &self.db_path
    }
}

fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path).map_err(from_sqlite)?;
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(from_sqlite)?;
    conn.busy_timeout(Duration::from_secs(5)).map_err(from_sqlite)?;
    Ok(conn)
}

async fn run_blocking<F>(write: F) -> Result<()>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    tokio::task::spawn_blocking(write)
        .await
        .map_err(|e| Error::Storage(format!("blocking write panicked: {e}")))?
}

fn from_sqlite(err: rusqlite::Error) -> Error {
    Error::Storage(err.to_string())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn upload_record(file_id: &str, filename: &str) -> UploadRecord {
        UploadRecord {
            file_id: file_id.into(),
            filename: filename.into(),
            provider: Some("quickbooks".into()),
            content_type: "text/csv".into(),
            bytes: 1024,
            uploaded_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        }
    }

    fn run_record(run_id: &str) -> RunRecord {
        let mut metadata = BTreeMap::new();
        metadata.insert("client".into(), "acme".into());
        RunRecord {
            run_id: run_id.into(),
            thread_id: "thread_1".into(),
            assistant_id: Some("asst_1".into()),
            status: RunStatus::Queued,
            schema_profile: Some("income_cashflow_expense".into()),
            metadata,
            started_at: Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap(),
        }
    }

    #[tokio::test]
    async fn log_upload_twice_keeps_one_row_with_latest_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::open(dir.path().join("meta.db")).unwrap();

        store.log_upload(&upload_record("file_abc", "q1.csv")).await.unwrap();
        store.log_upload(&upload_record("file_abc", "q1-fixed.csv")).await.unwrap();

        let conn = Connection::open(store.path()).unwrap();
        let (count, filename): (i64, String) = conn
            .query_row(
                "SELECT COUNT(*), MAX(filename) FROM uploads WHERE file_id = 'file_abc'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(filename, "q1-fixed.csv");
    }

    #[tokio::test]
    async fn log_run_serializes_metadata_as_compact_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::open(dir.path().join("meta.db")).unwrap();

        store.log_run(&run_record("run_1")).await.unwrap();

        let conn = Connection::open(store.path()).unwrap();
        let (status, metadata_json): (String, String) = conn
            .query_row(
                "SELECT status, metadata_json FROM runs WHERE run_id = 'run_1'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .unwrap();
        assert_eq!(status, "queued");
        assert_eq!(metadata_json, r#"{"client":"acme"}"#);
    }

    #[tokio::test]
    async fn update_run_status_rewrites_the_status_column() {
        let dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::open(dir.path().join("meta.db")).unwrap();

        store.log_run(&run_record("run_1")).await.unwrap();
        store.update_run_status("run_1", RunStatus::Completed).await.unwrap();

        let conn = Connection::open(store.path()).unwrap();
        let status: String = conn
            .query_row("SELECT status FROM runs WHERE run_id = 'run_1'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(status, "completed");
    }

    #[tokio::test]
    async fn update_run_status_on_missing_run_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::open(dir.path().join("meta.db")).unwrap();

        store
            .update_run_status("run_missing", RunStatus::Failed)
            .await
            .unwrap();

        let conn = Connection::open(store.path()).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn reopening_an_existing_database_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.db");

        let store = MetadataStore::open(&path).unwrap();
        store.log_upload(&upload_record("file_1", "a.csv")).await.unwrap();
        drop(store);

        let store = MetadataStore::open(&path).unwrap();
        store.log_upload(&upload_record("file_2", "b.csv")).await.unwrap();

        let conn = Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM uploads", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }
}
