//! Metadata persistence for LedgerGate.
//!
//! A write-only log of upload and run events backed by a local SQLite
//! file. Callers treat every write as a best-effort side effect: the
//! store reports failures, but orchestration flows log and discard
//! them rather than failing an already-successful provider call.

pub mod record;
pub mod store;

pub use record::{RunRecord, RunStatus, UploadRecord};
pub use store::MetadataStore;
