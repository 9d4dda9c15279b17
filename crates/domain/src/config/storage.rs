use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Storage
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for local state. Created on startup if missing.
    #[serde(default = "d_data_dir")]
    pub data_dir: PathBuf,
    /// Path of the SQLite metadata database. Defaults to
    /// `{data_dir}/metadata.db` when unset.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: d_data_dir(),
            database_path: None,
        }
    }
}

impl StorageConfig {
    /// The effective database path after applying the default.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("metadata.db"))
    }
}

fn d_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
