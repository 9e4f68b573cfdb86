//! Storage configuration shared by every process that opens the activity store.
//!
//! # Invariants
//! - `busy_timeout_ms` bounds how long a write waits on a locked database.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default SQLite file name used when no path is configured.
pub const DEFAULT_DATABASE_FILE: &str = "mergington.sqlite3";
/// Default lock wait before a storage call fails with `RepoError::Timeout`.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Location and timeout policy of the activity database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// SQLite database file path.
    pub database_path: PathBuf,
    /// Milliseconds a connection waits for a competing lock.
    pub busy_timeout_ms: u64,
}

impl StorageConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}
