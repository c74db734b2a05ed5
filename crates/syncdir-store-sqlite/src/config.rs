// crates/syncdir-store-sqlite/src/config.rs
// ============================================================================
// Module: SQLite Directory Store Config
// Description: Location, name, and contention policy of a directory store.
// Purpose: Deserialize and validate store settings before any I/O happens.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A store is identified by a logical name and a backing file. Durability
//! settings are not configurable: every connection forces full sync. The
//! busy timeout defaults to the largest value `SQLite` accepts, so a store
//! waits out contention (including a machine sleeping mid-lock) instead of
//! failing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::SqliteStoreError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default busy timeout (ms): the largest value `SQLite` accepts.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = i32::MAX as u64;
/// Default logical store name.
pub const DEFAULT_STORE_NAME: &str = "default";
/// Maximum logical store name length (matches the version table key width).
const MAX_STORE_NAME_LENGTH: usize = 128;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Configuration for the `SQLite` directory backing store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `store_name` is non-empty and at most 128 bytes.
/// - `busy_timeout_ms` is interpreted as milliseconds, non-zero, and at most
///   `i32::MAX`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqliteDirectoryStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Logical directory name recorded in the version and info tables.
    #[serde(default = "default_store_name")]
    pub store_name: String,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl SqliteDirectoryStoreConfig {
    /// Creates a config with the default busy timeout.
    #[must_use]
    pub fn new(store_name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            store_name: store_name.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    /// Validates the store name, timeout, and path limits.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError::Invalid`] when a setting is out of range.
    pub fn validate(&self) -> Result<(), SqliteStoreError> {
        if self.store_name.is_empty() {
            return Err(SqliteStoreError::Invalid("store_name must not be empty".to_string()));
        }
        if self.store_name.len() > MAX_STORE_NAME_LENGTH {
            return Err(SqliteStoreError::Invalid(format!(
                "store_name exceeds {MAX_STORE_NAME_LENGTH} bytes"
            )));
        }
        if self.busy_timeout_ms == 0 {
            return Err(SqliteStoreError::Invalid(
                "busy_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.busy_timeout_ms > DEFAULT_BUSY_TIMEOUT_MS {
            return Err(SqliteStoreError::Invalid(format!(
                "busy_timeout_ms exceeds {DEFAULT_BUSY_TIMEOUT_MS}"
            )));
        }
        validate_store_path(&self.path)
    }
}

/// Returns the default logical store name.
fn default_store_name() -> String {
    DEFAULT_STORE_NAME.to_string()
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only panic-based assertions are permitted."
    )]

    use std::path::PathBuf;

    use super::DEFAULT_BUSY_TIMEOUT_MS;
    use super::SqliteDirectoryStoreConfig;
    use crate::error::SqliteStoreError;

    #[test]
    fn defaults_apply_when_fields_are_omitted() {
        let config: SqliteDirectoryStoreConfig =
            serde_json::from_str(r#"{"path":"/tmp/sync/SyncData.sqlite3"}"#).unwrap();
        assert_eq!(config.store_name, "default");
        assert_eq!(config.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
        assert_eq!(config.path, PathBuf::from("/tmp/sync/SyncData.sqlite3"));
    }

    #[test]
    fn misspelled_keys_are_rejected() {
        let parsed: Result<SqliteDirectoryStoreConfig, _> =
            serde_json::from_str(r#"{"path":"/tmp/sync.sqlite3","busy_timeout":5}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn rejects_empty_name_and_zero_timeout() {
        let mut config = SqliteDirectoryStoreConfig::new("", "/tmp/sync.sqlite3");
        assert!(matches!(config.validate(), Err(SqliteStoreError::Invalid(_))));
        config.store_name = "user@example.com".to_string();
        config.busy_timeout_ms = 0;
        assert!(matches!(config.validate(), Err(SqliteStoreError::Invalid(_))));
    }

    #[test]
    fn rejects_timeout_beyond_sqlite_range() {
        let mut config = SqliteDirectoryStoreConfig::new("name", "/tmp/sync.sqlite3");
        config.busy_timeout_ms = DEFAULT_BUSY_TIMEOUT_MS + 1;
        assert!(matches!(config.validate(), Err(SqliteStoreError::Invalid(_))));
        config.busy_timeout_ms = DEFAULT_BUSY_TIMEOUT_MS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_overlong_components() {
        let config = SqliteDirectoryStoreConfig::new("name", format!("/tmp/{}", "a".repeat(300)));
        assert!(matches!(config.validate(), Err(SqliteStoreError::Invalid(_))));
    }
}
