// crates/syncdir-store-sqlite/src/error.rs
// ============================================================================
// Module: SQLite Directory Store Errors
// Description: Error taxonomy for opening, migrating, loading, and saving.
// Purpose: Collapse every failure into the outcome a consumer acts on.
// Dependencies: syncdir-core, thiserror
// ============================================================================

//! ## Overview
//! [`SqliteStoreError`] records what went wrong in enough detail for logs;
//! [`SqliteStoreError::open_result`] reduces it to the load outcome the
//! directory consumer acts on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use syncdir_core::DirOpenResult;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` directory store errors.
///
/// # Invariants
/// - Error messages never embed entry payloads or attribute values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteStoreError {
    /// Filesystem error preparing or recreating the store file.
    #[error("directory store io error: {0}")]
    Io(String),
    /// Database could not be opened or configured, even after recreating it.
    #[error("directory store open error: {0}")]
    Open(String),
    /// `SQLite` engine error.
    #[error("directory store db error: {0}")]
    Db(String),
    /// Stored data is inconsistent with the schema.
    #[error("directory store corruption: {0}")]
    Corrupt(String),
    /// Stored schema is newer than this build understands.
    #[error("directory store schema version {found} is newer than supported version {supported}")]
    VersionTooNew {
        /// Version found on disk.
        found: i64,
        /// Newest version this build supports.
        supported: i64,
    },
    /// Invalid configuration or caller input.
    #[error("directory store invalid input: {0}")]
    Invalid(String),
}

impl SqliteStoreError {
    /// Maps the error to the load outcome reported to the directory.
    #[must_use]
    pub const fn open_result(&self) -> DirOpenResult {
        match self {
            Self::Io(_) | Self::Open(_) | Self::Invalid(_) => DirOpenResult::FailedOpenDatabase,
            Self::VersionTooNew {
                ..
            } => DirOpenResult::FailedNewerVersion,
            Self::Db(_) | Self::Corrupt(_) => DirOpenResult::FailedDatabaseCorrupt,
        }
    }

    /// Returns the stable label used in audit events.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Open(_) => "open",
            Self::Db(_) => "db",
            Self::Corrupt(_) => "corrupt",
            Self::VersionTooNew {
                ..
            } => "version_too_new",
            Self::Invalid(_) => "invalid",
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
