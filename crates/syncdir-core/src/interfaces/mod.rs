// crates/syncdir-core/src/interfaces/mod.rs
// ============================================================================
// Module: Syncdir Interfaces
// Description: Backend-agnostic contract for directory persistence.
// Purpose: Define the load/save surface consumed by the directory.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! A backing store translates between caller-owned in-memory containers and
//! durable storage. It keeps no copies of entries between calls. Loads
//! report a single outcome; saves are all-or-nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;

use crate::core::ExtendedAttributes;
use crate::core::KernelLoadInfo;
use crate::core::MetahandlesIndex;
use crate::core::SaveChangesSnapshot;

// ============================================================================
// SECTION: Open Result
// ============================================================================

/// Outcome of loading a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirOpenResult {
    /// Store opened and every container was populated.
    Opened,
    /// Store could not be opened, even after recreating the file.
    FailedOpenDatabase,
    /// Initialization, migration, or bulk load failed (disk full or corrupt).
    FailedDatabaseCorrupt,
    /// Stored schema is newer than this build understands.
    FailedNewerVersion,
}

impl DirOpenResult {
    /// Returns the stable label used in logs and CLI output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::FailedOpenDatabase => "failed_open_database",
            Self::FailedDatabaseCorrupt => "failed_database_corrupt",
            Self::FailedNewerVersion => "failed_newer_version",
        }
    }
}

impl fmt::Display for DirOpenResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Backing Store
// ============================================================================

/// Persistence backend for a synchronized directory.
///
/// Callers serialize access: one load at startup, then saves that never
/// overlap.
pub trait DirectoryBackingStore {
    /// Opens the store and fills the caller's containers.
    ///
    /// Containers are only appended to; entries and attributes loaded here
    /// are clean.
    fn load(
        &mut self,
        entries: &mut MetahandlesIndex,
        xattrs: &mut ExtendedAttributes,
        info: &mut KernelLoadInfo,
    ) -> DirOpenResult;

    /// Persists a dirty snapshot atomically.
    ///
    /// Returns false when nothing was persisted; the caller keeps the
    /// snapshot dirty and retries later.
    fn save_changes(&mut self, snapshot: &SaveChangesSnapshot) -> bool;
}
