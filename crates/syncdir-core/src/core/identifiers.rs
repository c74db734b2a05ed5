// crates/syncdir-core/src/core/identifiers.rs
// ============================================================================
// Module: Syncdir Identifiers
// Description: Opaque sync identifiers for directory entries.
// Purpose: Provide a strongly typed, serializable ID with a stable string form.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Sync identifiers are opaque strings assigned either locally or by the
//! server. The root of the hierarchy always carries the identifier `r`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// String form of the root identifier.
pub const ROOT_ID: &str = "r";

/// Sync identifier of a directory entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncId(String);

impl SyncId {
    /// Creates a new sync identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier of the hierarchy root.
    #[must_use]
    pub fn root() -> Self {
        Self::new(ROOT_ID)
    }

    /// Returns true when this is the root identifier.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == ROOT_ID
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SyncId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for SyncId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SyncId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
