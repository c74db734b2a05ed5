// crates/syncdir-core/src/core/xattr.rs
// ============================================================================
// Module: Syncdir Extended Attributes
// Description: Key/value side table attached to entries.
// Purpose: Model attribute keys, values, and their transient flags.
// Dependencies: crate::core::entry
// ============================================================================

//! ## Overview
//! Extended attributes are opaque values keyed by `(metahandle, key)`.
//! Writing a key again replaces the prior value. The `dirty` and
//! `is_deleted` flags live only in memory and drive what a save does.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::entry::Metahandle;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Key of an extended attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExtendedAttributeKey {
    /// Owning entry handle.
    pub metahandle: Metahandle,
    /// Attribute name.
    pub key: String,
}

impl ExtendedAttributeKey {
    /// Creates a new attribute key.
    #[must_use]
    pub fn new(metahandle: Metahandle, key: impl Into<String>) -> Self {
        Self {
            metahandle,
            key: key.into(),
        }
    }
}

/// Value of an extended attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedAttributeValue {
    /// Opaque value bytes.
    pub value: Vec<u8>,
    /// Set when the value differs from what was last saved.
    pub dirty: bool,
    /// Set when the attribute should be removed on the next save.
    pub is_deleted: bool,
}

impl ExtendedAttributeValue {
    /// Returns a dirty, live value.
    #[must_use]
    pub const fn dirty(value: Vec<u8>) -> Self {
        Self {
            value,
            dirty: true,
            is_deleted: false,
        }
    }

    /// Returns a dirty deletion marker.
    #[must_use]
    pub const fn deleted() -> Self {
        Self {
            value: Vec::new(),
            dirty: true,
            is_deleted: true,
        }
    }
}

/// Extended attributes ordered by key.
pub type ExtendedAttributes = BTreeMap<ExtendedAttributeKey, ExtendedAttributeValue>;
