// crates/syncdir-core/src/core/entry.rs
// ============================================================================
// Module: Syncdir Entry Kernel
// Description: In-memory record for one synchronized item.
// Purpose: Hold every persisted field group plus the transient dirty flag.
// Dependencies: crate::core::{fields, identifiers, specifics}
// ============================================================================

//! ## Overview
//! An [`EntryKernel`] stores one value per catalog field, grouped exactly as
//! the field schema groups them. Field access is keyed by the group enums,
//! so there is no untyped index arithmetic. The dirty flag is never
//! persisted: setters raise it, and the store clears it when a record is
//! unpacked from disk.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::fields::BitField;
use crate::core::fields::IdField;
use crate::core::fields::Int64Field;
use crate::core::fields::ProtoField;
use crate::core::fields::StringField;
use crate::core::identifiers::SyncId;
use crate::core::specifics::EntitySpecifics;

// ============================================================================
// SECTION: Entry Kernel
// ============================================================================

/// Local handle of an entry; primary key of the entries table.
pub type Metahandle = i64;

/// Full metadata of one synchronized item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryKernel {
    /// Integer group.
    int64_fields: [i64; Int64Field::COUNT],
    /// Identifier group.
    id_fields: [SyncId; IdField::COUNT],
    /// Bit group.
    bit_fields: [bool; BitField::COUNT],
    /// String group.
    string_fields: [String; StringField::COUNT],
    /// Payload group.
    proto_fields: [EntitySpecifics; ProtoField::COUNT],
    /// Set when the record differs from what was last saved.
    dirty: bool,
}

impl EntryKernel {
    /// Creates an empty entry with the given handle.
    #[must_use]
    pub fn with_metahandle(metahandle: Metahandle) -> Self {
        let mut entry = Self::default();
        entry.put_int64(Int64Field::MetaHandle, metahandle);
        entry
    }

    /// Returns the entry's handle.
    #[must_use]
    pub const fn metahandle(&self) -> Metahandle {
        self.int64_fields[Int64Field::MetaHandle.index()]
    }

    /// Returns an integer field.
    #[must_use]
    pub const fn int64(&self, field: Int64Field) -> i64 {
        self.int64_fields[field.index()]
    }

    /// Sets an integer field and marks the entry dirty.
    pub const fn put_int64(&mut self, field: Int64Field, value: i64) {
        self.int64_fields[field.index()] = value;
        self.dirty = true;
    }

    /// Returns an identifier field.
    #[must_use]
    pub const fn id(&self, field: IdField) -> &SyncId {
        &self.id_fields[field.index()]
    }

    /// Sets an identifier field and marks the entry dirty.
    pub fn put_id(&mut self, field: IdField, value: SyncId) {
        self.id_fields[field.index()] = value;
        self.dirty = true;
    }

    /// Returns a bit field.
    #[must_use]
    pub const fn bit(&self, field: BitField) -> bool {
        self.bit_fields[field.index()]
    }

    /// Sets a bit field and marks the entry dirty.
    pub const fn put_bit(&mut self, field: BitField, value: bool) {
        self.bit_fields[field.index()] = value;
        self.dirty = true;
    }

    /// Returns a string field.
    #[must_use]
    pub fn string(&self, field: StringField) -> &str {
        &self.string_fields[field.index()]
    }

    /// Sets a string field and marks the entry dirty.
    pub fn put_string(&mut self, field: StringField, value: impl Into<String>) {
        self.string_fields[field.index()] = value.into();
        self.dirty = true;
    }

    /// Returns a payload field.
    #[must_use]
    pub const fn specifics(&self, field: ProtoField) -> &EntitySpecifics {
        &self.proto_fields[field.index()]
    }

    /// Sets a payload field and marks the entry dirty.
    pub fn put_specifics(&mut self, field: ProtoField, value: EntitySpecifics) {
        self.proto_fields[field.index()] = value;
        self.dirty = true;
    }

    /// Returns true when the entry has unsaved changes.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the unsaved-changes flag.
    pub const fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    /// Returns true for tombstones that synchronization has fully reconciled.
    ///
    /// Deleted entries that still have outbound changes or unapplied server
    /// updates are retained.
    #[must_use]
    pub const fn is_purgeable(&self) -> bool {
        self.bit(BitField::IsDel)
            && !self.bit(BitField::IsUnsynced)
            && !self.bit(BitField::IsUnappliedUpdate)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
