// crates/syncdir-core/src/core/fields.rs
// ============================================================================
// Module: Syncdir Field Schema
// Description: Compile-time catalog of entry fields and their storage columns.
// Purpose: Pin the durable column order shared by the codec and the schema.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Entry fields are partitioned into five groups, each modeled as its own
//! enum: 64-bit integers, identifiers, bits, strings, and structured
//! payloads. The wrapping [`Field`] enum enumerates every field in the
//! durable on-disk order (integers, identifiers, bits, strings, payloads).
//! Every `column` accessor is an exhaustive `match`, so a field added to a
//! group without a column mapping is rejected by the compiler.
//!
//! Adding a field means appending it to the end of its group and bumping
//! the schema version. Removing a field only drops it from this catalog;
//! the physical column is removed by the store's column refresh.

// ============================================================================
// SECTION: Column Spec
// ============================================================================

/// Stable column name plus its `CREATE TABLE` type/constraint clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Column name.
    pub name: &'static str,
    /// Column type affinity and constraints.
    pub spec: &'static str,
}

impl ColumnSpec {
    /// Creates a new column spec.
    #[must_use]
    pub const fn new(name: &'static str, spec: &'static str) -> Self {
        Self {
            name,
            spec,
        }
    }
}

// ============================================================================
// SECTION: Field Groups
// ============================================================================

/// 64-bit integer fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Int64Field {
    /// Local handle; primary key of the entries table.
    MetaHandle,
    /// Version of the last server update the local copy is based on.
    BaseVersion,
    /// Latest version reported by the server.
    ServerVersion,
    /// Local modification time.
    Mtime,
    /// Server modification time.
    ServerMtime,
    /// Local creation time.
    Ctime,
    /// Server creation time.
    ServerCtime,
    /// Position among siblings as reported by the server.
    ServerPositionInParent,
    /// Identifier of the item in the local model that owns it.
    LocalExternalId,
}

impl Int64Field {
    /// All integer fields in column order.
    pub const ALL: [Self; 9] = [
        Self::MetaHandle,
        Self::BaseVersion,
        Self::ServerVersion,
        Self::Mtime,
        Self::ServerMtime,
        Self::Ctime,
        Self::ServerCtime,
        Self::ServerPositionInParent,
        Self::LocalExternalId,
    ];
    /// Number of integer fields.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the slot of this field within its group.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the storage column for this field.
    #[must_use]
    pub const fn column(self) -> ColumnSpec {
        match self {
            Self::MetaHandle => {
                ColumnSpec::new("metahandle", "bigint primary key ON CONFLICT FAIL")
            }
            Self::BaseVersion => ColumnSpec::new("base_version", "bigint default -1"),
            Self::ServerVersion => ColumnSpec::new("server_version", "bigint default 0"),
            Self::Mtime => ColumnSpec::new("mtime", "bigint default 0"),
            Self::ServerMtime => ColumnSpec::new("server_mtime", "bigint default 0"),
            Self::Ctime => ColumnSpec::new("ctime", "bigint default 0"),
            Self::ServerCtime => ColumnSpec::new("server_ctime", "bigint default 0"),
            Self::ServerPositionInParent => {
                ColumnSpec::new("server_position_in_parent", "bigint default 0")
            }
            Self::LocalExternalId => ColumnSpec::new("local_external_id", "bigint default 0"),
        }
    }
}

/// Identifier fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdField {
    /// Sync identifier of the entry.
    Id,
    /// Local parent identifier.
    ParentId,
    /// Parent identifier as reported by the server.
    ServerParentId,
    /// Predecessor among siblings.
    PrevId,
    /// Successor among siblings.
    NextId,
}

impl IdField {
    /// All identifier fields in column order.
    pub const ALL: [Self; 5] =
        [Self::Id, Self::ParentId, Self::ServerParentId, Self::PrevId, Self::NextId];
    /// Number of identifier fields.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the slot of this field within its group.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the storage column for this field.
    #[must_use]
    pub const fn column(self) -> ColumnSpec {
        match self {
            Self::Id => ColumnSpec::new("id", "varchar(255) default 'r'"),
            Self::ParentId => ColumnSpec::new("parent_id", "varchar(255) default 'r'"),
            Self::ServerParentId => ColumnSpec::new("server_parent_id", "varchar(255) default 'r'"),
            Self::PrevId => ColumnSpec::new("prev_id", "varchar(255) default 'r'"),
            Self::NextId => ColumnSpec::new("next_id", "varchar(255) default 'r'"),
        }
    }
}

/// Boolean fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BitField {
    /// Local changes are pending commit to the server.
    IsUnsynced,
    /// A server update is pending local application.
    IsUnappliedUpdate,
    /// Entry is deleted locally.
    IsDel,
    /// Entry is a folder.
    IsDir,
    /// Server copy is a folder.
    ServerIsDir,
    /// Server copy is deleted.
    ServerIsDel,
}

impl BitField {
    /// All bit fields in column order.
    pub const ALL: [Self; 6] = [
        Self::IsUnsynced,
        Self::IsUnappliedUpdate,
        Self::IsDel,
        Self::IsDir,
        Self::ServerIsDir,
        Self::ServerIsDel,
    ];
    /// Number of bit fields.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the slot of this field within its group.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the storage column for this field.
    #[must_use]
    pub const fn column(self) -> ColumnSpec {
        match self {
            Self::IsUnsynced => ColumnSpec::new("is_unsynced", "bit default 0"),
            Self::IsUnappliedUpdate => ColumnSpec::new("is_unapplied_update", "bit default 0"),
            Self::IsDel => ColumnSpec::new("is_del", "bit default 0"),
            Self::IsDir => ColumnSpec::new("is_dir", "bit default 0"),
            Self::ServerIsDir => ColumnSpec::new("server_is_dir", "bit default 0"),
            Self::ServerIsDel => ColumnSpec::new("server_is_del", "bit default 0"),
        }
    }
}

/// String fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StringField {
    /// Display name of the entry.
    NonUniqueName,
    /// Display name as reported by the server.
    ServerNonUniqueName,
    /// Server-assigned tag identifying permanent items.
    UniqueServerTag,
    /// Client-assigned tag stable across machines.
    UniqueClientTag,
}

impl StringField {
    /// All string fields in column order.
    pub const ALL: [Self; 4] = [
        Self::NonUniqueName,
        Self::ServerNonUniqueName,
        Self::UniqueServerTag,
        Self::UniqueClientTag,
    ];
    /// Number of string fields.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the slot of this field within its group.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the storage column for this field.
    #[must_use]
    pub const fn column(self) -> ColumnSpec {
        match self {
            Self::NonUniqueName => ColumnSpec::new("non_unique_name", "varchar"),
            Self::ServerNonUniqueName => ColumnSpec::new("server_non_unique_name", "varchar(255)"),
            Self::UniqueServerTag => ColumnSpec::new("unique_server_tag", "varchar"),
            Self::UniqueClientTag => ColumnSpec::new("unique_client_tag", "varchar"),
        }
    }
}

/// Structured payload fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProtoField {
    /// Local rich data.
    Specifics,
    /// Rich data as reported by the server.
    ServerSpecifics,
}

impl ProtoField {
    /// All payload fields in column order.
    pub const ALL: [Self; 2] = [Self::Specifics, Self::ServerSpecifics];
    /// Number of payload fields.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the slot of this field within its group.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the storage column for this field.
    #[must_use]
    pub const fn column(self) -> ColumnSpec {
        match self {
            Self::Specifics => ColumnSpec::new("specifics", "blob"),
            Self::ServerSpecifics => ColumnSpec::new("server_specifics", "blob"),
        }
    }
}

// ============================================================================
// SECTION: Field Catalog
// ============================================================================

/// Total number of persisted entry fields.
pub const FIELD_COUNT: usize = Int64Field::COUNT
    + IdField::COUNT
    + BitField::COUNT
    + StringField::COUNT
    + ProtoField::COUNT;

/// Any persisted entry field, tagged with its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Integer group.
    Int64(Int64Field),
    /// Identifier group.
    Id(IdField),
    /// Bit group.
    Bit(BitField),
    /// String group.
    String(StringField),
    /// Payload group.
    Proto(ProtoField),
}

impl Field {
    /// Returns the storage column for this field.
    #[must_use]
    pub const fn column(self) -> ColumnSpec {
        match self {
            Self::Int64(field) => field.column(),
            Self::Id(field) => field.column(),
            Self::Bit(field) => field.column(),
            Self::String(field) => field.column(),
            Self::Proto(field) => field.column(),
        }
    }

    /// Iterates every field in durable column order.
    pub fn all() -> impl Iterator<Item = Self> {
        Int64Field::ALL
            .into_iter()
            .map(Self::Int64)
            .chain(IdField::ALL.into_iter().map(Self::Id))
            .chain(BitField::ALL.into_iter().map(Self::Bit))
            .chain(StringField::ALL.into_iter().map(Self::String))
            .chain(ProtoField::ALL.into_iter().map(Self::Proto))
    }
}

/// Returns the entries table column catalog in durable order.
#[must_use]
pub fn entry_columns() -> Vec<ColumnSpec> {
    Field::all().map(Field::column).collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
