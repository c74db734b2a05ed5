// crates/syncdir-core/src/core/mod.rs
// ============================================================================
// Module: Syncdir Core Types
// Description: Entry records, field schema, payloads, and bookkeeping types.
// Purpose: Provide the typed data model shared by every backing store.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types define the typed record persisted per synchronized item, the
//! compile-time field catalog that fixes its column layout, and the
//! bookkeeping exchanged between a backing store and its consumer.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod entry;
pub mod fields;
pub mod identifiers;
pub mod kernel_info;
pub mod model_type;
pub mod specifics;
pub mod xattr;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use entry::EntryKernel;
pub use entry::Metahandle;
pub use fields::BitField;
pub use fields::ColumnSpec;
pub use fields::FIELD_COUNT;
pub use fields::Field;
pub use fields::IdField;
pub use fields::Int64Field;
pub use fields::ProtoField;
pub use fields::StringField;
pub use fields::entry_columns;
pub use identifiers::ROOT_ID;
pub use identifiers::SyncId;
pub use kernel_info::DownloadProgress;
pub use kernel_info::INITIAL_NEXT_ID;
pub use kernel_info::KernelLoadInfo;
pub use kernel_info::KernelShareInfoStatus;
pub use kernel_info::MetahandlesIndex;
pub use kernel_info::PersistedKernelInfo;
pub use kernel_info::SaveChangesSnapshot;
pub use model_type::ModelType;
pub use specifics::AppSpecifics;
pub use specifics::AutofillSpecifics;
pub use specifics::BookmarkSpecifics;
pub use specifics::EntitySpecifics;
pub use specifics::ExtensionSpecifics;
pub use specifics::NigoriSpecifics;
pub use specifics::PasswordSpecifics;
pub use specifics::PreferenceSpecifics;
pub use specifics::SessionSpecifics;
pub use specifics::ThemeSpecifics;
pub use specifics::TypedUrlSpecifics;
pub use xattr::ExtendedAttributeKey;
pub use xattr::ExtendedAttributeValue;
pub use xattr::ExtendedAttributes;
