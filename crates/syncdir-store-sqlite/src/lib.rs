// crates/syncdir-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Directory Store
// Description: Durable DirectoryBackingStore backend using SQLite.
// Purpose: Persist a synchronized directory across crashes and schema changes.
// Dependencies: syncdir-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`DirectoryBackingStore`]
//! implementation. It migrates stores written by older schema versions,
//! purges reconciled tombstones on load, and saves dirty snapshots
//! all-or-nothing. Stored files are untrusted: unreadable files are
//! recreated and malformed payloads decode as empty.
//!
//! [`DirectoryBackingStore`]: syncdir_core::DirectoryBackingStore

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod codec;
pub mod config;
pub mod error;
pub mod migration;
pub mod schema;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileStoreAuditSink;
pub use audit::NoopStoreAuditSink;
pub use audit::StderrStoreAuditSink;
pub use audit::StoreAuditEvent;
pub use audit::StoreAuditSink;
pub use audit::StoreEventKind;
pub use config::SqliteDirectoryStoreConfig;
pub use error::SqliteStoreError;
pub use migration::MigrationReport;
pub use migration::MigrationStep;
pub use schema::CURRENT_VERSION;
pub use store::LoadReport;
pub use store::SqliteDirectoryBackingStore;
