// crates/syncdir-cli/src/lib.rs
// ============================================================================
// Module: Syncdir CLI Library
// Description: Configuration and report builders shared by the CLI binary.
// Purpose: Keep command logic testable outside the binary entry point.
// Dependencies: crate::{config, report}
// ============================================================================

//! ## Overview
//! The `syncdir` binary is a thin dispatcher. Configuration loading and the
//! JSON views it prints live here so integration tests can drive them.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod report;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::AuditConfig;
pub use config::AuditSinkKind;
pub use config::ConfigError;
pub use config::SyncdirConfig;
pub use report::LoadedStore;
pub use report::StoreSummary;
pub use report::entry_record;
pub use report::load_store;
