// crates/syncdir-core/src/lib.rs
// ============================================================================
// Module: Syncdir Core Library
// Description: Public API surface for the synchronized directory data model.
// Purpose: Expose core types, the backing store interface, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Syncdir core defines the typed records a synchronized directory persists,
//! the fixed field catalog that maps them onto storage columns, and the
//! [`DirectoryBackingStore`] contract a persistence backend fulfils. It is
//! backend-agnostic; the `SQLite` implementation lives in a separate crate.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::DirOpenResult;
pub use interfaces::DirectoryBackingStore;
pub use runtime::InMemoryBackingStore;
