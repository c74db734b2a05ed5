// crates/syncdir-core/src/runtime/mod.rs
// ============================================================================
// Module: Syncdir Runtime
// Description: Backend-free helpers built on the core interfaces.
// Purpose: Offer an in-memory backing store for tests and examples.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules hold implementations that need no external storage.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::InMemoryBackingStore;
