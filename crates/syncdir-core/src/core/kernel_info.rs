// crates/syncdir-core/src/core/kernel_info.rs
// ============================================================================
// Module: Syncdir Kernel Info
// Description: Store-wide bookkeeping and the save snapshot.
// Purpose: Carry birthday, id counter, per-type progress, and dirty state.
// Dependencies: crate::core::{entry, model_type, xattr}, serde
// ============================================================================

//! ## Overview
//! [`PersistedKernelInfo`] is the singleton bookkeeping row plus the
//! per-type download progress. [`KernelLoadInfo`] adds the values only a
//! load produces (cache GUID, highest handle in use). A
//! [`SaveChangesSnapshot`] is everything one save cycle must write.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::entry::EntryKernel;
use crate::core::entry::Metahandle;
use crate::core::model_type::ModelType;
use crate::core::xattr::ExtendedAttributes;

// ============================================================================
// SECTION: Kernel Info
// ============================================================================

/// Value of `next_id` in a freshly created store.
pub const INITIAL_NEXT_ID: i64 = -2;

/// Synchronization progress of one data type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadProgress {
    /// Last download watermark.
    pub last_download_timestamp: i64,
    /// Whether the first full download has completed.
    pub initial_sync_ended: bool,
}

/// Persisted bookkeeping for one directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedKernelInfo {
    /// Opaque epoch marker; changes only on a full resync.
    pub store_birthday: String,
    /// Counter used to mint new local identifiers.
    pub next_id: i64,
    /// Progress keyed by data type; missing types read as default.
    pub download_progress: BTreeMap<ModelType, DownloadProgress>,
}

impl Default for PersistedKernelInfo {
    fn default() -> Self {
        Self {
            store_birthday: String::new(),
            next_id: INITIAL_NEXT_ID,
            download_progress: BTreeMap::new(),
        }
    }
}

impl PersistedKernelInfo {
    /// Returns the progress recorded for a data type.
    #[must_use]
    pub fn progress(&self, model_type: ModelType) -> DownloadProgress {
        self.download_progress.get(&model_type).copied().unwrap_or_default()
    }

    /// Replaces the progress of a data type.
    pub fn set_progress(&mut self, model_type: ModelType, progress: DownloadProgress) {
        self.download_progress.insert(model_type, progress);
    }
}

/// Everything a load yields besides entries and attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelLoadInfo {
    /// Persisted bookkeeping.
    pub kernel_info: PersistedKernelInfo,
    /// Identifier of this physical store instance.
    pub cache_guid: String,
    /// Highest handle currently stored, or 0 when empty.
    pub max_metahandle: Metahandle,
}

// ============================================================================
// SECTION: Save Snapshot
// ============================================================================

/// Whether the bookkeeping in a snapshot must be written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KernelShareInfoStatus {
    /// Bookkeeping matches disk.
    #[default]
    Valid,
    /// Bookkeeping changed since the last save.
    Dirty,
}

/// Dirty state captured for one save cycle.
#[derive(Debug, Clone, Default)]
pub struct SaveChangesSnapshot {
    /// Whether `kernel_info` must be written.
    pub kernel_info_status: KernelShareInfoStatus,
    /// Bookkeeping to write when dirty.
    pub kernel_info: PersistedKernelInfo,
    /// Entries changed since the last save.
    pub dirty_metas: Vec<EntryKernel>,
    /// Attributes changed since the last save, including deletions.
    pub dirty_xattrs: ExtendedAttributes,
}

impl SaveChangesSnapshot {
    /// Returns true when the bookkeeping must be written.
    #[must_use]
    pub fn kernel_info_dirty(&self) -> bool {
        self.kernel_info_status == KernelShareInfoStatus::Dirty
    }

    /// Returns true when a save of this snapshot would write nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dirty_metas.is_empty() && self.dirty_xattrs.is_empty() && !self.kernel_info_dirty()
    }
}

/// Loaded entries keyed by handle.
pub type MetahandlesIndex = HashMap<Metahandle, EntryKernel>;
