// crates/syncdir-core/src/runtime/store.rs
// ============================================================================
// Module: Syncdir In-Memory Backing Store
// Description: Simple in-memory directory backing store for tests and examples.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides an in-memory [`DirectoryBackingStore`] with the same
//! observable semantics as the durable stores: tombstones are purged on load,
//! empty snapshots are no-ops, and saves apply completely or not at all. It
//! is not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::EntryKernel;
use crate::core::ExtendedAttributeValue;
use crate::core::ExtendedAttributes;
use crate::core::KernelLoadInfo;
use crate::core::Metahandle;
use crate::core::MetahandlesIndex;
use crate::core::PersistedKernelInfo;
use crate::core::SaveChangesSnapshot;
use crate::interfaces::DirOpenResult;
use crate::interfaces::DirectoryBackingStore;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Persisted state held by the in-memory store.
#[derive(Debug, Default)]
struct PersistedDirectory {
    /// Stored entries keyed by handle.
    entries: BTreeMap<Metahandle, EntryKernel>,
    /// Stored attribute values.
    xattrs: ExtendedAttributes,
    /// Stored bookkeeping.
    kernel_info: PersistedKernelInfo,
}

/// In-memory directory backing store for tests and examples.
///
/// Clones share the same persisted state, so a clone can stand in for
/// reopening the store.
#[derive(Debug, Clone)]
pub struct InMemoryBackingStore {
    /// Persisted state protected by a mutex.
    state: Arc<Mutex<PersistedDirectory>>,
    /// Identifier of this store instance.
    cache_guid: String,
    /// Largest snapshot (in entries) a save accepts; larger saves fail.
    fail_after: Option<usize>,
}

impl InMemoryBackingStore {
    /// Creates an empty store with the given cache GUID.
    #[must_use]
    pub fn new(cache_guid: impl Into<String>) -> Self {
        Self {
            state: Arc::new(Mutex::new(PersistedDirectory::default())),
            cache_guid: cache_guid.into(),
            fail_after: None,
        }
    }

    /// Makes every save containing more than `count` entries fail.
    #[must_use]
    pub const fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Returns the number of persisted entries.
    #[must_use]
    pub fn persisted_entry_count(&self) -> usize {
        self.state.lock().map_or(0, |state| state.entries.len())
    }
}

impl DirectoryBackingStore for InMemoryBackingStore {
    fn load(
        &mut self,
        entries: &mut MetahandlesIndex,
        xattrs: &mut ExtendedAttributes,
        info: &mut KernelLoadInfo,
    ) -> DirOpenResult {
        let Ok(mut state) = self.state.lock() else {
            return DirOpenResult::FailedOpenDatabase;
        };
        let purged: Vec<Metahandle> = state
            .entries
            .values()
            .filter(|entry| entry.is_purgeable())
            .map(EntryKernel::metahandle)
            .collect();
        for metahandle in &purged {
            state.entries.remove(metahandle);
        }
        state.xattrs.retain(|key, _| !purged.contains(&key.metahandle));

        for (metahandle, entry) in &state.entries {
            let mut entry = entry.clone();
            entry.clear_dirty();
            entries.insert(*metahandle, entry);
        }
        for (key, value) in &state.xattrs {
            xattrs.insert(key.clone(), ExtendedAttributeValue {
                value: value.value.clone(),
                dirty: false,
                is_deleted: false,
            });
        }
        info.kernel_info = state.kernel_info.clone();
        info.cache_guid.clone_from(&self.cache_guid);
        info.max_metahandle = state.entries.keys().next_back().copied().unwrap_or(0);
        DirOpenResult::Opened
    }

    fn save_changes(&mut self, snapshot: &SaveChangesSnapshot) -> bool {
        if snapshot.is_empty() {
            return true;
        }
        if let Some(limit) = self.fail_after
            && snapshot.dirty_metas.len() > limit
        {
            return false;
        }
        let Ok(mut state) = self.state.lock() else {
            return false;
        };
        for entry in &snapshot.dirty_metas {
            let mut stored = entry.clone();
            stored.clear_dirty();
            state.entries.insert(stored.metahandle(), stored);
        }
        for (key, value) in &snapshot.dirty_xattrs {
            if value.is_deleted {
                state.xattrs.remove(key);
            } else {
                state.xattrs.insert(key.clone(), ExtendedAttributeValue {
                    value: value.value.clone(),
                    dirty: false,
                    is_deleted: false,
                });
            }
        }
        if snapshot.kernel_info_dirty() {
            state.kernel_info = snapshot.kernel_info.clone();
        }
        true
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only panic-based assertions are permitted."
    )]

    use super::InMemoryBackingStore;
    use crate::core::BitField;
    use crate::core::EntryKernel;
    use crate::core::ExtendedAttributeKey;
    use crate::core::ExtendedAttributeValue;
    use crate::core::ExtendedAttributes;
    use crate::core::KernelLoadInfo;
    use crate::core::KernelShareInfoStatus;
    use crate::core::MetahandlesIndex;
    use crate::core::SaveChangesSnapshot;
    use crate::interfaces::DirOpenResult;
    use crate::interfaces::DirectoryBackingStore;

    fn load(
        store: &mut InMemoryBackingStore,
    ) -> (MetahandlesIndex, ExtendedAttributes, KernelLoadInfo) {
        let mut entries = MetahandlesIndex::new();
        let mut xattrs = ExtendedAttributes::new();
        let mut info = KernelLoadInfo::default();
        assert_eq!(store.load(&mut entries, &mut xattrs, &mut info), DirOpenResult::Opened);
        (entries, xattrs, info)
    }

    #[test]
    fn saved_entries_load_clean() {
        let mut store = InMemoryBackingStore::new("guid");
        let mut entry = EntryKernel::with_metahandle(7);
        entry.put_bit(BitField::IsDir, true);
        let snapshot = SaveChangesSnapshot {
            dirty_metas: vec![entry],
            ..SaveChangesSnapshot::default()
        };
        assert!(store.save_changes(&snapshot));
        let (entries, _, info) = load(&mut store);
        assert_eq!(info.max_metahandle, 7);
        assert_eq!(info.cache_guid, "guid");
        let loaded = &entries[&7];
        assert!(loaded.bit(BitField::IsDir));
        assert!(!loaded.is_dirty());
    }

    #[test]
    fn load_purges_reconciled_tombstones_with_their_attributes() {
        let mut store = InMemoryBackingStore::new("guid");
        let mut tombstone = EntryKernel::with_metahandle(2);
        tombstone.put_bit(BitField::IsDel, true);
        let mut pending = EntryKernel::with_metahandle(3);
        pending.put_bit(BitField::IsDel, true);
        pending.put_bit(BitField::IsUnsynced, true);
        let mut xattrs = ExtendedAttributes::new();
        xattrs.insert(ExtendedAttributeKey::new(2, "k"), ExtendedAttributeValue::dirty(vec![1]));
        let snapshot = SaveChangesSnapshot {
            dirty_metas: vec![tombstone, pending],
            dirty_xattrs: xattrs,
            ..SaveChangesSnapshot::default()
        };
        assert!(store.save_changes(&snapshot));
        let (entries, xattrs, _) = load(&mut store);
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key(&3));
        assert!(xattrs.is_empty());
    }

    #[test]
    fn failed_save_persists_nothing() {
        let mut store = InMemoryBackingStore::new("guid").failing_after(1);
        let snapshot = SaveChangesSnapshot {
            kernel_info_status: KernelShareInfoStatus::Dirty,
            dirty_metas: vec![EntryKernel::with_metahandle(1), EntryKernel::with_metahandle(2)],
            ..SaveChangesSnapshot::default()
        };
        assert!(!store.save_changes(&snapshot));
        assert_eq!(store.persisted_entry_count(), 0);
    }
}
