// crates/syncdir-cli/src/report.rs
// ============================================================================
// Module: Store Reports
// Description: Opens a store and renders its contents as JSON values.
// Purpose: Back the `info` and `dump` commands with testable builders.
// Dependencies: serde, serde_json, syncdir-core, syncdir-store-sqlite
// ============================================================================

//! ## Overview
//! Opening a store for inspection is a full load: migration, tombstone
//! purge, and recreation of an unreadable file all happen exactly as they
//! would for the sync engine. [`StoreSummary`] condenses the load outcome;
//! [`entry_record`] renders one entry keyed by its durable column names.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use syncdir_core::BitField;
use syncdir_core::DownloadProgress;
use syncdir_core::EntryKernel;
use syncdir_core::ExtendedAttributes;
use syncdir_core::Field;
use syncdir_core::KernelLoadInfo;
use syncdir_core::MetahandlesIndex;
use syncdir_store_sqlite::CURRENT_VERSION;
use syncdir_store_sqlite::LoadReport;
use syncdir_store_sqlite::SqliteDirectoryBackingStore;
use syncdir_store_sqlite::SqliteDirectoryStoreConfig;
use syncdir_store_sqlite::SqliteStoreError;
use syncdir_store_sqlite::StoreAuditSink;

// ============================================================================
// SECTION: Load
// ============================================================================

/// Everything one load of a store produced.
#[derive(Debug, Clone, Default)]
pub struct LoadedStore {
    /// Loaded entries by metahandle.
    pub entries: MetahandlesIndex,
    /// Loaded extended attributes.
    pub xattrs: ExtendedAttributes,
    /// Loaded bookkeeping.
    pub info: KernelLoadInfo,
    /// What the load did.
    pub report: LoadReport,
}

impl LoadedStore {
    /// Returns entries ordered by metahandle.
    #[must_use]
    pub fn entries_in_order(&self) -> Vec<&EntryKernel> {
        let mut entries: Vec<&EntryKernel> = self.entries.values().collect();
        entries.sort_by_key(|entry| entry.metahandle());
        entries
    }
}

/// Opens and fully loads the configured store.
///
/// # Errors
///
/// Returns [`SqliteStoreError`] when the store cannot be opened or loaded.
pub fn load_store(
    config: &SqliteDirectoryStoreConfig,
    audit: Arc<dyn StoreAuditSink>,
) -> Result<LoadedStore, SqliteStoreError> {
    let mut store =
        SqliteDirectoryBackingStore::with_config(config.clone()).with_audit_sink(audit);
    let mut entries = MetahandlesIndex::new();
    let mut xattrs = ExtendedAttributes::new();
    let mut info = KernelLoadInfo::default();
    let report = store.try_load(&mut entries, &mut xattrs, &mut info)?;
    Ok(LoadedStore {
        entries,
        xattrs,
        info,
        report,
    })
}

// ============================================================================
// SECTION: Summary
// ============================================================================

/// Condensed view of a loaded store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreSummary {
    /// Logical directory name.
    pub store_name: String,
    /// Database file path.
    pub path: String,
    /// Schema version after the load.
    pub schema_version: i64,
    /// Schema version found before the load (0 for a new file).
    pub previous_version: i64,
    /// Migration steps applied, as `from->to`.
    pub migrations: Vec<String>,
    /// Whether the entries table was rebuilt to the current columns.
    pub columns_refreshed: bool,
    /// Whether this load created the schema in an empty file.
    pub created: bool,
    /// Whether an unrecognized schema was discarded.
    pub reset: bool,
    /// Whether an unreadable file was deleted and recreated.
    pub recreated: bool,
    /// Version string of the software that created the store.
    pub created_version: String,
    /// Creation time in seconds since the epoch.
    pub created_time: i64,
    /// Tombstones purged by this load.
    pub tombstones_purged: usize,
    /// Entries loaded.
    pub entries: usize,
    /// Entries with local changes not yet committed to the server.
    pub unsynced_entries: usize,
    /// Entries with server changes not yet applied locally.
    pub unapplied_updates: usize,
    /// Extended attributes loaded.
    pub extended_attributes: usize,
    /// Largest metahandle on disk.
    pub max_metahandle: i64,
    /// Client identifier for this store.
    pub cache_guid: String,
    /// Server-assigned birthday.
    pub store_birthday: String,
    /// Next local identifier counter.
    pub next_id: i64,
    /// Download progress keyed by data type name.
    pub download_progress: BTreeMap<String, DownloadProgress>,
}

impl StoreSummary {
    /// Builds a summary from a completed load.
    #[must_use]
    pub fn new(config: &SqliteDirectoryStoreConfig, loaded: &LoadedStore) -> Self {
        let migration = &loaded.report.migration;
        let count_bit =
            |bit: BitField| loaded.entries.values().filter(|entry| entry.bit(bit)).count();
        Self {
            store_name: config.store_name.clone(),
            path: config.path.display().to_string(),
            schema_version: CURRENT_VERSION,
            previous_version: migration.stored_version,
            migrations: migration
                .steps
                .iter()
                .map(|step| format!("{}->{}", step.from_version(), step.to_version()))
                .collect(),
            columns_refreshed: migration.columns_refreshed,
            created: migration.reset && migration.stored_version == 0,
            reset: migration.reset && migration.stored_version != 0,
            recreated: loaded.report.recreated,
            created_version: loaded.report.created_version.clone(),
            created_time: loaded.report.created_time,
            tombstones_purged: loaded.report.tombstones_purged,
            entries: loaded.entries.len(),
            unsynced_entries: count_bit(BitField::IsUnsynced),
            unapplied_updates: count_bit(BitField::IsUnappliedUpdate),
            extended_attributes: loaded.xattrs.len(),
            max_metahandle: loaded.info.max_metahandle,
            cache_guid: loaded.info.cache_guid.clone(),
            store_birthday: loaded.info.kernel_info.store_birthday.clone(),
            next_id: loaded.info.kernel_info.next_id,
            download_progress: loaded
                .info
                .kernel_info
                .download_progress
                .iter()
                .map(|(model_type, progress)| (model_type.to_string(), *progress))
                .collect(),
        }
    }
}

// ============================================================================
// SECTION: Entry Records
// ============================================================================

/// Renders an entry as a JSON object keyed by column name.
///
/// Payload columns render as their structured form rather than raw bytes.
///
/// # Errors
///
/// Returns [`serde_json::Error`] when a payload cannot be rendered.
pub fn entry_record(entry: &EntryKernel) -> Result<Map<String, Value>, serde_json::Error> {
    Field::all()
        .map(|field| {
            let value = match field {
                Field::Int64(field) => Value::from(entry.int64(field)),
                Field::Id(field) => Value::from(entry.id(field).as_str()),
                Field::Bit(field) => Value::from(entry.bit(field)),
                Field::String(field) => Value::from(entry.string(field)),
                Field::Proto(field) => serde_json::to_value(entry.specifics(field))?,
            };
            Ok((field.column().name.to_string(), value))
        })
        .collect()
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

    use serde_json::json;
    use syncdir_core::BookmarkSpecifics;
    use syncdir_core::EntitySpecifics;
    use syncdir_core::EntryKernel;
    use syncdir_core::FIELD_COUNT;
    use syncdir_core::ProtoField;
    use syncdir_core::StringField;

    use super::LoadedStore;
    use super::entry_record;

    #[test]
    fn record_has_one_key_per_column() {
        let mut entry = EntryKernel::with_metahandle(3);
        entry.put_string(StringField::NonUniqueName, "Docs");
        entry.put_specifics(ProtoField::Specifics, EntitySpecifics {
            bookmark: Some(BookmarkSpecifics {
                url: "http://example.com/".to_string(),
                favicon: Vec::new(),
            }),
            ..EntitySpecifics::default()
        });
        let record = entry_record(&entry).unwrap();
        assert_eq!(record.len(), FIELD_COUNT);
        assert_eq!(record["metahandle"], json!(3));
        assert_eq!(record["non_unique_name"], json!("Docs"));
        assert_eq!(record["is_del"], json!(false));
        assert_eq!(record["specifics"]["bookmark"]["url"], json!("http://example.com/"));
        assert_eq!(record["server_specifics"], json!({}));
    }

    #[test]
    fn entries_are_ordered_by_metahandle() {
        let mut loaded = LoadedStore::default();
        for metahandle in [9, 1, 4] {
            loaded.entries.insert(metahandle, EntryKernel::with_metahandle(metahandle));
        }
        let order: Vec<i64> =
            loaded.entries_in_order().iter().map(|entry| entry.metahandle()).collect();
        assert_eq!(order, vec![1, 4, 9]);
    }
}
