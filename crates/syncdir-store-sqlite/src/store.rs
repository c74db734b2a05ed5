// crates/syncdir-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Directory Backing Store
// Description: Durable DirectoryBackingStore backed by SQLite.
// Purpose: Open, migrate, purge, load, and transactionally save a directory.
// Dependencies: rusqlite, syncdir-core
// ============================================================================

//! ## Overview
//! [`SqliteDirectoryBackingStore`] persists a directory in one `SQLite` file.
//! A load opens a dedicated connection, initializes or migrates the schema
//! in one exclusive transaction, purges reconciled tombstones, fills the
//! caller's containers, and closes the connection. Saves use a second
//! connection opened on first use and kept for the store's lifetime; each
//! save is one exclusive transaction that commits only when every write
//! affected exactly the rows it should.
//!
//! A file that cannot be opened and configured is treated as corrupt: it
//! is deleted and opened once more.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::TransactionBehavior;
use rusqlite::params;
use rusqlite::params_from_iter;
use syncdir_core::DirOpenResult;
use syncdir_core::DirectoryBackingStore;
use syncdir_core::DownloadProgress;
use syncdir_core::EntryKernel;
use syncdir_core::ExtendedAttributeKey;
use syncdir_core::ExtendedAttributeValue;
use syncdir_core::ExtendedAttributes;
use syncdir_core::INITIAL_NEXT_ID;
use syncdir_core::KernelLoadInfo;
use syncdir_core::MetahandlesIndex;
use syncdir_core::ModelType;
use syncdir_core::PersistedKernelInfo;
use syncdir_core::SaveChangesSnapshot;

use crate::audit::NoopStoreAuditSink;
use crate::audit::StoreAuditEvent;
use crate::audit::StoreAuditSink;
use crate::audit::StoreEventKind;
use crate::codec;
use crate::codec::value_blob;
use crate::codec::value_bool;
use crate::codec::value_int64;
use crate::codec::value_text;
use crate::config::SqliteDirectoryStoreConfig;
use crate::error::SqliteStoreError;
use crate::migration::MigrationReport;
use crate::migration::migrate_schema;
use crate::schema::CURRENT_VERSION;
use crate::schema::EXTENDED_ATTRIBUTES_TABLE;
use crate::schema::MODELS_TABLE;
use crate::schema::NewStoreInfo;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Suffix `SQLite` appends to the database path for its rollback journal.
const JOURNAL_SUFFIX: &str = "-journal";

// ============================================================================
// SECTION: Reports
// ============================================================================

/// What one successful load did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Schema initialization outcome.
    pub migration: MigrationReport,
    /// Whether the file was deleted and recreated because it could not be opened.
    pub recreated: bool,
    /// Version string of the software that created the store.
    pub created_version: String,
    /// Store creation time (seconds since epoch).
    pub created_time: i64,
    /// Tombstones removed before loading.
    pub tombstones_purged: usize,
    /// Entries loaded.
    pub entries_loaded: usize,
    /// Extended attributes loaded.
    pub xattrs_loaded: usize,
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed directory store.
///
/// # Invariants
/// - No I/O happens before the first load or save.
/// - The save connection, once opened, is reused by every later save.
/// - Callers serialize loads and saves.
pub struct SqliteDirectoryBackingStore {
    /// Store settings.
    config: SqliteDirectoryStoreConfig,
    /// Connection used by saves; opened lazily.
    save_connection: Option<Connection>,
    /// Lifecycle event sink.
    audit: Arc<dyn StoreAuditSink>,
}

impl SqliteDirectoryBackingStore {
    /// Creates a store for the named directory at the given path.
    #[must_use]
    pub fn new(store_name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self::with_config(SqliteDirectoryStoreConfig::new(store_name, path.as_ref()))
    }

    /// Creates a store from a full config.
    #[must_use]
    pub fn with_config(config: SqliteDirectoryStoreConfig) -> Self {
        Self {
            config,
            save_connection: None,
            audit: Arc::new(NoopStoreAuditSink),
        }
    }

    /// Routes lifecycle events to the given sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn StoreAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the store settings.
    #[must_use]
    pub const fn config(&self) -> &SqliteDirectoryStoreConfig {
        &self.config
    }

    /// Returns true once a save has opened the save connection.
    #[must_use]
    pub const fn save_connection_open(&self) -> bool {
        self.save_connection.is_some()
    }

    /// Opens the store and fills the caller's containers.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the store cannot be opened,
    /// migrated, purged, or read; containers may be partially filled.
    pub fn try_load(
        &mut self,
        entries: &mut MetahandlesIndex,
        xattrs: &mut ExtendedAttributes,
        info: &mut KernelLoadInfo,
    ) -> Result<LoadReport, SqliteStoreError> {
        let result = self.load_inner(entries, xattrs, info);
        match &result {
            Ok(report) => {
                let count = u64::try_from(report.entries_loaded).unwrap_or(u64::MAX);
                self.record(
                    StoreAuditEvent::new(StoreEventKind::StoreLoaded, &self.config.store_name)
                        .with_count(count),
                );
            }
            Err(err) => self.record(
                StoreAuditEvent::new(StoreEventKind::StoreLoadFailed, &self.config.store_name)
                    .with_error(err.kind(), err.to_string()),
            ),
        }
        result
    }

    /// Persists a snapshot in one transaction; empty snapshots write nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the save connection cannot be opened
    /// or any write fails; nothing from the snapshot is persisted then.
    pub fn try_save_changes(
        &mut self,
        snapshot: &SaveChangesSnapshot,
    ) -> Result<(), SqliteStoreError> {
        if snapshot.is_empty() {
            return Ok(());
        }
        let result = self.save_inner(snapshot);
        match &result {
            Ok(()) => {
                let count = u64::try_from(snapshot.dirty_metas.len()).unwrap_or(u64::MAX);
                self.record(
                    StoreAuditEvent::new(StoreEventKind::SaveCommitted, &self.config.store_name)
                        .with_count(count),
                );
            }
            Err(err) => self.record(
                StoreAuditEvent::new(StoreEventKind::SaveFailed, &self.config.store_name)
                    .with_error(err.kind(), err.to_string()),
            ),
        }
        result
    }

    /// Runs the load pipeline on a connection closed before returning.
    fn load_inner(
        &self,
        entries: &mut MetahandlesIndex,
        xattrs: &mut ExtendedAttributes,
        info: &mut KernelLoadInfo,
    ) -> Result<LoadReport, SqliteStoreError> {
        self.config.validate()?;
        ensure_parent_dir(&self.config.path)?;
        let (mut connection, recreated) = self.open_load_connection()?;

        let mut report = self.initialize_tables(&mut connection)?;
        report.recreated = recreated;

        report.tombstones_purged = drop_deleted_entries(&mut connection)?;
        if report.tombstones_purged > 0 {
            let count = u64::try_from(report.tombstones_purged).unwrap_or(u64::MAX);
            self.record(
                StoreAuditEvent::new(StoreEventKind::TombstonesPurged, &self.config.store_name)
                    .with_count(count),
            );
        }

        report.entries_loaded = load_entries(&connection, entries)?;
        report.xattrs_loaded = load_extended_attributes(&connection, xattrs)?;
        load_info(&connection, info)?;
        Ok(report)
    }

    /// Opens the load connection, recreating the file once on failure.
    fn open_load_connection(&self) -> Result<(Connection, bool), SqliteStoreError> {
        match open_connection(&self.config) {
            Ok(connection) => Ok((connection, false)),
            Err(err) => {
                self.record(
                    StoreAuditEvent::new(StoreEventKind::StoreOpenRetry, &self.config.store_name)
                        .with_error(err.kind(), err.to_string()),
                );
                remove_store_file(&self.config.path)?;
                let connection = open_connection(&self.config)?;
                Ok((connection, true))
            }
        }
    }

    /// Creates or migrates the schema in one exclusive transaction.
    fn initialize_tables(
        &self,
        connection: &mut Connection,
    ) -> Result<LoadReport, SqliteStoreError> {
        let fresh = NewStoreInfo::generate(&self.config.store_name);
        let tx = connection
            .transaction_with_behavior(TransactionBehavior::Exclusive)
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let migration = migrate_schema(&tx, &fresh)?;
        let created: Option<(Option<String>, Option<i64>)> = tx
            .query_row("SELECT db_create_version, db_create_time FROM share_info", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .optional()
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let Some((created_version, created_time)) = created else {
            return Err(SqliteStoreError::Corrupt("share_info has no rows".to_string()));
        };
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;

        self.record_migration(&migration);
        let report = LoadReport {
            migration,
            created_version: created_version.unwrap_or_default(),
            created_time: created_time.unwrap_or_default(),
            ..LoadReport::default()
        };
        self.record(
            StoreAuditEvent::new(StoreEventKind::StoreCreatedInfo, &self.config.store_name)
                .with_detail(format!(
                    "db_create_version={} db_create_time={}",
                    report.created_version, report.created_time
                )),
        );
        Ok(report)
    }

    /// Runs the save pipeline on the lazily opened save connection.
    fn save_inner(&mut self, snapshot: &SaveChangesSnapshot) -> Result<(), SqliteStoreError> {
        let connection = self.lazy_save_connection()?;
        let tx = connection
            .transaction_with_behavior(TransactionBehavior::Exclusive)
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        for entry in &snapshot.dirty_metas {
            save_entry(&tx, entry)?;
        }
        for (key, value) in &snapshot.dirty_xattrs {
            save_extended_attribute(&tx, key, value)?;
        }
        if snapshot.kernel_info_dirty() {
            save_kernel_info(&tx, &snapshot.kernel_info)?;
        }
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))
    }

    /// Returns the save connection, opening it on first use.
    fn lazy_save_connection(&mut self) -> Result<&mut Connection, SqliteStoreError> {
        if self.save_connection.is_none() {
            let connection = open_connection(&self.config)?;
            self.save_connection = Some(connection);
        }
        self.save_connection
            .as_mut()
            .ok_or_else(|| SqliteStoreError::Open("save connection unavailable".to_string()))
    }

    /// Emits one event per schema change made during initialization.
    fn record_migration(&self, migration: &MigrationReport) {
        let store_name = &self.config.store_name;
        for step in &migration.steps {
            self.record(
                StoreAuditEvent::new(StoreEventKind::SchemaMigrated, store_name)
                    .with_versions(step.from_version(), step.to_version()),
            );
        }
        if migration.columns_refreshed {
            self.record(StoreAuditEvent::new(StoreEventKind::SchemaColumnsRefreshed, store_name));
        }
        if migration.reset {
            let kind = if migration.stored_version == 0 {
                StoreEventKind::SchemaCreated
            } else {
                StoreEventKind::SchemaReset
            };
            self.record(
                StoreAuditEvent::new(kind, store_name)
                    .with_versions(migration.stored_version, CURRENT_VERSION),
            );
        }
    }

    /// Sends one event to the audit sink.
    fn record(&self, event: StoreAuditEvent) {
        self.audit.record(&event);
    }
}

impl DirectoryBackingStore for SqliteDirectoryBackingStore {
    fn load(
        &mut self,
        entries: &mut MetahandlesIndex,
        xattrs: &mut ExtendedAttributes,
        info: &mut KernelLoadInfo,
    ) -> DirOpenResult {
        match self.try_load(entries, xattrs, info) {
            Ok(_) => DirOpenResult::Opened,
            Err(err) => err.open_result(),
        }
    }

    fn save_changes(&mut self, snapshot: &SaveChangesSnapshot) -> bool {
        self.try_save_changes(snapshot).is_ok()
    }
}

// ============================================================================
// SECTION: Connections
// ============================================================================

/// Opens a `SQLite` connection with the store's durability settings.
fn open_connection(config: &SqliteDirectoryStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Open(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies durability pragmas and checks that the file is a database.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteDirectoryStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Open(err.to_string()))?;
    connection
        .execute_batch("PRAGMA fullfsync = 1;")
        .map_err(|err| SqliteStoreError::Open(err.to_string()))?;
    connection
        .execute_batch("PRAGMA synchronous = 2;")
        .map_err(|err| SqliteStoreError::Open(err.to_string()))?;
    connection
        .query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
        .map_err(|err| SqliteStoreError::Open(err.to_string()))?;
    Ok(())
}

/// Deletes the store file and its rollback journal; missing files are fine.
fn remove_store_file(path: &Path) -> Result<(), SqliteStoreError> {
    remove_if_present(path)?;
    remove_if_present(&journal_path(path))
}

/// Returns the rollback journal path `SQLite` uses for a database file.
fn journal_path(path: &Path) -> PathBuf {
    let mut journal = path.as_os_str().to_owned();
    journal.push(JOURNAL_SUFFIX);
    PathBuf::from(journal)
}

/// Removes one file, treating a missing file as already removed.
fn remove_if_present(path: &Path) -> Result<(), SqliteStoreError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(SqliteStoreError::Io(format!("{}: {err}", path.display()))),
    }
}

/// Ensures the parent directory exists for the store path.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Invalid("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent)
        .map_err(|err| SqliteStoreError::Io(format!("{}: {err}", parent.display())))
}

// ============================================================================
// SECTION: Load
// ============================================================================

/// Deletes reconciled tombstones and their attributes; returns the count.
fn drop_deleted_entries(connection: &mut Connection) -> Result<usize, SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TEMP TABLE death_row (metahandle BIGINT)")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch(
        "INSERT INTO death_row SELECT metahandle FROM metas WHERE is_del > 0 AND is_unsynced < 1 \
         AND is_unapplied_update < 1",
    )
    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch(&format!(
        "DELETE FROM {EXTENDED_ATTRIBUTES_TABLE} WHERE metahandle IN (SELECT metahandle FROM \
         death_row)"
    ))
    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let purged = tx
        .execute("DELETE FROM metas WHERE metahandle IN (SELECT metahandle FROM death_row)", [])
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("DROP TABLE death_row")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(purged)
}

/// Loads every entry; returns the count.
fn load_entries(
    connection: &Connection,
    entries: &mut MetahandlesIndex,
) -> Result<usize, SqliteStoreError> {
    let mut stmt = connection
        .prepare(&codec::select_entries_sql())
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let mut rows = stmt.query([]).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let mut count = 0;
    while let Some(entry) = codec::next_entry(&mut rows)? {
        let previous = entries.insert(entry.metahandle(), entry);
        debug_assert!(previous.is_none(), "metahandle loaded twice");
        count += 1;
    }
    Ok(count)
}

/// Loads every extended attribute as clean; returns the count.
fn load_extended_attributes(
    connection: &Connection,
    xattrs: &mut ExtendedAttributes,
) -> Result<usize, SqliteStoreError> {
    let mut stmt = connection
        .prepare(&format!("SELECT metahandle, key, value FROM {EXTENDED_ATTRIBUTES_TABLE}"))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let mut rows = stmt.query([]).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let mut count = 0;
    while let Some(row) = rows.next().map_err(|err| SqliteStoreError::Db(err.to_string()))? {
        let metahandle =
            value_int64(row.get_ref(0).map_err(|err| SqliteStoreError::Db(err.to_string()))?)?;
        let key = value_text(row.get_ref(1).map_err(|err| SqliteStoreError::Db(err.to_string()))?);
        let value =
            value_blob(row.get_ref(2).map_err(|err| SqliteStoreError::Db(err.to_string()))?);
        xattrs.insert(ExtendedAttributeKey::new(metahandle, key), ExtendedAttributeValue {
            value,
            dirty: false,
            is_deleted: false,
        });
        count += 1;
    }
    Ok(count)
}

/// Loads bookkeeping, per-type progress, and the highest handle.
fn load_info(connection: &Connection, info: &mut KernelLoadInfo) -> Result<(), SqliteStoreError> {
    let share_info: Option<(Option<String>, Option<i64>, Option<String>)> = connection
        .query_row("SELECT store_birthday, next_id, cache_guid FROM share_info", [], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        })
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let Some((store_birthday, next_id, cache_guid)) = share_info else {
        return Err(SqliteStoreError::Corrupt("share_info has no rows".to_string()));
    };
    info.kernel_info.store_birthday = store_birthday.unwrap_or_default();
    info.kernel_info.next_id = next_id.unwrap_or(INITIAL_NEXT_ID);
    info.cache_guid = cache_guid.unwrap_or_default();

    let mut stmt = connection
        .prepare(&format!(
            "SELECT model_id, last_download_timestamp, initial_sync_ended FROM {MODELS_TABLE}"
        ))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let mut rows = stmt.query([]).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    while let Some(row) = rows.next().map_err(|err| SqliteStoreError::Db(err.to_string()))? {
        let model_id =
            value_blob(row.get_ref(0).map_err(|err| SqliteStoreError::Db(err.to_string()))?);
        let model_type = ModelType::from_model_id(&model_id);
        if !model_type.is_real() {
            continue;
        }
        let progress = DownloadProgress {
            last_download_timestamp: value_int64(
                row.get_ref(1).map_err(|err| SqliteStoreError::Db(err.to_string()))?,
            )?,
            initial_sync_ended: value_bool(
                row.get_ref(2).map_err(|err| SqliteStoreError::Db(err.to_string()))?,
            ),
        };
        info.kernel_info.set_progress(model_type, progress);
    }

    let max_metahandle: Option<i64> = connection
        .query_row("SELECT MAX(metahandle) FROM metas", [], |row| row.get(0))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    info.max_metahandle = max_metahandle.unwrap_or(0);
    Ok(())
}

// ============================================================================
// SECTION: Save
// ============================================================================

/// Upserts one entry; exactly one row must change.
fn save_entry(tx: &Transaction<'_>, entry: &EntryKernel) -> Result<(), SqliteStoreError> {
    let mut stmt = tx
        .prepare_cached(&codec::insert_entry_sql())
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let changed = stmt
        .execute(params_from_iter(codec::bind_fields(entry)))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    if changed != 1 {
        return Err(SqliteStoreError::Db(format!(
            "entry {} upsert affected {changed} rows",
            entry.metahandle()
        )));
    }
    Ok(())
}

/// Upserts or deletes one extended attribute.
fn save_extended_attribute(
    tx: &Transaction<'_>,
    key: &ExtendedAttributeKey,
    value: &ExtendedAttributeValue,
) -> Result<(), SqliteStoreError> {
    if value.is_deleted {
        // The value may never have reached disk.
        tx.execute(
            &format!("DELETE FROM {EXTENDED_ATTRIBUTES_TABLE} WHERE metahandle = ?1 AND key = ?2"),
            params![key.metahandle, key.key],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        return Ok(());
    }
    let changed = tx
        .execute(
            &format!(
                "INSERT OR REPLACE INTO {EXTENDED_ATTRIBUTES_TABLE} (metahandle, key, value) \
                 VALUES (?1, ?2, ?3)"
            ),
            params![key.metahandle, key.key, value.value],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    if changed != 1 {
        return Err(SqliteStoreError::Db(format!(
            "extended attribute upsert for entry {} affected {changed} rows",
            key.metahandle
        )));
    }
    Ok(())
}

/// Writes bookkeeping and one progress row per real data type.
fn save_kernel_info(
    tx: &Transaction<'_>,
    kernel_info: &PersistedKernelInfo,
) -> Result<(), SqliteStoreError> {
    let changed = tx
        .execute(
            "UPDATE share_info SET store_birthday = ?1, next_id = ?2",
            params![kernel_info.store_birthday, kernel_info.next_id],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    if changed != 1 {
        return Err(SqliteStoreError::Db(format!("share_info update affected {changed} rows")));
    }
    for model_type in ModelType::REAL {
        let progress = kernel_info.progress(model_type);
        let changed = tx
            .execute(
                &format!(
                    "INSERT OR REPLACE INTO {MODELS_TABLE} (model_id, last_download_timestamp, \
                     initial_sync_ended) VALUES (?1, ?2, ?3)"
                ),
                params![
                    model_type.model_id(),
                    progress.last_download_timestamp,
                    progress.initial_sync_ended
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        if changed != 1 {
            return Err(SqliteStoreError::Db(format!(
                "{model_type} progress upsert affected {changed} rows"
            )));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
