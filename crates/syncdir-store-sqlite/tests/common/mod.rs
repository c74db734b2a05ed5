// crates/syncdir-store-sqlite/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Shared helpers for SQLite directory store tests.
// Purpose: Build scratch stores, legacy fixtures, and recording sinks.
// Dependencies: syncdir-core, syncdir-store-sqlite, rusqlite, tempfile
// ============================================================================

//! ## Overview
//! Fixtures for integration tests: scratch store paths, a full load helper,
//! an audit sink that records events, and builders for version 67 through
//! 70 files as older releases wrote them.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use rusqlite::Connection;
use rusqlite::params;
use syncdir_core::BookmarkSpecifics;
use syncdir_core::ColumnSpec;
use syncdir_core::EntitySpecifics;
use syncdir_core::ExtendedAttributes;
use syncdir_core::KernelLoadInfo;
use syncdir_core::MetahandlesIndex;
use syncdir_core::entry_columns;
use syncdir_store_sqlite::LoadReport;
use syncdir_store_sqlite::SqliteDirectoryBackingStore;
use syncdir_store_sqlite::StoreAuditEvent;
use syncdir_store_sqlite::StoreAuditSink;
use syncdir_store_sqlite::StoreEventKind;
use syncdir_store_sqlite::schema::compose_create_table;
use tempfile::TempDir;

// ============================================================================
// SECTION: Store Helpers
// ============================================================================

/// Logical name used by every test store.
pub const STORE_NAME: &str = "user@example.com";

/// Returns a fresh temp dir and a store path inside it.
pub fn scratch_path() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("SyncData.sqlite3");
    (dir, path)
}

/// Everything a load hands back.
pub struct Loaded {
    pub entries: MetahandlesIndex,
    pub xattrs: ExtendedAttributes,
    pub info: KernelLoadInfo,
    pub report: LoadReport,
}

/// Opens a new store instance at `path` and loads it.
pub fn load_store(path: &Path) -> Loaded {
    let mut store = SqliteDirectoryBackingStore::new(STORE_NAME, path);
    load_with(&mut store)
}

/// Loads through an existing store instance.
pub fn load_with(store: &mut SqliteDirectoryBackingStore) -> Loaded {
    let mut entries = MetahandlesIndex::new();
    let mut xattrs = ExtendedAttributes::new();
    let mut info = KernelLoadInfo::default();
    let report = store.try_load(&mut entries, &mut xattrs, &mut info).unwrap();
    Loaded {
        entries,
        xattrs,
        info,
        report,
    }
}

/// Returns the column names of a table.
pub fn columns_of(path: &Path, table: &str) -> Vec<String> {
    let conn = Connection::open(path).unwrap();
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})")).unwrap();
    stmt.query_map([], |row| row.get::<_, String>(1))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

/// Returns the stored schema version.
pub fn stored_version(path: &Path) -> i64 {
    let conn = Connection::open(path).unwrap();
    conn.query_row("SELECT data FROM share_version", [], |row| row.get(0)).unwrap()
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink that keeps every event in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    events: Mutex<Vec<StoreAuditEvent>>,
}

impl RecordingAuditSink {
    /// Returns the kinds of all recorded events in order.
    pub fn kinds(&self) -> Vec<StoreEventKind> {
        self.events.lock().unwrap().iter().map(|event| event.event).collect()
    }

    /// Returns all recorded events.
    pub fn events(&self) -> Vec<StoreAuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl StoreAuditSink for RecordingAuditSink {
    fn record(&self, event: &StoreAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Legacy Fixtures
// ============================================================================

/// One entry as a version 67 store holds it.
pub struct LegacyEntry {
    pub metahandle: i64,
    pub id: &'static str,
    pub parent_id: &'static str,
    pub is_del: bool,
    pub is_dir: bool,
    pub is_bookmark_object: bool,
    pub server_is_bookmark_object: bool,
    pub non_unique_name: &'static str,
    pub bookmark_url: &'static str,
    pub server_bookmark_url: &'static str,
    pub bookmark_favicon: &'static [u8],
    pub singleton_tag: &'static str,
}

impl LegacyEntry {
    /// Returns a plain, live, non-bookmark entry.
    pub const fn plain(metahandle: i64, id: &'static str) -> Self {
        Self {
            metahandle,
            id,
            parent_id: "r",
            is_del: false,
            is_dir: false,
            is_bookmark_object: false,
            server_is_bookmark_object: false,
            non_unique_name: "",
            bookmark_url: "",
            server_bookmark_url: "",
            bookmark_favicon: &[],
            singleton_tag: "",
        }
    }
}

/// Writes a version 67 store with the given entries.
///
/// `share_info` still carries the single-type sync progress columns.
pub fn create_v67_store(
    path: &Path,
    last_sync_timestamp: i64,
    initial_sync_ended: bool,
    entries: &[LegacyEntry],
) {
    let conn = Connection::open(path).unwrap();
    create_legacy_bookkeeping(&conn, 67, last_sync_timestamp, initial_sync_ended);
    conn.execute_batch(
        "CREATE TABLE metas (metahandle bigint primary key ON CONFLICT FAIL, \
         base_version bigint default -1, server_version bigint default 0, \
         mtime bigint default 0, server_mtime bigint default 0, ctime bigint default 0, \
         server_ctime bigint default 0, server_position_in_parent bigint default 0, \
         local_external_id bigint default 0, id varchar(255) default 'r', \
         parent_id varchar(255) default 'r', server_parent_id varchar(255) default 'r', \
         prev_id varchar(255) default 'r', next_id varchar(255) default 'r', \
         is_unsynced bit default 0, is_unapplied_update bit default 0, is_del bit default 0, \
         is_dir bit default 0, is_bookmark_object bit default 0, server_is_dir bit default 0, \
         server_is_del bit default 0, server_is_bookmark_object bit default 0, name varchar(255), \
         unsanitized_name varchar(255), non_unique_name varchar, server_name varchar(255), \
         server_non_unique_name varchar, bookmark_url varchar, server_bookmark_url varchar, \
         singleton_tag varchar, bookmark_favicon blob, server_bookmark_favicon blob);",
    )
    .unwrap();
    for entry in entries {
        conn.execute(
            "INSERT INTO metas (metahandle, id, parent_id, server_parent_id, is_del, is_dir, \
             server_is_dir, is_bookmark_object, server_is_bookmark_object, name, \
             unsanitized_name, non_unique_name, server_name, server_non_unique_name, \
             bookmark_url, server_bookmark_url, singleton_tag, bookmark_favicon, \
             server_bookmark_favicon, base_version, server_version) VALUES (?1, ?2, ?3, ?3, ?4, \
             ?5, ?5, ?6, ?7, ?8, ?8, ?8, ?8, ?8, ?9, ?10, ?11, ?12, ?12, 1, 1)",
            params![
                entry.metahandle,
                entry.id,
                entry.parent_id,
                entry.is_del,
                entry.is_dir,
                entry.is_bookmark_object,
                entry.server_is_bookmark_object,
                entry.non_unique_name,
                entry.bookmark_url,
                entry.server_bookmark_url,
                entry.singleton_tag,
                entry.bookmark_favicon,
            ],
        )
        .unwrap();
    }
}

/// Writes a version 68 store: version 67 without the three name columns.
pub fn create_v68_store(
    path: &Path,
    last_sync_timestamp: i64,
    initial_sync_ended: bool,
    entries: &[LegacyEntry],
) {
    create_v67_store(path, last_sync_timestamp, initial_sync_ended, entries);
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "ALTER TABLE metas DROP COLUMN name;
         ALTER TABLE metas DROP COLUMN unsanitized_name;
         ALTER TABLE metas DROP COLUMN server_name;
         UPDATE share_version SET data = 68;",
    )
    .unwrap();
}

/// Writes a version 69 or 70 store holding a root, the `google_chrome`
/// permanent folder, and one bookmark with a structured payload.
///
/// Version 69 still names the server tag column `singleton_tag` and has no
/// client tag column; version 70 has the current entry columns.
pub fn create_payload_era_store(
    path: &Path,
    version: i64,
    last_sync_timestamp: i64,
    initial_sync_ended: bool,
) {
    assert!(matches!(version, 69 | 70), "no payload-era layout for version {version}");
    let conn = Connection::open(path).unwrap();
    create_legacy_bookkeeping(&conn, version, last_sync_timestamp, initial_sync_ended);

    let tag_column = if version == 69 { "singleton_tag" } else { "unique_server_tag" };
    let mut columns = entry_columns();
    if version == 69 {
        columns.retain(|column| !matches!(column.name, "unique_server_tag" | "unique_client_tag"));
        columns.push(ColumnSpec::new("singleton_tag", "varchar"));
    }
    conn.execute_batch(&compose_create_table("metas", &columns)).unwrap();

    let bookmark = EntitySpecifics {
        bookmark: Some(BookmarkSpecifics {
            url: "http://example.com/".to_string(),
            favicon: vec![0x89, 0x50],
        }),
        ..EntitySpecifics::default()
    };
    let insert = format!(
        "INSERT INTO metas (metahandle, id, parent_id, is_dir, non_unique_name, {tag_column}, \
         specifics, base_version) VALUES (?1, ?2, 'r', ?3, ?4, ?5, ?6, 1)"
    );
    let rows: [(i64, &str, bool, &str, &str, Vec<u8>); 3] = [
        (1, "r", true, "", "", Vec::new()),
        (2, "s_ID_2", true, "Google Chrome", "google_chrome", Vec::new()),
        (3, "s_ID_3", false, "Example", "", bookmark.to_bytes()),
    ];
    for (metahandle, id, is_dir, name, tag, specifics) in rows {
        conn.execute(&insert, params![metahandle, id, is_dir, name, tag, specifics]).unwrap();
    }
}

/// Writes the version row, a single-type `share_info`, and the attribute
/// table shared by every layout before version 71.
fn create_legacy_bookkeeping(
    conn: &Connection,
    version: i64,
    last_sync_timestamp: i64,
    initial_sync_ended: bool,
) {
    conn.execute_batch(
        "CREATE TABLE share_version (id VARCHAR(128) primary key, data INT);
         CREATE TABLE share_info (id VARCHAR(128) primary key, last_sync_timestamp INT, \
         name VARCHAR(128), initial_sync_ended BIT default 0, store_birthday VARCHAR(256), \
         db_create_version VARCHAR(128), db_create_time INT, next_id BIGINT default -2, \
         cache_guid VARCHAR(32));
         CREATE TABLE extended_attributes (metahandle bigint, key varchar(127), value blob, \
         PRIMARY KEY(metahandle, key) ON CONFLICT REPLACE);",
    )
    .unwrap();
    conn.execute("INSERT INTO share_version VALUES (?1, ?2)", params![STORE_NAME, version])
        .unwrap();
    conn.execute(
        "INSERT INTO share_info VALUES (?1, ?2, ?1, ?3, 'legacy-birthday', 'legacy-version', \
         1263522064, -65542, '9mXPDpRN6qGFKO0ptQ5jwQ==')",
        params![STORE_NAME, last_sync_timestamp, initial_sync_ended],
    )
    .unwrap();
}
