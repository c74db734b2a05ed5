// crates/syncdir-store-sqlite/src/schema.rs
// ============================================================================
// Module: Directory Store Schema
// Description: Table catalogs, DDL, and version bookkeeping for the store.
// Purpose: Create, inspect, rebuild, and drop the persisted tables.
// Dependencies: rand, rusqlite, syncdir-core
// ============================================================================

//! ## Overview
//! Five tables make up a directory store: `share_version` (one row holding
//! the schema version), `share_info` (bookkeeping), `models` (per-type
//! progress), `metas` (entries), and `extended_attributes`. Column lists
//! for `metas` and `share_info` are compile-time catalogs; the generic
//! [`rebuild_table`] keeps exactly the catalog columns of a live table.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use rand::RngCore;
use rand::rngs::OsRng;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::params;
use syncdir_core::ColumnSpec;
use syncdir_core::INITIAL_NEXT_ID;
use syncdir_core::ROOT_ID;
use syncdir_core::entry_columns;

use crate::error::SqliteStoreError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Schema version written by this build.
pub const CURRENT_VERSION: i64 = 71;
/// Entries table.
pub const METAS_TABLE: &str = "metas";
/// Bookkeeping table.
pub const SHARE_INFO_TABLE: &str = "share_info";
/// Schema version table.
pub const SHARE_VERSION_TABLE: &str = "share_version";
/// Per-type progress table.
pub const MODELS_TABLE: &str = "models";
/// Extended attribute table.
pub const EXTENDED_ATTRIBUTES_TABLE: &str = "extended_attributes";
/// Prefix for tables built by a rebuild before being renamed into place.
const REBUILD_PREFIX: &str = "temp_";
/// Every table a reset removes, including leftovers of interrupted rebuilds.
const ALL_TABLES: [&str; 7] = [
    METAS_TABLE,
    "temp_metas",
    SHARE_INFO_TABLE,
    "temp_share_info",
    SHARE_VERSION_TABLE,
    EXTENDED_ATTRIBUTES_TABLE,
    MODELS_TABLE,
];

/// Current `share_info` catalog.
pub const SHARE_INFO_COLUMNS: [ColumnSpec; 7] = [
    ColumnSpec::new("id", "TEXT primary key"),
    ColumnSpec::new("name", "TEXT"),
    ColumnSpec::new("store_birthday", "TEXT"),
    ColumnSpec::new("db_create_version", "TEXT"),
    ColumnSpec::new("db_create_time", "INT"),
    ColumnSpec::new("next_id", "INT default -2"),
    ColumnSpec::new("cache_guid", "TEXT"),
];

// ============================================================================
// SECTION: New Store Info
// ============================================================================

/// Values written into a freshly created store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStoreInfo {
    /// Logical store name; keys the version and bookkeeping rows.
    pub store_name: String,
    /// Version string of the software creating the store.
    pub create_version: String,
    /// Creation time (seconds since epoch).
    pub create_time_secs: i64,
    /// Root entry creation time (milliseconds since epoch).
    pub root_time_ms: i64,
    /// Identifier of the new physical store.
    pub cache_guid: String,
}

impl NewStoreInfo {
    /// Captures the current time and a fresh cache GUID.
    #[must_use]
    pub fn generate(store_name: &str) -> Self {
        let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        Self {
            store_name: store_name.to_string(),
            create_version: env!("CARGO_PKG_VERSION").to_string(),
            create_time_secs: i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX),
            root_time_ms: i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
            cache_guid: generate_cache_guid(),
        }
    }
}

/// Returns 128 random bits as uppercase hex.
#[must_use]
pub fn generate_cache_guid() -> String {
    let mut bytes = [0_u8; 16];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|byte| format!("{byte:02X}")).collect()
}

// ============================================================================
// SECTION: Inspection
// ============================================================================

/// Returns true when a table with the given name exists.
///
/// # Errors
///
/// Returns [`SqliteStoreError::Db`] when the catalog cannot be queried.
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool, SqliteStoreError> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(found.is_some())
}

// ============================================================================
// SECTION: Version
// ============================================================================

/// Reads the stored schema version; a missing table or row reads as 0.
///
/// # Errors
///
/// Returns [`SqliteStoreError::Db`] when the version cannot be read.
pub fn get_version(conn: &Connection) -> Result<i64, SqliteStoreError> {
    if !table_exists(conn, SHARE_VERSION_TABLE)? {
        return Ok(0);
    }
    let version: Option<Option<i64>> = conn
        .query_row(&format!("SELECT data FROM {SHARE_VERSION_TABLE}"), [], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(version.flatten().unwrap_or(0))
}

/// Overwrites the stored schema version.
///
/// # Errors
///
/// Returns [`SqliteStoreError::Db`] when the update fails.
pub fn set_version(conn: &Connection, version: i64) -> Result<(), SqliteStoreError> {
    conn.execute(&format!("UPDATE {SHARE_VERSION_TABLE} SET data = ?1"), params![version])
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

// ============================================================================
// SECTION: DDL
// ============================================================================

/// Renders a `CREATE TABLE` statement from a column catalog.
#[must_use]
pub fn compose_create_table(table: &str, columns: &[ColumnSpec]) -> String {
    let body = columns
        .iter()
        .map(|column| format!("{} {}", column.name, column.spec))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {table} ({body})")
}

/// Renders a comma-separated column name list.
#[must_use]
pub fn column_names(columns: &[ColumnSpec]) -> String {
    columns.iter().map(|column| column.name).collect::<Vec<_>>().join(", ")
}

/// Adds one column to an existing table.
///
/// # Errors
///
/// Returns [`SqliteStoreError::Db`] when the column cannot be added.
pub fn add_column(
    conn: &Connection,
    table: &str,
    column: ColumnSpec,
) -> Result<(), SqliteStoreError> {
    conn.execute_batch(&format!("ALTER TABLE {table} ADD COLUMN {} {}", column.name, column.spec))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))
}

/// Drops a table if it exists.
///
/// # Errors
///
/// Returns [`SqliteStoreError::Db`] when the drop fails.
pub fn safe_drop_table(conn: &Connection, table: &str) -> Result<(), SqliteStoreError> {
    conn.execute_batch(&format!("DROP TABLE IF EXISTS {table}"))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))
}

/// Drops every store table.
///
/// # Errors
///
/// Returns [`SqliteStoreError::Db`] when a drop fails.
pub fn drop_all_tables(conn: &Connection) -> Result<(), SqliteStoreError> {
    for table in ALL_TABLES {
        safe_drop_table(conn, table)?;
    }
    Ok(())
}

/// Rebuilds a table so it holds exactly the given columns.
///
/// Rows are copied by selecting the catalog column list, so columns absent
/// from the catalog are dropped and data in the rest is preserved.
///
/// # Errors
///
/// Returns [`SqliteStoreError::Db`] when any step fails; a catalog column
/// missing from the live table fails the copy.
pub fn rebuild_table(
    conn: &Connection,
    table: &str,
    columns: &[ColumnSpec],
) -> Result<(), SqliteStoreError> {
    let temp_table = format!("{REBUILD_PREFIX}{table}");
    let names = column_names(columns);
    safe_drop_table(conn, &temp_table)?;
    conn.execute_batch(&compose_create_table(&temp_table, columns))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    conn.execute_batch(&format!("INSERT INTO {temp_table} ({names}) SELECT {names} FROM {table}"))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    conn.execute_batch(&format!("DROP TABLE {table}"))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    conn.execute_batch(&format!("ALTER TABLE {temp_table} RENAME TO {table}"))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))
}

/// Creates the per-type progress table.
///
/// # Errors
///
/// Returns [`SqliteStoreError::Db`] when the table cannot be created.
pub fn create_models_table(conn: &Connection) -> Result<(), SqliteStoreError> {
    conn.execute_batch(&format!(
        "CREATE TABLE {MODELS_TABLE} (model_id BLOB primary key, last_download_timestamp INT, \
         initial_sync_ended BOOLEAN default 0)"
    ))
    .map_err(|err| SqliteStoreError::Db(err.to_string()))
}

/// Creates the extended attribute table.
///
/// # Errors
///
/// Returns [`SqliteStoreError::Db`] when the table cannot be created.
pub fn create_extended_attributes_table(conn: &Connection) -> Result<(), SqliteStoreError> {
    conn.execute_batch(&format!(
        "CREATE TABLE {EXTENDED_ATTRIBUTES_TABLE} (metahandle bigint, key varchar(127), \
         value blob, PRIMARY KEY(metahandle, key) ON CONFLICT REPLACE)"
    ))
    .map_err(|err| SqliteStoreError::Db(err.to_string()))
}

/// Creates every table of a current-version store and seeds it.
///
/// Seeds the version row, the bookkeeping row, and the root entry.
///
/// # Errors
///
/// Returns [`SqliteStoreError::Db`] when any statement fails.
pub fn create_tables(conn: &Connection, info: &NewStoreInfo) -> Result<(), SqliteStoreError> {
    conn.execute_batch(&format!(
        "CREATE TABLE {SHARE_VERSION_TABLE} (id VARCHAR(128) primary key, data INT)"
    ))
    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    conn.execute(
        &format!("INSERT INTO {SHARE_VERSION_TABLE} VALUES (?1, ?2)"),
        params![info.store_name, CURRENT_VERSION],
    )
    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;

    conn.execute_batch(&compose_create_table(SHARE_INFO_TABLE, &SHARE_INFO_COLUMNS))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    conn.execute(
        &format!(
            "INSERT INTO {SHARE_INFO_TABLE} ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            column_names(&SHARE_INFO_COLUMNS)
        ),
        params![
            info.store_name,
            info.store_name,
            "",
            info.create_version,
            info.create_time_secs,
            INITIAL_NEXT_ID,
            info.cache_guid,
        ],
    )
    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;

    create_models_table(conn)?;

    conn.execute_batch(&compose_create_table(METAS_TABLE, &entry_columns()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    conn.execute(
        &format!(
            "INSERT INTO {METAS_TABLE} (metahandle, id, is_dir, ctime, mtime) VALUES (1, ?1, 1, \
             ?2, ?2)"
        ),
        params![ROOT_ID, info.root_time_ms],
    )
    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;

    create_extended_attributes_table(conn)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
