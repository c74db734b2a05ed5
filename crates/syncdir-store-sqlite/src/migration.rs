// crates/syncdir-store-sqlite/src/migration.rs
// ============================================================================
// Module: Directory Store Migration
// Description: Versioned schema state machine from version 67 to current.
// Purpose: Carry stored data forward one version at a time without loss.
// Dependencies: rusqlite, syncdir-core
// ============================================================================

//! ## Overview
//! Each [`MigrationStep`] maps one stored version to the next and is applied
//! in order until the stored version stops matching a step. Steps that leave
//! obsolete columns behind only flag a column refresh; the refresh runs once,
//! after the version reaches [`CURRENT_VERSION`], and rebuilds the entries
//! table to the compiled catalog.
//!
//! A version newer than current is rejected before anything is written. A
//! version that no step recognizes (0, missing, or older than 67) resets the
//! store. Callers run [`migrate_schema`] inside one transaction so any
//! failure leaves the file as it was.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::Connection;
use rusqlite::Row;
use rusqlite::params;
use rusqlite::params_from_iter;
use syncdir_core::BookmarkSpecifics;
use syncdir_core::DownloadProgress;
use syncdir_core::EntitySpecifics;
use syncdir_core::ModelType;
use syncdir_core::ProtoField;
use syncdir_core::StringField;
use syncdir_core::entry_columns;

use crate::codec::value_blob;
use crate::codec::value_bool;
use crate::codec::value_int64;
use crate::codec::value_text;
use crate::error::SqliteStoreError;
use crate::schema;
use crate::schema::CURRENT_VERSION;
use crate::schema::METAS_TABLE;
use crate::schema::MODELS_TABLE;
use crate::schema::NewStoreInfo;
use crate::schema::SHARE_INFO_COLUMNS;
use crate::schema::SHARE_INFO_TABLE;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Oldest stored version that can still be migrated.
pub const OLDEST_MIGRATABLE_VERSION: i64 = 67;

/// Server tags of permanent items whose payload columns stay empty.
const PERMANENT_ITEM_TAGS: [&str; 1] = ["google_chrome"];

/// Legacy client columns folded into `specifics`.
const LEGACY_CLIENT_BOOKMARK_COLUMNS: [&str; 4] =
    ["is_bookmark_object", "bookmark_url", "bookmark_favicon", "is_dir"];

/// Legacy server columns folded into `server_specifics`.
const LEGACY_SERVER_BOOKMARK_COLUMNS: [&str; 4] = [
    "server_is_bookmark_object",
    "server_bookmark_url",
    "server_bookmark_favicon",
    "server_is_dir",
];

// ============================================================================
// SECTION: Steps
// ============================================================================

/// One schema transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationStep {
    /// Drops unused name columns (deferred to the column refresh).
    Version67To68,
    /// Folds legacy bookmark columns into structured payload columns.
    Version68To69,
    /// Adds the server and client tag columns.
    Version69To70,
    /// Moves sync progress from the bookkeeping row into `models`.
    Version70To71,
}

impl MigrationStep {
    /// Every step in application order.
    pub const ALL: [Self; 4] =
        [Self::Version67To68, Self::Version68To69, Self::Version69To70, Self::Version70To71];

    /// Returns the step that applies to a stored version.
    #[must_use]
    pub const fn for_version(version: i64) -> Option<Self> {
        match version {
            67 => Some(Self::Version67To68),
            68 => Some(Self::Version68To69),
            69 => Some(Self::Version69To70),
            70 => Some(Self::Version70To71),
            _ => None,
        }
    }

    /// Version this step starts from.
    #[must_use]
    pub const fn from_version(self) -> i64 {
        match self {
            Self::Version67To68 => 67,
            Self::Version68To69 => 68,
            Self::Version69To70 => 69,
            Self::Version70To71 => 70,
        }
    }

    /// Version this step produces.
    #[must_use]
    pub const fn to_version(self) -> i64 {
        self.from_version() + 1
    }

    /// Applies the step's data transformation; the caller advances the version.
    fn apply(self, conn: &Connection, state: &mut MigrationState) -> Result<(), SqliteStoreError> {
        match self {
            Self::Version67To68 => {
                state.needs_column_refresh = true;
                Ok(())
            }
            Self::Version68To69 => migrate_68_to_69(conn, state),
            Self::Version69To70 => migrate_69_to_70(conn, state),
            Self::Version70To71 => migrate_70_to_71(conn),
        }
    }
}

/// State carried across steps of one migration run.
#[derive(Debug, Default)]
struct MigrationState {
    /// Entries table still holds columns outside the catalog.
    needs_column_refresh: bool,
}

/// What one schema initialization did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Version found on disk before initialization (0 when absent).
    pub stored_version: i64,
    /// Steps applied, in order.
    pub steps: Vec<MigrationStep>,
    /// Whether the entries table was rebuilt to the catalog.
    pub columns_refreshed: bool,
    /// Whether all tables were dropped and recreated.
    pub reset: bool,
}

// ============================================================================
// SECTION: Driver
// ============================================================================

/// Brings the schema to [`CURRENT_VERSION`], resetting it when unrecognized.
///
/// `fresh` supplies the values written if the store is (re)created.
///
/// # Errors
///
/// Returns [`SqliteStoreError::VersionTooNew`] before touching anything when
/// the stored version is newer than supported, and any step failure as is.
pub fn migrate_schema(
    conn: &Connection,
    fresh: &NewStoreInfo,
) -> Result<MigrationReport, SqliteStoreError> {
    let stored_version = schema::get_version(conn)?;
    if stored_version > CURRENT_VERSION {
        return Err(SqliteStoreError::VersionTooNew {
            found: stored_version,
            supported: CURRENT_VERSION,
        });
    }
    let mut report = MigrationReport {
        stored_version,
        ..MigrationReport::default()
    };
    let mut state = MigrationState::default();
    let mut version = stored_version;
    while let Some(step) = MigrationStep::for_version(version) {
        step.apply(conn, &mut state)?;
        version = step.to_version();
        schema::set_version(conn, version)?;
        report.steps.push(step);
    }

    if version == CURRENT_VERSION && state.needs_column_refresh {
        schema::rebuild_table(conn, METAS_TABLE, &entry_columns())?;
        report.columns_refreshed = true;
    }

    if version != CURRENT_VERSION {
        schema::drop_all_tables(conn)?;
        schema::create_tables(conn, fresh)?;
        report.reset = true;
    }
    Ok(report)
}

// ============================================================================
// SECTION: Step Bodies
// ============================================================================

/// Adds payload columns and fills them from the legacy bookmark columns.
fn migrate_68_to_69(
    conn: &Connection,
    state: &mut MigrationState,
) -> Result<(), SqliteStoreError> {
    schema::add_column(conn, METAS_TABLE, ProtoField::Specifics.column())?;
    schema::add_column(conn, METAS_TABLE, ProtoField::ServerSpecifics.column())?;
    migrate_to_specifics(
        conn,
        &LEGACY_CLIENT_BOOKMARK_COLUMNS,
        ProtoField::Specifics,
        encode_bookmark_url_and_favicon,
    )?;
    migrate_to_specifics(
        conn,
        &LEGACY_SERVER_BOOKMARK_COLUMNS,
        ProtoField::ServerSpecifics,
        encode_bookmark_url_and_favicon,
    )?;

    let placeholders = vec!["?"; PERMANENT_ITEM_TAGS.len()].join(", ");
    conn.execute(
        &format!(
            "UPDATE metas SET specifics = NULL, server_specifics = NULL WHERE singleton_tag IN \
             ({placeholders})"
        ),
        params_from_iter(PERMANENT_ITEM_TAGS),
    )
    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;

    state.needs_column_refresh = true;
    Ok(())
}

/// Adds the tag columns and carries the singleton tag forward.
fn migrate_69_to_70(
    conn: &Connection,
    state: &mut MigrationState,
) -> Result<(), SqliteStoreError> {
    schema::add_column(conn, METAS_TABLE, StringField::UniqueServerTag.column())?;
    schema::add_column(conn, METAS_TABLE, StringField::UniqueClientTag.column())?;
    conn.execute_batch("UPDATE metas SET unique_server_tag = singleton_tag")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    state.needs_column_refresh = true;
    Ok(())
}

/// Extracts sync progress into `models` and rebuilds `share_info`.
fn migrate_70_to_71(conn: &Connection) -> Result<(), SqliteStoreError> {
    schema::create_models_table(conn)?;

    let mut stmt = conn
        .prepare("SELECT last_sync_timestamp, initial_sync_ended FROM share_info")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let mut rows = stmt.query([]).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let progress = match rows.next().map_err(|err| SqliteStoreError::Db(err.to_string()))? {
        Some(row) => DownloadProgress {
            last_download_timestamp: value_int64(
                row.get_ref(0).map_err(|err| SqliteStoreError::Db(err.to_string()))?,
            )?,
            initial_sync_ended: value_bool(
                row.get_ref(1).map_err(|err| SqliteStoreError::Db(err.to_string()))?,
            ),
        },
        None => return Err(SqliteStoreError::Corrupt("share_info has no rows".to_string())),
    };
    if rows.next().map_err(|err| SqliteStoreError::Db(err.to_string()))?.is_some() {
        return Err(SqliteStoreError::Corrupt("share_info has more than one row".to_string()));
    }
    drop(rows);
    drop(stmt);

    let inserted = conn
        .execute(
            &format!(
                "INSERT INTO {MODELS_TABLE} (model_id, last_download_timestamp, \
                 initial_sync_ended) VALUES (?1, ?2, ?3)"
            ),
            params![
                ModelType::Bookmarks.model_id(),
                progress.last_download_timestamp,
                progress.initial_sync_ended
            ],
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    if inserted != 1 {
        return Err(SqliteStoreError::Db(format!("models seed affected {inserted} rows")));
    }

    schema::rebuild_table(conn, SHARE_INFO_TABLE, &SHARE_INFO_COLUMNS)
}

// ============================================================================
// SECTION: Legacy Payload Folding
// ============================================================================

/// Encodes legacy columns (starting at a row offset) into a payload.
type LegacyColumnHandler =
    fn(&Row<'_>, usize, &mut EntitySpecifics) -> Result<(), SqliteStoreError>;

/// Rewrites a payload column of every entry from a set of legacy columns.
///
/// The handler sees the existing payload and the legacy values; the result
/// replaces the payload column. Returns the number of rows rewritten.
fn migrate_to_specifics(
    conn: &Connection,
    legacy_columns: &[&str],
    specifics_field: ProtoField,
    handler: LegacyColumnHandler,
) -> Result<usize, SqliteStoreError> {
    let specifics_column = specifics_field.column().name;
    let select = format!(
        "SELECT metahandle, {specifics_column}, {} FROM metas",
        legacy_columns.join(", ")
    );
    let mut updates: Vec<(i64, Vec<u8>)> = Vec::new();
    {
        let mut stmt =
            conn.prepare(&select).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut rows = stmt.query([]).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        while let Some(row) = rows.next().map_err(|err| SqliteStoreError::Db(err.to_string()))? {
            let metahandle =
                value_int64(row.get_ref(0).map_err(|err| SqliteStoreError::Db(err.to_string()))?)?;
            let mut specifics = EntitySpecifics::from_bytes_lossy(&value_blob(
                row.get_ref(1).map_err(|err| SqliteStoreError::Db(err.to_string()))?,
            ));
            handler(row, 2, &mut specifics)?;
            updates.push((metahandle, specifics.to_bytes()));
        }
    }

    let mut update = conn
        .prepare(&format!("UPDATE metas SET {specifics_column} = ?1 WHERE metahandle = ?2"))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    for (metahandle, bytes) in &updates {
        update
            .execute(params![bytes, metahandle])
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    }
    Ok(updates.len())
}

/// Folds (type flag, url, favicon, directory flag) into a bookmark payload.
fn encode_bookmark_url_and_favicon(
    row: &Row<'_>,
    first: usize,
    specifics: &mut EntitySpecifics,
) -> Result<(), SqliteStoreError> {
    let column = |offset: usize| {
        row.get_ref(first + offset).map_err(|err| SqliteStoreError::Db(err.to_string()))
    };
    if !value_bool(column(0)?) {
        return Ok(());
    }
    let bookmark = specifics.bookmark.get_or_insert_with(BookmarkSpecifics::default);
    if !value_bool(column(3)?) {
        bookmark.url = value_text(column(1)?);
        bookmark.favicon = value_blob(column(2)?);
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
