// crates/syncdir-store-sqlite/src/codec.rs
// ============================================================================
// Module: Entry Record Codec
// Description: Maps entry kernels to and from flat column rows.
// Purpose: Bind every field for full-record writes and unpack full rows.
// Dependencies: rusqlite, syncdir-core
// ============================================================================

//! ## Overview
//! Entries are written whole: [`bind_fields`] yields one value per catalog
//! field in durable order, matching [`insert_entry_sql`]. [`unpack_entry`]
//! reads a row produced by [`select_entries_sql`]. Both walk
//! [`Field::all`] with an exhaustive match, so a field added to the catalog
//! cannot be skipped by the codec.
//!
//! Unpacking is lenient per value: NULL reads as zero, empty, or false, and
//! malformed payload bytes read as an empty payload. Only a column count
//! that disagrees with the catalog is fatal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rusqlite::Row;
use rusqlite::Rows;
use rusqlite::types::Value;
use rusqlite::types::ValueRef;
use syncdir_core::EntitySpecifics;
use syncdir_core::EntryKernel;
use syncdir_core::FIELD_COUNT;
use syncdir_core::Field;
use syncdir_core::SyncId;
use syncdir_core::entry_columns;

use crate::error::SqliteStoreError;
use crate::schema::METAS_TABLE;
use crate::schema::column_names;

// ============================================================================
// SECTION: SQL
// ============================================================================

/// Returns the full-record upsert statement for the entries table.
#[must_use]
pub fn insert_entry_sql() -> String {
    let placeholders = vec!["?"; FIELD_COUNT].join(", ");
    format!(
        "INSERT OR REPLACE INTO {METAS_TABLE} ({}) VALUES ({placeholders})",
        column_names(&entry_columns())
    )
}

/// Returns the full-column select over the entries table.
#[must_use]
pub fn select_entries_sql() -> String {
    format!("SELECT {} FROM {METAS_TABLE}", column_names(&entry_columns()))
}

// ============================================================================
// SECTION: Bind
// ============================================================================

/// Returns every field of an entry as bindable values in durable order.
#[must_use]
pub fn bind_fields(entry: &EntryKernel) -> Vec<Value> {
    Field::all()
        .map(|field| match field {
            Field::Int64(field) => Value::Integer(entry.int64(field)),
            Field::Id(field) => Value::Text(entry.id(field).as_str().to_string()),
            Field::Bit(field) => Value::Integer(i64::from(entry.bit(field))),
            Field::String(field) => Value::Text(entry.string(field).to_string()),
            Field::Proto(field) => Value::Blob(entry.specifics(field).to_bytes()),
        })
        .collect()
}

// ============================================================================
// SECTION: Unpack
// ============================================================================

/// Builds a clean entry from a full-column row.
///
/// # Errors
///
/// Returns [`SqliteStoreError::Corrupt`] when the row shape does not match
/// the catalog, or an integer column holds a non-integer.
pub fn unpack_entry(row: &Row<'_>) -> Result<EntryKernel, SqliteStoreError> {
    let column_count = row.as_ref().column_count();
    if column_count != FIELD_COUNT {
        return Err(SqliteStoreError::Corrupt(format!(
            "entry row has {column_count} columns, expected {FIELD_COUNT}"
        )));
    }
    let mut entry = EntryKernel::default();
    for (index, field) in Field::all().enumerate() {
        let value = row.get_ref(index).map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        match field {
            Field::Int64(field) => entry.put_int64(field, value_int64(value)?),
            Field::Id(field) => entry.put_id(field, SyncId::new(value_text(value))),
            Field::Bit(field) => entry.put_bit(field, value_bool(value)),
            Field::String(field) => entry.put_string(field, value_text(value)),
            Field::Proto(field) => {
                entry.put_specifics(field, EntitySpecifics::from_bytes_lossy(&value_blob(value)));
            }
        }
    }
    entry.clear_dirty();
    Ok(entry)
}

/// Unpacks the next row of a full-column query, or `None` when exhausted.
///
/// # Errors
///
/// Returns [`SqliteStoreError`] when stepping or unpacking fails.
pub fn next_entry(rows: &mut Rows<'_>) -> Result<Option<EntryKernel>, SqliteStoreError> {
    match rows.next().map_err(|err| SqliteStoreError::Db(err.to_string()))? {
        Some(row) => unpack_entry(row).map(Some),
        None => Ok(None),
    }
}

// ============================================================================
// SECTION: Value Conversion
// ============================================================================

/// Reads an integer column; NULL reads as 0.
pub(crate) fn value_int64(value: ValueRef<'_>) -> Result<i64, SqliteStoreError> {
    match value {
        ValueRef::Null => Ok(0),
        ValueRef::Integer(number) => Ok(number),
        ValueRef::Text(text) => String::from_utf8_lossy(text)
            .trim()
            .parse()
            .map_err(|_| SqliteStoreError::Corrupt("integer column holds text".to_string())),
        ValueRef::Real(_) | ValueRef::Blob(_) => {
            Err(SqliteStoreError::Corrupt("integer column holds a non-integer".to_string()))
        }
    }
}

/// Reads a text column; NULL reads as empty.
pub(crate) fn value_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(number) => number.to_string(),
        ValueRef::Real(number) => number.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// Reads a bit column with a non-zero test; NULL reads as false.
pub(crate) fn value_bool(value: ValueRef<'_>) -> bool {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => false,
        ValueRef::Integer(number) => number != 0,
        ValueRef::Real(number) => number != 0.0,
        ValueRef::Text(text) => {
            String::from_utf8_lossy(text).trim().parse::<i64>().is_ok_and(|number| number != 0)
        }
    }
}

/// Reads a blob column; NULL reads as empty.
pub(crate) fn value_blob(value: ValueRef<'_>) -> Vec<u8> {
    match value {
        ValueRef::Blob(bytes) | ValueRef::Text(bytes) => bytes.to_vec(),
        ValueRef::Null | ValueRef::Integer(_) | ValueRef::Real(_) => Vec::new(),
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

    use rusqlite::Connection;
    use rusqlite::params_from_iter;
    use syncdir_core::BitField;
    use syncdir_core::EntryKernel;
    use syncdir_core::FIELD_COUNT;

    use super::bind_fields;
    use super::insert_entry_sql;
    use super::next_entry;
    use super::select_entries_sql;
    use crate::schema::NewStoreInfo;
    use crate::schema::create_tables;

    #[test]
    fn bind_produces_one_value_per_field() {
        assert_eq!(bind_fields(&EntryKernel::with_metahandle(5)).len(), FIELD_COUNT);
    }

    #[test]
    fn null_columns_unpack_as_defaults() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn, &NewStoreInfo::generate("name")).unwrap();
        conn.execute_batch("INSERT INTO metas (metahandle, non_unique_name) VALUES (9, NULL)")
            .unwrap();
        let mut stmt =
            conn.prepare(&format!("{} WHERE metahandle = 9", select_entries_sql())).unwrap();
        let mut rows = stmt.query([]).unwrap();
        let entry = next_entry(&mut rows).unwrap().unwrap();
        assert_eq!(entry.metahandle(), 9);
        assert!(entry.id(syncdir_core::IdField::Id).is_root());
        assert!(!entry.bit(BitField::IsDel));
        assert!(entry.string(syncdir_core::StringField::NonUniqueName).is_empty());
        assert!(!entry.is_dirty());
        assert!(next_entry(&mut rows).unwrap().is_none());
    }

    #[test]
    fn bound_entry_is_accepted_by_insert_statement() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn, &NewStoreInfo::generate("name")).unwrap();
        let mut entry = EntryKernel::with_metahandle(2);
        entry.put_bit(BitField::IsUnsynced, true);
        let changed =
            conn.execute(&insert_entry_sql(), params_from_iter(bind_fields(&entry))).unwrap();
        assert_eq!(changed, 1);
    }
}
