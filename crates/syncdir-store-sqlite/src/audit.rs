// crates/syncdir-store-sqlite/src/audit.rs
// ============================================================================
// Module: Directory Store Audit Logging
// Description: Structured lifecycle events for the SQLite directory store.
// Purpose: Emit JSON-line store events without hard logging dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The store reports schema creation, resets, migrations, purges, loads, and
//! saves as [`StoreAuditEvent`] values. Events carry counts, versions, and
//! error kinds only; entry contents never reach a sink. Deployments pick a
//! sink: stderr, an append-only file, or nothing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Kind of store lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreEventKind {
    /// First open failed; the file was deleted and the open retried.
    StoreOpenRetry,
    /// Fresh schema created in an empty file.
    SchemaCreated,
    /// Unrecognized schema dropped and recreated.
    SchemaReset,
    /// One migration step applied.
    SchemaMigrated,
    /// Entries table rebuilt to the current column set.
    SchemaColumnsRefreshed,
    /// Creation version and time read back after initialization.
    StoreCreatedInfo,
    /// Reconciled tombstones removed during load.
    TombstonesPurged,
    /// Load completed.
    StoreLoaded,
    /// Load failed.
    StoreLoadFailed,
    /// Save committed.
    SaveCommitted,
    /// Save rolled back.
    SaveFailed,
}

/// Directory store audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct StoreAuditEvent {
    /// Event identifier.
    pub event: StoreEventKind,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Logical store name.
    pub store_name: String,
    /// Schema version before the event, when relevant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_version: Option<i64>,
    /// Schema version after the event, when relevant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_version: Option<i64>,
    /// Affected row count, when relevant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Normalized error kind label for failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    /// Free-form detail (creation version, error message).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl StoreAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(event: StoreEventKind, store_name: &str) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event,
            timestamp_ms,
            store_name: store_name.to_string(),
            from_version: None,
            to_version: None,
            count: None,
            error_kind: None,
            detail: None,
        }
    }

    /// Attaches the schema versions before and after the event.
    #[must_use]
    pub fn with_versions(mut self, from_version: i64, to_version: i64) -> Self {
        self.from_version = Some(from_version);
        self.to_version = Some(to_version);
        self
    }

    /// Attaches an affected row count.
    #[must_use]
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    /// Attaches an error kind and message.
    #[must_use]
    pub fn with_error(mut self, error_kind: &'static str, message: impl Into<String>) -> Self {
        self.error_kind = Some(error_kind);
        self.detail = Some(message.into());
        self
    }

    /// Attaches free-form detail.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for directory store events.
pub trait StoreAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &StoreAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrStoreAuditSink;

impl StoreAuditSink for StderrStoreAuditSink {
    fn record(&self, event: &StoreAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileStoreAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileStoreAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl StoreAuditSink for FileStoreAuditSink {
    fn record(&self, event: &StoreAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink.
pub struct NoopStoreAuditSink;

impl StoreAuditSink for NoopStoreAuditSink {
    fn record(&self, _event: &StoreAuditEvent) {}
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

    use super::FileStoreAuditSink;
    use super::StoreAuditEvent;
    use super::StoreAuditSink;
    use super::StoreEventKind;

    #[test]
    fn events_serialize_without_empty_optionals() {
        let event = StoreAuditEvent::new(StoreEventKind::SchemaMigrated, "user@example.com")
            .with_versions(69, 70);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "schema_migrated");
        assert_eq!(value["from_version"], 69);
        assert_eq!(value["to_version"], 70);
        assert!(value.get("count").is_none());
        assert!(value.get("error_kind").is_none());
    }

    #[test]
    fn file_sink_appends_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let sink = FileStoreAuditSink::new(&path).unwrap();
        sink.record(&StoreAuditEvent::new(StoreEventKind::StoreLoaded, "a").with_count(3));
        sink.record(&StoreAuditEvent::new(StoreEventKind::SaveCommitted, "a").with_count(1));
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["event"], "store_loaded");
        assert_eq!(first["count"], 3);
    }
}
