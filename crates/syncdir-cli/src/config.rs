// crates/syncdir-cli/src/config.rs
// ============================================================================
// Module: Syncdir CLI Configuration
// Description: TOML configuration loading and validation for the CLI.
// Purpose: Resolve store settings and the audit sink with hard input limits.
// Dependencies: serde, syncdir-store-sqlite, thiserror, toml
// ============================================================================

//! ## Overview
//! The CLI reads `syncdir.toml` from the working directory unless a path is
//! passed explicitly or set through `SYNCDIR_CONFIG`. The file carries a
//! `[store]` table (the store settings) and an optional `[audit]` table
//! choosing where lifecycle events go. Oversized, non-UTF-8, or unknown
//! input fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use syncdir_store_sqlite::FileStoreAuditSink;
use syncdir_store_sqlite::NoopStoreAuditSink;
use syncdir_store_sqlite::SqliteDirectoryStoreConfig;
use syncdir_store_sqlite::StderrStoreAuditSink;
use syncdir_store_sqlite::StoreAuditSink;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "syncdir.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SYNCDIR_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 64 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// Top-level CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncdirConfig {
    /// Store location and connection settings.
    pub store: SqliteDirectoryStoreConfig,
    /// Lifecycle event routing.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl SyncdirConfig {
    /// Builds a config for a store path given directly on the command line.
    #[must_use]
    pub fn for_store_path(store_name: &str, path: &Path) -> Self {
        Self {
            store: SqliteDirectoryStoreConfig::new(store_name, path),
            audit: AuditConfig::default(),
        }
    }

    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the store and audit settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a setting is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate().map_err(|err| ConfigError::Invalid(err.to_string()))?;
        self.audit.validate()
    }
}

/// Where store lifecycle events are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `audit.path`.
    File,
}

/// Audit sink settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Selected sink.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates that the file sink has a usable path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the file sink has no path or the
    /// path exceeds limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()))
            }
            (_, Some(path)) => validate_path(path),
            (_, None) => Ok(()),
        }
    }

    /// Opens the configured sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file sink cannot be opened.
    pub fn build_sink(&self) -> Result<Arc<dyn StoreAuditSink>, ConfigError> {
        match self.sink {
            AuditSinkKind::None => Ok(Arc::new(NoopStoreAuditSink)),
            AuditSinkKind::Stderr => Ok(Arc::new(StderrStoreAuditSink)),
            AuditSinkKind::File => {
                let path = self.path.as_deref().ok_or_else(|| {
                    ConfigError::Invalid("audit.path is required for the file sink".to_string())
                })?;
                let sink =
                    FileStoreAuditSink::new(path).map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Arc::new(sink))
            }
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates a path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
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

    use super::AuditConfig;
    use super::AuditSinkKind;
    use super::SyncdirConfig;

    #[test]
    fn minimal_config_defaults_audit_to_none() {
        let config: SyncdirConfig = toml::from_str("[store]\npath = \"db/SyncData.sqlite3\"\n")
            .expect("parse minimal config");
        assert_eq!(config.audit, AuditConfig::default());
        assert_eq!(config.store.store_name, "default");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn file_sink_requires_path() {
        let audit = AuditConfig {
            sink: AuditSinkKind::File,
            path: None,
        };
        assert!(audit.validate().is_err());
        assert!(audit.build_sink().is_err());
    }

    #[test]
    fn unknown_tables_are_rejected() {
        let parsed: Result<SyncdirConfig, _> =
            toml::from_str("[store]\npath = \"a.sqlite3\"\n[server]\nport = 1\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn misspelled_store_keys_are_rejected() {
        let parsed: Result<SyncdirConfig, _> =
            toml::from_str("[store]\npath = \"a.sqlite3\"\nstore_nmae = \"typo\"\n");
        assert!(parsed.is_err());
    }
}
