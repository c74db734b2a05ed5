// crates/syncdir-cli/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate CLI config loading guards (path, size, encoding, sink).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

//! Config load validation tests for syncdir-cli.

use std::io::Write;
use std::path::Path;

use syncdir_cli::AuditSinkKind;
use syncdir_cli::ConfigError;
use syncdir_cli::SyncdirConfig;
use tempfile::NamedTempFile;
use tempfile::TempDir;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<SyncdirConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(text: &str) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(text.as_bytes()).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(SyncdirConfig::load(Some(path)), "config path exceeds max length")
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(SyncdirConfig::load(Some(path)), "config path component too long")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    let payload = vec![b'#'; 64 * 1024 + 1];
    file.write_all(&payload).map_err(|err| err.to_string())?;
    assert_invalid(SyncdirConfig::load(Some(file.path())), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(&[0xFF, 0xFE, 0xFF]).map_err(|err| err.to_string())?;
    assert_invalid(SyncdirConfig::load(Some(file.path())), "config file must be utf-8")
}

#[test]
fn load_rejects_missing_store_table() -> TestResult {
    let file = write_config("[audit]\nsink = \"stderr\"\n")?;
    assert_invalid(SyncdirConfig::load(Some(file.path())), "config parse error")
}

#[test]
fn load_rejects_empty_store_name() -> TestResult {
    let file = write_config("[store]\npath = \"SyncData.sqlite3\"\nstore_name = \"\"\n")?;
    assert_invalid(SyncdirConfig::load(Some(file.path())), "invalid config")
}

#[test]
fn load_rejects_misspelled_store_key() -> TestResult {
    let file = write_config("[store]\npath = \"SyncData.sqlite3\"\nbusy_timeout = 5000\n")?;
    assert_invalid(SyncdirConfig::load(Some(file.path())), "config parse error")
}

#[test]
fn load_rejects_store_path_that_is_a_directory() -> TestResult {
    let dir = TempDir::new().map_err(|err| err.to_string())?;
    let text = format!("[store]\npath = '{}'\n", dir.path().display());
    let file = write_config(&text)?;
    assert_invalid(SyncdirConfig::load(Some(file.path())), "invalid config")
}

#[test]
fn load_rejects_file_sink_without_path() -> TestResult {
    let file = write_config("[store]\npath = \"SyncData.sqlite3\"\n[audit]\nsink = \"file\"\n")?;
    assert_invalid(SyncdirConfig::load(Some(file.path())), "audit.path is required")
}

#[test]
fn load_accepts_full_config() -> TestResult {
    let file = write_config(
        "[store]\npath = \"SyncData.sqlite3\"\nstore_name = \"user@example.com\"\n\
         busy_timeout_ms = 5000\n[audit]\nsink = \"file\"\npath = \"audit.jsonl\"\n",
    )?;
    let config = SyncdirConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.store.store_name != "user@example.com" || config.store.busy_timeout_ms != 5000 {
        return Err("unexpected store settings".to_string());
    }
    if config.audit.sink != AuditSinkKind::File {
        return Err("expected file sink".to_string());
    }
    Ok(())
}
