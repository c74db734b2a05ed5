// crates/syncdir-cli/src/main.rs
// ============================================================================
// Module: Syncdir CLI Entry Point
// Description: Command dispatcher for directory store inspection.
// Purpose: Open a store the way the sync engine does and print what it holds.
// Dependencies: clap, serde_json, syncdir-cli, syncdir-core, thiserror
// ============================================================================

//! ## Overview
//! `syncdir info` prints a JSON summary of a store; `syncdir dump` prints one
//! JSON line per entry. Both perform a full load, so opening an old store
//! migrates it and opening an unreadable one recreates it. Errors go to
//! stderr and yield a failure exit code.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use syncdir_cli::LoadedStore;
use syncdir_cli::StoreSummary;
use syncdir_cli::SyncdirConfig;
use syncdir_cli::entry_record;
use syncdir_cli::load_store;
use syncdir_core::BitField;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Store name used when a path is given without a name.
const DEFAULT_STORE_NAME: &str = "default";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "syncdir", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a store and print a JSON summary.
    Info(InfoCommand),
    /// Load a store and print one JSON line per entry.
    Dump(DumpCommand),
}

/// Store location inputs.
#[derive(Args, Debug, Clone)]
struct StoreLocationArgs {
    /// Optional config file path (defaults to syncdir.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Optional direct store path (overrides config).
    #[arg(long = "store-path", value_name = "PATH")]
    store_path: Option<PathBuf>,
    /// Store name used with `--store-path`.
    #[arg(long = "store-name", value_name = "NAME", requires = "store_path")]
    store_name: Option<String>,
}

/// Arguments for `info`.
#[derive(Args, Debug)]
struct InfoCommand {
    /// Store location settings.
    #[command(flatten)]
    location: StoreLocationArgs,
}

/// Arguments for `dump`.
#[derive(Args, Debug)]
struct DumpCommand {
    /// Store location settings.
    #[command(flatten)]
    location: StoreLocationArgs,
    /// Only print entries with uncommitted local changes.
    #[arg(long, action = ArgAction::SetTrue)]
    unsynced: bool,
    /// Stop after this many entries.
    #[arg(long, value_name = "COUNT")]
    limit: Option<usize>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("syncdir {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Info(command) => command_info(&command),
        Commands::Dump(command) => command_dump(&command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes `info`.
fn command_info(command: &InfoCommand) -> CliResult<ExitCode> {
    let config = resolve_config(&command.location)?;
    let loaded = open_store(&config)?;
    let summary = StoreSummary::new(&config.store, &loaded);
    write_json_line(&summary)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `dump`.
fn command_dump(command: &DumpCommand) -> CliResult<ExitCode> {
    let config = resolve_config(&command.location)?;
    let loaded = open_store(&config)?;
    let selected = loaded
        .entries_in_order()
        .into_iter()
        .filter(|entry| !command.unsynced || entry.bit(BitField::IsUnsynced))
        .take(command.limit.unwrap_or(usize::MAX));
    for entry in selected {
        let record = entry_record(entry)
            .map_err(|err| CliError::new(format!("entry render failed: {err}")))?;
        write_json_line(&record)?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Store Helpers
// ============================================================================

/// Resolves settings from a direct store path or the config file.
fn resolve_config(location: &StoreLocationArgs) -> CliResult<SyncdirConfig> {
    if let Some(path) = &location.store_path {
        let store_name = location.store_name.as_deref().unwrap_or(DEFAULT_STORE_NAME);
        let config = SyncdirConfig::for_store_path(store_name, path);
        config.validate().map_err(|err| CliError::new(err.to_string()))?;
        return Ok(config);
    }
    SyncdirConfig::load(location.config.as_deref()).map_err(|err| CliError::new(err.to_string()))
}

/// Opens the configured audit sink and loads the store.
fn open_store(config: &SyncdirConfig) -> CliResult<LoadedStore> {
    let audit = config.audit.build_sink().map_err(|err| CliError::new(err.to_string()))?;
    load_store(&config.store, audit).map_err(|err| {
        CliError::new(format!("store load failed ({}): {err}", err.open_result()))
    })
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a value as a single JSON line to stdout.
fn write_json_line<T: Serialize>(value: &T) -> CliResult<()> {
    let line = serde_json::to_string(value)
        .map_err(|err| CliError::new(format!("json render failed: {err}")))?;
    write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
