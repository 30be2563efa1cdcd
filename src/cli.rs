// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every option can also come from the environment (see the `env = ...`
//! attributes) or from an optional TOML file passed via `--config`. Flags
//! left unset here fall through to the file and then to built-in defaults,
//! see [`crate::config::loader::resolve_settings`].

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `bulkwatch`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "bulkwatch",
    version,
    about = "Watch an input directory and run a health-gated bulk evaluation job for new images.",
    long_about = None
)]
pub struct CliArgs {
    /// Optional TOML config file.
    #[arg(long, value_name = "PATH", env = "BULKWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory to watch for new input images.
    #[arg(long, value_name = "DIR", env = "BULKWATCH_INPUT_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Classify endpoint of the backend; the health URL is derived from it.
    #[arg(long, value_name = "URL", env = "TARIC_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Script run for each bulk evaluation, relative to `--workdir`.
    #[arg(long, value_name = "PATH", env = "BULKWATCH_JOB_SCRIPT")]
    pub job_script: Option<PathBuf>,

    /// Interpreter used to run the job script. Pass an empty string to
    /// execute the script directly.
    #[arg(long, value_name = "PROGRAM", env = "BULKWATCH_INTERPRETER")]
    pub interpreter: Option<String>,

    /// Working directory of the job process.
    #[arg(long, value_name = "DIR", env = "BULKWATCH_WORKDIR")]
    pub workdir: Option<PathBuf>,

    /// Timeout of a single backend health probe, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub health_timeout_ms: Option<u64>,

    /// Settle window between a new file appearing and the trigger, in
    /// milliseconds.
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Dispatch the initial scan only, without watching, then exit.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BULK_WATCHER_LOGLEVEL` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the settings, but don't watch or run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
