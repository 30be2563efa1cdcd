// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::cli::CliArgs;
use crate::config::model::{RawSettings, Settings};
use crate::errors::Result;

/// Load a TOML settings file and return the raw, unvalidated `RawSettings`.
///
/// This only performs TOML deserialization. Use [`resolve_settings`] to get
/// validated [`Settings`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawSettings> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let raw: RawSettings = toml::from_str(&contents)?;

    Ok(raw)
}

/// Overlay CLI/environment values on top of file values.
///
/// Anything set on the command line (or through the matching environment
/// variable, which clap folds into the same field) wins.
pub fn merge_cli(file: RawSettings, args: &CliArgs) -> RawSettings {
    RawSettings {
        input_dir: args.input_dir.clone().or(file.input_dir),
        backend_url: args.backend_url.clone().or(file.backend_url),
        job_script: args.job_script.clone().or(file.job_script),
        interpreter: args.interpreter.clone().or(file.interpreter),
        workdir: args.workdir.clone().or(file.workdir),
        health_timeout_ms: args.health_timeout_ms.or(file.health_timeout_ms),
        debounce_ms: args.debounce_ms.or(file.debounce_ms),
    }
}

/// Resolve the effective settings for a run.
///
/// - Reads `--config` if given.
/// - Merges CLI flags and environment variables on top.
/// - Applies defaults and validates (see `validate.rs`).
pub fn resolve_settings(args: &CliArgs) -> Result<Settings> {
    let file = match &args.config {
        Some(path) => load_from_path(path)?,
        None => RawSettings::default(),
    };
    Settings::try_from(merge_cli(file, args))
}
