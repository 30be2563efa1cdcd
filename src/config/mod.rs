// src/config/mod.rs

//! Configuration loading and validation for bulkwatch.
//!
//! Responsibilities:
//! - Define the raw (TOML-backed) and resolved settings (`model.rs`).
//! - Load an optional settings file and merge CLI/env values (`loader.rs`).
//! - Apply defaults and validate (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_from_path, merge_cli, resolve_settings};
pub use model::{JobSpec, RawSettings, Settings};
