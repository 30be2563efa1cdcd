// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Only setup-time failures surface as errors. Per-trigger failures (an
//! unhealthy backend, a job that exits non-zero) are plain values handled by
//! the coordinator, see [`crate::health::HealthStatus`] and
//! [`crate::exec::JobOutcome`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BulkwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("File watch error: {0}")]
    WatchError(#[from] notify::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("E-mail error: {0}")]
    EmailError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BulkwatchError>;
