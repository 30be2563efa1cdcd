// src/config/validate.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::config::model::{
    DEFAULT_BACKEND_URL, DEFAULT_DEBOUNCE_MS, DEFAULT_HEALTH_TIMEOUT_MS, DEFAULT_INPUT_DIR,
    DEFAULT_INTERPRETER, DEFAULT_JOB_SCRIPT, JobSpec, RawSettings, Settings,
};
use crate::errors::{BulkwatchError, Result};

/// Upper bound for the debounce window. The delay only lets a file finish
/// writing, so it stays sub-second.
const MAX_DEBOUNCE_MS: u64 = 999;

impl TryFrom<RawSettings> for Settings {
    type Error = crate::errors::BulkwatchError;

    fn try_from(raw: RawSettings) -> std::result::Result<Self, Self::Error> {
        let workdir = match raw.workdir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };

        let backend_url = parse_backend_url(raw.backend_url.as_deref())?;
        let health_timeout_ms = validate_health_timeout(raw.health_timeout_ms)?;
        let debounce_ms = validate_debounce(raw.debounce_ms)?;

        let script = raw
            .job_script
            .unwrap_or_else(|| PathBuf::from(DEFAULT_JOB_SCRIPT));
        if script.as_os_str().is_empty() {
            return Err(BulkwatchError::ConfigError(
                "job_script must not be empty".to_string(),
            ));
        }

        let interpreter = match raw.interpreter {
            Some(s) if s.trim().is_empty() => None,
            Some(s) => Some(s.trim().to_string()),
            None => Some(DEFAULT_INTERPRETER.to_string()),
        };

        let input_dir = raw
            .input_dir
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR));

        let job = JobSpec {
            interpreter,
            script: resolve_against(&workdir, &script),
            workdir: workdir.clone(),
        };

        Ok(Settings::new_unchecked(
            resolve_against(&workdir, &input_dir),
            backend_url,
            job,
            Duration::from_millis(health_timeout_ms),
            Duration::from_millis(debounce_ms),
        ))
    }
}

fn parse_backend_url(raw: Option<&str>) -> Result<Url> {
    let raw = raw.unwrap_or(DEFAULT_BACKEND_URL).trim();
    let url = Url::parse(raw)?;
    ensure_http_scheme(&url)?;
    Ok(url)
}

fn ensure_http_scheme(url: &Url) -> Result<()> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(BulkwatchError::ConfigError(format!(
            "backend_url must use http or https (got '{other}')"
        ))),
    }
}

fn validate_health_timeout(ms: Option<u64>) -> Result<u64> {
    let ms = ms.unwrap_or(DEFAULT_HEALTH_TIMEOUT_MS);
    if ms == 0 {
        return Err(BulkwatchError::ConfigError(
            "health_timeout_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(ms)
}

fn validate_debounce(ms: Option<u64>) -> Result<u64> {
    let ms = ms.unwrap_or(DEFAULT_DEBOUNCE_MS);
    if ms > MAX_DEBOUNCE_MS {
        return Err(BulkwatchError::ConfigError(format!(
            "debounce_ms must be <= {MAX_DEBOUNCE_MS} (got {ms})"
        )));
    }
    Ok(ms)
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
