// src/config/model.rs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

/// Default classify endpoint of the backend.
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000/classify";
/// Default input directory, relative to the working directory.
pub const DEFAULT_INPUT_DIR: &str = "data/taric_bulk_input";
/// Default job script, relative to the working directory.
pub const DEFAULT_JOB_SCRIPT: &str = "bulk-evaluation.py";
/// Default interpreter for the job script.
pub const DEFAULT_INTERPRETER: &str = "python3";
pub const DEFAULT_HEALTH_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_DEBOUNCE_MS: u64 = 200;

/// Settings as read from an optional TOML file, before defaults and
/// validation are applied.
///
/// ```toml
/// input_dir = "data/taric_bulk_input"
/// backend_url = "http://127.0.0.1:8000/classify"
/// job_script = "bulk-evaluation.py"
/// interpreter = "python3"
/// workdir = "/srv/taric"
/// health_timeout_ms = 3000
/// debounce_ms = 200
/// ```
///
/// Every key is optional. CLI flags and environment variables are merged on
/// top of this before it is turned into [`Settings`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RawSettings {
    #[serde(default)]
    pub input_dir: Option<PathBuf>,

    #[serde(default)]
    pub backend_url: Option<String>,

    #[serde(default)]
    pub job_script: Option<PathBuf>,

    /// `Some("")` means "no interpreter, execute the script directly".
    #[serde(default)]
    pub interpreter: Option<String>,

    #[serde(default)]
    pub workdir: Option<PathBuf>,

    #[serde(default)]
    pub health_timeout_ms: Option<u64>,

    #[serde(default)]
    pub debounce_ms: Option<u64>,
}

/// How the external bulk evaluation job is launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    /// Program used to run `script`; `None` runs the script itself.
    pub interpreter: Option<String>,
    /// Absolute (or workdir-joined) path of the job script.
    pub script: PathBuf,
    /// Working directory of the child process.
    pub workdir: PathBuf,
}

impl JobSpec {
    /// Program and arguments of the child process.
    pub fn command_line(&self) -> (String, Vec<String>) {
        let script = self.script.to_string_lossy().into_owned();
        match &self.interpreter {
            Some(interp) => (interp.clone(), vec![script]),
            None => (script, Vec::new()),
        }
    }
}

/// Fully resolved, validated settings.
///
/// Construct via `Settings::try_from(RawSettings)` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct Settings {
    pub input_dir: PathBuf,
    pub backend_url: Url,
    pub job: JobSpec,
    pub health_timeout: Duration,
    pub debounce: Duration,
}

impl Settings {
    /// Internal constructor used by validation.
    pub(crate) fn new_unchecked(
        input_dir: PathBuf,
        backend_url: Url,
        job: JobSpec,
        health_timeout: Duration,
        debounce: Duration,
    ) -> Self {
        Self {
            input_dir,
            backend_url,
            job,
            health_timeout,
            debounce,
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.job.workdir
    }
}
