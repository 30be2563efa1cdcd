#![allow(dead_code)]

use std::path::{Path, PathBuf};

use bulkwatch::config::{RawSettings, Settings};

/// Builder for `Settings` to simplify test setup.
///
/// Everything is anchored in `workdir`, so tests can point it at a tempdir.
pub struct SettingsBuilder {
    raw: RawSettings,
}

impl SettingsBuilder {
    pub fn new(workdir: impl AsRef<Path>) -> Self {
        Self {
            raw: RawSettings {
                workdir: Some(workdir.as_ref().to_path_buf()),
                ..RawSettings::default()
            },
        }
    }

    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.raw.input_dir = Some(dir.into());
        self
    }

    pub fn backend_url(mut self, url: &str) -> Self {
        self.raw.backend_url = Some(url.to_string());
        self
    }

    pub fn job_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.raw.job_script = Some(script.into());
        self
    }

    pub fn interpreter(mut self, interpreter: &str) -> Self {
        self.raw.interpreter = Some(interpreter.to_string());
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.raw.debounce_ms = Some(ms);
        self
    }

    pub fn health_timeout_ms(mut self, ms: u64) -> Self {
        self.raw.health_timeout_ms = Some(ms);
        self
    }

    pub fn raw(self) -> RawSettings {
        self.raw
    }

    pub fn build(self) -> Settings {
        Settings::try_from(self.raw).expect("Failed to build valid settings from builder")
    }
}
