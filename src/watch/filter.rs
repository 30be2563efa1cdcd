// src/watch/filter.rs

//! Suffix allow-list for input files.

use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::errors::{BulkwatchError, Result};

/// Image types the bulk evaluation job understands.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Case-insensitive file-suffix filter, compiled to a `GlobSet` of `*.ext`
/// patterns matched against the file name only.
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    set: GlobSet,
    extensions: Vec<String>,
}

impl ExtensionFilter {
    /// Build a filter for the given extensions (with or without leading dot).
    pub fn new<I, S>(extensions: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        let mut normalized = Vec::new();

        for ext in extensions {
            let ext = ext.as_ref().trim().trim_start_matches('.').to_lowercase();
            if ext.is_empty() {
                continue;
            }
            let glob = GlobBuilder::new(&format!("*.{ext}"))
                .case_insensitive(true)
                .literal_separator(true)
                .build()
                .map_err(|e| {
                    BulkwatchError::ConfigError(format!("invalid extension '{ext}': {e}"))
                })?;
            builder.add(glob);
            normalized.push(ext);
        }

        let set = builder
            .build()
            .map_err(|e| BulkwatchError::ConfigError(format!("building extension filter: {e}")))?;

        Ok(Self {
            set,
            extensions: normalized,
        })
    }

    /// The fixed image filter used by the watcher.
    pub fn images() -> Result<Self> {
        Self::new(ALLOWED_EXTENSIONS)
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Does the file name of `path` end in one of the allowed suffixes?
    ///
    /// Dotfiles without a real extension (e.g. `.jpg`) are rejected.
    pub fn matches(&self, path: &Path) -> bool {
        if path.extension().is_none() {
            return false;
        }
        match path.file_name() {
            Some(name) => self.set.is_match(Path::new(name)),
            None => false,
        }
    }
}
