// src/exec/backend.rs

//! Pluggable job runner abstraction.
//!
//! The runtime talks to a `JobRunner` instead of spawning processes itself.
//! This makes it easy to swap in a fake runner in tests while keeping the
//! production implementation in [`super::process`].
//!
//! - `ProcessJobRunner` is the default implementation used by `bulkwatch`.
//!   It launches the configured script and waits for it to exit.
//! - Tests can provide their own `JobRunner` that, for example, records
//!   invocations and completes when the test says so.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Outcome of one job invocation.
///
/// Failing to start the process at all is kept apart from a process that
/// ran and exited non-zero; both are logged, neither is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Success,
    /// Exited with a non-zero code (`-1` when terminated by a signal).
    Failed(i32),
    /// The process could not be started (missing binary, permissions, ...).
    LaunchError(String),
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success)
    }
}

impl fmt::Display for JobOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobOutcome::Success => write!(f, "success"),
            JobOutcome::Failed(code) => write!(f, "exit code {code}"),
            JobOutcome::LaunchError(msg) => write!(f, "launch error: {msg}"),
        }
    }
}

/// Trait abstracting how the bulk job is executed.
///
/// Production code uses [`super::ProcessJobRunner`]; tests can provide their
/// own implementation that doesn't spawn real processes.
pub trait JobRunner: Send + Sync {
    /// Run the job to completion and report how it ended.
    ///
    /// Never returns an error: every failure is a [`JobOutcome`] variant.
    fn run(&self) -> Pin<Box<dyn Future<Output = JobOutcome> + Send + '_>>;
}
