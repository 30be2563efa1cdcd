// src/engine/mod.rs

//! Dispatch coordination engine for bulkwatch.
//!
//! This module ties together:
//! - the coordinator state (`running` / `pending`)
//! - the health gate in front of every dispatch attempt
//! - the main runtime event loop that reacts to:
//!   - triggers (initial scan, new files)
//!   - health probe results
//!   - job completions
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`]. Every event passes through one mpsc channel
//! and is applied by one task, so the coordinator flags are never touched
//! concurrently and a pending re-run is just another loop iteration.

use crate::exec::JobOutcome;
use crate::health::HealthStatus;

pub use crate::types::TriggerReason;

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// If true, exit the runtime as soon as the coordinator is idle again
    /// (used for `--once`).
    pub exit_when_idle: bool,
}

/// Events flowing into the runtime from the watcher, probe tasks, job tasks
/// and the signal handler.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Something wants the bulk job to run.
    TriggerRequested { reason: TriggerReason },
    /// The health probe for the current attempt finished.
    HealthChecked { status: HealthStatus },
    /// The job process for the current attempt exited.
    JobFinished { outcome: JobOutcome },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use core::{CoordinatorState, CoreRuntime};
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
