// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::{debug, error, info, warn};

use crate::engine::core::CoordinatorState;
use crate::engine::TriggerReason;
use crate::exec::JobOutcome;
use crate::health::HealthStatus;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start a dispatch attempt: probe the backend, report `HealthChecked`.
    CheckHealth { reason: TriggerReason },
    /// The gate passed: run the job, report `JobFinished`.
    RunJob,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn none() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: true,
        }
    }

    fn command(command: CoreCommand) -> Self {
        Self {
            commands: vec![command],
            keep_running: true,
        }
    }
}

/// Handle a trigger request.
///
/// - Idle: start an attempt. `pending` is cleared because this attempt
///   covers everything that arrived so far.
/// - Running: only remember that another run is wanted.
/// - Shutting down: drop it.
pub fn handle_trigger(state: &mut CoordinatorState, reason: TriggerReason) -> CoreStep {
    if state.shutting_down {
        info!(%reason, "shutdown in progress; ignoring trigger");
        return CoreStep::none();
    }

    info!(%reason, "bulk evaluation triggered");

    if state.running {
        if !state.pending {
            info!("bulk evaluation already running; remembering a pending run");
        }
        state.pending = true;
        return CoreStep::none();
    }

    start_attempt(state, reason)
}

/// Handle the result of the health probe for the current attempt.
///
/// Unhealthy ends the attempt without touching `pending`: a trigger that
/// arrived during the probe is honoured by the next trigger, not retried
/// here, so a degraded backend is not hammered.
pub fn handle_health_checked(state: &mut CoordinatorState, status: HealthStatus) -> CoreStep {
    if !state.running {
        warn!(%status, "health result received while idle; ignoring");
        return CoreStep::none();
    }

    match status {
        HealthStatus::Healthy if state.shutting_down => {
            info!("backend healthy, but shutdown in progress; not starting the job");
            state.running = false;
            CoreStep::none()
        }
        HealthStatus::Healthy => {
            info!("backend health OK; starting bulk evaluation");
            state.jobs_started += 1;
            CoreStep::command(CoreCommand::RunJob)
        }
        HealthStatus::Unhealthy(reason) => {
            warn!(%reason, "backend not healthy or unreachable; skipping this run");
            if state.pending {
                debug!("pending trigger kept for the next attempt");
            }
            state.running = false;
            CoreStep::none()
        }
    }
}

/// Handle the end of a job process.
///
/// This is the loop's re-dispatch point: if anything arrived during the run,
/// `pending` is cleared right here and exactly one new attempt starts.
pub fn handle_job_finished(state: &mut CoordinatorState, outcome: JobOutcome) -> CoreStep {
    match &outcome {
        JobOutcome::Success => info!("bulk evaluation finished successfully (exit code 0)"),
        JobOutcome::Failed(code) => warn!(exit_code = code, "bulk evaluation exited with failure"),
        JobOutcome::LaunchError(msg) => error!(error = %msg, "bulk evaluation could not be started"),
    }

    if !state.running {
        warn!(%outcome, "job completion received while idle; ignoring");
        return CoreStep::none();
    }

    if state.pending && !state.shutting_down {
        info!("pending run detected; starting another bulk evaluation");
        state.running = false;
        return start_attempt(state, TriggerReason::Pending);
    }

    if state.pending {
        info!("shutdown in progress; dropping pending run");
    }
    state.running = false;
    CoreStep::none()
}

/// Handle a shutdown request. The core keeps running until the in-flight
/// attempt (if any) has reported back.
pub fn handle_shutdown(state: &mut CoordinatorState) -> CoreStep {
    state.shutting_down = true;
    if state.running {
        info!("shutdown requested; waiting for the active run to finish");
    } else {
        info!("shutdown requested; coordinator idle");
    }
    CoreStep::none()
}

fn start_attempt(state: &mut CoordinatorState, reason: TriggerReason) -> CoreStep {
    state.running = true;
    state.pending = false;
    state.attempts_started += 1;
    debug!(attempt = state.attempts_started, %reason, "dispatch attempt started");
    CoreStep::command(CoreCommand::CheckHealth { reason })
}
