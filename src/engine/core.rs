// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated coordinator state
//! - a list of "commands" describing what the IO shell should do next
//!
//! The async/IO-heavy shell (`engine::runtime::Runtime`) is responsible for:
//! - reading events from channels
//! - running the health probe and the job outside the event loop
//! - handling Ctrl+C / shutdown
//!
//! The core is intended to be extensively unit tested without any Tokio,
//! channels, network, or processes.

use crate::engine::event_handlers::{
    handle_health_checked, handle_job_finished, handle_shutdown, handle_trigger, CoreStep,
};
use crate::engine::{RuntimeEvent, RuntimeOptions};

/// The coordinator flags.
///
/// `running` is set the moment an attempt starts, before the health probe,
/// and only cleared once the attempt ends with no re-run due. `pending`
/// records that at least one trigger arrived while `running` was set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinatorState {
    pub(crate) running: bool,
    pub(crate) pending: bool,
    pub(crate) shutting_down: bool,
    /// Dispatch attempts started (health probes issued).
    pub(crate) attempts_started: u64,
    /// Job invocations started.
    pub(crate) jobs_started: u64,
}

impl CoordinatorState {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_idle(&self) -> bool {
        !self.running
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down
    }

    pub fn attempts_started(&self) -> u64 {
        self.attempts_started
    }

    pub fn jobs_started(&self) -> u64 {
        self.jobs_started
    }
}

/// Pure core runtime state.
///
/// It has **no** channels, no Tokio types, and does not perform any IO.
#[derive(Debug, Default)]
pub struct CoreRuntime {
    state: CoordinatorState,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(options: RuntimeOptions) -> Self {
        Self {
            state: CoordinatorState::default(),
            options,
        }
    }

    pub fn state(&self) -> &CoordinatorState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state.is_idle()
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        let mut step = match event {
            RuntimeEvent::TriggerRequested { reason } => handle_trigger(&mut self.state, reason),
            RuntimeEvent::HealthChecked { status } => {
                handle_health_checked(&mut self.state, status)
            }
            RuntimeEvent::JobFinished { outcome } => handle_job_finished(&mut self.state, outcome),
            RuntimeEvent::ShutdownRequested => handle_shutdown(&mut self.state),
        };

        if self.state.is_idle() && (self.state.shutting_down || self.options.exit_when_idle) {
            step.keep_running = false;
        }

        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{CoreCommand, TriggerReason};
    use crate::exec::JobOutcome;
    use crate::health::HealthStatus;

    fn trigger(core: &mut CoreRuntime, name: &str) -> CoreStep {
        core.step(RuntimeEvent::TriggerRequested {
            reason: TriggerReason::new_file(name),
        })
    }

    fn healthy(core: &mut CoreRuntime) -> CoreStep {
        core.step(RuntimeEvent::HealthChecked {
            status: HealthStatus::Healthy,
        })
    }

    fn finished(core: &mut CoreRuntime, outcome: JobOutcome) -> CoreStep {
        core.step(RuntimeEvent::JobFinished { outcome })
    }

    fn is_check_health(step: &CoreStep) -> bool {
        matches!(step.commands.as_slice(), [CoreCommand::CheckHealth { .. }])
    }

    fn is_run_job(step: &CoreStep) -> bool {
        matches!(step.commands.as_slice(), [CoreCommand::RunJob])
    }

    #[test]
    fn idle_trigger_starts_attempt_with_health_check() {
        let mut core = CoreRuntime::default();

        let step = trigger(&mut core, "a.jpg");

        assert!(is_check_health(&step));
        assert!(step.keep_running);
        assert!(core.state().is_running());
        assert!(!core.is_pending());
        assert_eq!(core.state().attempts_started(), 1);
        assert_eq!(core.state().jobs_started(), 0);
    }

    #[test]
    fn healthy_backend_runs_job_then_returns_to_idle() {
        let mut core = CoreRuntime::default();
        trigger(&mut core, "a.jpg");

        assert!(is_run_job(&healthy(&mut core)));
        assert_eq!(core.state().jobs_started(), 1);

        let step = finished(&mut core, JobOutcome::Success);
        assert!(step.commands.is_empty());
        assert!(core.is_idle());
    }

    #[test]
    fn triggers_during_run_collapse_into_one_rerun() {
        let mut core = CoreRuntime::default();
        trigger(&mut core, "a.jpg");
        healthy(&mut core);

        // b and c arrive while a's run is active.
        assert!(trigger(&mut core, "b.jpg").commands.is_empty());
        assert!(trigger(&mut core, "c.jpg").commands.is_empty());
        assert!(core.is_pending());

        let step = finished(&mut core, JobOutcome::Success);
        match step.commands.as_slice() {
            [CoreCommand::CheckHealth { reason }] => assert_eq!(*reason, TriggerReason::Pending),
            other => panic!("expected a pending CheckHealth, got {other:?}"),
        }
        // Cleared when the re-run decision is made, not after it completes.
        assert!(!core.is_pending());
        assert!(core.state().is_running());

        assert!(is_run_job(&healthy(&mut core)));
        assert!(finished(&mut core, JobOutcome::Success).commands.is_empty());

        assert!(core.is_idle());
        assert!(!core.is_pending());
        assert_eq!(core.state().jobs_started(), 2);
    }

    #[test]
    fn trigger_during_rerun_sets_pending_again() {
        let mut core = CoreRuntime::default();
        trigger(&mut core, "a.jpg");
        healthy(&mut core);
        trigger(&mut core, "b.jpg");
        finished(&mut core, JobOutcome::Success);
        healthy(&mut core);

        trigger(&mut core, "c.jpg");
        assert!(core.is_pending());

        assert!(is_check_health(&finished(&mut core, JobOutcome::Failed(2))));
        assert_eq!(core.state().attempts_started(), 3);
    }

    #[test]
    fn unhealthy_backend_skips_job_and_keeps_pending() {
        let mut core = CoreRuntime::default();
        trigger(&mut core, "a.jpg");
        // Arrives while the probe is in flight.
        trigger(&mut core, "b.jpg");

        let step = core.step(RuntimeEvent::HealthChecked {
            status: HealthStatus::Unhealthy("backend reported status 'degraded'".to_string()),
        });

        assert!(step.commands.is_empty());
        assert!(core.is_idle());
        assert!(core.is_pending(), "pending is neither consumed nor dropped");
        assert_eq!(core.state().jobs_started(), 0);

        // The next trigger honours it with a single attempt.
        assert!(is_check_health(&trigger(&mut core, "c.jpg")));
        assert!(!core.is_pending());
    }

    #[test]
    fn failed_and_unlaunchable_jobs_return_to_idle() {
        let mut core = CoreRuntime::default();

        for outcome in [
            JobOutcome::Failed(1),
            JobOutcome::LaunchError("No such file or directory".to_string()),
        ] {
            trigger(&mut core, "a.jpg");
            healthy(&mut core);
            let step = finished(&mut core, outcome);
            assert!(step.commands.is_empty());
            assert!(step.keep_running);
            assert!(core.is_idle());
        }
    }

    #[test]
    fn shutdown_while_idle_exits_immediately() {
        let mut core = CoreRuntime::default();
        let step = core.step(RuntimeEvent::ShutdownRequested);
        assert!(!step.keep_running);
    }

    #[test]
    fn shutdown_mid_run_waits_for_job_and_starts_nothing_new() {
        let mut core = CoreRuntime::default();
        trigger(&mut core, "a.jpg");
        healthy(&mut core);
        trigger(&mut core, "b.jpg");

        let step = core.step(RuntimeEvent::ShutdownRequested);
        assert!(step.keep_running, "in-flight run must be allowed to finish");

        assert!(trigger(&mut core, "late.jpg").commands.is_empty());

        let step = finished(&mut core, JobOutcome::Success);
        assert!(step.commands.is_empty(), "no re-run after shutdown");
        assert!(!step.keep_running);
        assert_eq!(core.state().jobs_started(), 1);
    }

    #[test]
    fn shutdown_during_health_probe_skips_job() {
        let mut core = CoreRuntime::default();
        trigger(&mut core, "a.jpg");
        core.step(RuntimeEvent::ShutdownRequested);

        let step = healthy(&mut core);
        assert!(step.commands.is_empty());
        assert!(!step.keep_running);
        assert_eq!(core.state().jobs_started(), 0);
    }

    #[test]
    fn exit_when_idle_stops_after_first_attempt() {
        let mut core = CoreRuntime::new(RuntimeOptions {
            exit_when_idle: true,
        });
        let step = core.step(RuntimeEvent::TriggerRequested {
            reason: TriggerReason::InitialScan,
        });
        assert!(step.keep_running);
        assert!(healthy(&mut core).keep_running);

        let step = finished(&mut core, JobOutcome::Success);
        assert!(!step.keep_running);
    }

    #[test]
    fn stray_health_result_while_idle_is_ignored() {
        let mut core = CoreRuntime::default();
        let step = healthy(&mut core);
        assert!(step.commands.is_empty());
        assert_eq!(core.state().jobs_started(), 0);
    }
}
