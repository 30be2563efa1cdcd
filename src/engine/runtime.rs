// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::errors::Result;
use crate::exec::{JobOutcome, JobRunner};
use crate::health::{HealthProbe, HealthStatus};

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent};

/// Drives the coordinator in response to `RuntimeEvent`s, and delegates the
/// health probe and the job itself to a `HealthProbe` and a `JobRunner`.
///
/// This is a pure IO shell around `CoreRuntime`, which contains all the
/// coordination semantics. Probe and job run in spawned tasks and report
/// back through `event_tx`, so triggers keep flowing (and only flip
/// `pending`) while a long job is in flight.
pub struct Runtime<P: HealthProbe + 'static, J: JobRunner + 'static> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    event_tx: mpsc::Sender<RuntimeEvent>,
    probe: Arc<P>,
    runner: Arc<J>,
    in_flight: Option<JoinHandle<()>>,
}

impl<P: HealthProbe + 'static, J: JobRunner + 'static> fmt::Debug for Runtime<P, J> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<P: HealthProbe + 'static, J: JobRunner + 'static> Runtime<P, J> {
    /// `event_tx` must feed the same channel as `event_rx`; probe and job
    /// results are reported through it.
    pub fn new(
        core: CoreRuntime,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        event_tx: mpsc::Sender<RuntimeEvent>,
        probe: Arc<P>,
        runner: Arc<J>,
    ) -> Self {
        Self {
            core,
            event_rx,
            event_tx,
            probe,
            runner,
            in_flight: None,
        }
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`.
    /// - Feeds them into the core runtime.
    /// - Executes commands returned by the core (probe, run).
    ///
    /// Returns once the core reports it is done: after a shutdown request
    /// once the active attempt has finished, or when idle in `--once` mode.
    pub async fn run(mut self) -> Result<()> {
        info!("bulkwatch runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);

            for command in step.commands {
                self.execute_command(command);
            }

            if !step.keep_running {
                info!("coordinator idle and done; stopping runtime");
                break;
            }
        }

        // The core only stops once the last attempt has reported back, so
        // this just reaps the finished task.
        if let Some(handle) = self.in_flight.take() {
            if let Err(err) = handle.await {
                error!(error = %err, "in-flight task ended abnormally");
            }
        }

        info!(
            attempts = self.core.state().attempts_started(),
            jobs = self.core.state().jobs_started(),
            "runtime exiting"
        );
        Ok(())
    }

    /// Execute a single command from the core.
    fn execute_command(&mut self, command: CoreCommand) {
        let tx = self.event_tx.clone();

        let handle = match command {
            CoreCommand::CheckHealth { reason } => {
                debug!(%reason, "probing backend health");
                let probe = Arc::clone(&self.probe);
                tokio::spawn(async move {
                    // A panicking probe still has to answer, or the core
                    // would stay `running` forever.
                    let status = match tokio::spawn(async move { probe.check().await }).await {
                        Ok(status) => status,
                        Err(err) => {
                            error!(error = %err, "health probe task failed");
                            HealthStatus::Unhealthy(format!("health probe task failed: {err}"))
                        }
                    };
                    if tx.send(RuntimeEvent::HealthChecked { status }).await.is_err() {
                        debug!("runtime gone before health result could be delivered");
                    }
                })
            }
            CoreCommand::RunJob => {
                let runner = Arc::clone(&self.runner);
                tokio::spawn(async move {
                    let outcome = match tokio::spawn(async move { runner.run().await }).await {
                        Ok(outcome) => outcome,
                        Err(err) => {
                            error!(error = %err, "job runner task failed");
                            JobOutcome::LaunchError(format!("job runner task failed: {err}"))
                        }
                    };
                    debug!(success = outcome.is_success(), "job task finished");
                    if tx.send(RuntimeEvent::JobFinished { outcome }).await.is_err() {
                        debug!("runtime gone before job outcome could be delivered");
                    }
                })
            }
        };

        // Single-flight: the core never issues a command while the previous
        // one is still outstanding.
        self.in_flight = Some(handle);
    }
}
