#![allow(dead_code)]

pub use bulkwatch_test_utils::builders;
pub use bulkwatch_test_utils::fake_probe::ScriptedProbe;
pub use bulkwatch_test_utils::fake_runner::ControllableRunner;
pub use bulkwatch_test_utils::{init_tracing, with_timeout};

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use bulkwatch::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use bulkwatch::errors::Result;

/// A runtime wired to fakes, running on its own task.
pub struct Harness {
    pub tx: mpsc::Sender<RuntimeEvent>,
    pub probe: Arc<ScriptedProbe>,
    pub runner: Arc<ControllableRunner>,
    pub handle: JoinHandle<Result<()>>,
}

impl Harness {
    pub fn start(probe: ScriptedProbe, runner: ControllableRunner, options: RuntimeOptions) -> Self {
        let (tx, rx) = mpsc::channel::<RuntimeEvent>(64);
        let probe = Arc::new(probe);
        let runner = Arc::new(runner);

        let runtime = Runtime::new(
            CoreRuntime::new(options),
            rx,
            tx.clone(),
            Arc::clone(&probe),
            Arc::clone(&runner),
        );
        let handle = tokio::spawn(runtime.run());

        Self {
            tx,
            probe,
            runner,
            handle,
        }
    }

    pub async fn trigger(&self, reason: TriggerReason) {
        self.tx
            .send(RuntimeEvent::TriggerRequested { reason })
            .await
            .expect("runtime stopped");
    }

    pub async fn shutdown(&self) {
        let _ = self.tx.send(RuntimeEvent::ShutdownRequested).await;
    }
}

/// Give the runtime a moment to process what was sent so far.
pub async fn settle() {
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
}
