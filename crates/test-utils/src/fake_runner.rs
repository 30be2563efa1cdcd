use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tokio::sync::{Notify, Semaphore};

use bulkwatch::exec::{JobOutcome, JobRunner};

/// A fake job runner that:
/// - records how many runs were started
/// - tracks how many runs overlap (and the maximum ever seen)
/// - either completes immediately, or blocks each run until the test calls
///   [`ControllableRunner::release`].
pub struct ControllableRunner {
    gate: Option<Semaphore>,
    outcome: Mutex<JobOutcome>,
    started: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    progress: Notify,
}

impl ControllableRunner {
    fn build(gate: Option<Semaphore>, outcome: JobOutcome) -> Self {
        Self {
            gate,
            outcome: Mutex::new(outcome),
            started: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            progress: Notify::new(),
        }
    }

    /// Every run finishes right away with `outcome`.
    pub fn immediate(outcome: JobOutcome) -> Self {
        Self::build(None, outcome)
    }

    /// Every run blocks until released, then succeeds.
    pub fn gated() -> Self {
        Self::build(Some(Semaphore::new(0)), JobOutcome::Success)
    }

    /// Let `n` blocked (or future) runs finish.
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn set_outcome(&self, outcome: JobOutcome) {
        *self.outcome.lock().unwrap() = outcome;
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Wait until at least `n` runs have started.
    pub async fn wait_for_started(&self, n: usize) {
        loop {
            let notified = self.progress.notified();
            if self.started() >= n {
                return;
            }
            notified.await;
        }
    }
}

impl JobRunner for ControllableRunner {
    fn run(&self) -> Pin<Box<dyn Future<Output = JobOutcome> + Send + '_>> {
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.started.fetch_add(1, Ordering::SeqCst);
            self.progress.notify_waiters();

            if let Some(gate) = &self.gate {
                gate.acquire().await.expect("gate closed").forget();
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.outcome.lock().unwrap().clone()
        })
    }
}
