use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use bulkwatch::health::{HealthProbe, HealthStatus};

/// A fake health probe that:
/// - answers from a script of statuses, then falls back to a fixed status
/// - counts how often it was asked
/// - optionally takes `delay` per probe, to widen race windows in tests.
pub struct ScriptedProbe {
    script: Mutex<VecDeque<HealthStatus>>,
    fallback: HealthStatus,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    pub fn new(script: impl IntoIterator<Item = HealthStatus>, fallback: HealthStatus) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn healthy() -> Self {
        Self::new([], HealthStatus::Healthy)
    }

    pub fn unhealthy(reason: &str) -> Self {
        Self::new([], HealthStatus::Unhealthy(reason.to_string()))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HealthProbe for ScriptedProbe {
    fn check(&self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + '_>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| self.fallback.clone())
        })
    }
}
