// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::watch::event_handler::forward_events;
use crate::watch::filter::ExtensionFilter;

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Use [`WatcherHandle::stop`]
/// to stop watching and join the forwarding task.
pub struct WatcherHandle {
    inner: RecommendedWatcher,
    forwarder: JoinHandle<()>,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("forwarder_finished", &self.forwarder.is_finished())
            .finish_non_exhaustive()
    }
}

impl WatcherHandle {
    /// Stop the OS watcher and wait for the forwarding task to end.
    ///
    /// Files still inside their debounce window are not triggered.
    pub async fn stop(self) {
        drop(self.inner);
        self.forwarder.abort();
        if let Err(err) = self.forwarder.await {
            if !err.is_cancelled() {
                warn!(error = %err, "watcher event loop ended abnormally");
            }
        }
        info!("file watcher stopped");
    }
}

/// Spawn a filesystem watcher on `input_dir` (non-recursive) that turns
/// newly appeared input files into `RuntimeEvent::TriggerRequested`.
///
/// Once the watch is established, the forwarding task first sends a single
/// `InitialScan` trigger so files that were already present get processed,
/// and only then starts forwarding filesystem events. That keeps the initial
/// scan ahead of every event-driven trigger.
///
/// Fails if the directory cannot be watched; callers treat that as fatal.
pub fn spawn_watcher(
    input_dir: impl Into<PathBuf>,
    filter: ExtensionFilter,
    debounce: Duration,
    fs: Arc<dyn FileSystem>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    let input_dir = input_dir.into();
    let input_dir = input_dir.canonicalize().unwrap_or(input_dir);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            // The receiver only goes away on shutdown.
            Ok(event) => {
                let _ = event_tx.send(event);
            }
            Err(err) => {
                warn!(error = %err, "file watch error");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&input_dir, RecursiveMode::NonRecursive)?;

    info!(dir = ?input_dir, "file watcher started");

    let forwarder = tokio::spawn(async move {
        if runtime_tx
            .send(RuntimeEvent::TriggerRequested {
                reason: TriggerReason::InitialScan,
            })
            .await
            .is_err()
        {
            warn!("runtime channel closed before the initial scan could be requested");
            return;
        }

        forward_events(event_rx, fs, filter, debounce, runtime_tx).await;
    });

    Ok(WatcherHandle {
        inner: watcher,
        forwarder,
    })
}
