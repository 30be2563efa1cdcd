// src/watch/event_handler.rs

//! Event processing logic for file system changes.
//!
//! Raw `notify` events are reduced to "a path appeared" (created or moved
//! in), filtered, and debounced into coalesced `TriggerRequested` events.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};
use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::fs::FileSystem;
use crate::watch::filter::ExtensionFilter;

/// A continuous stream of arrivals still triggers after this many debounce
/// windows.
pub const MAX_BATCH_WINDOWS: u32 = 10;

/// Paths that newly appeared in the watched directory according to `event`.
///
/// Creation and move-into-directory are treated the same. For a rename
/// reported with both ends, only the destination counts.
pub fn appeared_paths(event: &Event) -> Vec<&Path> {
    match &event.kind {
        EventKind::Create(_)
        | EventKind::Modify(ModifyKind::Name(RenameMode::To))
        | EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => {
            event.paths.iter().map(PathBuf::as_path).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            event.paths.get(1).map(PathBuf::as_path).into_iter().collect()
        }
        _ => Vec::new(),
    }
}

/// Decide whether an appeared path is an input file.
///
/// Returns the file name to report in the trigger reason, or `None` for
/// directories, vanished paths and unsupported suffixes.
pub fn accept_path(fs: &dyn FileSystem, filter: &ExtensionFilter, path: &Path) -> Option<String> {
    if !fs.is_file(path) {
        debug!(?path, "ignoring path that is not a regular file");
        return None;
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    if !filter.matches(path) {
        debug!(file = %name, "ignoring file with unsupported extension");
        return None;
    }

    info!(file = %name, "new input file detected");
    Some(name)
}

/// Accepted files waiting for the debounce window to settle.
#[derive(Debug)]
struct Batch {
    first: String,
    merged: usize,
    started: Instant,
    last: Instant,
}

impl Batch {
    fn new(name: String, now: Instant) -> Self {
        Self {
            first: name,
            merged: 0,
            started: now,
            last: now,
        }
    }

    fn deadline(&self, debounce: Duration) -> Instant {
        let settle = self.last + debounce;
        let cap = self.started + debounce * MAX_BATCH_WINDOWS;
        settle.min(cap)
    }

    fn into_reason(self) -> TriggerReason {
        TriggerReason::NewFile {
            name: self.first,
            merged: self.merged,
        }
    }
}

/// Consume raw watcher events until the channel closes, sending one
/// `TriggerRequested` per settled batch of accepted files.
///
/// A batch is flushed once no further file was accepted for `debounce`, or
/// after `MAX_BATCH_WINDOWS * debounce` at the latest. The delay gives a
/// writer time to finish the file; it is a heuristic, not a guarantee.
/// When the channel closes, an unflushed batch is dropped: that only happens
/// on shutdown, when no new runs may start.
pub async fn forward_events(
    mut event_rx: mpsc::UnboundedReceiver<Event>,
    fs: Arc<dyn FileSystem>,
    filter: ExtensionFilter,
    debounce: Duration,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let mut batch: Option<Batch> = None;

    loop {
        let deadline = batch.as_ref().map(|b| b.deadline(debounce));
        let next = match deadline {
            None => event_rx.recv().await,
            Some(deadline) => match timeout_at(deadline, event_rx.recv()).await {
                Ok(next) => next,
                Err(_elapsed) => {
                    if let Some(settled) = batch.take() {
                        let reason = settled.into_reason();
                        debug!(%reason, "debounce window settled");
                        if runtime_tx
                            .send(RuntimeEvent::TriggerRequested { reason })
                            .await
                            .is_err()
                        {
                            warn!("runtime channel closed; stopping watcher event loop");
                            return;
                        }
                    }
                    continue;
                }
            },
        };

        let Some(event) = next else {
            if let Some(dropped) = batch {
                debug!(reason = %dropped.into_reason(), "watcher closed; dropping unsettled batch");
            }
            break;
        };

        debug!(?event, "received notify event");

        for path in appeared_paths(&event) {
            let Some(name) = accept_path(fs.as_ref(), &filter, path) else {
                continue;
            };
            let now = Instant::now();
            match batch.as_mut() {
                Some(b) => {
                    b.merged += 1;
                    b.last = now;
                }
                None => batch = Some(Batch::new(name, now)),
            }
        }
    }

    debug!("watcher event loop finished");
}
