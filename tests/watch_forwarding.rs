// tests/watch_forwarding.rs

mod common;
use crate::common::{init_tracing, with_timeout};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use notify::event::{CreateKind, ModifyKind, RenameMode};
use notify::{Event, EventKind};
use tokio::sync::mpsc;
use tokio::time::timeout;

use bulkwatch::engine::{RuntimeEvent, TriggerReason};
use bulkwatch::fs::mock::MockFileSystem;
use bulkwatch::fs::RealFileSystem;
use bulkwatch::watch::{forward_events, spawn_watcher, ExtensionFilter};

const DEBOUNCE: Duration = Duration::from_millis(60);

fn created(path: &str) -> Event {
    Event::new(EventKind::Create(CreateKind::Any)).add_path(PathBuf::from(path))
}

struct Forwarder {
    raw_tx: mpsc::UnboundedSender<Event>,
    rt_rx: mpsc::Receiver<RuntimeEvent>,
}

fn start_forwarder(fs: MockFileSystem) -> Forwarder {
    let (raw_tx, raw_rx) = mpsc::unbounded_channel();
    let (rt_tx, rt_rx) = mpsc::channel(16);
    let filter = ExtensionFilter::images().unwrap();
    tokio::spawn(forward_events(raw_rx, Arc::new(fs), filter, DEBOUNCE, rt_tx));
    Forwarder { raw_tx, rt_rx }
}

fn reason(event: RuntimeEvent) -> TriggerReason {
    match event {
        RuntimeEvent::TriggerRequested { reason } => reason,
        other => panic!("expected a trigger, got {other:?}"),
    }
}

async fn assert_quiet(rx: &mut mpsc::Receiver<RuntimeEvent>) {
    let next = timeout(DEBOUNCE * 4, rx.recv()).await;
    assert!(next.is_err(), "unexpected trigger: {next:?}");
}

#[tokio::test]
async fn burst_of_files_becomes_one_trigger() {
    init_tracing();
    let fs = MockFileSystem::new();
    for f in ["/in/a.jpg", "/in/b.PNG", "/in/c.webp", "/in/notes.txt"] {
        fs.add_file(f);
    }
    let mut fw = start_forwarder(fs);

    for f in ["/in/a.jpg", "/in/notes.txt", "/in/b.PNG", "/in/c.webp"] {
        fw.raw_tx.send(created(f)).unwrap();
    }

    let got = with_timeout(fw.rt_rx.recv()).await.unwrap();
    assert_eq!(
        reason(got),
        TriggerReason::NewFile {
            name: "a.jpg".to_string(),
            merged: 2
        }
    );
    assert_quiet(&mut fw.rt_rx).await;
}

#[tokio::test]
async fn separate_bursts_trigger_separately() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("/in/one.jpg");
    fs.add_file("/in/two.jpeg");
    let mut fw = start_forwarder(fs);

    fw.raw_tx.send(created("/in/one.jpg")).unwrap();
    let first = with_timeout(fw.rt_rx.recv()).await.unwrap();
    assert_eq!(reason(first), TriggerReason::new_file("one.jpg"));

    fw.raw_tx
        .send(
            Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
                .add_path(PathBuf::from("/tmp/two.part"))
                .add_path(PathBuf::from("/in/two.jpeg")),
        )
        .unwrap();
    let second = with_timeout(fw.rt_rx.recv()).await.unwrap();
    assert_eq!(reason(second), TriggerReason::new_file("two.jpeg"));
}

#[tokio::test]
async fn unsupported_files_and_directories_never_trigger() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("/in/report.pdf");
    fs.add_file("/in/noext");
    fs.add_dir("/in/album.jpg");
    let mut fw = start_forwarder(fs);

    for f in ["/in/report.pdf", "/in/noext", "/in/album.jpg", "/in/vanished.jpg"] {
        fw.raw_tx.send(created(f)).unwrap();
    }

    assert_quiet(&mut fw.rt_rx).await;
}

#[tokio::test]
async fn closing_the_watcher_drops_unsettled_batch() {
    init_tracing();
    let fs = MockFileSystem::new();
    fs.add_file("/in/a.jpg");
    let mut fw = start_forwarder(fs);

    fw.raw_tx.send(created("/in/a.jpg")).unwrap();
    drop(fw.raw_tx);

    assert!(with_timeout(fw.rt_rx.recv()).await.is_none());
}

#[tokio::test]
async fn real_watcher_sends_initial_scan_then_new_files() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let (rt_tx, mut rt_rx) = mpsc::channel(16);

    let handle = spawn_watcher(
        dir.path(),
        ExtensionFilter::images().unwrap(),
        DEBOUNCE,
        Arc::new(RealFileSystem),
        rt_tx,
    )
    .unwrap();

    let first = with_timeout(rt_rx.recv()).await.unwrap();
    assert_eq!(reason(first), TriggerReason::InitialScan);

    std::fs::write(dir.path().join("ignored.txt"), b"x").unwrap();
    std::fs::write(dir.path().join("scan.JPG"), b"jpeg bytes").unwrap();

    let second = with_timeout(rt_rx.recv()).await.unwrap();
    match reason(second) {
        TriggerReason::NewFile { name, .. } => assert_eq!(name, "scan.JPG"),
        other => panic!("expected a new-file trigger, got {other:?}"),
    }

    with_timeout(handle.stop()).await;
}

#[tokio::test]
async fn watching_a_missing_directory_fails() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let (rt_tx, _rt_rx) = mpsc::channel(16);

    let result = spawn_watcher(
        dir.path().join("does-not-exist"),
        ExtensionFilter::images().unwrap(),
        DEBOUNCE,
        Arc::new(RealFileSystem),
        rt_tx,
    );
    assert!(result.is_err());
}
