// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod health;
pub mod logging;
pub mod tunnel_link;
pub mod types;
pub mod watch;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};
use url::Url;

use crate::cli::CliArgs;
use crate::config::{resolve_settings, Settings};
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions, TriggerReason};
use crate::errors::{BulkwatchError, Result};
use crate::exec::ProcessJobRunner;
use crate::fs::{FileSystem, RealFileSystem};
use crate::health::{derive_health_url, HttpHealthProbe};
use crate::watch::{spawn_watcher, ExtensionFilter, WatcherHandle};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings resolution (file, env, CLI)
/// - startup checks (input dir, job script)
/// - health probe and job runner
/// - coordinator core + runtime
/// - (optional) file watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let settings = resolve_settings(&args)?;
    let health_url = derive_health_url(&settings.backend_url);

    if args.dry_run {
        print_dry_run(&settings, &health_url);
        return Ok(());
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    prepare_environment(fs.as_ref(), &settings)?;

    let probe = Arc::new(HttpHealthProbe::new(health_url, settings.health_timeout)?);

    info!(url = %settings.backend_url, "backend classify URL");
    info!(url = %probe.url(), "backend health URL");

    let runner = Arc::new(ProcessJobRunner::new(
        settings.job.clone(),
        settings.backend_url.clone(),
    ));

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    // In --once mode there is no watcher; seed the initial scan directly.
    // Otherwise the watcher seeds it once the watch is established.
    let watcher = if args.once {
        rt_tx
            .send(RuntimeEvent::TriggerRequested {
                reason: TriggerReason::InitialScan,
            })
            .await
            .map_err(anyhow::Error::from)?;
        None
    } else {
        info!(dir = ?settings.input_dir, "watching input directory");
        Some(spawn_watcher(
            &settings.input_dir,
            ExtensionFilter::images()?,
            settings.debounce,
            Arc::clone(&fs),
            rt_tx.clone(),
        )?)
    };

    spawn_shutdown_listener(watcher, rt_tx.clone());

    let options = RuntimeOptions {
        exit_when_idle: args.once,
    };

    let core = CoreRuntime::new(options);
    let runtime = Runtime::new(core, rt_rx, rt_tx, probe, runner);
    runtime.run().await?;

    info!("bulkwatch stopped cleanly");
    Ok(())
}

/// Ctrl-C → [`request_shutdown`].
fn spawn_shutdown_listener(watcher: Option<WatcherHandle>, tx: mpsc::Sender<RuntimeEvent>) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C; running until killed");
            // Keep the watcher alive.
            let _watcher = watcher;
            std::future::pending::<()>().await;
            return;
        }

        info!("stop signal received; shutting down");
        request_shutdown(&tx, watcher).await;
    });
}

/// Put the runtime into shutdown, then stop and join the watcher.
///
/// `ShutdownRequested` goes out first: from then on the core ignores
/// triggers and skips the job for an attempt whose probe is still running,
/// so nothing the watcher flushes while stopping can start a new run. An
/// in-flight run is left alone.
pub async fn request_shutdown(tx: &mpsc::Sender<RuntimeEvent>, watcher: Option<WatcherHandle>) {
    if tx.send(RuntimeEvent::ShutdownRequested).await.is_err() {
        debug!("runtime already stopped");
    }
    if let Some(watcher) = watcher {
        watcher.stop().await;
    }
}

/// Make sure the input directory exists and the job script is present.
///
/// A missing input directory is created; a path that exists but is not a
/// directory, or a missing job script, is fatal.
pub fn prepare_environment(fs: &dyn FileSystem, settings: &Settings) -> Result<()> {
    let input_dir = &settings.input_dir;
    if !fs.is_dir(input_dir) {
        if fs.exists(input_dir) {
            return Err(BulkwatchError::ConfigError(format!(
                "input path {:?} exists but is not a directory",
                input_dir
            )));
        }
        info!(dir = ?input_dir, "input directory missing; creating it");
        fs.create_dir_all(input_dir)?;
    }

    if !fs.is_file(&settings.job.script) {
        return Err(BulkwatchError::ConfigError(format!(
            "job script not found: {:?}",
            settings.job.script
        )));
    }

    Ok(())
}

/// Simple dry-run output: print the resolved settings.
fn print_dry_run(settings: &Settings, health_url: &Url) {
    let (program, args) = settings.job.command_line();

    println!("bulkwatch dry-run");
    println!("  input_dir       = {}", settings.input_dir.display());
    println!("  backend_url     = {}", settings.backend_url);
    println!("  health_url      = {health_url}");
    println!("  health_timeout  = {:?}", settings.health_timeout);
    println!("  debounce        = {:?}", settings.debounce);
    println!("  workdir         = {}", settings.workdir().display());
    println!("  job             = {program} {}", args.join(" "));
    println!("  extensions      = {:?}", watch::ALLOWED_EXTENSIONS);
}
