// src/exec/process.rs

//! Job runner backed by an OS process.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, error, info};
use url::Url;

use crate::config::JobSpec;
use crate::exec::backend::{JobOutcome, JobRunner};

/// Environment variable through which the job learns the backend URL.
pub const BACKEND_URL_ENV: &str = "TARIC_BACKEND_URL";

/// Runs `<interpreter> <script>` in the configured working directory.
///
/// The child inherits our environment and stdio; `TARIC_BACKEND_URL` is set
/// explicitly so a `--backend-url` override reaches the job too. The child
/// is placed in its own process group so a Ctrl-C aimed at the watcher does
/// not kill a run that is allowed to finish.
#[derive(Debug, Clone)]
pub struct ProcessJobRunner {
    job: JobSpec,
    backend_url: Url,
}

impl ProcessJobRunner {
    pub fn new(job: JobSpec, backend_url: Url) -> Self {
        Self { job, backend_url }
    }

    fn build_command(&self) -> (String, Command) {
        let (program, args) = self.job.command_line();

        let mut cmd = Command::new(&program);
        cmd.args(&args)
            .current_dir(&self.job.workdir)
            .env(BACKEND_URL_ENV, self.backend_url.as_str())
            .stdin(Stdio::null())
            .kill_on_drop(false);

        #[cfg(unix)]
        cmd.process_group(0);

        (program, cmd)
    }

    async fn execute(&self) -> JobOutcome {
        let (program, mut cmd) = self.build_command();

        info!(
            program = %program,
            script = ?self.job.script,
            workdir = ?self.job.workdir,
            "starting bulk evaluation job"
        );

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) => {
                return JobOutcome::LaunchError(format!("spawning '{program}': {err}"));
            }
        };

        debug!(pid = ?child.id(), "job process spawned");

        match child.wait().await {
            Ok(status) if status.success() => JobOutcome::Success,
            Ok(status) => JobOutcome::Failed(status.code().unwrap_or(-1)),
            Err(err) => {
                error!(program = %program, error = %err, "waiting for job process failed");
                JobOutcome::Failed(-1)
            }
        }
    }
}

impl JobRunner for ProcessJobRunner {
    fn run(&self) -> Pin<Box<dyn Future<Output = JobOutcome> + Send + '_>> {
        Box::pin(self.execute())
    }
}
