// src/tunnel_link/mod.rs

//! Publishing of public tunnel links (`send-link` binary).
//!
//! Reads the frontend and backend quick-tunnel URLs from the `cloudflared`
//! logs, writes `backend_url.json` for the frontend, and optionally mails the
//! links to a recipients list. Only a missing frontend URL is fatal.

pub mod email;
pub mod tunnel;

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::errors::Result;

pub use tunnel::{write_backend_url_json, BackendUrlFile, TunnelUrlFinder, TUNNEL_URL_PATTERN};

pub const DEFAULT_FRONTEND_LOG: &str = "cf_frontend.log";
pub const DEFAULT_BACKEND_LOG: &str = "cf_backend.log";
pub const RECIPIENTS_FILE: &str = "recipients.txt";
pub const EMAIL_ENV_FILE: &str = "email_config.env";
pub const BACKEND_URL_JSON: &str = "backend_url.json";

/// Where `send-link` reads from and writes to.
#[derive(Debug, Clone)]
pub struct LinkPaths {
    pub frontend_log: PathBuf,
    pub backend_log: PathBuf,
    pub project_dir: PathBuf,
}

impl LinkPaths {
    /// Default log locations inside `project_dir`.
    pub fn in_project(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        Self {
            frontend_log: project_dir.join(DEFAULT_FRONTEND_LOG),
            backend_log: project_dir.join(DEFAULT_BACKEND_LOG),
            project_dir,
        }
    }

    pub fn backend_url_json(&self) -> PathBuf {
        self.project_dir.join(BACKEND_URL_JSON)
    }

    pub fn email_env(&self) -> PathBuf {
        self.project_dir.join(EMAIL_ENV_FILE)
    }

    pub fn recipients(&self) -> PathBuf {
        self.project_dir.join(RECIPIENTS_FILE)
    }
}

/// What `publish_links` found and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReport {
    pub frontend_url: String,
    pub backend_url: Option<String>,
    pub backend_json_written: bool,
    pub email_sent: bool,
}

/// Discover the links, write `backend_url.json` and (optionally) send mail.
pub async fn publish_links(paths: &LinkPaths, send_email: bool) -> Result<LinkReport> {
    let finder = TunnelUrlFinder::new()?;

    let frontend_url = finder.find_in_file(&paths.frontend_log)?;
    info!(url = %frontend_url, "frontend tunnel URL");

    let backend_url = match finder.find_in_file(&paths.backend_log) {
        Ok(url) => {
            info!(url = %url, "backend tunnel URL");
            Some(url)
        }
        Err(err) => {
            warn!(error = %err, "backend tunnel URL not available");
            None
        }
    };

    let backend_json_written = match backend_url.as_deref() {
        Some(url) => {
            write_backend_url_json(&paths.backend_url_json(), url)?;
            true
        }
        None => {
            warn!("no backend URL; backend_url.json left untouched");
            false
        }
    };

    let email_sent = send_email
        && maybe_send_email(
            &paths.email_env(),
            &paths.recipients(),
            &frontend_url,
            backend_url.as_deref(),
        )
        .await;

    Ok(LinkReport {
        frontend_url,
        backend_url,
        backend_json_written,
        email_sent,
    })
}

/// Every failure on this path is logged and reported as `false`.
async fn maybe_send_email(
    env_path: &Path,
    recipients_path: &Path,
    frontend_url: &str,
    backend_url: Option<&str>,
) -> bool {
    let env = match email::load_env_file(env_path) {
        Ok(Some(env)) if !env.is_empty() => env,
        Ok(_) => {
            info!(path = ?env_path, "no e-mail config; skipping e-mail");
            return false;
        }
        Err(err) => {
            warn!(error = %err, "unreadable e-mail config; skipping e-mail");
            return false;
        }
    };

    let result = async {
        let recipients = email::load_recipients(recipients_path)?;
        let settings = email::SmtpSettings::from_env_map(&env)?;
        let message = email::build_message(
            &settings,
            &recipients,
            email::compose_body(frontend_url, backend_url),
        )?;
        email::send(&settings, message).await?;
        Ok::<usize, crate::errors::BulkwatchError>(recipients.len())
    }
    .await;

    match result {
        Ok(count) => {
            info!(recipients = count, "tunnel links e-mailed");
            true
        }
        Err(err) => {
            warn!(error = %err, "e-mail not sent");
            false
        }
    }
}
