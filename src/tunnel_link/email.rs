// src/tunnel_link/email.rs

//! Optional e-mail announcement of the tunnel links via SMTP (`lettre`).
//!
//! Configuration comes from a dotenv-style file (`email_config.env`) and a
//! plain recipients list. Any problem here is reported to the caller, which
//! downgrades it to a warning: the links are still usable without the mail.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::info;

use crate::errors::{BulkwatchError, Result};

pub const DEFAULT_SMTP_PORT: u16 = 587;

pub const SUBJECT: &str = "TARIC classification - test link (Cloudflare tunnel)";

/// SMTP connection settings from `email_config.env`.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from: String,
    pub starttls: bool,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("from", &self.from)
            .field("starttls", &self.starttls)
            .finish_non_exhaustive()
    }
}

impl SmtpSettings {
    /// Build settings from parsed `KEY=VALUE` pairs.
    ///
    /// `SMTP_HOST`, `SMTP_USER` and `SMTP_PASSWORD` are required. `SMTP_FROM`
    /// defaults to the user, `SMTP_PORT` to 587, and STARTTLS is on unless
    /// `SMTP_USE_TLS` is something other than `1`.
    pub fn from_env_map(env: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| {
            env.get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let (Some(host), Some(user), Some(password)) =
            (get("SMTP_HOST"), get("SMTP_USER"), get("SMTP_PASSWORD"))
        else {
            return Err(BulkwatchError::EmailError(
                "SMTP_HOST, SMTP_USER and SMTP_PASSWORD must all be set".to_string(),
            ));
        };

        let port = match get("SMTP_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| {
                BulkwatchError::EmailError(format!("invalid SMTP_PORT '{raw}': {e}"))
            })?,
            None => DEFAULT_SMTP_PORT,
        };

        let from = get("SMTP_FROM").unwrap_or_else(|| user.clone());
        let starttls = get("SMTP_USE_TLS").is_none_or(|v| v == "1");

        Ok(Self {
            host,
            port,
            user,
            password,
            from,
            starttls,
        })
    }
}

/// Parse a dotenv-style file into a map without touching the process
/// environment. Returns `Ok(None)` if the file does not exist.
pub fn load_env_file(path: &Path) -> Result<Option<HashMap<String, String>>> {
    if !path.exists() {
        return Ok(None);
    }

    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("opening e-mail config {:?}", path))?;

    let mut env = HashMap::new();
    for item in iter {
        let (key, value) = item.with_context(|| format!("parsing e-mail config {:?}", path))?;
        env.insert(key, value);
    }
    Ok(Some(env))
}

/// Read one address per line, skipping blank lines and `#` comments.
/// An empty list is an error.
pub fn load_recipients(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading recipients list {:?}", path))?;

    let recipients: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();

    if recipients.is_empty() {
        return Err(BulkwatchError::EmailError(format!(
            "recipients list {:?} is empty",
            path
        )));
    }
    Ok(recipients)
}

pub fn compose_body(frontend_url: &str, backend_url: Option<&str>) -> String {
    let mut body = String::from("Hello,\n\n");
    body.push_str("here is the current test link for the TARIC image classification:\n\n");
    body.push_str(&format!("Frontend: {frontend_url}\n"));
    if let Some(backend_url) = backend_url {
        body.push_str(&format!("Backend (info): {backend_url}\n"));
    }
    body.push_str(
        "\nNote: the frontend talks to the backend via the URL configured in \
         backend_url.json.\n\nRegards\nTARIC automation\n",
    );
    body
}

fn parse_mailbox(addr: &str) -> Result<Mailbox> {
    addr.parse()
        .map_err(|e| BulkwatchError::EmailError(format!("invalid address '{addr}': {e}")))
}

/// Build the message for all recipients.
pub fn build_message(
    settings: &SmtpSettings,
    recipients: &[String],
    body: String,
) -> Result<Message> {
    let mut builder = Message::builder()
        .from(parse_mailbox(&settings.from)?)
        .subject(SUBJECT)
        .header(ContentType::TEXT_PLAIN);

    for addr in recipients {
        builder = builder.to(parse_mailbox(addr)?);
    }

    builder
        .body(body)
        .map_err(|e| BulkwatchError::EmailError(e.to_string()))
}

/// Send `message` through the configured SMTP relay.
pub async fn send(settings: &SmtpSettings, message: Message) -> Result<()> {
    let builder = if settings.starttls {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| BulkwatchError::EmailError(e.to_string()))?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
    };

    let transport = builder
        .port(settings.port)
        .credentials(Credentials::new(
            settings.user.clone(),
            settings.password.clone(),
        ))
        .build();

    info!(host = %settings.host, port = settings.port, "connecting to SMTP server");
    transport
        .send(message)
        .await
        .map_err(|e| BulkwatchError::EmailError(e.to_string()))?;
    Ok(())
}
