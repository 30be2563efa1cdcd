// src/health/probe.rs

//! Backend health probe.
//!
//! The coordinator asks a [`HealthProbe`] once per dispatch attempt whether
//! the downstream service is ready. Every kind of failure maps to
//! [`HealthStatus::Unhealthy`]; the probe never errors and never reports
//! healthy unless the backend explicitly says `"ok"`.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::errors::Result;

/// Result of a single health probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    /// Unhealthy or unreachable, with a human-readable reason for the logs.
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy(reason) => write!(f, "unhealthy: {reason}"),
        }
    }
}

/// Trait abstracting the downstream readiness check.
///
/// Production code uses [`HttpHealthProbe`]; tests provide scripted fakes.
pub trait HealthProbe: Send + Sync {
    /// Probe the downstream service. Must resolve within the probe's own
    /// timeout.
    fn check(&self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + '_>>;
}

/// HTTP GET against the backend's `/health` endpoint.
#[derive(Debug, Clone)]
pub struct HttpHealthProbe {
    url: Url,
    client: reqwest::Client,
}

impl HttpHealthProbe {
    /// Build a probe for `health_url` whose requests give up after `timeout`.
    pub fn new(health_url: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: health_url,
            client,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn probe(&self) -> HealthStatus {
        let response = match self.client.get(self.url.clone()).send().await {
            Ok(resp) => resp,
            Err(err) => {
                return HealthStatus::Unhealthy(format!("request to {} failed: {err}", self.url));
            }
        };

        let status = response.status();
        if !status.is_success() {
            return HealthStatus::Unhealthy(format!("{} returned HTTP {status}", self.url));
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(err) => {
                return HealthStatus::Unhealthy(format!(
                    "{} returned an unparseable body: {err}",
                    self.url
                ));
            }
        };

        let verdict = interpret_health_body(&body);
        debug!(url = %self.url, %status, %verdict, "backend health probe finished");
        verdict
    }
}

impl HealthProbe for HttpHealthProbe {
    fn check(&self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + '_>> {
        Box::pin(self.probe())
    }
}

/// Decide health from a decoded JSON body.
///
/// Healthy only for an object whose `status` is the string `"ok"`
/// (case-insensitive).
pub fn interpret_health_body(body: &Value) -> HealthStatus {
    match body.get("status").and_then(Value::as_str) {
        Some(status) if status.trim().eq_ignore_ascii_case("ok") => HealthStatus::Healthy,
        Some(other) => HealthStatus::Unhealthy(format!("backend reported status '{other}'")),
        None => HealthStatus::Unhealthy(format!("unexpected health response: {body}")),
    }
}
