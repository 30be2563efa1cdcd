// src/tunnel_link/tunnel.rs

//! Quick-tunnel URL extraction and the `backend_url.json` hand-off file.

use std::path::Path;

use anyhow::Context;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{BulkwatchError, Result};

/// Public URLs handed out by Cloudflare quick tunnels.
pub const TUNNEL_URL_PATTERN: &str = r"https://[0-9a-zA-Z.-]+\.trycloudflare\.com";

/// Contents of `backend_url.json`, read by the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendUrlFile {
    pub backend_url: String,
}

/// Finds the first tunnel URL in a blob of log text.
#[derive(Debug, Clone)]
pub struct TunnelUrlFinder {
    re: Regex,
}

impl TunnelUrlFinder {
    pub fn new() -> Result<Self> {
        let re = Regex::new(TUNNEL_URL_PATTERN)
            .map_err(|e| BulkwatchError::ConfigError(format!("invalid tunnel URL pattern: {e}")))?;
        Ok(Self { re })
    }

    pub fn find<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.re.find(text).map(|m| m.as_str())
    }

    /// Read `log_path` (lossily, logs may contain garbage) and return the
    /// first tunnel URL in it.
    pub fn find_in_file(&self, log_path: &Path) -> Result<String> {
        let bytes = std::fs::read(log_path)
            .with_context(|| format!("reading tunnel log {:?}", log_path))?;
        let text = String::from_utf8_lossy(&bytes);

        self.find(&text).map(str::to_string).ok_or_else(|| {
            BulkwatchError::ConfigError(format!("no tunnel URL found in {:?}", log_path))
        })
    }
}

/// Write `{"backend_url": "<url>"}` to `path`, replacing any previous file.
pub fn write_backend_url_json(path: &Path, backend_url: &str) -> Result<()> {
    let file = BackendUrlFile {
        backend_url: backend_url.to_string(),
    };
    let mut json = serde_json::to_string_pretty(&file).map_err(anyhow::Error::from)?;
    json.push('\n');

    std::fs::write(path, json).with_context(|| format!("writing {:?}", path))?;
    info!(path = ?path, url = %backend_url, "backend URL file written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn finds_first_tunnel_url_in_log_noise() {
        let finder = TunnelUrlFinder::new().unwrap();
        let log = "\
2025-01-01T10:00:00Z INF Requesting new quick Tunnel on trycloudflare.com...
2025-01-01T10:00:01Z INF |  https://brave-otter-42.trycloudflare.com  |
2025-01-01T10:00:02Z INF |  https://second-one.trycloudflare.com  |";

        assert_eq!(
            finder.find(log),
            Some("https://brave-otter-42.trycloudflare.com")
        );
    }

    #[test]
    fn ignores_other_hosts_and_plain_http() {
        let finder = TunnelUrlFinder::new().unwrap();
        assert_eq!(finder.find("http://x.trycloudflare.com"), None);
        assert_eq!(finder.find("https://example.com/trycloudflare.com"), None);
    }

    #[test]
    fn missing_log_or_url_is_an_error() {
        let dir = tempdir().unwrap();
        let finder = TunnelUrlFinder::new().unwrap();

        assert!(finder.find_in_file(&dir.path().join("nope.log")).is_err());

        let empty = dir.path().join("cf.log");
        std::fs::write(&empty, b"starting tunnel\n\xff\xfe").unwrap();
        assert!(finder.find_in_file(&empty).is_err());
    }

    #[test]
    fn backend_url_file_is_valid_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("backend_url.json");

        write_backend_url_json(&path, "https://be.trycloudflare.com").unwrap();

        let parsed: BackendUrlFile =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.backend_url, "https://be.trycloudflare.com");
    }
}
