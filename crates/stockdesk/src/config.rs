// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

/// Configuration for the stockdesk API client.
#[derive(Debug, Clone, clap::Args)]
pub struct ClientConfig {
    /// Base URL of the inventory API (e.g. `https://localhost:8081/`).
    #[arg(long, env = "STOCKDESK_API_URL")]
    pub api_url: String,

    /// Per-request timeout in milliseconds.
    #[arg(long, default_value_t = 10000, env = "STOCKDESK_TIMEOUT_MS")]
    pub timeout_ms: u64,

    /// Path to the token file. Defaults to `<state dir>/credentials.json`.
    #[arg(long, env = "STOCKDESK_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// Page size for paginated listings.
    #[arg(long, default_value_t = 15, env = "STOCKDESK_PAGE_SIZE")]
    pub page_size: u32,

    /// Log level filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "warn", env = "STOCKDESK_LOG_LEVEL")]
    pub log_level: String,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "STOCKDESK_LOG_FORMAT")]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl ClientConfig {
    /// Config pointed at `api_url` with every other field at its default.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            timeout_ms: 10000,
            credentials: None,
            page_size: 15,
            log_level: "warn".to_owned(),
            log_format: LogFormat::Text,
        }
    }

    /// Base URL with exactly one trailing slash, so relative endpoint paths
    /// such as `RefreshToken` join onto it.
    pub fn base_url(&self) -> String {
        format!("{}/", self.api_url.trim_end_matches('/'))
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }

    pub fn credentials_path(&self) -> PathBuf {
        match self.credentials {
            Some(ref path) => path.clone(),
            None => state_dir().join("credentials.json"),
        }
    }
}

/// Resolve the state directory for stockdesk data.
///
/// Checks `STOCKDESK_STATE_DIR`, then `$XDG_STATE_HOME/stockdesk`,
/// then `$HOME/.local/state/stockdesk`.
pub fn state_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("STOCKDESK_STATE_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("stockdesk");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".local/state/stockdesk");
    }
    PathBuf::from(".stockdesk")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
