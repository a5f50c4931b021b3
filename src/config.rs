//! Runtime configuration for the sync engine.

use std::path::PathBuf;
use std::time::Duration;

/// Default remote base URL used when no environment override is present
const DEFAULT_REMOTE_URL: &str = "http://127.0.0.1:54321";

/// Retry budget for a pending entry before it is moved to the dead-letter
/// table
const DEFAULT_MAX_RETRY_ATTEMPTS: i64 = 3;

/// Default timeout applied to every remote round-trip
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Sync engine configuration.
#[derive(Debug, Clone)]
pub struct Config {
    remote_url: String,
    api_key: Option<String>,
    /// Pending-entry retry ceiling
    pub max_retry_attempts: i64,
    /// Timeout for each remote HTTP call
    pub request_timeout: Duration,
    /// Local cache database file; `None` keeps the cache in memory
    pub database_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let remote_url = std::env::var("BANK_SAMPAH_REMOTE_URL")
            .unwrap_or_else(|_| DEFAULT_REMOTE_URL.to_string());
        let api_key = std::env::var("BANK_SAMPAH_API_KEY").ok();
        Self {
            remote_url,
            api_key,
            max_retry_attempts: DEFAULT_MAX_RETRY_ATTEMPTS,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            database_path: None,
        }
    }
}

impl Config {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the remote base URL
    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.remote_url = url.into();
        self
    }

    /// Override the remote API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Remote base URL
    pub fn remote_url(&self) -> &str {
        &self.remote_url
    }

    /// Remote API key, if configured
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Full URL for a row-CRUD endpoint of the given collection table
    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.remote_url, table)
    }
}
