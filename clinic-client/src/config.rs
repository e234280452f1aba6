//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

use shared::response::DEFAULT_PAGE_SIZE;

use crate::{ClientResult, HttpClient};

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default delay before a search box query is sent
pub const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Client configuration for the clinic API
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL (e.g., "https://clinic.example.com/api")
    pub base_url: String,

    /// Bearer token sent with every request
    pub token: Option<String>,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Directory holding the local key/value store
    pub storage_dir: PathBuf,

    /// Log level filter (e.g., "info", "clinic_client=debug")
    pub log_level: String,

    /// Directory for rolling log files, stdout when unset
    pub log_dir: Option<PathBuf>,

    /// Emit JSON log lines instead of human-readable text
    pub log_json: bool,

    /// Search debounce delay
    pub search_debounce: Duration,

    /// Rows per page in client-side paginated tables
    pub page_size: u32,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: DEFAULT_TIMEOUT_SECS,
            storage_dir: PathBuf::from(".clinic"),
            log_level: "info".to_string(),
            log_dir: None,
            log_json: false,
            search_debounce: DEFAULT_SEARCH_DEBOUNCE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Read configuration from the environment (and `.env` when present).
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `CLINIC_API_URL` | `http://localhost/api` |
    /// | `CLINIC_API_TOKEN` | none |
    /// | `CLINIC_API_TIMEOUT` | 30 |
    /// | `CLINIC_STORAGE_DIR` | `.clinic` |
    /// | `CLINIC_LOG_LEVEL` | `info` |
    /// | `CLINIC_LOG_DIR` | none |
    /// | `CLINIC_LOG_JSON` | `false` |
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::new(
            std::env::var("CLINIC_API_URL").unwrap_or_else(|_| "http://localhost/api".to_string()),
        );
        config.token = std::env::var("CLINIC_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        config.timeout = std::env::var("CLINIC_API_TIMEOUT")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        if let Ok(dir) = std::env::var("CLINIC_STORAGE_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Ok(level) = std::env::var("CLINIC_LOG_LEVEL") {
            config.log_level = level;
        }
        config.log_dir = std::env::var("CLINIC_LOG_DIR").ok().map(PathBuf::from);
        config.log_json = std::env::var("CLINIC_LOG_JSON")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);
        config
    }

    /// Set the bearer token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = dir.into();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    pub fn with_log_json(mut self, json: bool) -> Self {
        self.log_json = json;
        self
    }

    pub fn with_search_debounce(mut self, delay: Duration) -> Self {
        self.search_debounce = delay;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Create an HTTP client from this configuration
    pub fn build_http_client(&self) -> ClientResult<HttpClient> {
        HttpClient::new(self)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost/api")
    }
}
