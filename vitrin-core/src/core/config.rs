use crate::catalog;
use std::path::PathBuf;

/// Database file name inside the data directory
const DB_FILE_NAME: &str = "vitrin.redb";

/// Storefront configuration
///
/// # Environment Variables
///
/// All values can be overridden through environment variables:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | CATALOG_BASE_URL | mockapi catalog | Remote catalog base URL |
/// | REQUEST_TIMEOUT_MS | 30000 | HTTP request timeout (milliseconds) |
/// | DATA_DIR | ./data | Directory holding the local database |
/// | LOG_LEVEL | info | Tracing level filter |
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote catalog base URL
    pub catalog_base_url: String,
    /// HTTP request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Directory holding the local database file
    pub data_dir: String,
    /// Log level: trace | debug | info | warn | error
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        Self {
            catalog_base_url: std::env::var("CATALOG_BASE_URL")
                .unwrap_or_else(|_| catalog::DEFAULT_BASE_URL.into()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30000),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
        }
    }

    /// Path of the local database file
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(DB_FILE_NAME)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_base_url: catalog::DEFAULT_BASE_URL.into(),
            request_timeout_ms: 30000,
            data_dir: "./data".into(),
            log_level: "info".into(),
        }
    }
}
