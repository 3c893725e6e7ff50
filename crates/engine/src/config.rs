//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Deploy service base URL.
    pub deploy_api_base: String,

    /// Upload endpoint URL (default: `{deploy_api_base}/upload`).
    pub upload_endpoint: String,

    /// HTTP client timeout in seconds (default: 30).
    pub http_timeout_secs: u64,

    /// Debounce window for the subdomain availability probe in
    /// milliseconds (default: 500).
    pub availability_debounce_ms: u64,

    /// Path for the JSON file persistence gateway. When None, snapshots
    /// are kept in memory only.
    pub site_file: Option<PathBuf>,
}

impl EngineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let deploy_api_base = env::var("DEPLOY_API_BASE")
            .context("DEPLOY_API_BASE environment variable is required")?;

        let upload_endpoint = env::var("UPLOAD_ENDPOINT")
            .unwrap_or_else(|_| format!("{}/upload", deploy_api_base.trim_end_matches('/')));

        let http_timeout_secs = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .context("HTTP_TIMEOUT_SECS must be a valid u64")?;

        let availability_debounce_ms = env::var("AVAILABILITY_DEBOUNCE_MS")
            .unwrap_or_else(|_| "500".to_string())
            .parse()
            .context("AVAILABILITY_DEBOUNCE_MS must be a valid u64")?;

        let site_file = env::var("SITE_FILE").map(PathBuf::from).ok();

        Ok(Self {
            deploy_api_base,
            upload_endpoint,
            http_timeout_secs,
            availability_debounce_ms,
            site_file,
        })
    }
}
