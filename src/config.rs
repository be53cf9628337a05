use std::env;
use anyhow::{Context, Result};

/// The application's configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// The base URL of the ERP backend (e.g. `http://localhost:4003`).
    pub api_base_url: String,
    /// Per-request timeout in seconds for backend calls.
    pub request_timeout_secs: u64,
    /// Interval in seconds between dashboard collection re-fetches.
    pub poll_interval_secs: u64,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            api_base_url: env::var("API_BASE_URL")
                .context("API_BASE_URL must be set (e.g. http://localhost:4003)")?,
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("Invalid REQUEST_TIMEOUT_SECS")?,
            poll_interval_secs: env::var("POLL_INTERVAL_SECS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid POLL_INTERVAL_SECS")?,
        })
    }

    /// Creates a `Config` pointed at the given base URL with default timings.
    pub fn with_base_url(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            request_timeout_secs: 30,
            poll_interval_secs: 10,
        }
    }
}
