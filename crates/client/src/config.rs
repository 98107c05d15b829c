//! Client configuration.

use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Safely shorter than a 15-minute access token.
pub const DEFAULT_RENEWAL_INTERVAL: Duration = Duration::from_secs(14 * 60);

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer number of seconds, got '{value}'")]
    InvalidSeconds { var: &'static str, value: String },

    #[error("{var} must not be empty")]
    Empty { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST API, e.g. `http://localhost:3000/api`.
    pub api_base_url: String,
    /// How often the silent renewal tick fires while a session is active.
    pub renewal_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            renewal_interval: DEFAULT_RENEWAL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Read `SHOPDESK_API_URL`, `SHOPDESK_RENEWAL_INTERVAL_SECS` and
    /// `SHOPDESK_REQUEST_TIMEOUT_SECS`, falling back to defaults for unset
    /// variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("SHOPDESK_API_URL") {
            let url = url.trim();
            if url.is_empty() {
                return Err(ConfigError::Empty {
                    var: "SHOPDESK_API_URL",
                });
            }
            config.api_base_url = url.to_string();
        }
        if let Some(secs) = lookup("SHOPDESK_RENEWAL_INTERVAL_SECS") {
            config.renewal_interval = parse_seconds("SHOPDESK_RENEWAL_INTERVAL_SECS", &secs)?;
        }
        if let Some(secs) = lookup("SHOPDESK_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = parse_seconds("SHOPDESK_REQUEST_TIMEOUT_SECS", &secs)?;
        }

        Ok(config)
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_renewal_interval(mut self, interval: Duration) -> Self {
        self.renewal_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

fn parse_seconds(var: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidSeconds {
            var,
            value: value.to_string(),
        }),
    }
}
