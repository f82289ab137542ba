use std::env;
use std::time::Duration;

use tubepilot_core::constants::API_TIMEOUT;
use url::Url;

use crate::{FailureKind, GatewayError};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_ENV: &str = "TUBEPILOT_API_URL";
pub const TIMEOUT_ENV: &str = "TUBEPILOT_TIMEOUT_SECS";

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
    /// Ceiling for a whole call, body transfer included.
    pub request_timeout: Duration,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_URL).expect("default api url is valid"),
            connect_timeout: Duration::from_secs(10),
            request_timeout: API_TIMEOUT,
        }
    }
}

impl GatewaySettings {
    pub fn with_base_url(base_url: &str) -> Result<Self, GatewayError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            ..Self::default()
        })
    }

    /// Reads `TUBEPILOT_API_URL` and `TUBEPILOT_TIMEOUT_SECS`, falling back to defaults.
    pub fn from_env() -> Result<Self, GatewayError> {
        let mut settings = Self::default();
        if let Ok(raw) = env::var(API_URL_ENV) {
            settings.base_url = parse_base_url(&raw)?;
        }
        if let Ok(raw) = env::var(TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                GatewayError::new(
                    FailureKind::Validation,
                    format!("{TIMEOUT_ENV} must be a whole number of seconds, got {raw:?}"),
                )
            })?;
            settings.request_timeout = Duration::from_secs(secs);
        }
        Ok(settings)
    }
}

/// Parses a base URL, making sure relative joins keep any path prefix.
pub fn parse_base_url(raw: &str) -> Result<Url, GatewayError> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Url::parse(&normalized).map_err(|err| {
        GatewayError::new(
            FailureKind::Validation,
            format!("invalid api url {raw:?}: {err}"),
        )
    })
}
