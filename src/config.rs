//! Configuration management for the review agent tool server.
//!
//! Configuration can be set via environment variables:
//! - `DATAFORSEO_API_KEY` - Required. Base64 `login:password` credential for DataForSEO.
//!   Alternatively set both `DATAFORSEO_LOGIN` and `DATAFORSEO_PASSWORD`.
//! - `DATAFORSEO_BASE_URL` - Optional. Defaults to `https://api.dataforseo.com`.
//! - `MAP_API_KEY` - Optional. Google Geocoding API key; enables address lookup.
//! - `GEOCODING_BASE_URL` - Optional. Defaults to `https://maps.googleapis.com`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `POLL_MAX_ATTEMPTS` - Optional. Review task polls before giving up. Defaults to `10`.
//! - `POLL_INTERVAL_SECS` - Optional. Wait after a "not ready" poll. Defaults to `3`.
//! - `POLL_ERROR_INTERVAL_SECS` - Optional. Wait after a failed poll. Defaults to `5`.
//! - `HTTP_TIMEOUT_SECS` - Optional. Per-request timeout for outbound calls. Defaults to `30`.

use std::str::FromStr;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;

use crate::reviews::RetryPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// DataForSEO access.
#[derive(Debug, Clone)]
pub struct DataForSeoConfig {
    /// Value sent as `Authorization: Basic <credential>`
    pub credential: String,

    /// API host
    pub base_url: String,
}

/// Google Geocoding access.
#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    /// API key (geocoding is disabled without one)
    pub api_key: Option<String>,

    /// API host
    pub base_url: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: crate::geocoding::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl GeocodingConfig {
    /// Check if geocoding is enabled (API key configured)
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Tool server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// DataForSEO configuration
    pub dataforseo: DataForSeoConfig,

    /// Geocoding configuration
    pub geocoding: GeocodingConfig,

    /// Review task polling policy
    pub polling: RetryPolicy,

    /// Timeout applied to every outbound HTTP request
    pub http_timeout: Duration,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no DataForSEO credential is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credential = match var("DATAFORSEO_API_KEY").filter(|v| !v.is_empty()) {
            Some(key) => key,
            None => match (var("DATAFORSEO_LOGIN"), var("DATAFORSEO_PASSWORD")) {
                (Some(login), Some(password)) => BASE64.encode(format!("{}:{}", login, password)),
                _ => return Err(ConfigError::MissingEnvVar("DATAFORSEO_API_KEY".to_string())),
            },
        };

        let dataforseo = DataForSeoConfig {
            credential,
            base_url: var("DATAFORSEO_BASE_URL")
                .unwrap_or_else(|| crate::dataforseo::DEFAULT_BASE_URL.to_string()),
        };

        let geocoding = GeocodingConfig {
            api_key: var("MAP_API_KEY").filter(|v| !v.is_empty()),
            base_url: var("GEOCODING_BASE_URL")
                .unwrap_or_else(|| crate::geocoding::DEFAULT_BASE_URL.to_string()),
        };

        let defaults = RetryPolicy::default();
        let polling = RetryPolicy {
            max_attempts: parse_var(&var, "POLL_MAX_ATTEMPTS")?.unwrap_or(defaults.max_attempts),
            pending_interval: parse_var(&var, "POLL_INTERVAL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.pending_interval),
            error_interval: parse_var(&var, "POLL_ERROR_INTERVAL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.error_interval),
        };

        let http_timeout = Duration::from_secs(parse_var(&var, "HTTP_TIMEOUT_SECS")?.unwrap_or(30));

        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_var(&var, "PORT")?.unwrap_or(3000);

        Ok(Self {
            dataforseo,
            geocoding,
            polling,
            http_timeout,
            host,
            port,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(credential: String, dataforseo_base_url: String) -> Self {
        Self {
            dataforseo: DataForSeoConfig {
                credential,
                base_url: dataforseo_base_url,
            },
            geocoding: GeocodingConfig::default(),
            polling: RetryPolicy::default(),
            http_timeout: Duration::from_secs(30),
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

fn parse_var<F, T>(var: &F, name: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var(name)
        .map(|v| {
            v.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e)))
        })
        .transpose()
}
