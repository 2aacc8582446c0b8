//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `VOLTLANE_REMOTE_URL` - Base URL of the remote document service
//! - `VOLTLANE_REMOTE_API_KEY` - API key for the document service
//!
//! ## Optional
//! - `VOLTLANE_REMOTE_POLL_MS` - Subscription poll interval in milliseconds
//!   (default: 2000)
//! - `VOLTLANE_REDIRECT_DELAY_MS` - Delay before the post-checkout redirect
//!   in milliseconds (default: 2000)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use voltlane_remote::rest::RestConfig;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Clone)]
pub struct StorefrontConfig {
    /// Base URL of the remote document service
    pub remote_url: String,
    /// API key for the document service
    pub remote_api_key: SecretString,
    /// Poll interval for REST subscriptions
    pub poll_interval: Duration,
    /// Delay before the post-checkout redirect
    pub redirect_delay: Duration,
}

impl std::fmt::Debug for StorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontConfig")
            .field("remote_url", &self.remote_url)
            .field("remote_api_key", &"[REDACTED]")
            .field("poll_interval", &self.poll_interval)
            .field("redirect_delay", &self.redirect_delay)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the API key fails placeholder detection.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let remote_url = get_required_env("VOLTLANE_REMOTE_URL")?;
        let remote_api_key = get_validated_secret("VOLTLANE_REMOTE_API_KEY")?;
        let poll_interval = get_duration_ms("VOLTLANE_REMOTE_POLL_MS", 2000)?;
        let redirect_delay = get_duration_ms("VOLTLANE_REDIRECT_DELAY_MS", 2000)?;

        Ok(Self {
            remote_url,
            remote_api_key,
            poll_interval,
            redirect_delay,
        })
    }

    /// REST backend configuration derived from this config.
    #[must_use]
    pub fn rest_config(&self) -> RestConfig {
        let mut config = RestConfig::new(self.remote_url.clone(), self.remote_api_key.clone());
        config.poll_interval = self.poll_interval;
        config
    }
}

/// Get a required environment variable.
fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_string()))
}

/// Get a required secret, rejecting obvious placeholder values.
fn get_validated_secret(name: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(name)?;
    validate_secret_value(name, value)
}

fn validate_secret_value(name: &str, value: String) -> Result<SecretString, ConfigError> {
    let lowered = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lowered.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                name.to_string(),
                format!("value matches placeholder pattern '{pattern}'"),
            ));
        }
    }
    Ok(SecretString::from(value))
}

/// Parse a millisecond duration from the environment, with a default.
fn get_duration_ms(name: &str, default_ms: u64) -> Result<Duration, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string())),
        Err(_) => Ok(Duration::from_millis(default_ms)),
    }
}
