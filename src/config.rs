use serde::{Deserialize, Serialize};
use std::env;

use crate::error::{SdkError, SdkResult};

const ENV_IDENTITY_URL: &str = "TRIBEGATE_IDENTITY_URL";
const ENV_APPLICATION: &str = "TRIBEGATE_APPLICATION";
const ENV_TIMEOUT_SECS: &str = "TRIBEGATE_TIMEOUT_SECS";
const ENV_CACHE_MAX_AGE: &str = "TRIBEGATE_CACHE_MAX_AGE";

/// Configuration for an SDK instance.
///
/// The bearer token itself is never part of the configuration; it is
/// sourced per request from caller-controlled storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdkConfig {
    /// Base URL of the identity service
    pub identity_url: String,

    /// Application name, matching the catalog's `applicationName`
    pub application_name: String,

    /// Outbound request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Cache lifetime advertised by the discovery endpoint, in seconds
    #[serde(default = "default_cache_max_age")]
    pub cache_max_age: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_cache_max_age() -> u32 {
    300
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            identity_url: String::new(),
            application_name: String::new(),
            timeout_secs: default_timeout_secs(),
            cache_max_age: default_cache_max_age(),
        }
    }
}

impl SdkConfig {
    /// Create a configuration with default timeout and cache settings
    pub fn new(identity_url: &str, application_name: &str) -> Self {
        Self {
            identity_url: identity_url.to_string(),
            application_name: application_name.to_string(),
            ..Default::default()
        }
    }

    /// Load configuration from `TRIBEGATE_*` environment variables.
    ///
    /// `TRIBEGATE_IDENTITY_URL` and `TRIBEGATE_APPLICATION` are required;
    /// `TRIBEGATE_TIMEOUT_SECS` and `TRIBEGATE_CACHE_MAX_AGE` override the
    /// defaults when present.
    pub fn from_env() -> SdkResult<Self> {
        let identity_url = env::var(ENV_IDENTITY_URL)
            .map_err(|_| SdkError::Config(format!("{} is not set", ENV_IDENTITY_URL)))?;
        let application_name = env::var(ENV_APPLICATION)
            .map_err(|_| SdkError::Config(format!("{} is not set", ENV_APPLICATION)))?;

        let mut config = Self::new(&identity_url, &application_name);

        if let Ok(raw) = env::var(ENV_TIMEOUT_SECS) {
            config.timeout_secs = raw
                .parse()
                .map_err(|_| SdkError::Config(format!("invalid {}: {}", ENV_TIMEOUT_SECS, raw)))?;
        }
        if let Ok(raw) = env::var(ENV_CACHE_MAX_AGE) {
            config.cache_max_age = raw
                .parse()
                .map_err(|_| SdkError::Config(format!("invalid {}: {}", ENV_CACHE_MAX_AGE, raw)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> SdkResult<()> {
        if self.identity_url.trim().is_empty() {
            return Err(SdkError::Config("identity url is required".to_string()));
        }
        if self.application_name.trim().is_empty() {
            return Err(SdkError::Config("application name is required".to_string()));
        }
        Ok(())
    }
}
