//! Client configuration loaded from TOML or the environment.
//!
//! ```toml
//! region = "us-east-2"
//! service = "execute-api"
//! max_retries = 3
//! base_delay_ms = 1000
//! timeout_ms = 3000
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sigil_http_client::{RetryConfig, SignedClientConfig, WorkflowContext};
use sigil_signing::{DEFAULT_REGION, DEFAULT_SERVICE};
use thiserror::Error;

/// Environment variable names read by [`SigilConfig::from_env`].
pub mod vars {
    pub const REGION: &str = "SIGIL_REGION";
    pub const SERVICE: &str = "SIGIL_SERVICE";
    pub const MAX_RETRIES: &str = "SIGIL_MAX_RETRIES";
    pub const BASE_DELAY_MS: &str = "SIGIL_BASE_DELAY_MS";
    pub const TIMEOUT_MS: &str = "SIGIL_TIMEOUT_MS";
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Settings for a signed client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SigilConfig {
    /// Signing region.
    pub region: String,
    /// Signing service.
    pub service: String,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Base backoff delay in milliseconds.
    pub base_delay_ms: u64,
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SigilConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            service: DEFAULT_SERVICE.to_string(),
            max_retries: 3,
            base_delay_ms: 1000,
            timeout_ms: 3000,
        }
    }
}

impl SigilConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::LoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `SIGIL_*` environment variables after reading `.env`.
    ///
    /// A missing `.env` file is not an error.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from a map of variables, as [`from_env`](Self::from_env) would.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(region) = lookup(vars::REGION) {
            config.region = region;
        }
        if let Some(service) = lookup(vars::SERVICE) {
            config.service = service;
        }
        if let Some(value) = lookup(vars::MAX_RETRIES) {
            config.max_retries = parse_var(vars::MAX_RETRIES, &value)?;
        }
        if let Some(value) = lookup(vars::BASE_DELAY_MS) {
            config.base_delay_ms = parse_var(vars::BASE_DELAY_MS, &value)?;
        }
        if let Some(value) = lookup(vars::TIMEOUT_MS) {
            config.timeout_ms = parse_var(vars::TIMEOUT_MS, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the values can produce a working client.
    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(invalid("region", "must not be empty"));
        }
        if self.service.trim().is_empty() {
            return Err(invalid("service", "must not be empty"));
        }
        if self.timeout_ms == 0 {
            return Err(invalid("timeout_ms", "must be greater than zero"));
        }
        Ok(())
    }

    /// Retry budget.
    pub fn retry(&self) -> RetryConfig {
        RetryConfig::new(self.max_retries, Duration::from_millis(self.base_delay_ms))
    }

    /// Build client settings, optionally tagging requests with a workflow.
    pub fn client_config(&self, workflow: Option<WorkflowContext>) -> SignedClientConfig {
        let mut builder = SignedClientConfig::builder()
            .region(&self.region)
            .service(&self.service)
            .timeout(Duration::from_millis(self.timeout_ms))
            .retry(self.retry());
        if let Some(workflow) = workflow {
            builder = builder.workflow(workflow);
        }
        builder.build()
    }
}

impl From<SigilConfig> for SignedClientConfig {
    fn from(config: SigilConfig) -> Self {
        config.client_config(None)
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| invalid(key, &format!("{value:?} ({e})")))
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}
