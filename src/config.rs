//! Configuration management for Nitro
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::client::RequestPolicy;
use crate::error::{NitroError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for Nitro
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Timeout and retry settings for backend calls
    #[serde(default)]
    pub request: RequestConfig,
    /// Local chat history settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Nitro backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Optional API key sent as `X-API-Key`
    #[serde(default)]
    pub api_key: Option<String>,

    /// User identifier forwarded with chat messages
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_user_id() -> String {
    "anonymous".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            user_id: default_user_id(),
        }
    }
}

/// Retry and timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Retries after the first failed attempt
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Per-attempt timeout (milliseconds)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Pause between attempts (milliseconds)
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

fn default_retries() -> u32 {
    2
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_backoff_ms() -> u64 {
    2_000
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            timeout_ms: default_timeout_ms(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl RequestConfig {
    /// Retry policy described by this configuration
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use nitro::config::RequestConfig;
    ///
    /// let policy = RequestConfig::default().policy();
    /// assert_eq!(policy.retries, 2);
    /// assert_eq!(policy.backoff, Duration::from_millis(2000));
    /// ```
    pub fn policy(&self) -> RequestPolicy {
        RequestPolicy::new(self.retries, Duration::from_millis(self.timeout_ms))
            .with_backoff(Duration::from_millis(self.backoff_ms))
    }
}

/// Local chat history configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file; the platform data directory is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Maximum number of stored sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_max_sessions() -> usize {
    crate::storage::DEFAULT_MAX_SESSIONS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_sessions: default_max_sessions(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| NitroError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| NitroError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("NITRO_API_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(api_key) = std::env::var("NITRO_API_KEY") {
            self.api.api_key = Some(api_key);
        }

        if let Ok(user_id) = std::env::var("NITRO_USER_ID") {
            self.api.user_id = user_id;
        }

        if let Ok(retries) = std::env::var("NITRO_RETRIES") {
            if let Ok(value) = retries.parse() {
                self.request.retries = value;
            } else {
                tracing::warn!("Invalid NITRO_RETRIES: {}", retries);
            }
        }

        if let Ok(timeout) = std::env::var("NITRO_TIMEOUT_MS") {
            if let Ok(value) = timeout.parse() {
                self.request.timeout_ms = value;
            } else {
                tracing::warn!("Invalid NITRO_TIMEOUT_MS: {}", timeout);
            }
        }

        if let Ok(backoff) = std::env::var("NITRO_BACKOFF_MS") {
            if let Ok(value) = backoff.parse() {
                self.request.backoff_ms = value;
            } else {
                tracing::warn!("Invalid NITRO_BACKOFF_MS: {}", backoff);
            }
        }

        if let Ok(max_sessions) = std::env::var("NITRO_MAX_SESSIONS") {
            if let Ok(value) = max_sessions.parse() {
                self.storage.max_sessions = value;
            } else {
                tracing::warn!("Invalid NITRO_MAX_SESSIONS: {}", max_sessions);
            }
        }

        if let Ok(path) = std::env::var(crate::storage::local::STORAGE_PATH_ENV) {
            self.storage.path = Some(PathBuf::from(path));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(api_url) = &cli.api_url {
            tracing::debug!(api_url = %api_url, "CLI override: --api-url");
            self.api.base_url = api_url.clone();
        }

        if let Some(storage_path) = &cli.storage_path {
            tracing::debug!(storage_path = %storage_path.display(), "CLI override: --storage-path");
            self.storage.path = Some(storage_path.clone());
        }

        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(NitroError::Config("api.base_url cannot be empty".to_string()).into());
        }

        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            NitroError::Config(format!("Invalid api.base_url '{}': {}", self.api.base_url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(NitroError::Config(format!(
                "api.base_url must use http or https, got {}",
                url.scheme()
            ))
            .into());
        }

        if self.api.user_id.trim().is_empty() {
            return Err(NitroError::Config("api.user_id cannot be empty".to_string()).into());
        }

        if self.request.timeout_ms == 0 {
            return Err(NitroError::Config(
                "request.timeout_ms must be greater than 0".to_string(),
            )
            .into());
        }

        if self.storage.max_sessions == 0 {
            return Err(NitroError::Config(
                "storage.max_sessions must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
