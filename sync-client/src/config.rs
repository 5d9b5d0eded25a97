//! Configuration for versync clients.
//!
//! Configuration can be built in code or loaded from a TOML file:
//!
//! ```toml
//! base_url = "https://api.zotero.org/"
//! api_key = "..."
//! max_objects_per_request = 50
//! ```

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use versync_core::DEFAULT_MAX_OBJECTS_PER_REQUEST;

/// Client configuration.
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    /// Root URL of the API.
    pub base_url: String,
    /// Protocol version sent with every request (default: "3").
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Credential sent with every request, if set.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Maximum object keys named by one request (default: 100).
    #[serde(default = "default_max_objects_per_request")]
    pub max_objects_per_request: usize,
    /// Maximum requests in flight for the default dispatcher (default: 4).
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
    /// Whole-request timeout for the default transport (default: 60).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Connection retries for the default transport (default: 2).
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,
}

fn default_api_version() -> String {
    "3".to_string()
}

fn default_max_objects_per_request() -> usize {
    DEFAULT_MAX_OBJECTS_PER_REQUEST
}

fn default_max_concurrent_requests() -> usize {
    4
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_connect_retries() -> u32 {
    2
}

impl ClientConfig {
    /// Configuration for `base_url` with every other field at its default.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_version: default_api_version(),
            api_key: None,
            max_objects_per_request: default_max_objects_per_request(),
            max_concurrent_requests: default_max_concurrent_requests(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_retries: default_connect_retries(),
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
        self
    }

    /// Set the protocol version.
    pub fn with_api_version(mut self, version: &str) -> Self {
        self.api_version = version.to_string();
        self
    }

    /// Set the per-request object limit.
    pub fn with_max_objects_per_request(mut self, max: usize) -> Self {
        self.max_objects_per_request = max;
        self
    }

    /// Set the default dispatcher's concurrency limit.
    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        self.max_concurrent_requests = max;
        self
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that required values are present and limits are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Missing("base_url"));
        }
        if self.api_version.trim().is_empty() {
            return Err(ConfigError::Missing("api_version"));
        }
        if self.max_objects_per_request == 0 {
            return Err(ConfigError::Invalid {
                field: "max_objects_per_request",
                reason: "must be greater than zero",
            });
        }
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::Invalid {
                field: "max_concurrent_requests",
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("max_objects_per_request", &self.max_objects_per_request)
            .field("max_concurrent_requests", &self.max_concurrent_requests)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("connect_retries", &self.connect_retries)
            .finish()
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
    /// Required value missing or empty.
    #[error("{0} not set")]
    Missing(&'static str),
    /// Value present but unusable.
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },
}
