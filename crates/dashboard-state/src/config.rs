//! Configuration for the dashboard state.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default catalog root, overridden by `CATALOG_URL`.
pub const DEFAULT_CATALOG_URL: &str = "http://localhost:8080/catalog.json";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Runtime configuration of the dashboard state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// URL of the root catalog document.
    pub catalog_url: String,

    /// Name of the cube dimension indexed by the selected location.
    pub station_dimension: String,

    /// Maximum number of child documents fetched concurrently.
    pub max_concurrent_fetches: usize,

    /// HTTP request timeout for catalog documents, in seconds.
    pub request_timeout_secs: u64,

    /// Drop repeated theme keywords, keeping the first occurrence.
    pub dedupe_themes: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            station_dimension: "stations".to_string(),
            max_concurrent_fetches: 8,
            request_timeout_secs: 30,
            dedupe_themes: true,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from environment variables over the defaults.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load configuration from a YAML file. Missing keys keep their defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        tracing::info!(path = %path.display(), "Loaded dashboard config");
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("CATALOG_URL") {
            self.catalog_url = val;
        }

        if let Ok(val) = std::env::var("STATION_DIMENSION") {
            self.station_dimension = val;
        }

        if let Ok(val) = std::env::var("MAX_CONCURRENT_FETCHES") {
            if let Ok(n) = val.parse() {
                self.max_concurrent_fetches = n;
            }
        }

        if let Ok(val) = std::env::var("CATALOG_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.request_timeout_secs = secs;
            }
        }

        if let Ok(val) = std::env::var("DEDUPE_THEMES") {
            self.dedupe_themes = val.to_lowercase() == "true" || val == "1";
        }

        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.catalog_url.trim().is_empty() {
            return Err(ConfigError::Invalid("catalog_url must not be empty".to_string()));
        }

        if self.station_dimension.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "station_dimension must not be empty".to_string(),
            ));
        }

        if self.max_concurrent_fetches == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_fetches must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}
