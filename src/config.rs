//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::remote::{ScriptConfig, DEFAULT_ENDPOINT_URL};
use crate::views::DEFAULT_RECENT_LIMIT;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoint: EndpointConfig,

    #[serde(default)]
    pub views: ViewsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Script endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    #[serde(default = "default_endpoint_url")]
    pub url: String,

    /// Unset means requests never time out
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_endpoint_url() -> String {
    DEFAULT_ENDPOINT_URL.to_string()
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_endpoint_url(),
            request_timeout_secs: None,
        }
    }
}

impl EndpointConfig {
    pub fn script_config(&self) -> ScriptConfig {
        ScriptConfig {
            url: self.url.clone(),
            request_timeout_secs: self.request_timeout_secs,
        }
    }
}

/// View behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct ViewsConfig {
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

fn default_recent_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}

fn default_export_dir() -> String {
    ".".to_string()
}

impl Default for ViewsConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
            export_dir: default_export_dir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from the first default location that exists, or from the
    /// environment alone when none does. A file that exists but cannot be
    /// read or parsed is an error.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_first(&default_config_paths())
    }

    fn load_first(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        match paths.iter().find(|path| path.exists()) {
            Some(path) => {
                let config = Self::load_with_env(path)?;
                tracing::debug!("Loaded config from {:?}", path);
                Ok(config)
            }
            None => {
                tracing::debug!("Using default config with environment overrides");
                Ok(Self::from_env())
            }
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Endpoint overrides
        if let Some(url) = var("LABENTRY_ENDPOINT_URL") {
            self.endpoint.url = url;
        }
        if let Some(secs) = var("LABENTRY_TIMEOUT_SECS") {
            if let Ok(s) = secs.parse() {
                self.endpoint.request_timeout_secs = Some(s);
            }
        }

        // View overrides
        if let Some(dir) = var("LABENTRY_EXPORT_DIR") {
            self.views.export_dir = dir;
        }

        // Logging overrides
        if let Some(level) = var("LABENTRY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("LABENTRY_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("labentry").join("config.toml"));
    }
    paths.push(PathBuf::from("./labentry.toml"));
    paths
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    format!(
        r#"# Lab Entry Configuration
#
# Environment variables override these settings:
# - LABENTRY_ENDPOINT_URL
# - LABENTRY_TIMEOUT_SECS
# - LABENTRY_EXPORT_DIR
# - LABENTRY_LOG_LEVEL
# - LABENTRY_LOG_FORMAT

[endpoint]
# Deployed spreadsheet script URL
url = "{url}"

# Request timeout in seconds (unset: wait indefinitely)
# request_timeout_secs = 30

[views]
# How many of this session's submissions to show
recent_limit = {recent}

# Where `export` writes entries_<date>.csv
export_dir = "."

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty or json
format = "pretty"
"#,
        url = DEFAULT_ENDPOINT_URL,
        recent = DEFAULT_RECENT_LIMIT,
    )
}
