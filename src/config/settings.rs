//! Configuration settings structures for vitrine-rs
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "vitrine-rs".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_base_url() -> String {
    "https://dummyjson.com".to_string()
}

fn default_page_size() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/vitrine.log".to_string()
}

fn default_log_format() -> String {
    "full".to_string()
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Remote API Configuration
// ============================================================================

/// Remote product catalog API configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the catalog API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Page size for product list requests
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Artificial latency added before each remote call, in milliseconds.
    /// Zero disables it. Exists to make the optimistic window observable.
    #[serde(default)]
    pub simulated_latency_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            simulated_latency_ms: 0,
        }
    }
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Logging configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Enable console output
    #[serde(default = "default_true")]
    pub console: bool,

    /// Colorize console output
    #[serde(default = "default_true")]
    pub colored: bool,

    /// Enable file output
    #[serde(default)]
    pub file: bool,

    /// Log file path when file output is enabled
    #[serde(default = "default_log_path")]
    pub file_path: String,

    /// File output format: full, compact, json
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: true,
            colored: true,
            file: false,
            file_path: default_log_path(),
            format: default_log_format(),
        }
    }
}

impl LogConfig {
    /// Convert the section into the logger's own configuration type.
    pub fn to_logger_config(&self) -> Result<LoggerConfig, ConfigError> {
        let format: LogFormat = self
            .format
            .parse()
            .map_err(|_| ConfigError::validation("log.format", "must be full, compact, or json"))?;

        Ok(LoggerConfig {
            level: self.level.clone(),
            console: ConsoleConfig {
                enabled: self.console,
                colored: self.colored,
            },
            file: FileConfig {
                enabled: self.file,
                path: self.file_path.clone().into(),
                format,
            },
        })
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Root settings structure aggregating all configuration sections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub log: LogConfig,
}

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Settings {
    /// Validate the loaded settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::validation("api.base_url", "must not be empty"));
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(ConfigError::validation(
                "api.base_url",
                "must start with http:// or https://",
            ));
        }
        if self.api.page_size == 0 {
            return Err(ConfigError::validation(
                "api.page_size",
                "must be at least 1",
            ));
        }
        if !VALID_LOG_LEVELS.contains(&self.log.level.to_lowercase().as_str()) {
            return Err(ConfigError::validation(
                "log.level",
                "must be one of: trace, debug, info, warn, error",
            ));
        }
        // Ensure the format string parses; to_logger_config reports the field.
        self.log.to_logger_config()?;

        Ok(())
    }
}
