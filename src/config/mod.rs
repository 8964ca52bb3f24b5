//! Configuration management module for vitrine-rs
//!
//! This module provides layered configuration loading with support for:
//! - TOML configuration files
//! - Environment variable overrides
//! - Multiple environment configurations (development, test, staging, production)
//!
//! # Configuration Priority (lowest to highest)
//! 1. Built-in defaults
//! 2. `default.toml` - Base configuration file
//! 3. `{environment}.toml` - Environment-specific configuration
//! 4. `local.toml` - Local development overrides (not committed to version control)
//! 5. `VITRINE_*` environment variables

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;

// Re-export public types
pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::Settings;
