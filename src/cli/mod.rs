//! CLI module for vitrine-rs
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing with clap
//! - Configuration merging (CLI args + config files)
//! - Command execution and validation
//! - Command handlers for list, create, and demo operations

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod parser;
pub mod validation;

// Re-export public types for convenience
pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use parser::{Cli, Commands, DemoMode, Environment};

use anyhow::Context;

use crate::config::Settings;

/// Load and merge configuration from CLI arguments
///
/// This function handles the complete configuration loading process:
/// 1. Load base configuration from files and environment variables
/// 2. Merge CLI argument overrides
/// 3. Validate the final configuration
pub fn load_and_merge_config(cli: &Cli) -> anyhow::Result<Settings> {
    let merger = ConfigurationMerger::from_config_path(cli.config.as_ref())
        .context("Failed to initialize configuration loader")?;

    merger
        .load_and_merge(cli)
        .context("Failed to load configuration")
}
