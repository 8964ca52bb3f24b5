//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

// Include shadow-rs generated build information
use shadow_rs::shadow;
shadow!(build);

/// Optimistic-update client for a remote product catalog
#[derive(Parser, Debug)]
#[command(name = "vitrine-rs")]
#[command(about = "Optimistic-update client for a remote product catalog")]
#[command(long_about = "
Vitrine-rs is a client-side data layer for a remote product catalog. It keeps
a local cache of query results and applies created products to that cache
speculatively, before the server confirms the write, rolling back on failure
and reconciling with the server afterwards.

EXAMPLES:
    # List the first page of products
    vitrine-rs list

    # Create a product optimistically
    vitrine-rs create --title \"Fountain pen\" --price 24.90

    # Watch the optimistic lifecycle with an artificially slow server
    vitrine-rs demo --mode slow

    # Watch a rollback by forcing the create to fail
    vitrine-rs demo --mode error

    # Use a custom configuration file
    vitrine-rs --config /path/to/config.toml list
")]
#[command(version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Specify a custom configuration file to use instead of the default
    /// layered loading. The file should be in TOML format and must exist
    /// and be readable.
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Force the application to use a specific environment configuration.
    /// Available values: development (dev), test, staging (stage),
    /// production (prod)
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Override the catalog API base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Enable verbose logging
    ///
    /// Increases log output to debug level. Cannot be used with --quiet.
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    ///
    /// Suppresses all log output below error level. Cannot be used with
    /// --verbose.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Validate combinations clap cannot express declaratively
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("--verbose and --quiet cannot be used together".to_string());
        }
        Ok(())
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the first page of catalog products
    List {
        /// Maximum number of products to fetch
        #[arg(long, value_parser = super::validation::validate_limit)]
        limit: Option<u64>,
    },

    /// Create a product, applied to the local cache optimistically
    Create {
        /// Product title
        #[arg(long)]
        title: String,

        /// Product price
        #[arg(long, value_parser = super::validation::validate_price)]
        price: f64,
    },

    /// Walk through the optimistic update lifecycle step by step
    Demo {
        /// Demo flavor to run
        #[arg(long, value_enum, default_value = "normal")]
        mode: DemoMode,
    },
}

/// Application environment as a CLI value
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    #[value(alias = "dev")]
    Development,
    Test,
    #[value(alias = "stage")]
    Staging,
    #[value(alias = "prod")]
    Production,
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}

/// Demo flavors making different parts of the lifecycle observable
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DemoMode {
    /// Create against the real catalog at normal speed
    Normal,
    /// Add artificial latency so the speculative window is visible
    Slow,
    /// Force the create to fail and watch the rollback
    Error,
}
