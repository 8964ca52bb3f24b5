//! Configuration merging: CLI arguments override file and environment
//! settings.

use std::path::PathBuf;

use crate::cli::parser::Cli;
use crate::config::{ConfigError, ConfigLoader, Settings};

/// Merges layered configuration with CLI argument overrides.
///
/// Precedence, lowest to highest: built-in defaults, configuration files,
/// `VITRINE_*` environment variables, CLI arguments.
pub struct ConfigurationMerger {
    loader: ConfigLoader,
}

impl ConfigurationMerger {
    /// Build a merger, optionally pinned to a single configuration file.
    pub fn from_config_path(path: Option<&PathBuf>) -> Result<Self, ConfigError> {
        let loader = match path {
            Some(path) => ConfigLoader::from_file(path),
            None => ConfigLoader::new()?,
        };
        Ok(Self { loader })
    }

    /// Load settings and apply CLI overrides, re-validating the result.
    pub fn load_and_merge(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let loader = match cli.env {
            Some(env) => self.loader.clone().with_environment(env.into()),
            None => self.loader.clone(),
        };

        let mut settings = loader.load()?;

        if let Some(base_url) = &cli.base_url {
            settings.api.base_url = base_url.clone();
        }
        if cli.verbose {
            settings.log.level = "debug".to_string();
        }
        if cli.quiet {
            settings.log.level = "error".to_string();
        }

        settings.validate()?;

        Ok(settings)
    }
}
