//! Configuration loader for vitrine-rs
//!
//! This module provides the `ConfigLoader` struct that handles loading
//! configuration from multiple sources with proper precedence.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

/// Environment variable for configuration directory
const CONFIG_DIR_ENV: &str = "VITRINE_CONFIG_DIR";

/// Environment variable for specific configuration file
const CONFIG_FILE_ENV: &str = "VITRINE_CONFIG_FILE";

/// Default configuration directory
const DEFAULT_CONFIG_DIR: &str = "config";

/// Environment variable prefix for configuration overrides
const ENV_PREFIX: &str = "VITRINE";

/// Separator for nested configuration keys in environment variables
const ENV_SEPARATOR: &str = "__";

/// Configuration loader that handles layered configuration loading
///
/// The loader supports the following configuration sources (in order of priority):
/// 1. Built-in defaults (every field has one; no file is required)
/// 2. `default.toml` - Base configuration (optional)
/// 3. `{environment}.toml` - Environment-specific configuration (optional)
/// 4. `local.toml` - Local development overrides (optional)
/// 5. `VITRINE_*` environment variables (highest priority)
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Configuration directory path
    config_dir: PathBuf,
    /// Specific configuration file path (if set, skips layered loading)
    config_file: Option<PathBuf>,
    /// Current application environment
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a new configuration loader
    ///
    /// This reads environment variables to determine:
    /// - Configuration directory (`VITRINE_CONFIG_DIR`)
    /// - Specific configuration file (`VITRINE_CONFIG_FILE`)
    /// - Application environment (`VITRINE_APP_ENV`)
    ///
    /// # Errors
    ///
    /// Returns an error if both `VITRINE_CONFIG_DIR` and `VITRINE_CONFIG_FILE`
    /// are set, as they are mutually exclusive.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::var(CONFIG_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR));

        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if config_file.is_some() && std::env::var(CONFIG_DIR_ENV).is_ok() {
            return Err(ConfigError::mutual_exclusivity(
                "VITRINE_CONFIG_DIR and VITRINE_CONFIG_FILE cannot both be set. \
                 Use VITRINE_CONFIG_DIR for layered configuration or \
                 VITRINE_CONFIG_FILE for a single configuration file.",
            ));
        }

        let environment = AppEnvironment::from_env();

        Ok(Self {
            config_dir,
            config_file,
            environment,
        })
    }

    /// Create a loader that reads exactly one configuration file.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_file: Some(path.into()),
            environment: AppEnvironment::from_env(),
        }
    }

    /// Get the current application environment
    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    /// Override the detected application environment
    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    /// Load configuration from all sources
    ///
    /// If a specific configuration file is set, loads only that file.
    /// Otherwise, performs layered loading from the configuration directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An explicitly requested configuration file is not found
    /// - Configuration parsing fails
    /// - Configuration validation fails
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let config = self.build_config()?;
        let settings: Settings = config.try_deserialize().map_err(|e| {
            ConfigError::ParseError(format!("Failed to deserialize configuration: {}", e))
        })?;

        settings.validate()?;

        Ok(settings)
    }

    /// Build the config::Config instance from all sources
    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = Config::builder();

        let builder = if let Some(ref config_file) = self.config_file {
            // Single file mode; an explicitly named file must exist
            self.add_file_source(builder, config_file, true)?
        } else {
            self.build_layered_config(builder)?
        };

        // Environment variables are always highest priority
        // VITRINE_API__BASE_URL -> api.base_url
        let builder = Self::add_env_source(builder);

        builder.build().map_err(ConfigError::from)
    }

    /// Build layered configuration from multiple files
    ///
    /// Every layer is optional; a catalog client with complete built-in
    /// defaults must run from any working directory without a config tree.
    fn build_layered_config(
        &self,
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let default_path = self.config_dir.join("default.toml");
        let builder = self.add_file_source(builder, &default_path, false)?;

        let env_path = self
            .config_dir
            .join(format!("{}.toml", self.environment.as_str()));
        let builder = self.add_file_source(builder, &env_path, false)?;

        let local_path = self.config_dir.join("local.toml");
        let builder = self.add_file_source(builder, &local_path, false)?;

        Ok(builder)
    }

    /// Add a file source to the config builder
    fn add_file_source(
        &self,
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        path: &Path,
        required: bool,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        Ok(builder.add_source(
            File::new(path.to_str().unwrap_or_default(), FileFormat::Toml).required(required),
        ))
    }

    /// Add environment variable source to the config builder
    ///
    /// Environment variables with prefix `VITRINE_` are mapped to configuration
    /// keys. Double underscores (`__`) are used as separators for nested keys.
    ///
    /// Examples:
    /// - `VITRINE_API__BASE_URL` -> `api.base_url`
    /// - `VITRINE_LOG__LEVEL` -> `log.level`
    fn add_env_source(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> config::ConfigBuilder<config::builder::DefaultState> {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        )
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            config_file: None,
            environment: AppEnvironment::default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Global mutex to ensure tests run sequentially to avoid env var conflicts
    static TEST_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to create a temporary config directory with files
    fn setup_config_dir(files: &[(&str, &str)]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        for (name, content) in files {
            let path = temp_dir.path().join(name);
            fs::write(&path, content).expect("Failed to write config file");
        }
        temp_dir
    }

    /// Helper to safely set environment variables for a test
    struct EnvGuard {
        vars_to_restore: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new() -> Self {
            Self {
                vars_to_restore: Vec::new(),
            }
        }

        fn set(&mut self, key: &str, value: &str) {
            let original = std::env::var(key).ok();
            self.vars_to_restore.push((key.to_string(), original));
            unsafe {
                std::env::set_var(key, value);
            }
        }

        fn remove(&mut self, key: &str) {
            let original = std::env::var(key).ok();
            self.vars_to_restore.push((key.to_string(), original));
            unsafe {
                std::env::remove_var(key);
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, original_value) in &self.vars_to_restore {
                unsafe {
                    match original_value {
                        Some(value) => std::env::set_var(key, value),
                        None => std::env::remove_var(key),
                    }
                }
            }
        }
    }

    fn clean_guard() -> EnvGuard {
        let mut guard = EnvGuard::new();
        guard.remove(CONFIG_DIR_ENV);
        guard.remove(CONFIG_FILE_ENV);
        guard.remove("VITRINE_APP_ENV");
        guard.remove("VITRINE_API__BASE_URL");
        guard
    }

    #[test]
    fn test_load_with_no_files_yields_defaults() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut guard = clean_guard();
        let temp_dir = TempDir::new().unwrap();
        guard.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());

        let settings = ConfigLoader::new().unwrap().load().unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_default_toml_overrides_builtins() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut guard = clean_guard();
        let temp_dir = setup_config_dir(&[(
            "default.toml",
            "[api]\nbase_url = \"https://example.test\"\npage_size = 5\n",
        )]);
        guard.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());

        let settings = ConfigLoader::new().unwrap().load().unwrap();
        assert_eq!(settings.api.base_url, "https://example.test");
        assert_eq!(settings.api.page_size, 5);
        // Untouched sections keep their builtins
        assert_eq!(settings.log.level, "info");
    }

    #[test]
    fn test_environment_file_layers_over_default() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut guard = clean_guard();
        let temp_dir = setup_config_dir(&[
            ("default.toml", "[log]\nlevel = \"info\"\n"),
            ("test.toml", "[log]\nlevel = \"debug\"\n"),
        ]);
        guard.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());
        guard.set("VITRINE_APP_ENV", "test");

        let settings = ConfigLoader::new().unwrap().load().unwrap();
        assert_eq!(settings.log.level, "debug");
    }

    #[test]
    fn test_env_var_has_highest_priority() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut guard = clean_guard();
        let temp_dir = setup_config_dir(&[(
            "default.toml",
            "[api]\nbase_url = \"https://from-file.test\"\n",
        )]);
        guard.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());
        guard.set("VITRINE_API__BASE_URL", "https://from-env.test");

        let settings = ConfigLoader::new().unwrap().load().unwrap();
        assert_eq!(settings.api.base_url, "https://from-env.test");
    }

    #[test]
    fn test_dir_and_file_are_mutually_exclusive() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut guard = clean_guard();
        guard.set(CONFIG_DIR_ENV, "config");
        guard.set(CONFIG_FILE_ENV, "custom.toml");

        assert!(matches!(
            ConfigLoader::new(),
            Err(ConfigError::MutualExclusivityError(_))
        ));
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let _guard = clean_guard();

        let loader = ConfigLoader::from_file("/nonexistent/vitrine.toml");
        assert!(matches!(loader.load(), Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_invalid_settings_fail_validation_on_load() {
        let _lock = TEST_MUTEX.lock().unwrap();
        let mut guard = clean_guard();
        let temp_dir = setup_config_dir(&[("default.toml", "[api]\npage_size = 0\n")]);
        guard.set(CONFIG_DIR_ENV, temp_dir.path().to_str().unwrap());

        assert!(ConfigLoader::new().unwrap().load().is_err());
    }
}
