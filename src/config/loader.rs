//! Configuration Loader
//!
//! Environment-aware configuration loading. Sources are layered, later ones
//! winning:
//!
//! 1. `{config_dir}/load_task.toml` (required)
//! 2. `{config_dir}/environments/{env}/load_task.toml` (optional)
//! 3. `LOAD_TASK__{SECTION}__{KEY}` environment variables

use super::error::{ConfigResult, ConfigurationError};
use super::LoadTaskConfig;
use config::{Config, Environment, File, FileFormat, Map};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub const BASE_CONFIG_FILE: &str = "load_task.toml";
pub const ENV_PREFIX: &str = "LOAD_TASK";

#[derive(Debug)]
pub struct ConfigManager {
    config: LoadTaskConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        Self::load_layers(config_dir, environment, None)
    }

    /// Like [`Self::load_from_directory_with_env`], with the override variables
    /// taken from `overrides` instead of the process environment
    pub fn load_with_overrides(
        config_dir: Option<PathBuf>,
        environment: &str,
        overrides: Map<String, String>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        Self::load_layers(config_dir, environment, Some(overrides))
    }

    fn load_layers(
        config_dir: Option<PathBuf>,
        environment: &str,
        overrides: Option<Map<String, String>>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);
        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let config = Self::load_and_merge_config(&config_directory, environment, overrides)?;
        config.validate()?;

        info!(
            environment = environment,
            retry_count = config.load_task.retry_count,
            cluster_name = %config.load_task.cluster_name,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    fn load_and_merge_config(
        config_directory: &Path,
        environment: &str,
        overrides: Option<Map<String, String>>,
    ) -> ConfigResult<LoadTaskConfig> {
        let base_path = config_directory.join(BASE_CONFIG_FILE);
        if !base_path.is_file() {
            return Err(ConfigurationError::config_file_not_found(vec![base_path]));
        }

        let env_path = Self::environment_config_path(config_directory, environment);
        if env_path.is_file() {
            debug!("Applying environment overrides from {}", env_path.display());
        }

        let env_source = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .source(overrides);

        let merged = Config::builder()
            .add_source(File::from(base_path.clone()).format(FileFormat::Toml))
            .add_source(
                File::from(env_path)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(env_source)
            .build()
            .map_err(|e| ConfigurationError::invalid_toml(base_path.display().to_string(), e))?;

        merged
            .try_deserialize()
            .map_err(|e| ConfigurationError::environment_config_error(environment, e))
    }

    fn environment_config_path(config_directory: &Path, environment: &str) -> PathBuf {
        config_directory
            .join("environments")
            .join(environment)
            .join(BASE_CONFIG_FILE)
    }

    /// LOAD_TASK_ENV, then APP_ENV, else `development`
    pub fn detect_environment() -> String {
        env::var("LOAD_TASK_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    fn default_config_directory() -> PathBuf {
        if let Ok(dir) = env::var("LOAD_TASK_CONFIG_DIR") {
            return PathBuf::from(dir);
        }
        if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
            let candidate = PathBuf::from(manifest_dir).join("config");
            if candidate.is_dir() {
                return candidate;
            }
        }
        PathBuf::from("config")
    }

    pub fn config(&self) -> &LoadTaskConfig {
        &self.config
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_base(dir: &Path, body: &str) {
        fs::write(dir.join(BASE_CONFIG_FILE), body).unwrap();
    }

    #[test]
    fn test_missing_base_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = ConfigManager::load_with_overrides(
            Some(dir.path().to_path_buf()),
            "test",
            Map::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::ConfigFileNotFound { .. }));
    }

    #[test]
    fn test_empty_base_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        write_base(dir.path(), "");

        let manager =
            ConfigManager::load_with_overrides(Some(dir.path().to_path_buf()), "test", Map::new())
                .unwrap();
        assert_eq!(manager.config(), &LoadTaskConfig::default());
        assert_eq!(manager.environment(), "test");
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let dir = TempDir::new().unwrap();
        write_base(dir.path(), "[load_task]\nexec_mem_limit_bytes = -1\n");

        let err =
            ConfigManager::load_with_overrides(Some(dir.path().to_path_buf()), "test", Map::new())
                .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidValue { .. }));
    }
}
