//! # Load Task Configuration
//!
//! Typed, validated settings for load tasks and the query registry, loaded
//! from TOML with per-environment overrides and `LOAD_TASK__*` environment
//! variables.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use loadtask_core::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manager = ConfigManager::load()?;
//! let retry_count = manager.config().load_task.retry_count;
//! let capacity = manager.config().registry.initial_capacity;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use crate::constants::{
    DEFAULT_CLUSTER_NAME, DEFAULT_EXEC_MEM_LIMIT_BYTES, DEFAULT_RETRY_COUNT, DEFAULT_TIMEZONE,
};
use serde::{Deserialize, Serialize};

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Upper bound on configured retries; anything above is almost certainly a typo
pub const MAX_RETRY_COUNT: u32 = 10;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadTaskConfig {
    pub load_task: LoadTaskSettings,
    pub registry: RegistrySettings,
    pub logging: LoggingSettings,
}

/// Defaults applied to every task created by a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadTaskSettings {
    /// Total attempts a task may make, the first one included
    pub retry_count: u32,
    pub exec_mem_limit_bytes: i64,
    pub cluster_name: String,
    pub timezone: String,
    pub strict_mode: bool,
}

impl Default for LoadTaskSettings {
    fn default() -> Self {
        Self {
            retry_count: DEFAULT_RETRY_COUNT,
            exec_mem_limit_bytes: DEFAULT_EXEC_MEM_LIMIT_BYTES,
            cluster_name: DEFAULT_CLUSTER_NAME.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            strict_mode: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    pub initial_capacity: usize,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            initial_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter directive used when RUST_LOG is unset
    pub level: Option<String>,
    pub json: bool,
}

impl LoadTaskConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        let task = &self.load_task;

        if task.exec_mem_limit_bytes <= 0 {
            return Err(ConfigurationError::invalid_value(
                "load_task.exec_mem_limit_bytes",
                task.exec_mem_limit_bytes.to_string(),
                "memory limit must be greater than 0",
            ));
        }

        if task.cluster_name.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "load_task.cluster_name",
                "load task configuration",
            ));
        }

        if task.timezone.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "load_task.timezone",
                "load task configuration",
            ));
        }

        if task.retry_count > MAX_RETRY_COUNT {
            return Err(ConfigurationError::invalid_value(
                "load_task.retry_count",
                task.retry_count.to_string(),
                format!("retry count must not exceed {MAX_RETRY_COUNT}"),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = LoadTaskConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.load_task.retry_count, DEFAULT_RETRY_COUNT);
        assert_eq!(config.load_task.timezone, "UTC");
        assert_eq!(config.registry.initial_capacity, 64);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = LoadTaskConfig::default();
        config.load_task.exec_mem_limit_bytes = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidValue { .. })
        ));

        let mut config = LoadTaskConfig::default();
        config.load_task.cluster_name = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::MissingRequiredField { .. })
        ));

        let mut config = LoadTaskConfig::default();
        config.load_task.timezone = String::new();
        assert!(config.validate().is_err());

        let mut config = LoadTaskConfig::default();
        config.load_task.retry_count = MAX_RETRY_COUNT + 1;
        assert!(config.validate().is_err());
    }
}
