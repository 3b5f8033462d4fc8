//! Layered configuration loading from disk.

use config::Map;
use loadtask_core::config::{ConfigManager, ConfigurationError, LoadTaskConfig};
use loadtask_core::registry::QueryRegistry;
use loadtask_core::task::LoadTaskParams;
use loadtask_core::test_helpers::{sample_database, sample_table};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn repo_config_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config")
}

fn write(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

#[test]
fn test_shipped_configuration_is_valid_for_every_environment() {
    for environment in ["development", "test", "production"] {
        let manager =
            ConfigManager::load_with_overrides(Some(repo_config_dir()), environment, Map::new())
                .unwrap_or_else(|e| panic!("{environment}: {e}"));
        assert_eq!(manager.environment(), environment);
        assert!(manager.config().validate().is_ok());
    }
}

#[test]
fn test_environment_file_overrides_base() {
    let base = ConfigManager::load_with_overrides(Some(repo_config_dir()), "development", Map::new())
        .unwrap();
    let test = ConfigManager::load_with_overrides(Some(repo_config_dir()), "test", Map::new())
        .unwrap();
    let production =
        ConfigManager::load_with_overrides(Some(repo_config_dir()), "production", Map::new())
            .unwrap();

    assert_eq!(base.config().load_task.retry_count, 2);
    assert_eq!(test.config().load_task.retry_count, 1);
    assert_eq!(test.config().load_task.cluster_name, "default_cluster");
    assert!(production.config().load_task.strict_mode);
    assert!(production.config().logging.json);
    assert_eq!(production.config().registry.initial_capacity, 1024);
}

#[test]
fn test_variable_overrides_win_over_files() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("load_task.toml"), "[load_task]\nretry_count = 2\n");
    write(
        &dir.path().join("environments/staging/load_task.toml"),
        "[load_task]\nretry_count = 4\ntimezone = \"Asia/Shanghai\"\n",
    );

    let mut overrides = Map::new();
    overrides.insert("LOAD_TASK__LOAD_TASK__RETRY_COUNT".to_string(), "6".to_string());
    overrides.insert("LOAD_TASK__REGISTRY__INITIAL_CAPACITY".to_string(), "16".to_string());

    let manager =
        ConfigManager::load_with_overrides(Some(dir.path().to_path_buf()), "staging", overrides)
            .unwrap();
    let config = manager.config();

    assert_eq!(config.load_task.retry_count, 6);
    assert_eq!(config.load_task.timezone, "Asia/Shanghai");
    assert_eq!(config.registry.initial_capacity, 16);
    assert_eq!(config.load_task.exec_mem_limit_bytes, LoadTaskConfig::default().load_task.exec_mem_limit_bytes);
}

#[test]
fn test_out_of_range_retry_count_is_rejected() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("load_task.toml"), "[load_task]\nretry_count = 50\n");

    let err = ConfigManager::load_with_overrides(Some(dir.path().to_path_buf()), "test", Map::new())
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidValue { ref field, .. } if field == "load_task.retry_count"));
}

#[test]
fn test_malformed_file_is_reported() {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join("load_task.toml"), "[load_task\nretry_count = ");

    let err = ConfigManager::load_with_overrides(Some(dir.path().to_path_buf()), "test", Map::new())
        .unwrap_err();
    assert!(matches!(err, ConfigurationError::InvalidToml { .. }));
}

#[test]
fn test_settings_flow_into_task_params() {
    let manager =
        ConfigManager::load_with_overrides(Some(repo_config_dir()), "production", Map::new())
            .unwrap();
    let settings = &manager.config().load_task;

    let params = LoadTaskParams::new(1, sample_database(), sample_table(), 2, 0).with_settings(settings);
    assert!(params.strict_mode);
    assert_eq!(params.retry_count, settings.retry_count);
    assert_eq!(params.exec_mem_limit, settings.exec_mem_limit_bytes);

    let registry = QueryRegistry::with_capacity(manager.config().registry.initial_capacity);
    assert!(registry.is_empty());
}
