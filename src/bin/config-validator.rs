//! # Load Task Configuration Validator
//!
//! Loads and validates the load task configuration for an environment and
//! prints the merged result.

use anyhow::Context;
use clap::Parser;
use loadtask_core::config::ConfigManager;
use loadtask_core::logging::init_structured_logging;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "config-validator")]
#[command(about = "Validate load task configuration files")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Environment to validate (defaults to LOAD_TASK_ENV, then "development")
    #[arg(short, long)]
    environment: Option<String>,

    /// Configuration directory path (default: ./config)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,
}

impl Cli {
    fn environment(&self) -> String {
        self.environment
            .clone()
            .unwrap_or_else(ConfigManager::detect_environment)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_structured_logging();

    let environment = cli.environment();
    println!("🔍 Validating load task configuration for '{environment}'");

    let manager = ConfigManager::load_from_directory_with_env(cli.config_dir, &environment)
        .with_context(|| format!("configuration for environment '{environment}' is invalid"))?;

    println!("✅ Configuration valid ({})", manager.config_directory().display());
    println!(
        "{}",
        serde_json::to_string_pretty(manager.config()).context("failed to render configuration")?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_bind_to_their_fields() {
        let cli = Cli::try_parse_from([
            "config-validator",
            "--environment",
            "production",
            "--config-dir",
            "/etc/load_task",
        ])
        .unwrap();
        assert_eq!(cli.environment(), "production");
        assert_eq!(cli.config_dir, Some(PathBuf::from("/etc/load_task")));

        let short = Cli::try_parse_from(["config-validator", "-e", "test", "-c", "cfg"]).unwrap();
        assert_eq!(short.environment.as_deref(), Some("test"));
        assert_eq!(short.config_dir, Some(PathBuf::from("cfg")));
    }

    #[test]
    fn test_help_is_not_an_environment() {
        let err = Cli::try_parse_from(["config-validator", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_missing_environment_falls_back_to_detection() {
        let cli = Cli::try_parse_from(["config-validator"]).unwrap();
        assert!(cli.environment.is_none());
        assert_eq!(cli.environment(), ConfigManager::detect_environment());
    }
}
