//! # Structured Logging Module
//!
//! Environment-aware structured logging for load task execution, plus a few
//! helpers that emit uniformly shaped operation records.

use crate::config::{ConfigManager, LoggingSettings};
use crate::types::LoadId;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging from the environment alone
pub fn init_structured_logging() {
    init_structured_logging_with(&LoggingSettings::default());
}

/// Initialize structured logging. RUST_LOG wins over `settings.level`, which
/// wins over the environment default. JSON output is selected by
/// `settings.json` or `LOAD_TASK_LOG_FORMAT=json`.
pub fn init_structured_logging_with(settings: &LoggingSettings) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let default_level = settings
            .level
            .clone()
            .unwrap_or_else(|| get_log_level(&environment));
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_level));
        let json = settings.json || json_requested();

        let layer = if json {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .json()
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed()
        };

        // Embedders may already have installed a global subscriber
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing with existing subscriber");
        }

        tracing::info!(
            environment = %environment,
            json = json,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

fn json_requested() -> bool {
    std::env::var("LOAD_TASK_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

fn get_environment() -> String {
    ConfigManager::detect_environment()
}

fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Log structured data for load task operations
pub fn log_task_operation(
    operation: &str,
    load_id: Option<LoadId>,
    signature: i64,
    status: &str,
    details: Option<&str>,
) {
    let load_id = load_id.map(|id| id.to_string());
    tracing::info!(
        operation = %operation,
        load_id = load_id.as_deref(),
        signature = signature,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📋 TASK_OPERATION"
    );
}

/// Log structured data for query registry operations
pub fn log_registry_operation(operation: &str, load_id: &LoadId, status: &str) {
    tracing::debug!(
        operation = %operation,
        load_id = %load_id,
        status = %status,
        "📚 REGISTRY_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_mapping() {
        assert_eq!(get_log_level("test"), "debug");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("unknown"), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_structured_logging();
        init_structured_logging_with(&LoggingSettings {
            level: Some("trace".to_string()),
            json: true,
        });
        log_task_operation("execute", Some(LoadId::new(1, 2)), 7, "finished", None);
        log_registry_operation("register", &LoadId::new(1, 2), "ok");
        log_error("test", "execute", "boom", Some("context"));
    }
}
