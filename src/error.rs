//! Error types for load task execution.
//!

use crate::config::ConfigurationError;
use crate::types::LoadId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadTaskError {
    /// The planner could not produce an execution plan for the file groups
    #[error("Planning error: {reason}")]
    Planning { reason: String },

    /// No time was left on the job deadline when the attempt started
    #[error("failed to execute plan when the left time is less than 0 (load id {load_id}, remaining {remaining_ms}ms)")]
    DeadlineExceeded { load_id: LoadId, remaining_ms: i64 },

    /// The coordinator did not report completion inside the attempt budget
    #[error("coordinator did not finish before attempt deadline (load id {load_id}, waited {timeout_seconds}s)")]
    Timeout { load_id: LoadId, timeout_seconds: u64 },

    /// The coordinator finished with a non-ok status
    #[error("{message}")]
    Execution { load_id: LoadId, message: String },

    #[error("Registry operation failed for {operation}: {reason}")]
    Registry { operation: String, reason: String },

    #[error("Invalid state for {operation}: {state}")]
    InvalidState { operation: String, state: String },

    #[error("Retry budget exhausted: {remaining} retries left")]
    RetryBudgetExhausted { remaining: u32 },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl LoadTaskError {
    pub fn planning(reason: impl Into<String>) -> Self {
        Self::Planning {
            reason: reason.into(),
        }
    }

    pub fn invalid_state(operation: impl Into<String>, state: impl ToString) -> Self {
        Self::InvalidState {
            operation: operation.into(),
            state: state.to_string(),
        }
    }

    /// Whether this failure was raised by a single execution attempt, which
    /// the owning job may answer with `retry_reset` and another `execute`.
    pub fn is_attempt_failure(&self) -> bool {
        matches!(
            self,
            Self::DeadlineExceeded { .. }
                | Self::Timeout { .. }
                | Self::Execution { .. }
                | Self::Registry { .. }
        )
    }

    /// Short machine-friendly tag used in structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Planning { .. } => "planning",
            Self::DeadlineExceeded { .. } => "deadline_exceeded",
            Self::Timeout { .. } => "timeout",
            Self::Execution { .. } => "execution",
            Self::Registry { .. } => "registry",
            Self::InvalidState { .. } => "invalid_state",
            Self::RetryBudgetExhausted { .. } => "retry_budget_exhausted",
            Self::Configuration(_) => "configuration",
        }
    }
}

impl From<ConfigurationError> for LoadTaskError {
    fn from(error: ConfigurationError) -> Self {
        LoadTaskError::Configuration(error.to_string())
    }
}

pub type LoadTaskResult<T> = anyhow::Result<T, LoadTaskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_error_displays_coordinator_message_verbatim() {
        let err = LoadTaskError::Execution {
            load_id: LoadId::new(1, 2),
            message: "disk full".to_string(),
        };
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(err.kind(), "execution");
    }

    #[test]
    fn test_attempt_failure_classification() {
        let id = LoadId::new(7, 9);
        assert!(LoadTaskError::Timeout {
            load_id: id,
            timeout_seconds: 5
        }
        .is_attempt_failure());
        assert!(LoadTaskError::DeadlineExceeded {
            load_id: id,
            remaining_ms: -10
        }
        .is_attempt_failure());
        assert!(!LoadTaskError::planning("schema mismatch").is_attempt_failure());
        assert!(!LoadTaskError::invalid_state("execute", "created").is_attempt_failure());
    }

    #[test]
    fn test_configuration_error_conversion() {
        let err: LoadTaskError = ConfigurationError::ValidationError {
            error: "cluster_name must not be empty".to_string(),
        }
        .into();
        assert!(matches!(err, LoadTaskError::Configuration(_)));
        assert!(err.to_string().contains("cluster_name"));
    }
}
