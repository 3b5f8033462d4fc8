use crate::error::{LoadTaskError, LoadTaskResult};
use crate::types::LoadId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a load task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadTaskState {
    /// Constructed, no plan yet
    Created,
    /// Bound to a load id with a plan ready to submit
    Planned,
    /// An attempt is running
    Executing,
    Succeeded,
    Failed,
}

impl LoadTaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Executing)
    }
}

impl Default for LoadTaskState {
    fn default() -> Self {
        Self::Created
    }
}

impl fmt::Display for LoadTaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Planned => write!(f, "planned"),
            Self::Executing => write!(f, "executing"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Events that move a load task between states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum TaskEvent {
    Plan,
    Start,
    Succeed,
    Fail(String),
    RetryReset,
}

impl TaskEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Plan => "plan",
            Self::Start => "start",
            Self::Succeed => "succeed",
            Self::Fail(_) => "fail",
            Self::RetryReset => "retry_reset",
        }
    }
}

/// Target state for `event` fired in `current`, or `InvalidState`
pub fn determine_target_state(
    current: LoadTaskState,
    event: &TaskEvent,
) -> LoadTaskResult<LoadTaskState> {
    let target = match (current, event) {
        (LoadTaskState::Created, TaskEvent::Plan) => LoadTaskState::Planned,
        (LoadTaskState::Planned, TaskEvent::Start) => LoadTaskState::Executing,
        (LoadTaskState::Executing, TaskEvent::Succeed) => LoadTaskState::Succeeded,
        (LoadTaskState::Executing, TaskEvent::Fail(_)) => LoadTaskState::Failed,

        // Repeated resets before the next attempt are allowed
        (LoadTaskState::Failed, TaskEvent::RetryReset) => LoadTaskState::Planned,
        (LoadTaskState::Planned, TaskEvent::RetryReset) => LoadTaskState::Planned,

        (from_state, event) => {
            return Err(LoadTaskError::invalid_state(event.event_type(), from_state))
        }
    };

    Ok(target)
}

/// Retry bookkeeping of a task as an immutable snapshot.
///
/// Every change produces a new value, so the task swaps the whole snapshot
/// and a failed transition leaves the previous one untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryState {
    load_id: Option<LoadId>,
    retries_left: u32,
    attempts: u32,
}

impl RetryState {
    pub fn new(retry_count: u32) -> Self {
        Self {
            load_id: None,
            retries_left: retry_count,
            attempts: 0,
        }
    }

    pub fn load_id(&self) -> Option<LoadId> {
        self.load_id
    }

    pub fn retries_left(&self) -> u32 {
        self.retries_left
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn bind(self, load_id: LoadId) -> Self {
        Self {
            load_id: Some(load_id),
            ..self
        }
    }

    /// Account for one attempt. The budget is consumed whatever the outcome
    /// and saturates at zero.
    pub fn attempt(self) -> Self {
        Self {
            retries_left: self.retries_left.saturating_sub(1),
            attempts: self.attempts + 1,
            ..self
        }
    }

    /// Rebind to a fresh load id for the next attempt
    pub fn reset(self, load_id: LoadId) -> LoadTaskResult<Self> {
        if self.retries_left == 0 {
            return Err(LoadTaskError::RetryBudgetExhausted { remaining: 0 });
        }
        Ok(self.bind(load_id))
    }
}
