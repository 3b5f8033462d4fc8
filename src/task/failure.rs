use crate::constants::DEFAULT_FAILURE_MESSAGE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a load was abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelType {
    Unknown,
    LoadRunFail,
    Timeout,
    UserCancel,
    TxnUnknown,
}

impl fmt::Display for CancelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "UNKNOWN"),
            Self::LoadRunFail => write!(f, "LOAD_RUN_FAIL"),
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::UserCancel => write!(f, "USER_CANCEL"),
            Self::TxnUnknown => write!(f, "TXN_UNKNOWN"),
        }
    }
}

/// Failure record handed to the job when the task is abandoned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub cancel_type: CancelType,
    pub message: String,
}

impl FailureRecord {
    pub fn new(cancel_type: CancelType, message: impl Into<String>) -> Self {
        Self {
            cancel_type,
            message: message.into(),
        }
    }
}

impl Default for FailureRecord {
    fn default() -> Self {
        Self::new(CancelType::LoadRunFail, DEFAULT_FAILURE_MESSAGE)
    }
}

impl fmt::Display for FailureRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type:{}; msg:{}", self.cancel_type, self.message)
    }
}
