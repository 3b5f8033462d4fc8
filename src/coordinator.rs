//! # Coordinator Contract
//!
//! A coordinator drives distributed execution of one plan across the cluster
//! and reports how it went. Handles are one-shot: the load task asks its
//! [`CoordinatorFactory`] for a fresh handle on every attempt, configures it
//! through the `set_*` mutators while it still owns it exclusively, and only
//! then shares it with the query registry.
//!
//! The accessors for counters, tracking URL and commit infos are only
//! meaningful after [`Coordinator::await_completion`] returned `true` and
//! [`Coordinator::status`] is ok.

use crate::error::LoadTaskResult;
use crate::planner::{DescriptorTable, ExecutionPlan, PlanFragment, ScanNode};
use crate::types::{LoadId, TabletCommitInfo};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    Load,
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => write!(f, "load"),
        }
    }
}

/// Final status reported by a coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecStatus {
    Ok,
    Error { message: String },
}

impl ExecStatus {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Ok => None,
            Self::Error { message } => Some(message),
        }
    }
}

/// Everything a coordinator is constructed from
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorParams {
    pub callback_id: i64,
    pub load_id: LoadId,
    pub desc_table: DescriptorTable,
    pub fragments: Vec<PlanFragment>,
    pub scan_nodes: Vec<ScanNode>,
    pub cluster_name: String,
    pub timezone: String,
}

impl CoordinatorParams {
    pub fn from_plan(callback_id: i64, plan: &ExecutionPlan, cluster_name: &str) -> Self {
        Self {
            callback_id,
            load_id: plan.load_id(),
            desc_table: plan.desc_table().clone(),
            fragments: plan.fragments().to_vec(),
            scan_nodes: plan.scan_nodes().to_vec(),
            cluster_name: cluster_name.to_string(),
            timezone: plan.timezone().to_string(),
        }
    }
}

#[async_trait]
pub trait Coordinator: Send + Sync + fmt::Debug {
    /// Load id this handle executes under
    fn query_id(&self) -> LoadId;

    fn set_query_type(&mut self, query_type: QueryType);

    fn set_exec_mem_limit(&mut self, bytes: i64);

    fn set_timeout_seconds(&mut self, seconds: u64);

    /// Submit the plan and return once execution has begun
    async fn start(&self) -> LoadTaskResult<()>;

    /// Wait up to `timeout` for execution to finish; `true` when it did
    async fn await_completion(&self, timeout: Duration) -> bool;

    fn status(&self) -> ExecStatus;

    fn load_counters(&self) -> HashMap<String, String>;

    fn tracking_url(&self) -> Option<String>;

    fn commit_infos(&self) -> Vec<TabletCommitInfo>;

    /// Ask the handle to abort. Exposed to registry observers; the load task
    /// never calls it itself.
    fn cancel(&self, reason: &str);
}

/// Creates one fresh coordinator handle per attempt
pub trait CoordinatorFactory: Send + Sync {
    fn create(&self, params: CoordinatorParams) -> Box<dyn Coordinator>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_status_accessors() {
        assert!(ExecStatus::Ok.is_ok());
        assert_eq!(ExecStatus::Ok.error_message(), None);

        let status = ExecStatus::error("disk full");
        assert!(!status.is_ok());
        assert_eq!(status.error_message(), Some("disk full"));
    }

    #[test]
    fn test_params_copy_plan_contents() {
        let load_id = LoadId::new(5, 6);
        let plan = ExecutionPlan::new(load_id, DescriptorTable::default(), vec![], vec![], "UTC");
        let params = CoordinatorParams::from_plan(42, &plan, "default_cluster");

        assert_eq!(params.callback_id, 42);
        assert_eq!(params.load_id, load_id);
        assert_eq!(params.cluster_name, "default_cluster");
        assert_eq!(params.timezone, "UTC");
        assert!(params.fragments.is_empty());
    }

    #[test]
    fn test_query_type_display() {
        assert_eq!(QueryType::Load.to_string(), "load");
    }
}
