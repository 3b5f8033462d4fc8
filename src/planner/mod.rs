//! # Load Planning
//!
//! The planner turns the load's file groups and their scanned file statuses
//! into an [`ExecutionPlan`] keyed by a load id. Plans are built once per task
//! and re-keyed in place on retry with [`ExecutionPlan::rebind`].
//!
//! [`Planner`] is the seam a surrounding load job plugs its own planner into;
//! [`LoadingPlanner`] is the broker-load planner used by default.

pub mod loading_planner;
pub mod plan;

pub use loading_planner::LoadingPlanner;
pub use plan::{
    DescriptorTable, ExecutionPlan, FileRange, PlanFragment, ScanNode, SlotDescriptor, TableSink,
    TupleDescriptor,
};

use crate::error::LoadTaskResult;
use crate::types::{DatabaseRef, FileGroup, FileStatus, LoadId, StorageDescriptor, TableRef};

/// Immutable inputs of a load that every plan of a task is derived from
#[derive(Debug, Clone, Copy)]
pub struct PlanningContext<'a> {
    pub callback_id: i64,
    pub txn_id: i64,
    pub database: &'a DatabaseRef,
    pub table: &'a TableRef,
    pub storage: &'a StorageDescriptor,
    pub file_groups: &'a [FileGroup],
    pub strict_mode: bool,
    pub timezone: &'a str,
}

pub trait Planner: Send + Sync {
    /// Build a plan for `load_id` from one list of file statuses per file group.
    ///
    /// Fails with [`crate::LoadTaskError::Planning`] when the input cannot be
    /// planned (schema mismatch, missing or unreadable files).
    fn plan(
        &self,
        ctx: &PlanningContext<'_>,
        load_id: LoadId,
        file_statuses: &[Vec<FileStatus>],
        file_count: usize,
    ) -> LoadTaskResult<ExecutionPlan>;
}
