//! # Load Task
//!
//! One bulk load of a batch of files into a table, executed one attempt at a
//! time under a job-wide absolute deadline.
//!
//! ## Lifecycle
//!
//! ```text
//! Created ──init──▶ Planned ──execute──▶ Executing ──▶ Succeeded
//!                      ▲                     │
//!                      └──── retry_reset ◀── Failed
//! ```
//!
//! Each attempt runs under its own load id. `retry_reset` draws a fresh id and
//! re-keys the existing plan, so a retried attempt never shares a registry
//! entry with an earlier one. The task itself never retries: failures are
//! returned to the caller, which owns the retry decision.
//!
//! ## Attempt protocol
//!
//! 1. Compute the remaining whole seconds before the deadline; give up with
//!    `DeadlineExceeded` before touching the coordinator if none are left.
//! 2. Create a coordinator for the plan (query type LOAD, memory limit,
//!    timeout = remaining seconds).
//! 3. Register it in the query registry. The registration is scoped and is
//!    released on every exit path.
//! 4. Start it and wait for completion within the same budget.
//! 5. Build the attachment from the reported counters, tracking URL and
//!    commit infos, or fail with `Timeout` / `Execution`.

use crate::constants::{DEFAULT_EXEC_MEM_LIMIT_BYTES, DEFAULT_RETRY_COUNT, DEFAULT_TIMEZONE};
use crate::config::LoadTaskSettings;
use crate::coordinator::{Coordinator, CoordinatorFactory, CoordinatorParams, ExecStatus, QueryType};
use crate::deadline::{AttemptBudget, Clock, DeadlineTracker, SystemClock};
use crate::error::{LoadTaskError, LoadTaskResult};
use crate::planner::{ExecutionPlan, LoadingPlanner, Planner, PlanningContext};
use crate::registry::QueryRegistry;
use crate::types::{DatabaseRef, FileGroup, FileStatus, LoadId, StorageDescriptor, TableRef};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::attachment::TaskAttachment;
use super::failure::{CancelType, FailureRecord};
use super::state::{determine_target_state, LoadTaskState, RetryState, TaskEvent};

static NEXT_SIGNATURE: AtomicI64 = AtomicI64::new(1);

fn next_signature() -> i64 {
    NEXT_SIGNATURE.fetch_add(1, Ordering::Relaxed)
}

/// Immutable description of the load a task performs
#[derive(Debug, Clone)]
pub struct LoadTaskParams {
    pub callback_id: i64,
    pub database: DatabaseRef,
    pub table: TableRef,
    pub storage: StorageDescriptor,
    pub file_groups: Vec<FileGroup>,
    /// Absolute job deadline, epoch milliseconds
    pub deadline_ms: i64,
    pub exec_mem_limit: i64,
    pub strict_mode: bool,
    pub txn_id: i64,
    pub timezone: String,
    pub retry_count: u32,
}

impl LoadTaskParams {
    pub fn new(
        callback_id: i64,
        database: DatabaseRef,
        table: TableRef,
        txn_id: i64,
        deadline_ms: i64,
    ) -> Self {
        Self {
            callback_id,
            database,
            table,
            storage: StorageDescriptor::default(),
            file_groups: Vec::new(),
            deadline_ms,
            exec_mem_limit: DEFAULT_EXEC_MEM_LIMIT_BYTES,
            strict_mode: false,
            txn_id,
            timezone: DEFAULT_TIMEZONE.to_string(),
            retry_count: DEFAULT_RETRY_COUNT,
        }
    }

    /// Take memory limit, strict mode, timezone and retry budget from configuration
    pub fn with_settings(mut self, settings: &LoadTaskSettings) -> Self {
        self.exec_mem_limit = settings.exec_mem_limit_bytes;
        self.strict_mode = settings.strict_mode;
        self.timezone = settings.timezone.clone();
        self.retry_count = settings.retry_count;
        if self.database.cluster_name.is_empty() {
            self.database.cluster_name = settings.cluster_name.clone();
        }
        self
    }

    pub fn with_storage(mut self, storage: StorageDescriptor) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_file_groups(mut self, file_groups: Vec<FileGroup>) -> Self {
        self.file_groups = file_groups;
        self
    }

    pub fn with_exec_mem_limit(mut self, bytes: i64) -> Self {
        self.exec_mem_limit = bytes;
        self
    }

    pub fn with_strict_mode(mut self, strict_mode: bool) -> Self {
        self.strict_mode = strict_mode;
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }
}

/// Collaborators a task drives, injected by whoever schedules the load
#[derive(Clone)]
pub struct LoadTaskServices {
    pub planner: Arc<dyn Planner>,
    pub coordinators: Arc<dyn CoordinatorFactory>,
    pub registry: Arc<QueryRegistry>,
    pub clock: Arc<dyn Clock>,
}

impl LoadTaskServices {
    pub fn new(coordinators: Arc<dyn CoordinatorFactory>, registry: Arc<QueryRegistry>) -> Self {
        Self {
            planner: Arc::new(LoadingPlanner::new()),
            coordinators,
            registry,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_planner(mut self, planner: Arc<dyn Planner>) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

pub struct LoadTask {
    signature: i64,
    params: LoadTaskParams,
    deadline: DeadlineTracker,
    state: LoadTaskState,
    retry: RetryState,
    used_load_ids: Vec<LoadId>,
    failure: FailureRecord,
    plan: Option<ExecutionPlan>,
    attachment: Option<TaskAttachment>,
    services: LoadTaskServices,
}

/// Everything a single attempt reads from its task
struct Attempt<'a> {
    signature: i64,
    params: &'a LoadTaskParams,
    deadline: DeadlineTracker,
    plan: Option<&'a ExecutionPlan>,
    services: &'a LoadTaskServices,
}

impl Attempt<'_> {
    async fn run(&self, load_id: LoadId) -> LoadTaskResult<TaskAttachment> {
        let now = self.services.clock.now_millis();
        let Some(budget) = self.deadline.attempt_budget_at(now) else {
            return Err(LoadTaskError::DeadlineExceeded {
                load_id,
                remaining_ms: self.deadline.remaining_ms_at(now),
            });
        };

        let plan = self
            .plan
            .ok_or_else(|| LoadTaskError::invalid_state("execute", "no plan"))?;

        let mut handle = self.services.coordinators.create(CoordinatorParams::from_plan(
            self.params.callback_id,
            plan,
            &self.params.database.cluster_name,
        ));
        handle.set_query_type(QueryType::Load);
        handle.set_exec_mem_limit(self.params.exec_mem_limit);
        handle.set_timeout_seconds(budget.timeout_seconds);
        let handle: Arc<dyn Coordinator> = Arc::from(handle);

        let _registration = self
            .services
            .registry
            .register_scoped(load_id, Arc::clone(&handle))?;

        self.run_coordinator(handle.as_ref(), load_id, budget).await
    }

    async fn run_coordinator(
        &self,
        handle: &dyn Coordinator,
        load_id: LoadId,
        budget: AttemptBudget,
    ) -> LoadTaskResult<TaskAttachment> {
        debug!(
            load_id = %load_id,
            query_id = %handle.query_id(),
            timeout_seconds = budget.timeout_seconds,
            "Begin to execute plan"
        );

        // Start and wait share one budget; a handle that ignores its own
        // timeout must not stretch the attempt either
        let submitted = async {
            handle.start().await?;
            Ok::<bool, LoadTaskError>(handle.await_completion(budget.timeout()).await)
        };
        let finished = match tokio::time::timeout(budget.timeout(), submitted).await {
            Ok(finished) => finished?,
            Err(_) => false,
        };
        if !finished {
            return Err(LoadTaskError::Timeout {
                load_id,
                timeout_seconds: budget.timeout_seconds,
            });
        }

        match handle.status() {
            ExecStatus::Ok => Ok(TaskAttachment::new(
                self.signature,
                handle.load_counters(),
                handle.tracking_url(),
                handle.commit_infos(),
            )),
            ExecStatus::Error { message } => Err(LoadTaskError::Execution { load_id, message }),
        }
    }
}

/// Holds a task in `Executing` for the length of one attempt. Dropped
/// without [`AttemptGuard::settle`], it moves the task to `Failed`.
struct AttemptGuard<'a> {
    state: &'a mut LoadTaskState,
    load_id: LoadId,
    settled: bool,
}

impl AttemptGuard<'_> {
    fn settle(mut self, event: &TaskEvent) -> LoadTaskResult<()> {
        *self.state = determine_target_state(*self.state, event)?;
        self.settled = true;
        Ok(())
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        *self.state = LoadTaskState::Failed;
        warn!(load_id = %self.load_id, "Loading task attempt abandoned before completion");
    }
}

impl std::fmt::Debug for LoadTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadTask")
            .field("signature", &self.signature)
            .field("callback_id", &self.params.callback_id)
            .field("txn_id", &self.params.txn_id)
            .field("state", &self.state)
            .field("retry", &self.retry)
            .field("failure", &self.failure)
            .finish_non_exhaustive()
    }
}

impl LoadTask {
    pub fn new(params: LoadTaskParams, services: LoadTaskServices) -> Self {
        Self {
            signature: next_signature(),
            deadline: DeadlineTracker::new(params.deadline_ms),
            retry: RetryState::new(params.retry_count),
            params,
            state: LoadTaskState::Created,
            used_load_ids: Vec::new(),
            failure: FailureRecord::default(),
            plan: None,
            attachment: None,
            services,
        }
    }

    /// Bind the task to `load_id` and build its plan
    pub fn init(
        &mut self,
        load_id: LoadId,
        file_statuses: &[Vec<FileStatus>],
        file_count: usize,
    ) -> LoadTaskResult<()> {
        let next_state = determine_target_state(self.state, &TaskEvent::Plan)?;

        let ctx = PlanningContext {
            callback_id: self.params.callback_id,
            txn_id: self.params.txn_id,
            database: &self.params.database,
            table: &self.params.table,
            storage: &self.params.storage,
            file_groups: &self.params.file_groups,
            strict_mode: self.params.strict_mode,
            timezone: &self.params.timezone,
        };
        let plan = self
            .services
            .planner
            .plan(&ctx, load_id, file_statuses, file_count)?;

        self.plan = Some(plan);
        self.retry = self.retry.bind(load_id);
        self.used_load_ids.push(load_id);
        self.state = next_state;

        debug!(
            load_id = %load_id,
            callback_id = self.params.callback_id,
            signature = self.signature,
            "Load task planned"
        );
        Ok(())
    }

    /// Run one attempt. Consumes one unit of retry budget whatever the outcome.
    ///
    /// Dropping the returned future mid-attempt settles the task as `Failed`
    /// and releases its registration, so it can still be reset and retried.
    #[instrument(skip(self), fields(signature = self.signature, callback_id = self.params.callback_id))]
    pub async fn execute(&mut self) -> LoadTaskResult<TaskAttachment> {
        let next_state = determine_target_state(self.state, &TaskEvent::Start)?;
        let load_id = self
            .retry
            .load_id()
            .ok_or_else(|| LoadTaskError::invalid_state("execute", "unbound load id"))?;

        info!(
            load_id = %load_id,
            retries_left = self.retry.retries_left(),
            "Begin to execute loading task"
        );
        if self.retry.retries_left() == 0 {
            warn!(load_id = %load_id, "Executing load task with no retry budget left");
        }

        self.retry = self.retry.attempt();
        self.state = next_state;

        let attempt = Attempt {
            signature: self.signature,
            params: &self.params,
            deadline: self.deadline,
            plan: self.plan.as_ref(),
            services: &self.services,
        };
        let guard = AttemptGuard {
            state: &mut self.state,
            load_id,
            settled: false,
        };

        match attempt.run(load_id).await {
            Ok(attachment) => {
                guard.settle(&TaskEvent::Succeed)?;
                self.attachment = Some(attachment.clone());
                info!(load_id = %load_id, "Loading task finished");
                Ok(attachment)
            }
            Err(err) => {
                guard.settle(&TaskEvent::Fail(err.to_string()))?;
                warn!(
                    load_id = %load_id,
                    error_kind = err.kind(),
                    error = %err,
                    retries_left = self.retry.retries_left(),
                    "Loading task attempt failed"
                );
                Err(err)
            }
        }
    }

    /// Prepare the next attempt under a fresh load id, keeping the plan's
    /// fragments and scan nodes.
    pub fn retry_reset(&mut self) -> LoadTaskResult<LoadId> {
        let next_state = determine_target_state(self.state, &TaskEvent::RetryReset)?;
        if self.plan.is_none() {
            return Err(LoadTaskError::invalid_state("retry_reset", "no plan"));
        }

        let load_id = loop {
            let candidate = LoadId::generate();
            if !self.used_load_ids.contains(&candidate) {
                break candidate;
            }
        };
        let retry = self.retry.reset(load_id)?;

        if let Some(plan) = self.plan.as_mut() {
            plan.rebind(load_id);
        }
        self.retry = retry;
        self.used_load_ids.push(load_id);
        self.attachment = None;
        self.state = next_state;

        info!(
            load_id = %load_id,
            signature = self.signature,
            retries_left = self.retry.retries_left(),
            "Load task reset for retry"
        );
        Ok(load_id)
    }

    /// Overwrite the failure record on terminal abandonment
    pub fn record_failure(&mut self, cancel_type: CancelType, message: impl Into<String>) {
        self.failure = FailureRecord::new(cancel_type, message);
    }

    pub fn signature(&self) -> i64 {
        self.signature
    }

    pub fn callback_id(&self) -> i64 {
        self.params.callback_id
    }

    pub fn txn_id(&self) -> i64 {
        self.params.txn_id
    }

    pub fn database(&self) -> &DatabaseRef {
        &self.params.database
    }

    pub fn table(&self) -> &TableRef {
        &self.params.table
    }

    pub fn load_id(&self) -> Option<LoadId> {
        self.retry.load_id()
    }

    /// Every load id this task has been bound to, oldest first
    pub fn used_load_ids(&self) -> &[LoadId] {
        &self.used_load_ids
    }

    pub fn state(&self) -> LoadTaskState {
        self.state
    }

    pub fn retry_state(&self) -> RetryState {
        self.retry
    }

    pub fn retries_left(&self) -> u32 {
        self.retry.retries_left()
    }

    pub fn deadline(&self) -> DeadlineTracker {
        self.deadline
    }

    pub fn plan(&self) -> Option<&ExecutionPlan> {
        self.plan.as_ref()
    }

    pub fn attachment(&self) -> Option<&TaskAttachment> {
        self.attachment.as_ref()
    }

    pub fn failure_record(&self) -> &FailureRecord {
        &self.failure
    }
}
