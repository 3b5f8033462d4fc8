//! Scripted coordinator handles for exercising load tasks without a cluster.

use crate::constants::counters;
use crate::coordinator::{Coordinator, CoordinatorFactory, CoordinatorParams, ExecStatus, QueryType};
use crate::error::{LoadTaskError, LoadTaskResult};
use crate::registry::QueryRegistry;
use crate::types::{LoadId, TabletCommitInfo};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOutcome {
    Succeed,
    Fail(String),
    /// `start` itself fails
    StartError(String),
    /// Never completes and ignores the wait timeout
    Hang,
}

/// What a scripted coordinator does once started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockBehavior {
    pub outcome: MockOutcome,
    pub delay: Duration,
    /// How long `start` takes to return
    pub start_delay: Duration,
    pub counters: HashMap<String, String>,
    pub tracking_url: Option<String>,
    pub commit_infos: Vec<TabletCommitInfo>,
}

impl MockBehavior {
    fn with_outcome(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
            start_delay: Duration::ZERO,
            counters: HashMap::from([
                (counters::DPP_NORMAL_ALL.to_string(), "100".to_string()),
                (counters::DPP_ABNORMAL_ALL.to_string(), "0".to_string()),
                (counters::UNSELECTED_ROWS.to_string(), "0".to_string()),
            ]),
            tracking_url: Some("http://be-1:8040/api/_load_error_log?file=error_log_0".to_string()),
            commit_infos: vec![TabletCommitInfo::new(10001, 1), TabletCommitInfo::new(10002, 2)],
        }
    }

    pub fn succeed() -> Self {
        Self::with_outcome(MockOutcome::Succeed)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::with_outcome(MockOutcome::Fail(message.into()))
    }

    pub fn start_error(message: impl Into<String>) -> Self {
        Self::with_outcome(MockOutcome::StartError(message.into()))
    }

    pub fn hang() -> Self {
        Self::with_outcome(MockOutcome::Hang)
    }

    /// Finish only after `delay`
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn starting_after(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    pub fn with_counters(mut self, counters: HashMap<String, String>) -> Self {
        self.counters = counters;
        self
    }

    pub fn with_tracking_url(mut self, url: Option<String>) -> Self {
        self.tracking_url = url;
        self
    }

    pub fn with_commit_infos(mut self, commit_infos: Vec<TabletCommitInfo>) -> Self {
        self.commit_infos = commit_infos;
        self
    }
}

#[derive(Debug, Default, Clone)]
struct RecordedSettings {
    query_type: Option<QueryType>,
    exec_mem_limit: Option<i64>,
    timeout_seconds: Option<u64>,
    started: bool,
    registered_at_start: Option<bool>,
    cancel_reason: Option<String>,
}

/// What a created handle was configured with and how it was used
#[derive(Debug)]
pub struct CoordinatorRecord {
    params: CoordinatorParams,
    settings: Mutex<RecordedSettings>,
}

impl CoordinatorRecord {
    pub fn params(&self) -> &CoordinatorParams {
        &self.params
    }

    pub fn query_type(&self) -> Option<QueryType> {
        self.settings.lock().query_type
    }

    pub fn exec_mem_limit(&self) -> Option<i64> {
        self.settings.lock().exec_mem_limit
    }

    pub fn timeout_seconds(&self) -> Option<u64> {
        self.settings.lock().timeout_seconds
    }

    pub fn was_started(&self) -> bool {
        self.settings.lock().started
    }

    /// Whether the registry already held this handle's load id when `start` ran
    pub fn was_registered_at_start(&self) -> bool {
        self.settings.lock().registered_at_start.unwrap_or(false)
    }

    pub fn cancel_reason(&self) -> Option<String> {
        self.settings.lock().cancel_reason.clone()
    }
}

#[derive(Debug)]
struct MockCoordinator {
    record: Arc<CoordinatorRecord>,
    behavior: MockBehavior,
    registry: Option<Arc<QueryRegistry>>,
}

#[async_trait]
impl Coordinator for MockCoordinator {
    fn query_id(&self) -> LoadId {
        self.record.params.load_id
    }

    fn set_query_type(&mut self, query_type: QueryType) {
        self.record.settings.lock().query_type = Some(query_type);
    }

    fn set_exec_mem_limit(&mut self, bytes: i64) {
        self.record.settings.lock().exec_mem_limit = Some(bytes);
    }

    fn set_timeout_seconds(&mut self, seconds: u64) {
        self.record.settings.lock().timeout_seconds = Some(seconds);
    }

    async fn start(&self) -> LoadTaskResult<()> {
        let load_id = self.query_id();
        {
            let mut settings = self.record.settings.lock();
            settings.started = true;
            settings.registered_at_start = self.registry.as_ref().map(|r| r.contains(&load_id));
        }
        if !self.behavior.start_delay.is_zero() {
            tokio::time::sleep(self.behavior.start_delay).await;
        }

        match &self.behavior.outcome {
            MockOutcome::StartError(message) => Err(LoadTaskError::Execution {
                load_id,
                message: message.clone(),
            }),
            _ => Ok(()),
        }
    }

    async fn await_completion(&self, timeout: Duration) -> bool {
        if self.behavior.outcome == MockOutcome::Hang {
            std::future::pending::<()>().await;
        }
        if self.behavior.delay <= timeout {
            tokio::time::sleep(self.behavior.delay).await;
            true
        } else {
            tokio::time::sleep(timeout).await;
            false
        }
    }

    fn status(&self) -> ExecStatus {
        if let Some(reason) = self.record.cancel_reason() {
            return ExecStatus::error(format!("cancelled: {reason}"));
        }
        match &self.behavior.outcome {
            MockOutcome::Fail(message) | MockOutcome::StartError(message) => {
                ExecStatus::error(message.clone())
            }
            MockOutcome::Succeed | MockOutcome::Hang => ExecStatus::Ok,
        }
    }

    fn load_counters(&self) -> HashMap<String, String> {
        self.behavior.counters.clone()
    }

    fn tracking_url(&self) -> Option<String> {
        self.behavior.tracking_url.clone()
    }

    fn commit_infos(&self) -> Vec<TabletCommitInfo> {
        self.behavior.commit_infos.clone()
    }

    fn cancel(&self, reason: &str) {
        self.record.settings.lock().cancel_reason = Some(reason.to_string());
    }
}

/// Factory handing out scripted coordinators, one behavior per attempt
#[derive(Debug)]
pub struct MockCoordinatorFactory {
    queue: Mutex<VecDeque<MockBehavior>>,
    fallback: MockBehavior,
    registry: Option<Arc<QueryRegistry>>,
    created: Mutex<Vec<Arc<CoordinatorRecord>>>,
}

impl MockCoordinatorFactory {
    /// Every attempt behaves the same
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: behavior,
            registry: None,
            created: Mutex::new(Vec::new()),
        }
    }

    /// Attempts follow `behaviors` in order; the last one repeats
    pub fn with_sequence(behaviors: Vec<MockBehavior>) -> Self {
        let fallback = behaviors.last().cloned().unwrap_or_else(MockBehavior::succeed);
        Self {
            queue: Mutex::new(behaviors.into()),
            fallback,
            registry: None,
            created: Mutex::new(Vec::new()),
        }
    }

    /// Let handles observe the registry so tests can check register-before-start
    pub fn with_registry(mut self, registry: Arc<QueryRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn created(&self) -> Vec<Arc<CoordinatorRecord>> {
        self.created.lock().clone()
    }
}

impl CoordinatorFactory for MockCoordinatorFactory {
    fn create(&self, params: CoordinatorParams) -> Box<dyn Coordinator> {
        let behavior = self
            .queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        let record = Arc::new(CoordinatorRecord {
            params,
            settings: Mutex::new(RecordedSettings::default()),
        });
        self.created.lock().push(Arc::clone(&record));

        Box::new(MockCoordinator {
            record,
            behavior,
            registry: self.registry.clone(),
        })
    }
}
