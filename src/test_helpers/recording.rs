//! Recording callback and canned planner.

use crate::callback::LoadTaskCallback;
use crate::error::{LoadTaskError, LoadTaskResult};
use crate::planner::{ExecutionPlan, Planner, PlanningContext};
use crate::task::{FailureRecord, TaskAttachment};
use crate::types::{FileStatus, LoadId};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackEvent {
    Retry {
        signature: i64,
        error: String,
        retries_left: u32,
    },
    Finished {
        signature: i64,
    },
    Failed {
        signature: i64,
        failure: FailureRecord,
    },
}

/// Callback that remembers every notification in arrival order
#[derive(Debug)]
pub struct RecordingCallback {
    callback_id: i64,
    events: Mutex<Vec<CallbackEvent>>,
    attachments: Mutex<Vec<TaskAttachment>>,
}

impl RecordingCallback {
    pub fn new(callback_id: i64) -> Self {
        Self {
            callback_id,
            events: Mutex::new(Vec::new()),
            attachments: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<CallbackEvent> {
        self.events.lock().clone()
    }

    pub fn attachments(&self) -> Vec<TaskAttachment> {
        self.attachments.lock().clone()
    }
}

#[async_trait]
impl LoadTaskCallback for RecordingCallback {
    fn callback_id(&self) -> i64 {
        self.callback_id
    }

    async fn on_retry(&self, signature: i64, error: &LoadTaskError, retries_left: u32) {
        self.events.lock().push(CallbackEvent::Retry {
            signature,
            error: error.to_string(),
            retries_left,
        });
    }

    async fn on_task_finished(&self, attachment: TaskAttachment) {
        self.events.lock().push(CallbackEvent::Finished {
            signature: attachment.signature(),
        });
        self.attachments.lock().push(attachment);
    }

    async fn on_task_failed(&self, signature: i64, failure: FailureRecord) {
        self.events
            .lock()
            .push(CallbackEvent::Failed { signature, failure });
    }
}

/// Planner returning a fixed plan (re-keyed to the requested load id) or a fixed error
#[derive(Debug)]
pub struct StaticPlanner {
    result: Result<ExecutionPlan, LoadTaskError>,
    calls: AtomicUsize,
}

impl StaticPlanner {
    pub fn returning(plan: ExecutionPlan) -> Self {
        Self {
            result: Ok(plan),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: LoadTaskError) -> Self {
        Self {
            result: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Planner for StaticPlanner {
    fn plan(
        &self,
        _ctx: &PlanningContext<'_>,
        load_id: LoadId,
        _file_statuses: &[Vec<FileStatus>],
        _file_count: usize,
    ) -> LoadTaskResult<ExecutionPlan> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut plan = self.result.clone()?;
        plan.rebind(load_id);
        Ok(plan)
    }
}
