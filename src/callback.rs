//! # Load Task Callbacks
//!
//! Capability interface through which a load task reports back to the job
//! that owns it. The job implements it once and shares it with each of its
//! tasks; the [`crate::runner::LoadTaskRunner`] invokes it.

use crate::error::LoadTaskError;
use crate::task::{FailureRecord, TaskAttachment};
use async_trait::async_trait;

#[async_trait]
pub trait LoadTaskCallback: Send + Sync {
    /// Identifier of the owning job
    fn callback_id(&self) -> i64;

    /// An attempt failed and the task is about to be reset for another one
    async fn on_retry(&self, _signature: i64, _error: &LoadTaskError, _retries_left: u32) {}

    /// The task succeeded; the attachment goes to the commit protocol
    async fn on_task_finished(&self, attachment: TaskAttachment);

    /// The task was abandoned
    async fn on_task_failed(&self, signature: i64, failure: FailureRecord);
}
