//! # Load Tasks
//!
//! The retryable, deadline-bound execution unit of a bulk load and the
//! records it produces:
//!
//! - [`LoadTask`]: plans once, executes one attempt per call, resets for retry
//! - [`LoadTaskState`] / [`TaskEvent`]: lifecycle and its transition function
//! - [`RetryState`]: immutable retry bookkeeping snapshot
//! - [`TaskAttachment`]: success artifact for the commit protocol
//! - [`FailureRecord`]: what the job reports when it abandons the task

pub mod attachment;
pub mod failure;
pub mod load_task;
pub mod state;

pub use attachment::TaskAttachment;
pub use failure::{CancelType, FailureRecord};
pub use load_task::{LoadTask, LoadTaskParams, LoadTaskServices};
pub use state::{determine_target_state, LoadTaskState, RetryState, TaskEvent};
