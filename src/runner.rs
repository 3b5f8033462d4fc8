//! # Load Task Runner
//!
//! Drives one load task to a terminal outcome on behalf of its job: executes,
//! answers attempt failures with `retry_reset` while budget remains, and
//! reports the result through the job's [`LoadTaskCallback`].
//!
//! The retry loop lives here, outside the task, so the task keeps a single
//! attempt per `execute` call and never retries on its own.
//!
//! ```rust,no_run
//! use loadtask_core::runner::{LoadTaskRunner, RunOutcome};
//! # use loadtask_core::{callback::LoadTaskCallback, task::LoadTask};
//! # use std::sync::Arc;
//!
//! # async fn example(mut task: LoadTask, callback: Arc<dyn LoadTaskCallback>) -> Result<(), Box<dyn std::error::Error>> {
//! let runner = LoadTaskRunner::new(callback);
//! match runner.run(&mut task).await? {
//!     RunOutcome::Finished(attachment) => println!("loaded {:?} rows", attachment.loaded_rows()),
//!     RunOutcome::Abandoned(failure) => println!("load abandoned: {failure}"),
//! }
//! # Ok(())
//! # }
//! ```

use crate::callback::LoadTaskCallback;
use crate::error::{LoadTaskError, LoadTaskResult};
use crate::logging::{log_error, log_task_operation};
use crate::task::{CancelType, FailureRecord, LoadTask, TaskAttachment};
use std::sync::Arc;
use tracing::{instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Finished(TaskAttachment),
    Abandoned(FailureRecord),
}

pub struct LoadTaskRunner {
    callback: Arc<dyn LoadTaskCallback>,
}

impl LoadTaskRunner {
    pub fn new(callback: Arc<dyn LoadTaskCallback>) -> Self {
        Self { callback }
    }

    /// Run `task` until it succeeds or its budget is spent.
    ///
    /// Attempt failures end in `Ok(RunOutcome::Abandoned)`; misuse of the task
    /// (wrong state, missing plan) is returned as an error without notifying
    /// the callback.
    #[instrument(skip_all, fields(signature = task.signature(), callback_id = task.callback_id()))]
    pub async fn run(&self, task: &mut LoadTask) -> LoadTaskResult<RunOutcome> {
        if self.callback.callback_id() != task.callback_id() {
            warn!(
                runner_callback_id = self.callback.callback_id(),
                "Task belongs to a different callback"
            );
        }

        loop {
            let load_id = task.load_id();
            match task.execute().await {
                Ok(attachment) => {
                    log_task_operation("execute", load_id, task.signature(), "finished", None);
                    self.callback.on_task_finished(attachment.clone()).await;
                    return Ok(RunOutcome::Finished(attachment));
                }
                Err(err) if err.is_attempt_failure() && task.retries_left() > 0 => {
                    log_task_operation(
                        "execute",
                        load_id,
                        task.signature(),
                        "retrying",
                        Some(&err.to_string()),
                    );
                    self.callback
                        .on_retry(task.signature(), &err, task.retries_left())
                        .await;
                    task.retry_reset()?;
                }
                Err(err) if err.is_attempt_failure() => {
                    task.record_failure(cancel_type_for(&err), err.to_string());
                    log_error("load_task_runner", "execute", &err.to_string(), None);
                    let failure = task.failure_record().clone();
                    self.callback
                        .on_task_failed(task.signature(), failure.clone())
                        .await;
                    return Ok(RunOutcome::Abandoned(failure));
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn cancel_type_for(err: &LoadTaskError) -> CancelType {
    match err {
        LoadTaskError::DeadlineExceeded { .. } => CancelType::Timeout,
        _ => CancelType::LoadRunFail,
    }
}
