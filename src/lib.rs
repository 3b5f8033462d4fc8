#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Load Task Core
//!
//! Execution unit of a bulk file load into a distributed analytical store.
//!
//! ## Overview
//!
//! A load job splits its work into [`task::LoadTask`]s. Each task plans the
//! load once, then runs it as one or more *attempts*: every attempt creates a
//! coordinator for the plan, registers it in the process-wide
//! [`registry::QueryRegistry`], waits for completion within the time left
//! before the job deadline, and turns the coordinator's report into a
//! [`task::TaskAttachment`] for the commit protocol.
//!
//! Failed attempts are handed back to the caller. Retrying is explicit:
//! [`task::LoadTask::retry_reset`] draws a fresh load id and re-keys the plan,
//! refusing once [`task::LoadTask::execute`] has used up the retry budget;
//! [`runner::LoadTaskRunner`] packages that loop and reports through a
//! [`callback::LoadTaskCallback`].
//!
//! ## Module Organization
//!
//! - [`task`] - Load task lifecycle, retry bookkeeping, attachments
//! - [`planner`] - Execution plans and the broker load planner
//! - [`coordinator`] - Distributed execution handle interface
//! - [`registry`] - Process-wide registry of in-flight attempts
//! - [`deadline`] - Clock abstraction and attempt budgets
//! - [`runner`] / [`callback`] - Retry loop and job notifications
//! - [`config`] - Configuration management
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use loadtask_core::coordinator::CoordinatorFactory;
//! use loadtask_core::registry::QueryRegistry;
//! use loadtask_core::task::{LoadTask, LoadTaskParams, LoadTaskServices};
//! use loadtask_core::types::{FileStatus, LoadId};
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     params: LoadTaskParams,
//! #     factory: Arc<dyn CoordinatorFactory>,
//! #     statuses: Vec<Vec<FileStatus>>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(QueryRegistry::new());
//! let mut task = LoadTask::new(params, LoadTaskServices::new(factory, registry));
//!
//! let file_count = statuses.iter().map(Vec::len).sum();
//! task.init(LoadId::generate(), &statuses, file_count)?;
//!
//! let attachment = task.execute().await?;
//! println!("loaded {:?} rows", attachment.loaded_rows());
//! # Ok(())
//! # }
//! ```

pub mod callback;
pub mod config;
pub mod constants;
pub mod coordinator;
pub mod deadline;
pub mod error;
pub mod logging;
pub mod planner;
pub mod registry;
pub mod runner;
pub mod task;
pub mod test_helpers;
pub mod types;

pub use callback::LoadTaskCallback;
pub use config::{ConfigManager, LoadTaskConfig, LoadTaskSettings};
pub use coordinator::{Coordinator, CoordinatorFactory, ExecStatus, QueryType};
pub use deadline::{Clock, DeadlineTracker, SystemClock};
pub use error::{LoadTaskError, LoadTaskResult};
pub use registry::{QueryRegistry, RegistrationGuard};
pub use runner::{LoadTaskRunner, RunOutcome};
pub use task::{
    CancelType, FailureRecord, LoadTask, LoadTaskParams, LoadTaskServices, LoadTaskState,
    TaskAttachment,
};
pub use types::LoadId;
