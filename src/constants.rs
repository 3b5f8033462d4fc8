//! # Load Constants
//!
//! Counter keys reported by the coordinator, default settings and the
//! messages attached to failure records.

/// Retry budget given to a new load task
pub const DEFAULT_RETRY_COUNT: u32 = 2;

/// Default per-attempt execution memory limit (2 GiB)
pub const DEFAULT_EXEC_MEM_LIMIT_BYTES: i64 = 2 * 1024 * 1024 * 1024;

pub const DEFAULT_CLUSTER_NAME: &str = "default_cluster";

pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Message carried by a fresh failure record
pub const DEFAULT_FAILURE_MESSAGE: &str = "load execution failed";

/// Keys of the load counters map reported by the coordinator
pub mod counters {
    /// Rows that passed filtering and were written
    pub const DPP_NORMAL_ALL: &str = "dpp.norm.ALL";
    /// Rows rejected by quality filtering
    pub const DPP_ABNORMAL_ALL: &str = "dpp.abnorm.ALL";
    /// Rows dropped by the load's WHERE predicate
    pub const UNSELECTED_ROWS: &str = "unselected.rows";
}
