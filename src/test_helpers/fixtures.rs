//! # Test Fixtures
//!
//! A small, fixed load (two CSV files into `sales.orders`) and a clock that
//! only moves when told to.

use crate::constants::DEFAULT_CLUSTER_NAME;
use crate::deadline::Clock;
use crate::task::LoadTaskParams;
use crate::types::{Column, DatabaseRef, FileGroup, FileStatus, StorageDescriptor, TableRef};
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

pub const SAMPLE_CALLBACK_ID: i64 = 7001;
pub const SAMPLE_TXN_ID: i64 = 88_001;

/// Clock pinned to a caller-controlled instant
#[derive(Debug)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

pub fn sample_database() -> DatabaseRef {
    DatabaseRef {
        id: 10,
        name: "sales".to_string(),
        cluster_name: DEFAULT_CLUSTER_NAME.to_string(),
    }
}

pub fn sample_table() -> TableRef {
    TableRef {
        id: 20,
        name: "orders".to_string(),
        columns: vec![Column::new("order_id", false), Column::new("amount", true)],
    }
}

pub fn sample_file_groups() -> Vec<FileGroup> {
    vec![FileGroup::new(vec![
        "hdfs://nn:8020/warehouse/orders/part-0.csv".to_string(),
        "hdfs://nn:8020/warehouse/orders/part-1.csv".to_string(),
    ])
    .with_columns(&["order_id", "amount"])]
}

/// Statuses matching [`sample_file_groups`], with the total file count
pub fn sample_file_statuses() -> (Vec<Vec<FileStatus>>, usize) {
    let statuses = vec![vec![
        FileStatus::file("hdfs://nn:8020/warehouse/orders/part-0.csv", 4096),
        FileStatus::file("hdfs://nn:8020/warehouse/orders/part-1.csv", 2048),
    ]];
    let count = statuses.iter().map(Vec::len).sum();
    (statuses, count)
}

pub fn sample_params(deadline_ms: i64) -> LoadTaskParams {
    LoadTaskParams::new(
        SAMPLE_CALLBACK_ID,
        sample_database(),
        sample_table(),
        SAMPLE_TXN_ID,
        deadline_ms,
    )
    .with_storage(StorageDescriptor {
        name: "hdfs_broker".to_string(),
        properties: HashMap::from([("username".to_string(), "loader".to_string())]),
    })
    .with_file_groups(sample_file_groups())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_moves_only_when_told() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_millis(), 1_000);
        clock.advance(500);
        assert_eq!(clock.now_millis(), 1_500);
        clock.set(42);
        assert_eq!(clock.now_millis(), 42);
    }

    #[test]
    fn test_sample_statuses_cover_sample_groups() {
        let (statuses, count) = sample_file_statuses();
        let groups = sample_file_groups();
        assert_eq!(statuses.len(), groups.len());
        assert_eq!(count, groups[0].file_paths.len());
    }
}
