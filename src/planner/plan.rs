//! Execution plan produced for one load attempt.

use crate::types::{FileFormat, LoadId, StorageDescriptor};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDescriptor {
    pub slot_id: i32,
    pub column_name: String,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleDescriptor {
    pub tuple_id: i32,
    pub slots: Vec<SlotDescriptor>,
}

/// Row layouts referenced by scan nodes and sinks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorTable {
    pub tuples: Vec<TupleDescriptor>,
}

/// Byte range of a source file assigned to a scan node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRange {
    pub path: String,
    pub start_offset: u64,
    pub size: u64,
    pub format: FileFormat,
    pub splittable: bool,
}

/// Reads one file group through the storage descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanNode {
    pub node_id: i32,
    pub tuple_id: i32,
    pub column_names: Vec<String>,
    pub file_ranges: Vec<FileRange>,
    pub negative: bool,
    pub storage: StorageDescriptor,
}

/// Writes scanned rows into the target table under the load transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSink {
    pub load_id: LoadId,
    pub txn_id: i64,
    pub db_id: i64,
    pub table_id: i64,
    pub strict_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFragment {
    pub fragment_id: i32,
    pub scan_node_ids: Vec<i32>,
    pub sink: TableSink,
}

/// Compiled description of how to read the source files and write them into
/// the target table, bound to exactly one load id at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    load_id: LoadId,
    desc_table: DescriptorTable,
    fragments: Vec<PlanFragment>,
    scan_nodes: Vec<ScanNode>,
    timezone: String,
}

impl ExecutionPlan {
    pub fn new(
        load_id: LoadId,
        desc_table: DescriptorTable,
        fragments: Vec<PlanFragment>,
        scan_nodes: Vec<ScanNode>,
        timezone: impl Into<String>,
    ) -> Self {
        Self {
            load_id,
            desc_table,
            fragments,
            scan_nodes,
            timezone: timezone.into(),
        }
    }

    pub fn load_id(&self) -> LoadId {
        self.load_id
    }

    pub fn desc_table(&self) -> &DescriptorTable {
        &self.desc_table
    }

    pub fn fragments(&self) -> &[PlanFragment] {
        &self.fragments
    }

    pub fn scan_nodes(&self) -> &[ScanNode] {
        &self.scan_nodes
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    /// Re-key the plan to a new load id in place.
    ///
    /// Scan nodes and fragment layout are kept; only the plan's id and the
    /// sinks that carry it are replaced.
    pub fn rebind(&mut self, load_id: LoadId) {
        self.load_id = load_id;
        for fragment in &mut self.fragments {
            fragment.sink.load_id = load_id;
        }
    }
}
