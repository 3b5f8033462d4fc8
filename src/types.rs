//! # Load Types
//!
//! Identifiers and descriptors shared by the planner, the coordinator and the
//! load task: the per-attempt [`LoadId`], catalog references for the target
//! database and table, the storage access descriptor, file groups with their
//! scanned file statuses, and the per-tablet commit info reported on success.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// 128-bit identifier of one execution attempt of a load task.
///
/// A fresh value is generated for every attempt and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LoadId {
    pub hi: u64,
    pub lo: u64,
}

impl LoadId {
    pub fn new(hi: u64, lo: u64) -> Self {
        Self { hi, lo }
    }

    /// Generate a random identifier from a v4 UUID
    pub fn generate() -> Self {
        let (hi, lo) = Uuid::new_v4().as_u64_pair();
        Self { hi, lo }
    }
}

impl fmt::Display for LoadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}-{:x}", self.hi, self.lo)
    }
}

impl From<Uuid> for LoadId {
    fn from(uuid: Uuid) -> Self {
        let (hi, lo) = uuid.as_u64_pair();
        Self { hi, lo }
    }
}

/// Target database of a load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseRef {
    pub id: i64,
    pub name: String,
    pub cluster_name: String,
}

/// Column of the target table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            nullable,
        }
    }
}

/// Target table of a load
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub id: i64,
    pub name: String,
    pub columns: Vec<Column>,
}

impl TableRef {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns
            .iter()
            .any(|c| c.name.eq_ignore_ascii_case(name))
    }
}

/// How the source files are reached (broker name plus access properties)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageDescriptor {
    pub name: String,
    pub properties: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    Csv,
    Parquet,
    Orc,
    Json,
}

impl Default for FileFormat {
    fn default() -> Self {
        Self::Csv
    }
}

/// One group of source files that share a column mapping and format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileGroup {
    pub file_paths: Vec<String>,
    /// Columns present in the source files; empty means "all table columns in order"
    pub column_names: Vec<String>,
    pub format: FileFormat,
    /// Whether this group retracts previously loaded rows
    pub negative: bool,
}

impl FileGroup {
    pub fn new(file_paths: Vec<String>) -> Self {
        Self {
            file_paths,
            column_names: Vec::new(),
            format: FileFormat::default(),
            negative: false,
        }
    }

    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        self.column_names = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    pub fn with_format(mut self, format: FileFormat) -> Self {
        self.format = format;
        self
    }
}

/// A scanned source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStatus {
    pub path: String,
    pub size: u64,
    pub is_dir: bool,
    pub is_splitable: bool,
}

impl FileStatus {
    pub fn file(path: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
            is_dir: false,
            is_splitable: true,
        }
    }
}

/// Per-tablet commit information handed to the transaction commit protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabletCommitInfo {
    pub tablet_id: i64,
    pub backend_id: i64,
}

impl TabletCommitInfo {
    pub fn new(tablet_id: i64, backend_id: i64) -> Self {
        Self {
            tablet_id,
            backend_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_id_display_is_hex_pair() {
        let id = LoadId::new(0xab, 0x1f);
        assert_eq!(id.to_string(), "ab-1f");
    }

    #[test]
    fn test_load_id_from_uuid_keeps_all_bits() {
        let uuid = Uuid::from_u128(0x0123_4567_89ab_cdef_fedc_ba98_7654_3210);
        let id = LoadId::from(uuid);
        assert_eq!(id.hi, 0x0123_4567_89ab_cdef);
        assert_eq!(id.lo, 0xfedc_ba98_7654_3210);
    }

    #[test]
    fn test_generated_load_ids_differ() {
        assert_ne!(LoadId::generate(), LoadId::generate());
    }

    #[test]
    fn test_table_column_lookup_is_case_insensitive() {
        let table = TableRef {
            id: 1,
            name: "orders".to_string(),
            columns: vec![Column::new("order_id", false), Column::new("Amount", true)],
        };
        assert!(table.has_column("ORDER_ID"));
        assert!(table.has_column("amount"));
        assert!(!table.has_column("customer"));
    }
}
