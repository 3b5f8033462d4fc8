//! # Broker Load Planner
//!
//! Builds a single-fragment plan: one scan node per file group reading the
//! group's files through the storage descriptor, feeding one sink that writes
//! into the target table under the load transaction.

use super::plan::{
    DescriptorTable, ExecutionPlan, FileRange, PlanFragment, ScanNode, SlotDescriptor, TableSink,
    TupleDescriptor,
};
use super::{Planner, PlanningContext};
use crate::error::{LoadTaskError, LoadTaskResult};
use crate::types::{FileGroup, FileStatus, LoadId, TableRef};
use tracing::debug;

const DEST_TUPLE_ID: i32 = 0;
const FRAGMENT_ID: i32 = 0;

#[derive(Debug, Default, Clone, Copy)]
pub struct LoadingPlanner;

impl LoadingPlanner {
    pub fn new() -> Self {
        Self
    }

    fn build_desc_table(table: &TableRef) -> DescriptorTable {
        let slots = table
            .columns
            .iter()
            .enumerate()
            .map(|(idx, column)| SlotDescriptor {
                slot_id: idx as i32,
                column_name: column.name.clone(),
                nullable: column.nullable,
            })
            .collect();

        DescriptorTable {
            tuples: vec![TupleDescriptor {
                tuple_id: DEST_TUPLE_ID,
                slots,
            }],
        }
    }

    fn check_columns(table: &TableRef, group: &FileGroup, group_idx: usize) -> LoadTaskResult<()> {
        if let Some(missing) = group.column_names.iter().find(|c| !table.has_column(c)) {
            return Err(LoadTaskError::planning(format!(
                "schema mismatch: column '{missing}' of file group {group_idx} does not exist in table '{}'",
                table.name
            )));
        }
        Ok(())
    }

    fn build_scan_node(
        ctx: &PlanningContext<'_>,
        group: &FileGroup,
        group_idx: usize,
        statuses: &[FileStatus],
    ) -> LoadTaskResult<ScanNode> {
        Self::check_columns(ctx.table, group, group_idx)?;

        let mut file_ranges = Vec::with_capacity(statuses.len());
        for status in statuses {
            if status.is_dir {
                return Err(LoadTaskError::planning(format!(
                    "source path '{}' is a directory, not a readable file",
                    status.path
                )));
            }
            file_ranges.push(FileRange {
                path: status.path.clone(),
                start_offset: 0,
                size: status.size,
                format: group.format,
                splittable: status.is_splitable,
            });
        }

        let column_names = if group.column_names.is_empty() {
            ctx.table.columns.iter().map(|c| c.name.clone()).collect()
        } else {
            group.column_names.clone()
        };

        Ok(ScanNode {
            node_id: group_idx as i32,
            tuple_id: DEST_TUPLE_ID,
            column_names,
            file_ranges,
            negative: group.negative,
            storage: ctx.storage.clone(),
        })
    }
}

impl Planner for LoadingPlanner {
    fn plan(
        &self,
        ctx: &PlanningContext<'_>,
        load_id: LoadId,
        file_statuses: &[Vec<FileStatus>],
        file_count: usize,
    ) -> LoadTaskResult<ExecutionPlan> {
        if ctx.file_groups.is_empty() {
            return Err(LoadTaskError::planning("no file group in this load"));
        }
        if file_statuses.len() != ctx.file_groups.len() {
            return Err(LoadTaskError::planning(format!(
                "expected file statuses for {} file groups, got {}",
                ctx.file_groups.len(),
                file_statuses.len()
            )));
        }

        let scanned: usize = file_statuses.iter().map(Vec::len).sum();
        if scanned == 0 {
            return Err(LoadTaskError::planning("no source file in this load"));
        }
        if scanned != file_count {
            return Err(LoadTaskError::planning(format!(
                "file count mismatch: expected {file_count}, scanned {scanned}"
            )));
        }

        let scan_nodes = ctx
            .file_groups
            .iter()
            .zip(file_statuses)
            .enumerate()
            .map(|(idx, (group, statuses))| Self::build_scan_node(ctx, group, idx, statuses))
            .collect::<LoadTaskResult<Vec<_>>>()?;

        let fragment = PlanFragment {
            fragment_id: FRAGMENT_ID,
            scan_node_ids: scan_nodes.iter().map(|n| n.node_id).collect(),
            sink: TableSink {
                load_id,
                txn_id: ctx.txn_id,
                db_id: ctx.database.id,
                table_id: ctx.table.id,
                strict_mode: ctx.strict_mode,
            },
        };

        debug!(
            load_id = %load_id,
            callback_id = ctx.callback_id,
            scan_nodes = scan_nodes.len(),
            files = scanned,
            "Planned load"
        );

        Ok(ExecutionPlan::new(
            load_id,
            Self::build_desc_table(ctx.table),
            vec![fragment],
            scan_nodes,
            ctx.timezone,
        ))
    }
}
