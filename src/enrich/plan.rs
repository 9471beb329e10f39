//! Pure steps of a column enrichment: plan, mark loading, settle.
//!
//! Every step maps one snapshot to the next in a single combined mutation.
//! Settlement locates its column by id, touches only rows that existed when
//! the request was built, and leaves alone any cell hand-edited after
//! loading began.
use super::protocol::{BatchRequest, BatchResponse};
use crate::error::EnrichError;
use crate::grid::{ops, Cell, CellStatus, ColumnId, Grid};
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything needed to dispatch and later settle one column enrichment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentPlan {
    pub column: ColumnId,
    /// Index of the column in the snapshot the plan was built from.
    pub column_index: usize,
    pub key_column: usize,
    pub request: BatchRequest,
    /// Ascending indices of rows whose key value is non-blank.
    pub eligible_rows: Vec<usize>,
    /// Revision of the snapshot that marked the eligible cells loading.
    pub started_at: u64,
}

/// Counts from applying a batch result to the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SettleStats {
    pub applied: usize,
    pub skipped_edited: usize,
    pub column_missing: bool,
}

/// Validate a column and build its batch request from one snapshot.
///
/// The request lists the key value of every row, blank ones included, so
/// response index `i` maps back to row `i`. Context is sampled from the first
/// row only: every other non-blank header except the target and key columns.
/// The key column is left out of the context deliberately; each row already
/// carries its key value.
pub fn plan_enrichment(
    grid: &Grid,
    column: usize,
    key_column: usize,
) -> Result<EnrichmentPlan, EnrichError> {
    let width = grid.width();
    let header = grid
        .header(column)
        .ok_or(EnrichError::ColumnOutOfRange { column, width })?;
    if key_column >= width {
        return Err(EnrichError::ColumnOutOfRange {
            column: key_column,
            width,
        });
    }
    if header.trim().is_empty() {
        return Err(EnrichError::MissingHeader { column });
    }
    let column_id = grid
        .column_id(column)
        .ok_or(EnrichError::ColumnOutOfRange { column, width })?;

    let rows = grid.column_values(key_column);
    let eligible_rows = rows
        .iter()
        .enumerate()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(idx, _)| idx)
        .collect();

    let mut context_values = BTreeMap::new();
    if let Some(first) = grid.rows().first() {
        for (idx, name) in grid.headers().iter().enumerate() {
            if idx == column || idx == key_column || name.trim().is_empty() {
                continue;
            }
            let value = first.get(idx).map(|cell| cell.value.clone()).unwrap_or_default();
            context_values.insert(name.clone(), value);
        }
    }

    Ok(EnrichmentPlan {
        column: column_id,
        column_index: column,
        key_column,
        request: BatchRequest {
            column_name: header.to_string(),
            rows,
            context_values,
        },
        eligible_rows,
        started_at: grid.revision(),
    })
}

/// Mark the plan's eligible cells loading. Ineligible rows stay as they are.
pub fn mark_loading(grid: &Grid, plan: &EnrichmentPlan) -> Grid {
    let Some(col) = grid.column_index(plan.column) else {
        return grid.clone();
    };
    ops::map_column_cells(grid, col, |row, cell| {
        if plan.eligible_rows.binary_search(&row).is_ok() {
            cell.set_status(CellStatus::Loading);
        }
    })
}

/// Plan a column enrichment and mark its cells loading in one step.
pub fn begin_enrichment(
    grid: &Grid,
    column: usize,
    key_column: usize,
) -> Result<(Grid, EnrichmentPlan), EnrichError> {
    let mut plan = plan_enrichment(grid, column, key_column)?;
    let next = mark_loading(grid, &plan);
    plan.started_at = next.revision();
    Ok((next, plan))
}

/// Write a validated response into the column.
///
/// Every requested row `i` receives `enriched_values[i]` and `sources[i]`,
/// including rows with a blank key that were never marked loading. A cell
/// counts as enriched only when its new value is non-empty.
pub fn apply_success(
    grid: &Grid,
    plan: &EnrichmentPlan,
    response: &BatchResponse,
) -> (Grid, SettleStats) {
    let requested = plan.request.rows.len();
    settle_cells(grid, plan, |row| row < requested, |row, cell| {
        let (Some(value), Some(sources)) =
            (response.enriched_values.get(row), response.sources.get(row))
        else {
            return false;
        };
        cell.value = value.clone();
        cell.sources = sources.clone();
        cell.set_status(if value.is_empty() {
            CellStatus::Idle
        } else {
            CellStatus::Enriched
        });
        true
    })
}

/// End loading after a failed batch, keeping each cell's value and sources.
///
/// Only the rows that were marked loading change.
pub fn apply_failure(grid: &Grid, plan: &EnrichmentPlan) -> (Grid, SettleStats) {
    let eligible = |row: usize| plan.eligible_rows.binary_search(&row).is_ok();
    settle_cells(grid, plan, eligible, |_, cell| {
        cell.set_status(CellStatus::Failed);
        true
    })
}

fn settle_cells<T, F>(
    grid: &Grid,
    plan: &EnrichmentPlan,
    targets: T,
    mut apply: F,
) -> (Grid, SettleStats)
where
    T: Fn(usize) -> bool,
    F: FnMut(usize, &mut Cell) -> bool,
{
    let Some(col) = grid.column_index(plan.column) else {
        tracing::warn!(
            column = %plan.request.column_name,
            "column removed before enrichment settled"
        );
        let stats = SettleStats {
            column_missing: true,
            ..SettleStats::default()
        };
        return (grid.clone(), stats);
    };

    let mut stats = SettleStats::default();
    let next = ops::map_column_cells(grid, col, |row, cell| {
        if !targets(row) {
            return;
        }
        if cell.edited_at() > plan.started_at {
            tracing::debug!(row, col, "cell edited while enrichment was in flight; keeping edit");
            if cell.is_loading() {
                cell.set_status(CellStatus::Idle);
            }
            stats.skipped_edited += 1;
            return;
        }
        if apply(row, cell) {
            stats.applied += 1;
        }
    });
    (next, stats)
}
