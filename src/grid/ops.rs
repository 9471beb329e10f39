//! Pure grid mutations.
//!
//! Each operation takes a snapshot and returns a new one. The `try_*` forms
//! report why a mutation was refused; the plain forms log the refusal and
//! hand back an unchanged snapshot, since the limits they guard are enforced
//! at the UI boundary rather than being exceptional.
use super::{Cell, CellStatus, ColumnId, Grid, Row, MAX_COLUMNS};
use crate::error::GridError;

/// Append one row of blank cells.
pub fn add_row(grid: &Grid) -> Grid {
    let mut next = grid.clone();
    next.rows.push(vec![Cell::default(); grid.width()]);
    next.revision = grid.next_revision();
    next
}

/// Append one blank column, unless the grid is already at the column cap.
pub fn add_column(grid: &Grid) -> Grid {
    unchanged_on_refusal(grid, try_add_column(grid))
}

pub fn try_add_column(grid: &Grid) -> Result<Grid, GridError> {
    if grid.width() >= MAX_COLUMNS {
        return Err(GridError::ColumnCap { max: MAX_COLUMNS });
    }
    let mut next = grid.clone();
    next.headers.push(String::new());
    next.column_ids.push(ColumnId(grid.next_column_id));
    next.next_column_id = grid.next_column_id + 1;
    for row in &mut next.rows {
        row.push(Cell::default());
    }
    next.revision = grid.next_revision();
    Ok(next)
}

/// Remove a column's header and cells in one replacement.
pub fn delete_column(grid: &Grid, col: usize) -> Grid {
    unchanged_on_refusal(grid, try_delete_column(grid, col))
}

pub fn try_delete_column(grid: &Grid, col: usize) -> Result<Grid, GridError> {
    check_column(grid, col)?;
    if grid.width() <= 1 {
        return Err(GridError::LastColumn);
    }
    let mut next = grid.clone();
    next.headers.remove(col);
    next.column_ids.remove(col);
    for row in &mut next.rows {
        row.remove(col);
    }
    next.revision = grid.next_revision();
    Ok(next)
}

/// Replace a header's text.
pub fn edit_header(grid: &Grid, col: usize, text: &str) -> Grid {
    unchanged_on_refusal(grid, try_edit_header(grid, col, text))
}

pub fn try_edit_header(grid: &Grid, col: usize, text: &str) -> Result<Grid, GridError> {
    check_column(grid, col)?;
    let mut next = grid.clone();
    next.headers[col] = text.to_string();
    next.revision = grid.next_revision();
    Ok(next)
}

/// Overwrite a cell's value and drop its sources.
///
/// Status flags are left alone; callers that model a hand-edit clear the
/// enriched flag themselves (see `lifecycle::EditFocus::commit`). The cell is
/// stamped with the new revision so in-flight enrichments can tell it was
/// touched after they started.
pub fn edit_cell(grid: &Grid, row: usize, col: usize, text: &str) -> Grid {
    unchanged_on_refusal(grid, try_edit_cell(grid, row, col, text))
}

pub fn try_edit_cell(grid: &Grid, row: usize, col: usize, text: &str) -> Result<Grid, GridError> {
    check_cell(grid, row, col)?;
    let revision = grid.next_revision();
    let mut next = grid.clone();
    let cell = &mut next.rows[row][col];
    cell.value = text.to_string();
    cell.sources.clear();
    cell.edited_at = revision;
    next.revision = revision;
    Ok(next)
}

/// Set the status of a single cell.
pub(crate) fn set_cell_status(grid: &Grid, row: usize, col: usize, status: CellStatus) -> Grid {
    if check_cell(grid, row, col).is_err() {
        return grid.clone();
    }
    let mut next = grid.clone();
    next.rows[row][col].set_status(status);
    next.revision = grid.next_revision();
    next
}

/// Rewrite the cells of one column in a single combined mutation.
///
/// `update` sees each row index with that row's cell in `col`. Rows are
/// visited in order; the closure decides per cell whether to change it.
pub(crate) fn map_column_cells<F>(grid: &Grid, col: usize, mut update: F) -> Grid
where
    F: FnMut(usize, &mut Cell),
{
    if col >= grid.width() {
        return grid.clone();
    }
    let mut next = grid.clone();
    for (idx, row) in next.rows.iter_mut().enumerate() {
        update(idx, &mut row[col]);
    }
    next.revision = grid.next_revision();
    next
}

/// Check that every row is exactly as wide as the header list.
pub fn is_rectangular(grid: &Grid) -> bool {
    let width = grid.width();
    grid.column_ids.len() == width && grid.rows.iter().all(|row: &Row| row.len() == width)
}

fn check_column(grid: &Grid, col: usize) -> Result<(), GridError> {
    if col >= grid.width() {
        return Err(GridError::ColumnOutOfRange {
            column: col,
            width: grid.width(),
        });
    }
    Ok(())
}

fn check_cell(grid: &Grid, row: usize, col: usize) -> Result<(), GridError> {
    if row >= grid.height() || col >= grid.width() {
        return Err(GridError::CellOutOfRange { row, column: col });
    }
    Ok(())
}

fn unchanged_on_refusal(grid: &Grid, result: Result<Grid, GridError>) -> Grid {
    match result {
        Ok(next) => next,
        Err(err) => {
            tracing::debug!(%err, "grid mutation refused");
            grid.clone()
        }
    }
}

#[cfg(test)]
#[path = "ops_tests.rs"]
mod tests;
