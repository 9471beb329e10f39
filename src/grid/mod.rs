//! Grid snapshot types.
//!
//! A `Grid` is a value: every operation in [`ops`] takes a snapshot and
//! returns a new one, so a reader holding an older snapshot never observes a
//! half-applied change. Columns carry stable ids so work started against one
//! snapshot can find its column again after other columns were deleted.
use crate::error::GridError;
use serde::{Deserialize, Serialize};

pub mod csv;
pub mod ops;

/// Hard cap on the number of columns.
pub const MAX_COLUMNS: usize = 5;
/// Number of columns in a freshly created grid.
pub const INITIAL_COLUMNS: usize = 5;
/// Number of rows in a freshly created grid.
pub const INITIAL_ROWS: usize = 5;

/// Provenance attached to an enriched cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
}

/// Transient per-cell status flags.
///
/// `Failed` keeps the flags of an idle cell (not loading, not enriched) but
/// remembers that the last enrichment attempt for the cell did not land.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    #[default]
    Idle,
    Loading,
    Enriched,
    Failed,
}

/// One value-bearing unit of the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub value: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
    status: CellStatus,
    /// Grid revision of the last hand-edit; 0 when never hand-edited.
    #[serde(skip)]
    edited_at: u64,
}

impl Cell {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn status(&self) -> CellStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == CellStatus::Loading
    }

    pub fn is_enriched(&self) -> bool {
        self.status == CellStatus::Enriched
    }

    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }

    /// Revision at which the cell was last edited by hand.
    pub fn edited_at(&self) -> u64 {
        self.edited_at
    }

    pub(crate) fn set_status(&mut self, status: CellStatus) {
        self.status = status;
    }
}

/// A row is index-aligned with the grid headers.
pub type Row = Vec<Cell>;

/// Stable identity of a column across snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(u64);

/// Position of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Immutable snapshot of headers and cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid {
    headers: Vec<String>,
    rows: Vec<Row>,
    #[serde(skip)]
    column_ids: Vec<ColumnId>,
    #[serde(skip)]
    next_column_id: u64,
    #[serde(skip)]
    revision: u64,
}

impl Grid {
    /// The session's starting shape: five blank headers over five blank rows.
    pub fn initial() -> Self {
        let headers = vec![String::new(); INITIAL_COLUMNS];
        let rows = vec![vec![Cell::default(); INITIAL_COLUMNS]; INITIAL_ROWS];
        Self::assemble(headers, rows)
    }

    /// Build a grid from plain header and cell text, validating its shape.
    pub fn from_values(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, GridError> {
        if headers.is_empty() || headers.len() > MAX_COLUMNS {
            return Err(GridError::Width {
                found: headers.len(),
                max: MAX_COLUMNS,
            });
        }
        let width = headers.len();
        let mut cells = Vec::with_capacity(rows.len());
        for (idx, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(GridError::RaggedRow {
                    row: idx,
                    expected: width,
                    found: row.len(),
                });
            }
            cells.push(row.into_iter().map(Cell::new).collect());
        }
        Ok(Self::assemble(headers, cells))
    }

    fn assemble(headers: Vec<String>, rows: Vec<Row>) -> Self {
        let column_ids = (0..headers.len() as u64).map(ColumnId).collect();
        let next_column_id = headers.len() as u64;
        Self {
            headers,
            rows,
            column_ids,
            next_column_id,
            revision: 0,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn header(&self, col: usize) -> Option<&str> {
        self.headers.get(col).map(String::as_str)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(col))
    }

    pub fn column_id(&self, col: usize) -> Option<ColumnId> {
        self.column_ids.get(col).copied()
    }

    /// Current index of a column, or `None` once it has been deleted.
    pub fn column_index(&self, id: ColumnId) -> Option<usize> {
        self.column_ids.iter().position(|candidate| *candidate == id)
    }

    /// Monotonic counter bumped by every accepted mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Values of one column in row order.
    pub fn column_values(&self, col: usize) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.get(col).map(|cell| cell.value.clone()).unwrap_or_default())
            .collect()
    }

    fn next_revision(&self) -> u64 {
        self.revision + 1
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_grid_is_five_by_five_and_blank() {
        let grid = Grid::initial();
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.height(), 5);
        assert!(grid.headers().iter().all(String::is_empty));
        assert!(grid
            .rows()
            .iter()
            .flatten()
            .all(|cell| cell.value.is_empty() && cell.status() == CellStatus::Idle));
    }

    #[test]
    fn from_values_rejects_ragged_rows() {
        let err = Grid::from_values(
            vec!["Company".into(), "Revenue".into()],
            vec![vec!["Acme".into()]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            GridError::RaggedRow {
                row: 0,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn from_values_rejects_too_many_columns() {
        let headers = vec![String::new(); MAX_COLUMNS + 1];
        assert!(matches!(
            Grid::from_values(headers, Vec::new()),
            Err(GridError::Width { found: 6, .. })
        ));
    }

    #[test]
    fn column_ids_follow_header_positions() {
        let grid = Grid::from_values(vec!["a".into(), "b".into()], Vec::new()).unwrap();
        let id = grid.column_id(1).unwrap();
        assert_eq!(grid.column_index(id), Some(1));
        assert_eq!(grid.column_id(2), None);
    }

    #[test]
    fn snapshot_serializes_without_internal_bookkeeping() {
        let grid = Grid::from_values(vec!["Company".into()], vec![vec!["Acme".into()]]).unwrap();
        let json = serde_json::to_value(&grid).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "headers": ["Company"],
                "rows": [[{"value": "Acme", "status": "idle"}]]
            })
        );
    }
}
