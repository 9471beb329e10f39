//! Cell lifecycle and interactive edit focus.
//!
//! A cell is `Idle`, `Editing`, `Loading`, `SettledSuccess`, or
//! `SettledError`. Loading and settlement are driven by the enrichment
//! coordinator; editing is driven by [`EditFocus`], which holds the single
//! grid-wide edit position, the header being renamed, and the cell whose
//! sources tooltip is open.
use crate::error::GridError;
use crate::grid::{ops, CellStatus, Grid, Position};

/// Observable lifecycle state of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Idle,
    Editing,
    Loading,
    SettledSuccess,
    SettledError,
}

/// Derive the lifecycle state of a cell from its flags and the edit focus.
pub fn cell_state(grid: &Grid, focus: &EditFocus, pos: Position) -> Option<CellState> {
    let cell = grid.cell(pos.row, pos.col)?;
    if focus.active() == Some(pos) {
        return Some(CellState::Editing);
    }
    Some(match cell.status() {
        CellStatus::Idle => CellState::Idle,
        CellStatus::Loading => CellState::Loading,
        CellStatus::Enriched => CellState::SettledSuccess,
        CellStatus::Failed => CellState::SettledError,
    })
}

/// Replace a cell's value by hand: sources are dropped and the cell returns
/// to idle, whatever enrichment state it was in.
pub fn hand_edit(grid: &Grid, pos: Position, text: &str) -> Result<Grid, GridError> {
    let edited = ops::try_edit_cell(grid, pos.row, pos.col, text)?;
    Ok(ops::set_cell_status(&edited, pos.row, pos.col, CellStatus::Idle))
}

/// Why a focus request did not enter editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusRefusal {
    /// The sources tooltip for this exact cell is open.
    TooltipOpen,
    OutOfRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderDraft {
    col: usize,
    text: String,
}

/// Exclusive edit focus for one grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditFocus {
    active: Option<Position>,
    draft: String,
    header: Option<HeaderDraft>,
    tooltip: Option<Position>,
}

impl EditFocus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<Position> {
        self.active
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn tooltip(&self) -> Option<Position> {
        self.tooltip
    }

    pub fn editing_header(&self) -> Option<usize> {
        self.header.as_ref().map(|header| header.col)
    }

    /// Enter editing on `pos`, seeding the draft with the cell's value.
    ///
    /// A cell already being edited elsewhere is committed first, so the
    /// returned snapshot is the one to publish. Focus is refused while the
    /// sources tooltip of the same cell is open.
    pub fn begin(&mut self, grid: &Grid, pos: Position) -> Result<Grid, FocusRefusal> {
        if self.tooltip == Some(pos) {
            return Err(FocusRefusal::TooltipOpen);
        }
        if grid.cell(pos.row, pos.col).is_none() {
            return Err(FocusRefusal::OutOfRange);
        }
        let next = self.commit(grid);
        let seed = next
            .cell(pos.row, pos.col)
            .map(|cell| cell.value.clone())
            .unwrap_or_default();
        self.active = Some(pos);
        self.draft = seed;
        Ok(next)
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        if self.active.is_some() {
            self.draft = text.into();
        }
    }

    /// Write the draft into the focused cell and leave editing.
    ///
    /// The hand-edit drops sources and ends any enriched or loading state.
    /// Without an active edit this returns the snapshot unchanged.
    pub fn commit(&mut self, grid: &Grid) -> Grid {
        let Some(pos) = self.active.take() else {
            return grid.clone();
        };
        let draft = std::mem::take(&mut self.draft);
        match hand_edit(grid, pos, &draft) {
            Ok(next) => next,
            Err(err) => {
                tracing::debug!(%err, "edit target vanished before commit");
                grid.clone()
            }
        }
    }

    /// Leave editing without touching the grid.
    pub fn cancel(&mut self) {
        self.active = None;
        self.draft.clear();
    }

    /// Start renaming a header; any other header rename is discarded.
    pub fn begin_header(&mut self, grid: &Grid, col: usize) -> bool {
        let Some(text) = grid.header(col) else {
            return false;
        };
        self.header = Some(HeaderDraft {
            col,
            text: text.to_string(),
        });
        true
    }

    pub fn set_header_draft(&mut self, text: impl Into<String>) {
        if let Some(header) = self.header.as_mut() {
            header.text = text.into();
        }
    }

    pub fn header_draft(&self) -> Option<&str> {
        self.header.as_ref().map(|header| header.text.as_str())
    }

    pub fn commit_header(&mut self, grid: &Grid) -> Grid {
        match self.header.take() {
            Some(header) => ops::edit_header(grid, header.col, &header.text),
            None => grid.clone(),
        }
    }

    pub fn cancel_header(&mut self) {
        self.header = None;
    }

    /// Open the sources tooltip of a cell. Only cells with sources have one.
    pub fn open_tooltip(&mut self, grid: &Grid, pos: Position) -> bool {
        let has_sources = grid
            .cell(pos.row, pos.col)
            .is_some_and(|cell| cell.has_sources());
        if has_sources {
            self.tooltip = Some(pos);
        }
        has_sources
    }

    pub fn close_tooltip(&mut self) {
        self.tooltip = None;
    }

    /// Drop focus state that no longer points into `grid`.
    pub fn retain_valid(&mut self, grid: &Grid) {
        if let Some(pos) = self.active {
            if grid.cell(pos.row, pos.col).is_none() {
                self.cancel();
            }
        }
        if let Some(pos) = self.tooltip {
            if !matches!(grid.cell(pos.row, pos.col), Some(cell) if cell.has_sources()) {
                self.tooltip = None;
            }
        }
        if let Some(col) = self.editing_header() {
            if col >= grid.width() {
                self.header = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Source;

    fn company_grid() -> Grid {
        Grid::from_values(
            vec!["Company".into(), "Revenue".into()],
            vec![vec!["Acme".into(), String::new()]],
        )
        .unwrap()
    }

    fn with_sources(grid: &Grid, pos: Position) -> Grid {
        ops::map_column_cells(grid, pos.col, |row, cell| {
            if row == pos.row {
                cell.value = "$1B".into();
                cell.sources = vec![Source {
                    title: "X".into(),
                    url: "https://x".into(),
                }];
                cell.set_status(CellStatus::Enriched);
            }
        })
    }

    #[test]
    fn hand_edit_of_enriched_cell_returns_it_to_idle() {
        let pos = Position::new(0, 1);
        let grid = with_sources(&company_grid(), pos);
        let grid = hand_edit(&grid, pos, "$3B").unwrap();
        let cell = grid.cell(0, 1).unwrap();
        assert_eq!(cell.value, "$3B");
        assert!(cell.sources.is_empty());
        assert_eq!(cell.status(), CellStatus::Idle);
        assert_eq!(
            hand_edit(&grid, Position::new(4, 0), "x"),
            Err(GridError::CellOutOfRange { row: 4, column: 0 })
        );
    }

    #[test]
    fn begin_seeds_draft_and_marks_cell_editing() {
        let grid = company_grid();
        let mut focus = EditFocus::new();
        let pos = Position::new(0, 0);
        let grid = focus.begin(&grid, pos).unwrap();
        assert_eq!(focus.draft(), "Acme");
        assert_eq!(cell_state(&grid, &focus, pos), Some(CellState::Editing));
    }

    #[test]
    fn commit_writes_value_clears_sources_and_enriched() {
        let pos = Position::new(0, 1);
        let grid = with_sources(&company_grid(), pos);
        let mut focus = EditFocus::new();
        let grid = focus.begin(&grid, pos).unwrap();
        focus.set_draft("$2B");
        let grid = focus.commit(&grid);
        let cell = grid.cell(0, 1).unwrap();
        assert_eq!(cell.value, "$2B");
        assert!(cell.sources.is_empty());
        assert!(!cell.is_enriched());
        assert_eq!(focus.active(), None);
        assert_eq!(cell_state(&grid, &focus, pos), Some(CellState::Idle));
    }

    #[test]
    fn cancel_discards_draft_without_mutation() {
        let grid = company_grid();
        let mut focus = EditFocus::new();
        let opened = focus.begin(&grid, Position::new(0, 0)).unwrap();
        focus.set_draft("Globex");
        focus.cancel();
        assert_eq!(focus.commit(&opened), opened);
        assert_eq!(opened.cell(0, 0).unwrap().value, "Acme");
    }

    #[test]
    fn focusing_another_cell_commits_the_pending_edit() {
        let grid = company_grid();
        let mut focus = EditFocus::new();
        let grid = focus.begin(&grid, Position::new(0, 0)).unwrap();
        focus.set_draft("Globex");
        let grid = focus.begin(&grid, Position::new(0, 1)).unwrap();
        assert_eq!(grid.cell(0, 0).unwrap().value, "Globex");
        assert_eq!(focus.active(), Some(Position::new(0, 1)));
    }

    #[test]
    fn focus_is_suppressed_while_that_cells_tooltip_is_open() {
        let pos = Position::new(0, 1);
        let grid = with_sources(&company_grid(), pos);
        let mut focus = EditFocus::new();
        assert!(focus.open_tooltip(&grid, pos));
        assert_eq!(focus.begin(&grid, pos), Err(FocusRefusal::TooltipOpen));
        assert!(focus.begin(&grid, Position::new(0, 0)).is_ok());
    }

    #[test]
    fn tooltip_needs_sources() {
        let grid = company_grid();
        let mut focus = EditFocus::new();
        assert!(!focus.open_tooltip(&grid, Position::new(0, 0)));
        assert_eq!(focus.tooltip(), None);
    }

    #[test]
    fn out_of_range_focus_is_refused() {
        let mut focus = EditFocus::new();
        assert_eq!(
            focus.begin(&company_grid(), Position::new(4, 0)),
            Err(FocusRefusal::OutOfRange)
        );
    }

    #[test]
    fn header_rename_commits_and_cancels() {
        let grid = company_grid();
        let mut focus = EditFocus::new();
        assert!(focus.begin_header(&grid, 1));
        assert_eq!(focus.header_draft(), Some("Revenue"));
        focus.set_header_draft("CEO");
        let renamed = focus.commit_header(&grid);
        assert_eq!(renamed.header(1), Some("CEO"));

        assert!(focus.begin_header(&renamed, 0));
        focus.set_header_draft("ignored");
        focus.cancel_header();
        assert_eq!(focus.commit_header(&renamed), renamed);
    }

    #[test]
    fn retain_valid_drops_focus_on_deleted_column() {
        let grid = company_grid();
        let mut focus = EditFocus::new();
        let grid = focus.begin(&grid, Position::new(0, 1)).unwrap();
        let shrunk = ops::delete_column(&grid, 1);
        focus.retain_valid(&shrunk);
        assert_eq!(focus.active(), None);
    }

    #[test]
    fn failed_cells_report_settled_error() {
        let grid = ops::set_cell_status(&company_grid(), 0, 1, CellStatus::Failed);
        let state = cell_state(&grid, &EditFocus::new(), Position::new(0, 1));
        assert_eq!(state, Some(CellState::SettledError));
        let cell = grid.cell(0, 1).unwrap();
        assert!(!cell.is_loading() && !cell.is_enriched());
    }
}
