//! Error taxonomy for grid mutations, CSV import, and enrichment.
//!
//! Structural grid violations and enrichment failures are ordinary values:
//! the grid operations fall back to an unchanged snapshot and the coordinator
//! folds every failure into an outcome plus one notification.
use thiserror::Error;

/// Reasons a grid mutation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid already has the maximum of {max} columns")]
    ColumnCap { max: usize },
    #[error("the last remaining column cannot be deleted")]
    LastColumn,
    #[error("column {column} is out of range (grid has {width} columns)")]
    ColumnOutOfRange { column: usize, width: usize },
    #[error("cell ({row}, {column}) is out of range")]
    CellOutOfRange { row: usize, column: usize },
    #[error("grid must have between 1 and {max} columns, got {found}")]
    Width { found: usize, max: usize },
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Failures while reading CSV text into a grid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CsvError {
    #[error("CSV input is empty")]
    Empty,
    #[error("malformed CSV on line {line}: {message}")]
    Malformed { line: u64, message: String },
    #[error("could not write CSV: {0}")]
    Write(String),
    #[error(transparent)]
    Shape(#[from] GridError),
}

/// Failures of a single column enrichment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrichError {
    #[error("column {column} has no header")]
    MissingHeader { column: usize },
    #[error("column {column} is out of range (grid has {width} columns)")]
    ColumnOutOfRange { column: usize, width: usize },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("enrichment service returned HTTP {code}")]
    Status { code: u16 },
    #[error("malformed enrichment response: {0}")]
    MalformedResponse(String),
    #[error("enrichment service reported an error: {0}")]
    ServiceReported(String),
}
