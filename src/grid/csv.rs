//! CSV export and import for grid snapshots.
//!
//! Export writes the header line followed by one line per row, every cell
//! wrapped in double quotes with embedded quotes doubled. Headers are written
//! bare unless they contain a delimiter, quote, or line break. Import reads
//! RFC 4180 records so exported text reads back to the same values.
use super::Grid;
use crate::error::CsvError;
use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};

/// Render a grid as CSV text. Lines are joined with `\n`, no trailing newline.
pub fn export_csv(grid: &Grid) -> Result<String, CsvError> {
    let mut header = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    header.write_record(grid.headers()).map_err(write_error)?;
    let buf = header
        .into_inner()
        .map_err(|err| CsvError::Write(err.to_string()))?;

    let mut cells = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buf);
    for row in grid.rows() {
        cells
            .write_record(row.iter().map(|cell| cell.value.as_str()))
            .map_err(write_error)?;
    }
    let buf = cells
        .into_inner()
        .map_err(|err| CsvError::Write(err.to_string()))?;

    let mut text = String::from_utf8(buf).map_err(|err| CsvError::Write(err.to_string()))?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Parse CSV text into a grid: the first record is the header line.
pub fn import_csv(text: &str) -> Result<Grid, CsvError> {
    let mut records = read_records(text)?.into_iter();
    let headers = records.next().ok_or(CsvError::Empty)?;
    let grid = Grid::from_values(headers, records.collect())?;
    Ok(grid)
}

/// Read every record as a list of fields. Record widths are checked by the
/// grid, not the reader.
fn read_records(text: &str) -> Result<Vec<Vec<String>>, CsvError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    reader
        .records()
        .map(|record| {
            record
                .map(|record| record.iter().map(str::to_string).collect())
                .map_err(read_error)
        })
        .collect()
}

fn read_error(err: csv::Error) -> CsvError {
    CsvError::Malformed {
        line: err.position().map_or(0, |pos| pos.line()),
        message: err.to_string(),
    }
}

fn write_error(err: csv::Error) -> CsvError {
    CsvError::Write(err.to_string())
}
