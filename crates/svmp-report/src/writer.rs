//! CSV output of result tables

use crate::error::{Error, Result};
use crate::rows::TableRow;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, instrument};

/// Write a header and `rows` as CSV
///
/// The header is written even when `rows` is empty.
pub fn write_rows<W: Write, T: TableRow>(writer: W, rows: &[T]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(T::COLUMNS)?;
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write a table to `path`, replacing any existing file
#[instrument(skip(rows), fields(path = %path.as_ref().display(), rows = rows.len()))]
pub fn write_table<P: AsRef<Path>, T: TableRow>(path: P, rows: &[T]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_rows(file, rows)?;
    debug!("table written");
    Ok(())
}

/// Render a table as a CSV string
pub fn to_csv_string<T: TableRow>(rows: &[T]) -> Result<String> {
    let mut buffer = Vec::new();
    write_rows(&mut buffer, rows)?;
    String::from_utf8(buffer).map_err(|e| Error::InvalidInput(format!("non UTF-8 output: {e}")))
}
