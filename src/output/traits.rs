//! Record sink traits and errors
//!
//! A sink receives one header followed by any number of rows, in the order
//! they should appear in the output.

use thiserror::Error;

/// Errors that can occur while writing output
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Header was already written")]
    HeaderAlreadyWritten,

    #[error("Row written before the header")]
    HeaderMissing,
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for output rows
///
/// Writes must happen in this order: `write_header` once, `write_row` any
/// number of times, then `finish`. Any error is final; callers stop feeding
/// rows after the first failure.
pub trait RecordSink {
    /// Writes the column names; fails if called twice
    fn write_header(&mut self, header: &[&str]) -> SinkResult<()>;

    /// Writes one row; fails if no header was written yet
    fn write_row(&mut self, fields: &[&str]) -> SinkResult<()>;

    /// Flushes buffered rows to the underlying writer
    fn finish(&mut self) -> SinkResult<()>;
}

/// A value that can be written as one output row
pub trait CsvRow {
    fn fields(&self) -> Vec<&str>;
}
