//! CSV file sink

use crate::output::traits::{RecordSink, SinkError, SinkResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes rows as RFC 4180 CSV
///
/// The header is written through [`RecordSink::write_header`] rather than
/// by the csv crate, so the column order is owned by the caller.
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
    header_written: bool,
    rows_written: u64,
}

impl CsvSink<File> {
    /// Creates (or truncates) the file at `path`
    pub fn create(path: &Path) -> SinkResult<Self> {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;
        tracing::info!("Writing output to {}", path.display());
        Ok(Self::with_writer(writer))
    }
}

impl<W: Write> CsvSink<W> {
    pub fn from_writer(inner: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        Self::with_writer(writer)
    }

    fn with_writer(writer: csv::Writer<W>) -> Self {
        Self {
            writer,
            header_written: false,
            rows_written: 0,
        }
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flushes and returns the underlying writer
    pub fn into_inner(self) -> SinkResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))
    }
}

impl<W: Write> RecordSink for CsvSink<W> {
    fn write_header(&mut self, header: &[&str]) -> SinkResult<()> {
        if self.header_written {
            return Err(SinkError::HeaderAlreadyWritten);
        }
        self.writer.write_record(header)?;
        self.header_written = true;
        Ok(())
    }

    fn write_row(&mut self, fields: &[&str]) -> SinkResult<()> {
        if !self.header_written {
            return Err(SinkError::HeaderMissing);
        }
        self.writer.write_record(fields)?;
        self.rows_written += 1;
        Ok(())
    }

    fn finish(&mut self) -> SinkResult<()> {
        self.writer.flush()?;
        tracing::debug!("Flushed {} rows", self.rows_written);
        Ok(())
    }
}
