//! Output module for streaming crawl results to disk
//!
//! This module handles:
//! - The record sink interface and its CSV implementation
//! - Draining an ordered result stream into a sink
//! - Run statistics

mod csv_sink;
pub mod stats;
mod traits;

pub use csv_sink::CsvSink;
pub use stats::RunStatistics;
pub use traits::{CsvRow, RecordSink, SinkError, SinkResult};

use crate::Result;
use futures::{pin_mut, Stream, StreamExt};

/// Writes `header`, then every row of `rows`, then finishes the sink
///
/// Rows are pulled one at a time, so only the rows buffered upstream are
/// held in memory. The first error from the stream or the sink stops the
/// drain and is returned; nothing after it is pulled. `on_row` sees every
/// written row with its 1-based position.
///
/// Returns the number of rows written.
pub async fn stream_to_sink<S, St, T, F>(
    sink: &mut S,
    header: &[&str],
    rows: St,
    mut on_row: F,
) -> Result<u64>
where
    S: RecordSink + ?Sized,
    St: Stream<Item = Result<T>>,
    T: CsvRow,
    F: FnMut(u64, &T),
{
    sink.write_header(header)?;

    pin_mut!(rows);
    let mut written = 0;

    while let Some(row) = rows.next().await {
        let row = row?;
        sink.write_row(&row.fields())?;
        written += 1;
        on_row(written, &row);
    }

    sink.finish()?;
    Ok(written)
}
