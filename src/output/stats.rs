//! Run statistics
//!
//! Counters collected while the output is written, logged once at the end
//! of a run.

use chrono::{DateTime, Utc};

/// Summary of one crawl run
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Categories (or sitemap pages) selected for the run
    pub sources: usize,

    /// Rows the source announced up front; progress is measured against it
    pub announced_total: u64,

    pub records_written: u64,

    /// Records written with default package/shipping info
    pub package_fallbacks: u64,

    /// Records written with default loyalty points
    pub loyalty_fallbacks: u64,
}

impl RunStatistics {
    /// Starts the run clock
    pub fn start(sources: usize, announced_total: u64) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            sources,
            announced_total,
            records_written: 0,
            package_fallbacks: 0,
            loyalty_fallbacks: 0,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Lookups that fell back to a default value
    pub fn fallback_count(&self) -> u64 {
        self.package_fallbacks + self.loyalty_fallbacks
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Crawl Statistics ===");
        tracing::info!("  Sources: {}", self.sources);
        tracing::info!("  Announced records: {}", self.announced_total);
        tracing::info!("  Records written: {}", self.records_written);

        if self.fallback_count() > 0 {
            tracing::info!(
                "  Fallbacks: {} package info, {} loyalty points",
                self.package_fallbacks,
                self.loyalty_fallbacks
            );
        }

        if self.announced_total > 0 && self.records_written != self.announced_total {
            tracing::info!(
                "  Written records differ from announced total by {}",
                self.records_written.abs_diff(self.announced_total)
            );
        }

        if let Some(seconds) = self.duration_seconds() {
            tracing::info!("  Duration: {}s", seconds);
        }
    }
}
