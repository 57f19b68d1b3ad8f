//! Concurrent crawl pipeline
//!
//! Building blocks:
//! - [`BoundedParallel`]: order-preserving stage with a concurrency window
//! - [`RetryPolicy`]: immediate retries with a fixed budget
//! - [`paginate`]: lazy page-by-page listing of one category
//! - [`Enricher`]: concurrent, individually retried enrichment lookups
//! - [`Pipeline`]: the catalog crawl built from the pieces above

mod coordinator;
mod enrich;
mod paginate;
mod retry;
mod stage;

pub use coordinator::{flatten_categories, EnrichedRecord, Pipeline};
pub use enrich::{Enricher, Enrichment, EnrichmentKind};
pub use paginate::{paginate, FIRST_PAGE};
pub use retry::{retry, RetryPolicy};
pub use stage::BoundedParallel;
