//! Catalog crawl pipeline
//!
//! Wires the stages together:
//!
//! ```text
//! category tree -> flatten -> BoundedParallel(parallel-category) over paginate
//!   -> items in discovery order -> BoundedParallel(parallel-product) over
//!   enrich + assemble -> sink
//! ```
//!
//! Output order is category order, then page order, then position within
//! the page, no matter which request finishes first. Listing failures abort
//! the run; enrichment failures only degrade the affected record. A running
//! crawl cannot be cancelled other than by dropping it.

use crate::catalog::{
    CatalogSource, Category, DetailSource, ListingItem, LoyaltySource, ShopClient, ShopUrls,
};
use crate::config::{CategoryDepth, ScraperConfig};
use crate::output::{stream_to_sink, CsvRow, RecordSink, RunStatistics};
use crate::pipeline::enrich::{Enricher, EnrichmentKind};
use crate::pipeline::paginate::{paginate, FIRST_PAGE};
use crate::pipeline::retry::RetryPolicy;
use crate::pipeline::stage::BoundedParallel;
use crate::record::{assemble, CanonicalRecord, HEADER};
use crate::{Result, ScrapeError};
use futures::stream::{self, BoxStream};
use futures::{StreamExt, TryStreamExt};

/// Selects the categories to crawl from the category tree
///
/// `TopLevel` keeps the roots as they are. `All` walks the tree depth-first,
/// parents before children, and returns every node with its children
/// detached.
pub fn flatten_categories(tree: Vec<Category>, depth: CategoryDepth) -> Vec<Category> {
    match depth {
        CategoryDepth::TopLevel => tree,
        CategoryDepth::All => {
            let mut flat = Vec::new();
            let mut stack: Vec<Category> = tree.into_iter().rev().collect();

            while let Some(mut category) = stack.pop() {
                let children = category.children.take().unwrap_or_default();
                stack.extend(children.into_iter().rev());
                flat.push(category);
            }

            flat
        }
    }
}

/// An assembled record and the lookups that fell back to defaults
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    pub record: CanonicalRecord,
    pub degraded: Vec<EnrichmentKind>,
}

impl CsvRow for EnrichedRecord {
    fn fields(&self) -> Vec<&str> {
        self.record.fields()
    }
}

/// The catalog crawl, parameterized by its sources and settings
pub struct Pipeline<'a> {
    catalog: &'a dyn CatalogSource,
    details: &'a dyn DetailSource,
    loyalty: &'a dyn LoyaltySource,
    urls: &'a ShopUrls,
    settings: &'a ScraperConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        catalog: &'a dyn CatalogSource,
        details: &'a dyn DetailSource,
        loyalty: &'a dyn LoyaltySource,
        urls: &'a ShopUrls,
        settings: &'a ScraperConfig,
    ) -> Self {
        Self {
            catalog,
            details,
            loyalty,
            urls,
            settings,
        }
    }

    /// Uses the shop client for every source
    pub fn from_client(client: &'a ShopClient, settings: &'a ScraperConfig) -> Self {
        Self::new(client, client, client, client.urls(), settings)
    }

    /// Fetches the category tree and selects the categories to crawl
    pub async fn categories(&self) -> Result<Vec<Category>> {
        let tree = self.catalog.fetch_categories().await?;
        let categories = flatten_categories(tree, self.settings.category_depth);
        tracing::info!("Crawling {} categories", categories.len());
        Ok(categories)
    }

    /// Streams one record per listed product, in discovery order
    ///
    /// Nothing is requested until the stream is polled.
    pub fn records(&self, categories: Vec<Category>) -> BoxStream<'a, Result<EnrichedRecord>> {
        let catalog = self.catalog;
        let urls = self.urls;
        let enricher = Enricher::new(
            self.details,
            self.loyalty,
            RetryPolicy::new(self.settings.retry),
        );

        let items = BoundedParallel::new(
            stream::iter(categories),
            self.settings.parallel_category,
            move |category| open_listing(catalog, category),
        )
        .try_flatten();

        BoundedParallel::new(items, self.settings.parallel_product, move |item| {
            build_record(enricher, urls, item)
        })
        .boxed()
    }

    /// Runs the whole crawl into `sink`
    ///
    /// The header is written before the first listing request. Returns the
    /// statistics of the run; the first listing or sink error is returned
    /// instead and leaves the rows written so far in the sink.
    pub async fn run<S: RecordSink + ?Sized>(&self, sink: &mut S) -> Result<RunStatistics> {
        let categories = self.categories().await?;
        let announced: u64 = categories.iter().filter_map(|c| c.total_products).sum();
        tracing::info!("{} products announced", announced);

        let mut stats = RunStatistics::start(categories.len(), announced);
        let records = self.records(categories);

        let written = stream_to_sink(sink, &HEADER, records, |n, row: &EnrichedRecord| {
            tracing::info!("{}/{} {}", n, announced, row.record.link);
            for kind in &row.degraded {
                match kind {
                    EnrichmentKind::PackageInfo => stats.package_fallbacks += 1,
                    EnrichmentKind::LoyaltyPoints => stats.loyalty_fallbacks += 1,
                }
            }
        })
        .await?;

        stats.records_written = written;
        stats.finish();
        Ok(stats)
    }
}

/// Requests the first page of `category` and returns all of its items
///
/// Only the first page is fetched up front; every later page is requested
/// once the consumer has pulled the items of the page before it. The
/// category window therefore holds at most one page per category.
async fn open_listing<'a>(
    catalog: &'a dyn CatalogSource,
    category: Category,
) -> Result<BoxStream<'a, Result<ListingItem>>> {
    let mut items = paginate(catalog, category, FIRST_PAGE);
    let first = items.try_next().await?;

    Ok(stream::iter(first.map(Ok::<_, ScrapeError>))
        .chain(items)
        .boxed())
}

async fn build_record(
    enricher: Enricher<'_>,
    urls: &ShopUrls,
    item: Result<ListingItem>,
) -> Result<EnrichedRecord> {
    let item = item?;
    let link = urls.product(&item)?;
    let enrichment = enricher.enrich(&item, link.as_str()).await;
    if enrichment.is_degraded() {
        tracing::debug!("Product {} written with defaults", item.id);
    }

    Ok(EnrichedRecord {
        record: assemble(&item, &enrichment, &link),
        degraded: enrichment.degraded,
    })
}
