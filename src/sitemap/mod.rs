//! Sitemap-driven product page crawl
//!
//! A simpler crawl mode for storefronts without a listing API: every URL of
//! a sitemap is fetched as a product page, at most `parallel-pages` at a
//! time, and written in sitemap order. Page fetches are retried; a page
//! that still fails aborts the run.

mod page;
mod urlset;

pub use page::{extract_product_page, ProductPage, PAGE_HEADER};
pub use urlset::parse_sitemap;

use crate::config::SitemapConfig;
use crate::output::{stream_to_sink, RecordSink, RunStatistics};
use crate::pipeline::{BoundedParallel, RetryPolicy};
use crate::{Result, ScrapeError};
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use reqwest::Client;

/// Crawls the product pages listed in a sitemap
pub struct SitemapCrawler<'a> {
    client: &'a Client,
    settings: &'a SitemapConfig,
    policy: RetryPolicy,
}

impl<'a> SitemapCrawler<'a> {
    pub fn new(client: &'a Client, settings: &'a SitemapConfig, policy: RetryPolicy) -> Self {
        Self {
            client,
            settings,
            policy,
        }
    }

    /// Downloads the sitemap and returns its page URLs
    pub async fn fetch_urls(&self) -> Result<Vec<String>> {
        tracing::info!("Fetching sitemap: {}", self.settings.url);
        let xml = fetch_text(self.client, &self.settings.url).await?;
        let urls = parse_sitemap(&xml, &self.settings.url)?;
        tracing::info!("Sitemap lists {} pages", urls.len());
        Ok(urls)
    }

    /// Streams the extracted pages in the order of `urls`
    pub fn pages(&self, urls: Vec<String>) -> BoxStream<'a, Result<ProductPage>> {
        let client = self.client;
        let policy = self.policy;

        BoundedParallel::new(stream::iter(urls), self.settings.parallel_pages, move |url| {
            fetch_product_page(client, policy, url)
        })
        .boxed()
    }

    /// Runs the whole sitemap crawl into `sink`
    pub async fn run<S: RecordSink + ?Sized>(&self, sink: &mut S) -> Result<RunStatistics> {
        let urls = self.fetch_urls().await?;
        let total = urls.len() as u64;
        let mut stats = RunStatistics::start(urls.len(), total);

        let written = stream_to_sink(sink, &PAGE_HEADER, self.pages(urls), |n, page: &ProductPage| {
            tracing::info!("{}/{} {}", n, total, page.url);
        })
        .await?;

        stats.records_written = written;
        stats.finish();
        Ok(stats)
    }
}

async fn fetch_product_page(client: &Client, policy: RetryPolicy, url: String) -> Result<ProductPage> {
    let html = policy
        .run(
            || fetch_text(client, &url),
            |call, error| {
                tracing::debug!(
                    "Fetching {} failed (attempt {}/{}): {}",
                    url,
                    call,
                    policy.max_calls(),
                    error
                )
            },
        )
        .await
        .map_err(|error| {
            tracing::error!("Giving up on {}: {}", url, error);
            error
        })?;

    Ok(extract_product_page(&html, &url))
}

/// GETs `url` and returns the body of a 2xx response
async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| ScrapeError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScrapeError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| ScrapeError::Http {
        url: url.to_string(),
        source,
    })
}
