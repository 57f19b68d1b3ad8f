//! HTTP client for the shop API and storefront
//!
//! This module handles all HTTP requests of the catalog crawl:
//! - Building the shared HTTP client
//! - Category tree and listing requests against the JSON API
//! - Product detail page downloads
//! - Loyalty-point computation requests
//!
//! Status codes outside 2xx are turned into errors so the caller can decide
//! whether to retry.

use crate::catalog::detail::extract_package_info;
use crate::catalog::links::ShopUrls;
use crate::catalog::types::{Category, ListingItem, ListingPage, LoyaltyPoints, PackageInfo};
use crate::catalog::{CatalogSource, DetailSource, LoyaltySource};
use crate::config::{Config, Language};
use crate::{Result, ScrapeError};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with the configured user agent and timeout
///
/// # Example
///
/// ```no_run
/// use zr_crawl::catalog::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client("zr-crawl/0.1", Duration::from_secs(60)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    searched_products: SearchedProducts,
}

#[derive(Debug, Deserialize)]
struct SearchedProducts {
    #[serde(default)]
    products: Vec<ListingItem>,
    #[serde(default)]
    pagination: Option<SearchPagination>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPagination {
    total_pages: Option<u64>,
    total_products: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointsResponse {
    total_points: i64,
}

/// Shop client implementing every catalog source
///
/// The underlying `reqwest::Client` is a connection pool that is safe to
/// share between concurrent requests.
#[derive(Debug, Clone)]
pub struct ShopClient {
    client: Client,
    urls: ShopUrls,
    page_size: u32,
}

impl ShopClient {
    pub fn new(client: Client, urls: ShopUrls, page_size: u32) -> Self {
        Self {
            client,
            urls,
            page_size,
        }
    }

    /// Builds the client and URL set from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_http_client(
            &config.shop.user_agent,
            Duration::from_secs(config.scraper.request_timeout_secs),
        )
        .map_err(|source| ScrapeError::Http {
            url: config.shop.api_base_url.clone(),
            source,
        })?;
        let urls = ShopUrls::from_config(&config.shop)?;
        Ok(Self::new(client, urls, config.scraper.page_size))
    }

    pub fn urls(&self) -> &ShopUrls {
        &self.urls
    }

    fn language(&self) -> Language {
        self.urls.language()
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .header(ACCEPT_LANGUAGE, self.language().iso())
            .send()
            .await
            .map_err(|source| ScrapeError::Http {
                url: url.to_string(),
                source,
            })?;

        decode_json(&url, response).await
    }
}

/// Reads a successful response body as text
async fn read_body(url: &Url, response: Response) -> Result<String> {
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

async fn decode_json<T: DeserializeOwned>(url: &Url, response: Response) -> Result<T> {
    let body = read_body(url, response).await?;
    serde_json::from_str(&body).map_err(|e| ScrapeError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl CatalogSource for ShopClient {
    async fn fetch_categories(&self) -> Result<Vec<Category>> {
        let url = self.urls.category_tree()?;
        tracing::info!("Fetching category tree: {}", url);
        self.get_json(url).await
    }

    async fn fetch_page(&self, category: &Category, page: u32) -> Result<ListingPage> {
        let url = self.urls.search(category, page, self.page_size)?;
        tracing::debug!("Fetching category page: {}", url);

        let response: SearchResponse = self.get_json(url).await?;
        let pagination = response.searched_products.pagination;

        Ok(ListingPage {
            items: response.searched_products.products,
            total_items: pagination.as_ref().and_then(|p| p.total_products),
            total_pages: pagination.as_ref().and_then(|p| p.total_pages),
        })
    }
}

#[async_trait]
impl DetailSource for ShopClient {
    async fn fetch_package_info(&self, product_url: &str) -> Result<PackageInfo> {
        let url = Url::parse(product_url)?;
        tracing::debug!("Fetching product page: {}", url);

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT_LANGUAGE, self.language().iso())
            .send()
            .await
            .map_err(|source| ScrapeError::Http {
                url: url.to_string(),
                source,
            })?;

        let html = read_body(&url, response).await?;
        Ok(extract_package_info(&html))
    }
}

#[async_trait]
impl LoyaltySource for ShopClient {
    async fn fetch_loyalty_points(&self, item: &ListingItem) -> Result<LoyaltyPoints> {
        let url = self.urls.loyalty_points()?;
        let body = json!({
            "cumulusCode": "",
            "input": {
                "products": {
                    "brandReadableId": item.brand.readable_id,
                    "breadcrumb": item.breadcrumb.with_backfilled_slugs(),
                    "id": item.id,
                    "landingIds": item.landing_ids.clone().unwrap_or_default(),
                    "numberOfUnits": 1,
                    "price": item.price.sales_price,
                    "productReadableId": item.readable_id,
                }
            }
        });

        let response = self
            .client
            .post(url.clone())
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|source| ScrapeError::Http {
                url: url.to_string(),
                source,
            })?;

        let points: PointsResponse = decode_json(&url, response).await?;
        Ok(LoyaltyPoints {
            points: points.total_points,
        })
    }
}
