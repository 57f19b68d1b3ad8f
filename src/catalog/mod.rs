//! Shop catalog access
//!
//! This module contains everything that talks to the remote shop:
//! - The catalog data model (categories, listing items, enrichment data)
//! - The source traits the pipeline is written against
//! - The HTTP implementation of those traits
//! - Product detail page extraction and URL construction

mod client;
mod detail;
mod links;
mod types;

pub use client::{build_http_client, ShopClient};
pub use detail::extract_package_info;
pub use links::ShopUrls;
pub use types::{
    BrandRef, Breadcrumb, Category, CategoryRef, ListingItem, ListingPage, LoyaltyPoints,
    MediaFile, PackageInfo, Pricing, Seller,
};

use crate::Result;
use async_trait::async_trait;

/// Category tree and paginated product listing
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetches the category tree, roots first
    async fn fetch_categories(&self) -> Result<Vec<Category>>;

    /// Fetches one listing page of a category; pages start at 1
    ///
    /// An empty page marks the end of the category.
    async fn fetch_page(&self, category: &Category, page: u32) -> Result<ListingPage>;
}

/// Product detail pages
#[async_trait]
pub trait DetailSource: Send + Sync {
    async fn fetch_package_info(&self, product_url: &str) -> Result<PackageInfo>;
}

/// Loyalty-point computation service
#[async_trait]
pub trait LoyaltySource: Send + Sync {
    async fn fetch_loyalty_points(&self, item: &ListingItem) -> Result<LoyaltyPoints>;
}
