//! zr-crawl: a catalog crawler for online pharmacy shops
//!
//! This crate walks the category tree of a shop API, paginates the product
//! listing of every category, enriches each product with data from the
//! product detail page and the loyalty-point service, and streams one hashed
//! CSV row per product to disk.

pub mod catalog;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod record;
pub mod sitemap;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("Output error: {0}")]
    Sink(#[from] output::SinkError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use catalog::{Category, ListingItem, ShopClient};
pub use config::Config;
pub use pipeline::{BoundedParallel, Pipeline, RetryPolicy};
pub use record::CanonicalRecord;
