//! Configuration module for zr-crawl
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so a crawl can run without any file at all.
//!
//! # Example
//!
//! ```no_run
//! use zr_crawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("zr-crawl.toml")).unwrap();
//! println!("Categories in parallel: {}", config.scraper.parallel_category);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CategoryDepth, Config, Language, OutputConfig, ScraperConfig, ShopConfig, SitemapConfig,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default};
pub use validation::validate;
