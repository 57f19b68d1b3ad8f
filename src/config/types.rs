use serde::Deserialize;

/// Main configuration structure for zr-crawl
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    pub shop: ShopConfig,
    pub output: OutputConfig,
    pub sitemap: SitemapConfig,
}

/// Pipeline behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScraperConfig {
    /// How many categories are paginated at the same time
    pub parallel_category: usize,

    /// How many products are enriched at the same time
    pub parallel_product: usize,

    /// Extra attempts for each enrichment call after the first failure
    pub retry: u32,

    /// Number of products requested per listing page
    pub page_size: u32,

    /// Which part of the category tree is crawled
    pub category_depth: CategoryDepth,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            parallel_category: 3,
            parallel_product: 5,
            retry: 2,
            page_size: 300,
            category_depth: CategoryDepth::TopLevel,
            request_timeout_secs: 60,
        }
    }
}

/// Which categories of the tree are turned into listing queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryDepth {
    /// Only the roots returned by the category endpoint
    #[default]
    TopLevel,

    /// Every node, parents before their children
    All,
}

/// Shop endpoints and localisation
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ShopConfig {
    pub language: Language,

    /// Base URL of the JSON API (category tree, search, loyalty points)
    pub api_base_url: String,

    /// Base URL of the storefront used for product links and detail pages
    pub shop_base_url: String,

    pub user_agent: String,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            language: Language::De,
            api_base_url: "https://api-mkp.zurrose-shop.ch".to_string(),
            shop_base_url: "https://www.zurrose-shop.ch".to_string(),
            user_agent: format!("zr-crawl/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Storefront language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    De,
    Fr,
}

impl Language {
    /// Path segment used in storefront URLs
    pub fn code(self) -> &'static str {
        match self {
            Language::De => "de",
            Language::Fr => "fr",
        }
    }

    /// Value of the `Accept-Language` header sent to the API
    pub fn iso(self) -> &'static str {
        match self {
            Language::De => "de-DE",
            Language::Fr => "fr-FR",
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the CSV file, truncated at the start of a run
    pub path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "products.csv".to_string(),
        }
    }
}

/// Sitemap crawl configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SitemapConfig {
    pub url: String,

    /// How many product pages are fetched at the same time
    pub parallel_pages: usize,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            url: "https://www.amavita.ch/sitemaps/de/sitemap-1-4.xml".to_string(),
            parallel_pages: 5,
        }
    }
}
