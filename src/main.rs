//! zr-crawl main entry point
//!
//! This is the command-line interface for the zr-crawl catalog crawler.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use zr_crawl::catalog::build_http_client;
use zr_crawl::config::{load_config_or_default, validate, Config, Language};
use zr_crawl::output::CsvSink;
use zr_crawl::sitemap::SitemapCrawler;
use zr_crawl::{Pipeline, RetryPolicy, ShopClient};

/// zr-crawl: a catalog crawler for online pharmacy shops
///
/// Walks the shop's category tree, collects every listed product, enriches
/// it with package, shipping and loyalty-point data and writes one hashed
/// CSV row per product.
#[derive(Parser, Debug)]
#[command(name = "zr-crawl")]
#[command(version)]
#[command(about = "A catalog crawler for online pharmacy shops", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used without one)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Path of the CSV output file
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// How many times a failed request is retried
    #[arg(long, global = true)]
    retry: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Crawl the shop catalog through its listing API (default)
    Catalog {
        /// Storefront language
        #[arg(long, value_enum)]
        lang: Option<Language>,

        /// How many categories are fetched at the same time
        #[arg(long)]
        parallel_category: Option<usize>,

        /// How many products are enriched at the same time
        #[arg(long)]
        parallel_product: Option<usize>,
    },

    /// Crawl the product pages listed in a sitemap
    Sitemap {
        /// Sitemap URL
        #[arg(long)]
        url: Option<String>,

        /// How many pages are fetched at the same time
        #[arg(long, alias = "parallel-product")]
        parallel_pages: Option<usize>,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Catalog {
            lang: None,
            parallel_category: None,
            parallel_product: None,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_config_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(path) = &cli.config {
        tracing::info!("Configuration loaded from: {}", path.display());
    }

    let command = cli.command.clone().unwrap_or_default();
    apply_overrides(&mut config, &cli, &command);
    validate(&config).context("Invalid command-line override")?;

    if cli.dry_run {
        print_dry_run(&config, &command);
        return Ok(());
    }

    match command {
        Command::Catalog { .. } => handle_catalog(&config).await,
        Command::Sitemap { .. } => handle_sitemap(&config).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("zr_crawl=info,warn"),
            1 => EnvFilter::new("zr_crawl=debug,info"),
            2 => EnvFilter::new("zr_crawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Command-line flags take precedence over the configuration file
fn apply_overrides(config: &mut Config, cli: &Cli, command: &Command) {
    if let Some(output) = &cli.output {
        config.output.path = output.display().to_string();
    }
    if let Some(retry) = cli.retry {
        config.scraper.retry = retry;
    }

    match command {
        Command::Catalog {
            lang,
            parallel_category,
            parallel_product,
        } => {
            if let Some(lang) = lang {
                config.shop.language = *lang;
            }
            if let Some(parallel) = parallel_category {
                config.scraper.parallel_category = *parallel;
            }
            if let Some(parallel) = parallel_product {
                config.scraper.parallel_product = *parallel;
            }
        }
        Command::Sitemap {
            url,
            parallel_pages,
        } => {
            if let Some(url) = url {
                config.sitemap.url = url.clone();
            }
            if let Some(parallel) = parallel_pages {
                config.sitemap.parallel_pages = *parallel;
            }
        }
    }
}

/// Handles the --dry-run mode: shows the effective configuration
fn print_dry_run(config: &Config, command: &Command) {
    println!("=== zr-crawl Dry Run ===\n");

    match command {
        Command::Catalog { .. } => {
            println!("Catalog crawl:");
            println!("  API: {}", config.shop.api_base_url);
            println!("  Shop: {}", config.shop.shop_base_url);
            println!("  Language: {}", config.shop.language.code());
            println!("  Category depth: {:?}", config.scraper.category_depth);
            println!("  Parallel categories: {}", config.scraper.parallel_category);
            println!("  Parallel products: {}", config.scraper.parallel_product);
            println!("  Page size: {}", config.scraper.page_size);
        }
        Command::Sitemap { .. } => {
            println!("Sitemap crawl:");
            println!("  Sitemap: {}", config.sitemap.url);
            println!("  Parallel pages: {}", config.sitemap.parallel_pages);
        }
    }

    println!("  Retries per request: {}", config.scraper.retry);
    println!("  Request timeout: {}s", config.scraper.request_timeout_secs);
    println!("  User agent: {}", config.shop.user_agent);
    println!("\nOutput: {}", config.output.path);
    println!("\n✓ Configuration is valid");
}

async fn handle_catalog(config: &Config) -> anyhow::Result<()> {
    let client = ShopClient::from_config(config).context("Failed to set up shop client")?;
    let mut sink = create_sink(Path::new(&config.output.path))?;

    let pipeline = Pipeline::from_client(&client, &config.scraper);
    let stats = pipeline.run(&mut sink).await.context("Catalog crawl failed")?;
    tracing::info!("Wrote {} rows to {}", sink.rows_written(), config.output.path);

    stats.log_summary();
    Ok(())
}

async fn handle_sitemap(config: &Config) -> anyhow::Result<()> {
    let client = build_http_client(
        &config.shop.user_agent,
        Duration::from_secs(config.scraper.request_timeout_secs),
    )
    .context("Failed to build HTTP client")?;
    let mut sink = create_sink(Path::new(&config.output.path))?;

    let policy = RetryPolicy::new(config.scraper.retry);
    let crawler = SitemapCrawler::new(&client, &config.sitemap, policy);
    let stats = crawler.run(&mut sink).await.context("Sitemap crawl failed")?;
    tracing::info!("Wrote {} rows to {}", sink.rows_written(), config.output.path);

    stats.log_summary();
    Ok(())
}

fn create_sink(path: &Path) -> anyhow::Result<CsvSink<std::fs::File>> {
    CsvSink::create(path).with_context(|| format!("Failed to create {}", path.display()))
}
