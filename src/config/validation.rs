use crate::config::types::{Config, OutputConfig, ScraperConfig, ShopConfig, SitemapConfig};
use crate::ConfigError;
use url::Url;

const MAX_PARALLELISM: usize = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_shop_config(&config.shop)?;
    validate_output_config(&config.output)?;
    validate_sitemap_config(&config.sitemap)?;
    Ok(())
}

/// Validates pipeline bounds
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    validate_parallelism("parallel_category", config.parallel_category)?;
    validate_parallelism("parallel_product", config.parallel_product)?;

    if config.page_size < 1 {
        return Err(ConfigError::Validation(
            "page_size must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_parallelism(name: &str, value: usize) -> Result<(), ConfigError> {
    if value < 1 || value > MAX_PARALLELISM {
        return Err(ConfigError::Validation(format!(
            "{} must be between 1 and {}, got {}",
            name, MAX_PARALLELISM, value
        )));
    }
    Ok(())
}

/// Validates shop endpoints
fn validate_shop_config(config: &ShopConfig) -> Result<(), ConfigError> {
    validate_base_url("api_base_url", &config.api_base_url)?;
    validate_base_url("shop_base_url", &config.shop_base_url)?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_sitemap_config(config: &SitemapConfig) -> Result<(), ConfigError> {
    validate_base_url("sitemap url", &config.url)?;
    validate_parallelism("parallel_pages", config.parallel_pages)
}

/// A base URL must parse and use http or https
fn validate_base_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            name, value
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_parallelism() {
        assert!(validate_parallelism("p", 1).is_ok());
        assert!(validate_parallelism("p", 100).is_ok());

        assert!(validate_parallelism("p", 0).is_err());
        assert!(validate_parallelism("p", 101).is_err());
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("u", "https://api.example.com").is_ok());
        assert!(validate_base_url("u", "http://127.0.0.1:8080").is_ok());

        assert!(validate_base_url("u", "").is_err());
        assert!(validate_base_url("u", "ftp://example.com").is_err());
        assert!(validate_base_url("u", "not a url").is_err());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut config = Config::default();
        config.scraper.page_size = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_empty_output_path_rejected() {
        let mut config = Config::default();
        config.output.path = "  ".to_string();
        assert!(validate(&config).is_err());
    }
}
