//! URL construction for the shop API and storefront

use crate::catalog::types::{Category, ListingItem};
use crate::config::{Language, ShopConfig};
use crate::{Result, ScrapeError};
use url::Url;

/// Builds every URL the crawler requests or emits
#[derive(Debug, Clone)]
pub struct ShopUrls {
    api_base: Url,
    shop_base: Url,
    language: Language,
}

impl ShopUrls {
    pub fn new(api_base: Url, shop_base: Url, language: Language) -> Self {
        Self {
            api_base,
            shop_base,
            language,
        }
    }

    pub fn from_config(config: &ShopConfig) -> Result<Self> {
        Ok(Self::new(
            Url::parse(&config.api_base_url)?,
            Url::parse(&config.shop_base_url)?,
            config.language,
        ))
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// `<api>/category-tree`, oldest categories first
    pub fn category_tree(&self) -> Result<Url> {
        let mut url = with_segments(&self.api_base, &["category-tree"])?;
        url.query_pairs_mut()
            .append_pair("orderBy", "created_at")
            .append_pair("orderType", "ASC");
        Ok(url)
    }

    /// `<api>/search` for one page of a category (pages start at 1)
    pub fn search(&self, category: &Category, page: u32, page_size: u32) -> Result<Url> {
        let mut url = with_segments(&self.api_base, &["search"])?;
        url.query_pairs_mut()
            .append_pair("categoryIds[]", &category.id)
            .append_pair("page", &page.to_string())
            .append_pair("size", &page_size.to_string())
            .append_pair("facets", "0")
            .append_pair("onlyFacets", "0")
            .append_pair("facetsCategoryLevel", &category.level.to_string())
            .append_pair("pageName", "category_page")
            .append_pair("fullSearch", "true");
        Ok(url)
    }

    pub fn loyalty_points(&self) -> Result<Url> {
        with_segments(&self.api_base, &["cumulus", "calculatePoints"])
    }

    /// Canonical storefront link: `<shop>/<lang>/<slug>/dp/<readable id>`
    pub fn product(&self, item: &ListingItem) -> Result<Url> {
        with_segments(
            &self.shop_base,
            &[
                self.language.code(),
                item.slug.as_str(),
                "dp",
                item.readable_id.as_str(),
            ],
        )
    }
}

/// Appends percent-encoded path segments to a base URL
fn with_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ScrapeError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
