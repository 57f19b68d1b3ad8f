//! Sitemap XML parsing

use crate::{Result, ScrapeError};
use serde::Deserialize;

/// `<urlset>` root of a sitemap
#[derive(Debug, Deserialize)]
struct UrlSet {
    #[serde(rename = "url", default)]
    urls: Vec<UrlEntry>,
}

#[derive(Debug, Deserialize)]
struct UrlEntry {
    loc: String,
}

/// Returns every `<loc>` of a sitemap, in document order
///
/// `source` is only used for error messages.
pub fn parse_sitemap(xml: &str, source: &str) -> Result<Vec<String>> {
    let urlset: UrlSet = quick_xml::de::from_str(xml).map_err(|e| ScrapeError::Decode {
        url: source.to_string(),
        message: e.to_string(),
    })?;

    Ok(urlset
        .urls
        .into_iter()
        .map(|entry| entry.loc.trim().to_string())
        .filter(|loc| !loc.is_empty())
        .collect())
}
