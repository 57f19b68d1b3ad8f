//! Product page extraction for sitemap crawls

use crate::output::CsvRow;
use scraper::{Html, Selector};
use serde_json::Value;

/// CSV header of sitemap crawls, in column order
pub const PAGE_HEADER: [&str; 5] = ["name", "subname", "articleNumber", "price", "images"];

const GALLERY_ROLE: &str = "[data-gallery-role=gallery-placeholder]";
const GALLERY_WIDGET: &str = "mage/gallery/gallery";

/// Product data scraped from one storefront page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPage {
    pub name: String,
    pub subname: String,
    pub article_number: String,
    pub price: String,
    /// Full-size gallery image URLs joined by `|`
    pub images: String,
    pub url: String,
}

impl CsvRow for ProductPage {
    fn fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.subname.as_str(),
            self.article_number.as_str(),
            self.price.as_str(),
            self.images.as_str(),
        ]
    }
}

/// Extracts a product page; missing elements become empty strings
///
/// The name falls back to the subtitle when the main title is empty.
pub fn extract_product_page(html: &str, url: &str) -> ProductPage {
    let document = Html::parse_document(html);

    let name = select_text(&document, ".product-title__main").unwrap_or_default();
    let subname = select_text(&document, ".product-title__subtitle").unwrap_or_default();
    let article_number = select_text(&document, ".product-info-article-number")
        .map(|text| text.replace("Art.Nr.", "").trim().to_string())
        .unwrap_or_default();

    ProductPage {
        name: if name.is_empty() { subname.clone() } else { name },
        subname,
        article_number,
        price: select_raw_text(&document, ".price").unwrap_or_default(),
        images: gallery_images(&document).join("|"),
        url: url.to_string(),
    }
}

fn select_text(document: &Html, css: &str) -> Option<String> {
    select_raw_text(document, css).map(|text| text.trim().to_string())
}

/// Text of the first element matching `css`, whitespace kept
fn select_raw_text(document: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect())
}

/// Collects the `full` image URLs of every magento gallery widget
///
/// Init scripts that are not JSON or configure another widget are skipped.
fn gallery_images(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse(r#"script[type="text/x-magento-init"]"#) else {
        return Vec::new();
    };

    let mut images = Vec::new();
    for script in document.select(&selector) {
        let text = script.text().collect::<String>();
        let Ok(config) = serde_json::from_str::<Value>(&text) else {
            continue;
        };

        let entries = config
            .get(GALLERY_ROLE)
            .and_then(|role| role.get(GALLERY_WIDGET))
            .and_then(|gallery| gallery.get("data"))
            .and_then(Value::as_array);

        if let Some(entries) = entries {
            images.extend(
                entries
                    .iter()
                    .filter_map(|entry| entry.get("full").and_then(Value::as_str))
                    .map(str::to_string),
            );
        }
    }

    images
}
