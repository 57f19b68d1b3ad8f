//! Product detail page extraction
//!
//! Package size and shipping costs are not part of the listing API, they are
//! scraped from the product page:
//! - the package size is the text of `.product-detail__seller_quantity`
//! - shipping costs live in the server state blob assigned to
//!   `window.__SERVER_APP_STATE__` inside a deferred script
//!
//! Anything missing or malformed yields an empty string, never an error.

use crate::catalog::types::PackageInfo;
use scraper::{Html, Selector};
use serde_json::Value;

const SERVER_STATE_PREFIX: &str = "window.__SERVER_APP_STATE__ =";
const SHIPPING_COSTS_POINTER: &str = "/initialData/product/best_seller/shippingCosts";

/// Extracts package and shipping information from a product page
///
/// # Example
///
/// ```
/// use zr_crawl::catalog::extract_package_info;
///
/// let html = r#"<div class="product-detail__seller_quantity"> 50 Stk </div>"#;
/// assert_eq!(extract_package_info(html).size, "50 Stk");
/// ```
pub fn extract_package_info(html: &str) -> PackageInfo {
    let document = Html::parse_document(html);

    let size = extract_package_size(&document).unwrap_or_default();

    let (shipping_amount, shipping_currency) = match extract_server_state(&document) {
        Some(state) => extract_shipping_costs(&state),
        None => {
            tracing::debug!("No server state found on product page");
            (String::new(), String::new())
        }
    };

    PackageInfo {
        size,
        shipping_amount,
        shipping_currency,
    }
}

fn extract_package_size(document: &Html) -> Option<String> {
    let selector = Selector::parse(".product-detail__seller_quantity").ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
}

/// Parses the JSON assigned to the server state variable
fn extract_server_state(document: &Html) -> Option<Value> {
    let selector = Selector::parse("script[defer]").ok()?;

    document.select(&selector).find_map(|script| {
        let text = script.text().collect::<String>();
        let json = text.trim().strip_prefix(SERVER_STATE_PREFIX)?;
        serde_json::from_str(json.trim().trim_end_matches(';')).ok()
    })
}

fn extract_shipping_costs(state: &Value) -> (String, String) {
    match state.pointer(SHIPPING_COSTS_POINTER) {
        Some(costs) => (scalar_text(&costs["amount"]), scalar_text(&costs["currency"])),
        None => {
            tracing::debug!("Server state has no shipping costs");
            (String::new(), String::new())
        }
    }
}

/// Renders a JSON string or number as plain text
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}
