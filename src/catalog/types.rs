//! Catalog data model
//!
//! These types mirror the shop API closely enough to be deserialized
//! directly from its responses. Every field is defaulted so a partially
//! filled product still makes it into the output.

use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A node of the shop's category tree
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: String,
    pub level: u32,
    pub name: String,
    pub slug: Option<String>,
    pub readable_id: Option<String>,

    /// Product count announced by the category endpoint
    pub total_products: Option<u64>,

    pub children: Option<Vec<Category>>,
}

/// One product as returned by the paginated listing endpoint
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ListingItem {
    #[serde(rename = "product_id")]
    pub id: String,

    pub readable_id: String,
    pub slug: String,
    pub name: String,

    #[serde(deserialize_with = "null_as_default")]
    pub main_category: CategoryRef,

    #[serde(deserialize_with = "null_as_default")]
    pub price: Pricing,

    #[serde(rename = "best_seller", deserialize_with = "null_as_default")]
    pub seller: Seller,

    #[serde(deserialize_with = "null_as_default")]
    pub files: Vec<MediaFile>,

    #[serde(deserialize_with = "null_as_default")]
    pub breadcrumb: Breadcrumb,

    #[serde(deserialize_with = "null_as_default")]
    pub brand: BrandRef,

    #[serde(rename = "landingIds")]
    pub landing_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CategoryRef {
    pub category_id: String,
    pub category_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Pricing {
    pub currency: Option<String>,
    pub original_price: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub sales_price: f64,
}

impl Pricing {
    /// The list price, falling back to the sale price when none is set
    pub fn list_price(&self) -> f64 {
        match self.original_price {
            Some(price) if price != 0.0 => price,
            _ => self.sales_price,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Seller {
    pub seller_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MediaFile {
    pub position: Option<u32>,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BrandRef {
    pub readable_id: String,
}

/// Category path of a product, root first
///
/// Unknown fields are kept so the node can be sent back to the API as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Breadcrumb {
    pub id: String,
    pub name: String,
    pub readable_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub children: Vec<Breadcrumb>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Breadcrumb {
    /// Returns a copy where every node without a slug uses its readable id
    ///
    /// The loyalty-point service rejects breadcrumbs with slug-less nodes.
    pub fn with_backfilled_slugs(&self) -> Breadcrumb {
        let slug = match &self.slug {
            Some(slug) if !slug.is_empty() => slug.clone(),
            _ => self.readable_id.clone(),
        };

        Breadcrumb {
            slug: Some(slug),
            children: self
                .children
                .iter()
                .map(Breadcrumb::with_backfilled_slugs)
                .collect(),
            ..self.clone()
        }
    }

    /// Node names from the root down, following the first child at each level
    pub fn path_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut node = Some(self);

        while let Some(current) = node {
            if !current.name.is_empty() {
                names.push(current.name.as_str());
            }
            node = current.children.first();
        }

        names
    }
}

/// One page of the listing endpoint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPage {
    pub items: Vec<ListingItem>,
    pub total_items: Option<u64>,
    pub total_pages: Option<u64>,
}

/// Packaging and shipping details scraped from the product page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageInfo {
    pub size: String,
    pub shipping_amount: String,
    pub shipping_currency: String,
}

/// Loyalty points granted for buying one unit of a product
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoyaltyPoints {
    pub points: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn breadcrumb() -> Breadcrumb {
        serde_json::from_value(json!({
            "id": "root",
            "name": "Gesundheit",
            "readable_id": "GES",
            "slug": "gesundheit",
            "children": [{
                "id": "child",
                "name": "Sanität & Mundschutz",
                "readable_id": "QGRPKE",
                "level": 2,
                "children": [{
                    "id": "leaf",
                    "name": "Hygienemasken",
                    "readable_id": "HYG",
                    "children": null
                }]
            }]
        }))
        .unwrap()
    }

    #[test]
    fn test_backfill_keeps_existing_slug() {
        let patched = breadcrumb().with_backfilled_slugs();
        assert_eq!(patched.slug.as_deref(), Some("gesundheit"));
    }

    #[test]
    fn test_backfill_fills_missing_slugs_recursively() {
        let patched = breadcrumb().with_backfilled_slugs();
        let child = &patched.children[0];
        assert_eq!(child.slug.as_deref(), Some("QGRPKE"));
        assert_eq!(child.children[0].slug.as_deref(), Some("HYG"));
    }

    #[test]
    fn test_backfill_preserves_unknown_fields() {
        let patched = breadcrumb().with_backfilled_slugs();
        let value = serde_json::to_value(&patched.children[0]).unwrap();
        assert_eq!(value["level"], json!(2));
        assert_eq!(value["slug"], json!("QGRPKE"));
    }

    #[test]
    fn test_path_names() {
        assert_eq!(
            breadcrumb().path_names(),
            vec!["Gesundheit", "Sanität & Mundschutz", "Hygienemasken"]
        );
    }

    #[test]
    fn test_list_price_falls_back_to_sale_price() {
        let mut pricing = Pricing {
            currency: Some("CHF".to_string()),
            original_price: Some(4.5),
            sales_price: 3.9,
        };
        assert_eq!(pricing.list_price(), 4.5);

        pricing.original_price = Some(0.0);
        assert_eq!(pricing.list_price(), 3.9);

        pricing.original_price = None;
        assert_eq!(pricing.list_price(), 3.9);
    }

    #[test]
    fn test_listing_item_tolerates_nulls() {
        let item: ListingItem = serde_json::from_value(json!({
            "product_id": "p1",
            "readable_id": "279H6NGM",
            "name": "Mundschutzmaske Typ IIR",
            "files": null,
            "landingIds": null,
            "best_seller": { "seller_name": "drogi Drogerie Giger" },
            "price": { "currency": "CHF", "discount": null, "originalPrice": null, "salesPrice": 3.9 }
        }))
        .unwrap();

        assert_eq!(item.id, "p1");
        assert!(item.files.is_empty());
        assert_eq!(item.landing_ids, None);
        assert_eq!(item.seller.seller_name, "drogi Drogerie Giger");
        assert_eq!(item.price.list_price(), 3.9);
    }
}
