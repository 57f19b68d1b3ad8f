//! Projection of a listing item and its enrichment into a canonical record

use crate::catalog::ListingItem;
use crate::pipeline::Enrichment;
use crate::record::CanonicalRecord;
use url::Url;

/// Separator between category names of the full category path
const CATEGORY_SEPARATOR: &str = " > ";

/// Separator between image URLs
const IMAGE_SEPARATOR: &str = "|";

/// Builds the hashed record for `item`
///
/// Pure: the same inputs always produce the same record and hash.
pub fn assemble(item: &ListingItem, enrichment: &Enrichment, link: &Url) -> CanonicalRecord {
    let package = &enrichment.package;

    CanonicalRecord {
        hash: String::new(),
        category: item.main_category.category_name.clone(),
        full_category: item.breadcrumb.path_names().join(CATEGORY_SEPARATOR),
        name: item.name.clone(),
        package_size: package.size.clone(),
        cumulus_points: enrichment.loyalty.points.to_string(),
        price: format_price(item.price.list_price()),
        reduced_price: format_price(item.price.sales_price),
        company: item.seller.seller_name.clone(),
        shipping_costs: format!("{} {}", package.shipping_currency, package.shipping_amount),
        images: item
            .files
            .iter()
            .map(|file| file.url.as_str())
            .collect::<Vec<_>>()
            .join(IMAGE_SEPARATOR),
        link: link.to_string(),
    }
    .with_hash()
}

/// Shortest decimal form of a price: `3.9`, `4`, `12.35`
pub fn format_price(price: f64) -> String {
    format!("{}", price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{LoyaltyPoints, PackageInfo};
    use crate::record::compute_hash;
    use serde_json::json;

    fn item() -> ListingItem {
        serde_json::from_value(json!({
            "product_id": "p1",
            "readable_id": "279H6NGM",
            "slug": "mundschutzmaske-typ-iir",
            "name": "Mundschutzmaske Typ IIR",
            "main_category": {"category_id": "c9", "category_name": "Hygienemasken"},
            "price": {"currency": "CHF", "originalPrice": 4.5, "salesPrice": 3.9},
            "best_seller": {"seller_name": "drogi Drogerie Giger"},
            "files": [
                {"position": 1, "url": "https://img.example.ch/a.jpg"},
                {"position": 2, "url": "https://img.example.ch/b.jpg"}
            ],
            "breadcrumb": {
                "id": "r", "name": "Gesundheit", "readable_id": "GES",
                "children": [{"id": "l", "name": "Hygienemasken", "readable_id": "HYG", "children": []}]
            }
        }))
        .unwrap()
    }

    fn link() -> Url {
        Url::parse("https://shop.example.ch/de/mundschutzmaske-typ-iir/dp/279H6NGM").unwrap()
    }

    fn enrichment() -> Enrichment {
        Enrichment {
            package: PackageInfo {
                size: "50 Stk".to_string(),
                shipping_amount: "7.9".to_string(),
                shipping_currency: "CHF".to_string(),
            },
            loyalty: LoyaltyPoints { points: 7 },
            degraded: Vec::new(),
        }
    }

    #[test]
    fn test_projects_every_column() {
        let record = assemble(&item(), &enrichment(), &link());

        assert_eq!(record.category, "Hygienemasken");
        assert_eq!(record.full_category, "Gesundheit > Hygienemasken");
        assert_eq!(record.name, "Mundschutzmaske Typ IIR");
        assert_eq!(record.package_size, "50 Stk");
        assert_eq!(record.cumulus_points, "7");
        assert_eq!(record.price, "4.5");
        assert_eq!(record.reduced_price, "3.9");
        assert_eq!(record.company, "drogi Drogerie Giger");
        assert_eq!(record.shipping_costs, "CHF 7.9");
        assert_eq!(
            record.images,
            "https://img.example.ch/a.jpg|https://img.example.ch/b.jpg"
        );
        assert_eq!(record.link, link().as_str());
        assert_eq!(record.hash, compute_hash(&record.content_fields()));
    }

    #[test]
    fn test_fallback_enrichment() {
        let record = assemble(&item(), &Enrichment::default(), &link());

        assert_eq!(record.package_size, "");
        assert_eq!(record.cumulus_points, "0");
        assert_eq!(record.shipping_costs, " ");
    }

    #[test]
    fn test_price_falls_back_to_sale_price() {
        let mut item = item();
        item.price.original_price = Some(0.0);

        let record = assemble(&item, &enrichment(), &link());
        assert_eq!(record.price, "3.9");
    }

    #[test]
    fn test_same_inputs_same_hash() {
        let first = assemble(&item(), &enrichment(), &link());
        let second = assemble(&item(), &enrichment(), &link());
        assert_eq!(first, second);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(3.9), "3.9");
        assert_eq!(format_price(4.0), "4");
        assert_eq!(format_price(12.35), "12.35");
    }
}
