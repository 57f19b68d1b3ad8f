//! Canonical output record
//!
//! One flat record per product with a fixed column order. The `hash` column
//! is a SHA-256 digest over every other column, so it changes whenever any
//! published value changes and stays the same across runs otherwise.
//! Reordering the columns changes every hash.

mod assemble;

pub use assemble::{assemble, format_price};

use crate::output::CsvRow;
use sha2::{Digest, Sha256};

/// CSV header, in column order
pub const HEADER: [&str; 12] = [
    "hash",
    "category",
    "fullCategory",
    "name",
    "packageSize",
    "cumulusPoints",
    "price",
    "reducedPrice",
    "company",
    "shippingCosts",
    "images",
    "link",
];

/// A fully assembled product row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalRecord {
    pub hash: String,
    pub category: String,
    pub full_category: String,
    pub name: String,
    pub package_size: String,
    pub cumulus_points: String,
    pub price: String,
    pub reduced_price: String,
    pub company: String,
    pub shipping_costs: String,
    pub images: String,
    pub link: String,
}

impl CanonicalRecord {
    /// Every column except `hash`, in column order
    pub fn content_fields(&self) -> [&str; 11] {
        [
            self.category.as_str(),
            self.full_category.as_str(),
            self.name.as_str(),
            self.package_size.as_str(),
            self.cumulus_points.as_str(),
            self.price.as_str(),
            self.reduced_price.as_str(),
            self.company.as_str(),
            self.shipping_costs.as_str(),
            self.images.as_str(),
            self.link.as_str(),
        ]
    }

    /// Recomputes the hash from the current content fields
    pub fn with_hash(mut self) -> Self {
        self.hash = compute_hash(&self.content_fields());
        self
    }
}

impl CsvRow for CanonicalRecord {
    fn fields(&self) -> Vec<&str> {
        let mut fields = Vec::with_capacity(HEADER.len());
        fields.push(self.hash.as_str());
        fields.extend(self.content_fields());
        fields
    }
}

/// Hex SHA-256 over the plain concatenation of `fields`
pub fn compute_hash(fields: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for field in fields {
        hasher.update(field.as_bytes());
    }
    hex::encode(hasher.finalize())
}
