//! Per-product enrichment with isolated retries
//!
//! Each product gets two secondary lookups: package/shipping info from the
//! detail page and loyalty points from the points service. Both run at the
//! same time, each under its own retry budget. When a lookup gives up, its
//! default value is used and the product is flagged as degraded; a product
//! is never dropped because of an enrichment failure.

use crate::catalog::{DetailSource, ListingItem, LoyaltyPoints, LoyaltySource, PackageInfo};
use crate::pipeline::retry::RetryPolicy;
use crate::ScrapeError;
use std::fmt;

/// The secondary lookups made for every product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnrichmentKind {
    PackageInfo,
    LoyaltyPoints,
}

impl EnrichmentKind {
    pub fn operation(self) -> &'static str {
        match self {
            EnrichmentKind::PackageInfo => "fetch_package_info",
            EnrichmentKind::LoyaltyPoints => "fetch_loyalty_points",
        }
    }
}

impl fmt::Display for EnrichmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation())
    }
}

/// Merged result of both lookups
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enrichment {
    pub package: PackageInfo,
    pub loyalty: LoyaltyPoints,

    /// Lookups that fell back to their default value
    pub degraded: Vec<EnrichmentKind>,
}

impl Enrichment {
    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

/// Runs the enrichment lookups for one product at a time
///
/// Holds only shared references, so one enricher serves every concurrent
/// product of the pipeline.
#[derive(Clone, Copy)]
pub struct Enricher<'a> {
    details: &'a dyn DetailSource,
    loyalty: &'a dyn LoyaltySource,
    policy: RetryPolicy,
}

impl<'a> Enricher<'a> {
    pub fn new(
        details: &'a dyn DetailSource,
        loyalty: &'a dyn LoyaltySource,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            details,
            loyalty,
            policy,
        }
    }

    /// Looks up package info and loyalty points for `item`
    ///
    /// Waits for both lookups to succeed or give up.
    pub async fn enrich(&self, item: &ListingItem, product_url: &str) -> Enrichment {
        let package = self.policy.run(
            || self.details.fetch_package_info(product_url),
            |call, error| self.log_attempt(EnrichmentKind::PackageInfo, item, call, error),
        );
        let loyalty = self.policy.run(
            || self.loyalty.fetch_loyalty_points(item),
            |call, error| self.log_attempt(EnrichmentKind::LoyaltyPoints, item, call, error),
        );

        let (package, loyalty) = tokio::join!(package, loyalty);
        let mut degraded = Vec::new();

        let package = package.unwrap_or_else(|error| {
            give_up(EnrichmentKind::PackageInfo, item, &error);
            degraded.push(EnrichmentKind::PackageInfo);
            PackageInfo::default()
        });

        let loyalty = loyalty.unwrap_or_else(|error| {
            give_up(EnrichmentKind::LoyaltyPoints, item, &error);
            degraded.push(EnrichmentKind::LoyaltyPoints);
            LoyaltyPoints::default()
        });

        Enrichment {
            package,
            loyalty,
            degraded,
        }
    }

    fn log_attempt(&self, kind: EnrichmentKind, item: &ListingItem, call: u32, error: &ScrapeError) {
        tracing::debug!(
            "{} failed for product {} (attempt {}/{}): {}",
            kind,
            item.id,
            call,
            self.policy.max_calls(),
            error
        );
    }
}

fn give_up(kind: EnrichmentKind, item: &ListingItem, error: &ScrapeError) {
    tracing::warn!(
        "{}: giving up on product {} ({}), using default: {}",
        kind,
        item.id,
        item.name,
        error
    );
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Barrier;

    /// Detail source failing its first `failures` calls
    #[derive(Default)]
    pub(crate) struct FakeDetails {
        pub failures: u32,
        pub calls: AtomicU32,
    }

    impl FakeDetails {
        pub fn failing(failures: u32) -> Self {
            Self {
                failures,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl DetailSource for FakeDetails {
        async fn fetch_package_info(&self, product_url: &str) -> Result<PackageInfo> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                return Err(ScrapeError::Status {
                    url: product_url.to_string(),
                    status: 502,
                });
            }
            Ok(PackageInfo {
                size: "50 Stk".to_string(),
                shipping_amount: "7.90".to_string(),
                shipping_currency: "CHF".to_string(),
            })
        }
    }

    /// Loyalty source failing its first `failures` calls
    #[derive(Default)]
    pub(crate) struct FakeLoyalty {
        pub failures: u32,
        pub points: i64,
        pub calls: AtomicU32,
    }

    impl FakeLoyalty {
        pub fn granting(points: i64) -> Self {
            Self {
                points,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl LoyaltySource for FakeLoyalty {
        async fn fetch_loyalty_points(&self, item: &ListingItem) -> Result<LoyaltyPoints> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                return Err(ScrapeError::Decode {
                    url: format!("fake://points/{}", item.id),
                    message: "missing totalPoints".to_string(),
                });
            }
            Ok(LoyaltyPoints {
                points: self.points,
            })
        }
    }

    fn item() -> ListingItem {
        ListingItem {
            id: "p1".to_string(),
            name: "Maske".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_both_lookups_succeed() {
        let details = FakeDetails::failing(0);
        let loyalty = FakeLoyalty::granting(7);
        let enricher = Enricher::new(&details, &loyalty, RetryPolicy::new(2));

        let enrichment = enricher.enrich(&item(), "https://shop/p1").await;

        assert_eq!(enrichment.package.size, "50 Stk");
        assert_eq!(enrichment.loyalty.points, 7);
        assert!(!enrichment.is_degraded());
    }

    #[tokio::test]
    async fn test_package_failure_falls_back_without_touching_points() {
        let details = FakeDetails::failing(u32::MAX);
        let loyalty = FakeLoyalty::granting(7);
        let enricher = Enricher::new(&details, &loyalty, RetryPolicy::new(2));

        let enrichment = enricher.enrich(&item(), "https://shop/p1").await;

        assert_eq!(enrichment.package, PackageInfo::default());
        assert_eq!(enrichment.loyalty.points, 7);
        assert_eq!(enrichment.degraded, vec![EnrichmentKind::PackageInfo]);
        assert_eq!(details.calls.load(Ordering::SeqCst), 3);
        assert_eq!(loyalty.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_loyalty_failure_falls_back_to_zero() {
        let details = FakeDetails::failing(0);
        let loyalty = FakeLoyalty {
            failures: u32::MAX,
            points: 7,
            ..Default::default()
        };
        let enricher = Enricher::new(&details, &loyalty, RetryPolicy::new(1));

        let enrichment = enricher.enrich(&item(), "https://shop/p1").await;

        assert_eq!(enrichment.loyalty, LoyaltyPoints::default());
        assert_eq!(enrichment.package.shipping_currency, "CHF");
        assert_eq!(enrichment.degraded, vec![EnrichmentKind::LoyaltyPoints]);
        assert_eq!(loyalty.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_transient_failure_recovers_within_budget() {
        let details = FakeDetails::failing(2);
        let loyalty = FakeLoyalty::granting(3);
        let enricher = Enricher::new(&details, &loyalty, RetryPolicy::new(2));

        let enrichment = enricher.enrich(&item(), "https://shop/p1").await;

        assert_eq!(enrichment.package.size, "50 Stk");
        assert!(!enrichment.is_degraded());
        assert_eq!(details.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_lookups_run_concurrently() {
        // Each lookup blocks until the other one has started
        let barrier = Arc::new(Barrier::new(2));
        let details = BarrierDetails(barrier.clone());
        let loyalty = BarrierLoyalty(barrier);
        let enricher = Enricher::new(&details, &loyalty, RetryPolicy::new(0));

        let result = tokio::time::timeout(
            Duration::from_secs(1),
            enricher.enrich(&item(), "https://shop/p1"),
        )
        .await;

        assert!(result.is_ok(), "lookups did not run at the same time");
    }

    struct BarrierDetails(Arc<Barrier>);

    #[async_trait]
    impl DetailSource for BarrierDetails {
        async fn fetch_package_info(&self, _product_url: &str) -> Result<PackageInfo> {
            self.0.wait().await;
            Ok(PackageInfo::default())
        }
    }

    struct BarrierLoyalty(Arc<Barrier>);

    #[async_trait]
    impl LoyaltySource for BarrierLoyalty {
        async fn fetch_loyalty_points(&self, _item: &ListingItem) -> Result<LoyaltyPoints> {
            self.0.wait().await;
            Ok(LoyaltyPoints { points: 1 })
        }
    }
}
