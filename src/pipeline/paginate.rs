//! Lazy pagination over a category listing
//!
//! Pages are requested one after another, starting at the given page, and
//! the stream ends at the first empty page. A page is only requested once
//! every item of the previous page has been pulled by the consumer.
//! Failures end the stream with the error; nothing is retried here.

use crate::catalog::{CatalogSource, Category, ListingItem};
use crate::{Result, ScrapeError};
use futures::stream::{self, BoxStream};
use futures::{StreamExt, TryStreamExt};

/// First page of every listing
pub const FIRST_PAGE: u32 = 1;

struct PageCursor {
    category: Category,
    page: u32,
}

/// Streams every listing item of `category`, page by page
pub fn paginate<'a>(
    source: &'a dyn CatalogSource,
    category: Category,
    start_page: u32,
) -> BoxStream<'a, Result<ListingItem>> {
    let start_page = start_page.max(FIRST_PAGE);
    let cursor = PageCursor {
        category,
        page: start_page,
    };

    stream::try_unfold(cursor, move |cursor| next_page(source, cursor, start_page))
        .map_ok(|items| stream::iter(items.into_iter().map(Ok::<_, ScrapeError>)))
        .try_flatten()
        .boxed()
}

/// Fetches the page under the cursor; `None` once the category is exhausted
async fn next_page(
    source: &dyn CatalogSource,
    cursor: PageCursor,
    start_page: u32,
) -> Result<Option<(Vec<ListingItem>, PageCursor)>> {
    let page = source.fetch_page(&cursor.category, cursor.page).await?;

    if page.items.is_empty() {
        tracing::debug!(
            "Category '{}' exhausted at page {}",
            cursor.category.name,
            cursor.page
        );
        return Ok(None);
    }

    if cursor.page == start_page {
        if let Some(total) = page.total_items {
            tracing::info!(
                "Category '{}': {} products announced",
                cursor.category.name,
                total
            );
        }
    }

    let of_total = page
        .total_pages
        .map(|total| format!("/{}", total))
        .unwrap_or_default();
    tracing::debug!(
        "Category '{}' page {}{}: {} products",
        cursor.category.name,
        cursor.page,
        of_total,
        page.items.len()
    );

    let next = PageCursor {
        page: cursor.page + 1,
        ..cursor
    };
    Ok(Some((page.items, next)))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::catalog::ListingPage;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Listing source serving fixed page sizes per category id
    #[derive(Default)]
    pub(crate) struct FakeListing {
        pub categories: Vec<Category>,
        pub pages: HashMap<String, Vec<usize>>,
        pub failing_page: Option<(String, u32)>,
        pub requested: Mutex<Vec<(String, u32)>>,
    }

    impl FakeListing {
        pub fn with_pages(category: &str, sizes: Vec<usize>) -> Self {
            let mut listing = Self::default();
            listing.pages.insert(category.to_string(), sizes);
            listing
        }

        pub fn requested_pages(&self, category: &str) -> Vec<u32> {
            self.requested
                .lock()
                .unwrap()
                .iter()
                .filter(|(id, _)| id == category)
                .map(|(_, page)| *page)
                .collect()
        }
    }

    pub(crate) fn item(category: &str, page: u32, index: usize) -> ListingItem {
        ListingItem {
            id: format!("{}-p{}-{}", category, page, index),
            readable_id: format!("R{}{}{}", category, page, index),
            slug: format!("product-{}-{}", page, index),
            name: format!("Product {}/{}", page, index),
            ..Default::default()
        }
    }

    #[async_trait]
    impl CatalogSource for FakeListing {
        async fn fetch_categories(&self) -> Result<Vec<Category>> {
            Ok(self.categories.clone())
        }

        async fn fetch_page(&self, category: &Category, page: u32) -> Result<ListingPage> {
            self.requested
                .lock()
                .unwrap()
                .push((category.id.clone(), page));

            if self.failing_page == Some((category.id.clone(), page)) {
                return Err(ScrapeError::Status {
                    url: format!("fake://{}/{}", category.id, page),
                    status: 500,
                });
            }

            let size = self
                .pages
                .get(&category.id)
                .and_then(|sizes| sizes.get(page as usize - 1))
                .copied()
                .unwrap_or(0);

            let total: usize = self
                .pages
                .get(&category.id)
                .map_or(0, |sizes| sizes.iter().sum());

            Ok(ListingPage {
                items: (0..size).map(|i| item(&category.id, page, i)).collect(),
                total_items: Some(total as u64),
                total_pages: None,
            })
        }
    }

    pub(crate) fn category(id: &str) -> Category {
        Category {
            id: id.to_string(),
            level: 1,
            name: id.to_uppercase(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_stops_at_first_empty_page() {
        // A fourth page would have items, but must never be requested
        let listing = FakeListing::with_pages("c1", vec![3, 2, 0, 4]);

        let items: Vec<ListingItem> = paginate(&listing, category("c1"), FIRST_PAGE)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(items.len(), 5);
        assert_eq!(listing.requested_pages("c1"), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_items_keep_page_order() {
        let listing = FakeListing::with_pages("c1", vec![2, 1]);

        let ids: Vec<String> = paginate(&listing, category("c1"), FIRST_PAGE)
            .map_ok(|item| item.id)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(ids, vec!["c1-p1-0", "c1-p1-1", "c1-p2-0"]);
    }

    #[tokio::test]
    async fn test_next_page_waits_for_consumer() {
        let listing = FakeListing::with_pages("c1", vec![3, 3, 3]);
        let mut items = paginate(&listing, category("c1"), FIRST_PAGE);

        for _ in 0..3 {
            items.next().await.unwrap().unwrap();
        }
        assert_eq!(listing.requested_pages("c1"), vec![1]);

        items.next().await.unwrap().unwrap();
        assert_eq!(listing.requested_pages("c1"), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_starts_at_given_page() {
        let listing = FakeListing::with_pages("c1", vec![1, 1, 1]);

        let items: Vec<ListingItem> = paginate(&listing, category("c1"), 2)
            .try_collect()
            .await
            .unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(listing.requested_pages("c1"), vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn test_page_failure_ends_stream_with_error() {
        let mut listing = FakeListing::with_pages("c1", vec![2, 2, 2]);
        listing.failing_page = Some(("c1".to_string(), 2));

        let results: Vec<Result<ListingItem>> =
            paginate(&listing, category("c1"), FIRST_PAGE).collect().await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(matches!(results[2], Err(ScrapeError::Status { status: 500, .. })));
        assert_eq!(listing.requested_pages("c1"), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_empty_category() {
        let listing = FakeListing::with_pages("c1", vec![]);
        let items: Vec<ListingItem> = paginate(&listing, category("c1"), FIRST_PAGE)
            .try_collect()
            .await
            .unwrap();

        assert!(items.is_empty());
        assert_eq!(listing.requested_pages("c1"), vec![1]);
    }
}
