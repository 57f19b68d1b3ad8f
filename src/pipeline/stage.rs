//! Order-preserving bounded parallel stage
//!
//! `BoundedParallel` maps a stream of inputs through an async transform
//! with at most `limit` transforms in flight, and yields the outputs in
//! input order. Results that complete early wait in a reorder buffer until
//! every earlier result has been yielded.
//!
//! The stage is pull-driven: a new transform is only started while the
//! consumer polls, and only when fewer than `limit` results (running or
//! finished but not yet yielded) are outstanding. A slow consumer therefore
//! holds back the whole stage.

use futures::future::BoxFuture;
use futures::stream::{BoxStream, Fuse, FuturesOrdered};
use futures::{FutureExt, Stream, StreamExt};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

type Transform<'a, T, R> = Box<dyn FnMut(T) -> BoxFuture<'a, R> + Send + 'a>;

/// Stream adapter running at most `limit` transforms concurrently
///
/// Errors are not swallowed: if the transform returns a `Result`, each
/// failure is yielded in the position of the input that produced it.
///
/// # Example
///
/// ```
/// use futures::{stream, StreamExt};
/// use zr_crawl::pipeline::BoundedParallel;
///
/// let stage = BoundedParallel::new(stream::iter(1..=4u32), 2, |n| async move { n * 2 });
/// let doubled: Vec<u32> = futures::executor::block_on(stage.collect());
/// assert_eq!(doubled, vec![2, 4, 6, 8]);
/// ```
pub struct BoundedParallel<'a, T, R> {
    input: Fuse<BoxStream<'a, T>>,
    transform: Transform<'a, T, R>,
    in_flight: FuturesOrdered<BoxFuture<'a, R>>,
    limit: usize,
}

impl<'a, T, R> BoundedParallel<'a, T, R> {
    /// Creates the stage; a `limit` of 0 is treated as 1
    pub fn new<S, F, Fut>(input: S, limit: usize, mut transform: F) -> Self
    where
        S: Stream<Item = T> + Send + 'a,
        F: FnMut(T) -> Fut + Send + 'a,
        Fut: Future<Output = R> + Send + 'a,
    {
        Self {
            input: input.boxed().fuse(),
            transform: Box::new(move |item| transform(item).boxed()),
            in_flight: FuturesOrdered::new(),
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of started transforms whose results have not been yielded yet
    #[cfg(test)]
    fn outstanding(&self) -> usize {
        self.in_flight.len()
    }
}

impl<'a, T, R> Stream for BoundedParallel<'a, T, R> {
    type Item = R;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<R>> {
        let this = self.get_mut();

        // Top up the window before polling the ordered results
        while this.in_flight.len() < this.limit {
            match this.input.poll_next_unpin(cx) {
                Poll::Ready(Some(item)) => {
                    let future = (this.transform)(item);
                    this.in_flight.push_back(future);
                }
                Poll::Ready(None) | Poll::Pending => break,
            }
        }

        match this.in_flight.poll_next_unpin(cx) {
            Poll::Ready(Some(output)) => Poll::Ready(Some(output)),
            Poll::Ready(None) if this.input.is_done() => Poll::Ready(None),
            Poll::Ready(None) | Poll::Pending => Poll::Pending,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.input.size_hint();
        let outstanding = self.in_flight.len();
        (
            lower.saturating_add(outstanding),
            upper.and_then(|upper| upper.checked_add(outstanding)),
        )
    }
}
