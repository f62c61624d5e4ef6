//! Chunked fan-out combinator.

use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;

/// Runs `f` over `items` in sequential batches of `batch_size`, with every
/// future inside a batch polled concurrently.
///
/// Batch N+1 starts only once every future of batch N has settled. Results
/// are returned in completion order, batch by batch. A `batch_size` of 0 is
/// treated as 1.
pub async fn run_in_batches<I, T, F, Fut>(items: Vec<I>, batch_size: usize, f: F) -> Vec<T>
where
    F: Fn(I) -> Fut,
    Fut: Future<Output = T>,
{
    let batch_size = batch_size.max(1);
    let mut results = Vec::with_capacity(items.len());
    let mut items = items.into_iter().peekable();

    while items.peek().is_some() {
        let mut in_flight: FuturesUnordered<Fut> =
            items.by_ref().take(batch_size).map(&f).collect();
        while let Some(result) = in_flight.next().await {
            results.push(result);
        }
    }

    results
}
