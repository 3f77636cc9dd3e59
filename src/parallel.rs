//! Bounded concurrent processing.
//!
//! Runs an async function over a list of items with at most `max_concurrent`
//! futures in flight. Futures are polled on the calling task, so they may
//! borrow from the caller.

use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};
use log::debug;

/// Apply `f` to every item, keeping up to `max_concurrent` calls running.
///
/// Results are returned in completion order. The first error stops the run and
/// drops the calls still in flight.
pub async fn try_map_bounded<T, R, E, F, Fut>(
    items: Vec<T>,
    max_concurrent: usize,
    f: F,
) -> Result<Vec<R>, E>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
{
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let max_concurrent = max_concurrent.max(1);
    debug!(
        "Processing {} items with max {} concurrent",
        items.len(),
        max_concurrent
    );

    let mut results = Vec::with_capacity(items.len());
    let mut running = FuturesUnordered::new();
    let mut pending = items.into_iter();

    // Seed initial batch up to max_concurrent
    for item in pending.by_ref().take(max_concurrent) {
        running.push(f(item));
    }

    // Refill as calls complete to keep the pool full
    while let Some(result) = running.next().await {
        results.push(result?);

        if let Some(item) = pending.next() {
            running.push(f(item));
        }
    }

    Ok(results)
}
