//! Bounded fan-out for independent API calls.
//!
//! Used by the group audit, where each group needs its own member and user
//! lookups. At most `max_concurrent` workers run at once; the caller waits
//! until all of them have finished.

use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};
use log::debug;

use crate::error::Result;

/// Run `worker` over every item with at most `max_concurrent` in flight.
///
/// Results are returned in arrival order, which varies from run to run.
/// The first error stops the run; workers still in flight are dropped.
///
/// # Example
///
/// ```ignore
/// let rows = run_bounded(groups, 10, |group| audit_group(&client, group)).await?;
/// ```
pub async fn run_bounded<I, T, R, F, Fut>(
    items: I,
    max_concurrent: usize,
    worker: F,
) -> Result<Vec<R>>
where
    I: IntoIterator<Item = T>,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let max_concurrent = max_concurrent.max(1);
    let mut pending = items.into_iter();
    let mut in_flight = FuturesUnordered::new();
    let mut results = Vec::new();

    // Seed initial batch up to max_concurrent
    for item in pending.by_ref().take(max_concurrent) {
        in_flight.push(worker(item));
    }

    // Refill as workers finish to keep the pool full
    while let Some(result) = in_flight.next().await {
        results.push(result?);

        if let Some(item) = pending.next() {
            in_flight.push(worker(item));
        }
    }

    debug!("Bounded fan-out finished with {} results", results.len());
    Ok(results)
}
