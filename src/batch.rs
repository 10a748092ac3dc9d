//! Batch scheduling - gate-bounded fan-out with submission-order results
//!
//! A batch launches exactly `count` fetches behind a counting gate of
//! `concurrency` permits. Results come back in submission order no matter
//! when each fetch completes, and one slow or failing fetch never affects
//! the others.

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::debug;

use crate::fetcher::Fetcher;
use crate::record::Record;

/// Run `count` tasks with at most `concurrency` in flight at once.
///
/// Each task holds one semaphore permit for its full duration and releases
/// it when it finishes, on success or failure. `join_all` assembles the
/// results in submission order regardless of completion order.
pub async fn run_bounded<F, Fut, T>(count: usize, concurrency: usize, task: F) -> Vec<T>
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = T>,
{
    // A zero-permit gate would never open; config validation rejects 0 up
    // front, this clamp is the backstop.
    let gate = Arc::new(Semaphore::new(concurrency.max(1)));

    let tasks = (0..count).map(|index| {
        let gate = Arc::clone(&gate);
        // The future is inert until polled, so the task does not start
        // before its permit is held.
        let fut = task(index);
        async move {
            // acquire() only fails once the semaphore is closed, and this
            // gate lives for the whole batch.
            let _permit = gate.acquire().await.ok();
            fut.await
        }
    });

    join_all(tasks).await
}

/// Fetch `count` responses from `url` with bounded concurrency.
///
/// Returns exactly `count` records in submission order. Individual fetch
/// failures surface as error records, never as batch failures.
pub async fn fetch_batch(fetcher: &Fetcher, url: &str, count: usize, concurrency: usize) -> Vec<Record> {
    debug!(url, count, concurrency, "starting batch");
    run_bounded(count, concurrency, |_| fetcher.fetch(url)).await
}
