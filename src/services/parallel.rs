//! Bounded, order-preserving parallel map.
//!
//! Runs a transform over a collection with one task per item. When the
//! item count exceeds the concurrency cap, a semaphore bounds in-flight
//! tasks; otherwise everything is dispatched immediately. Results come
//! back in input order regardless of completion order.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

/// Map `f` over `items` with at most `max_concurrent` tasks in flight.
///
/// The returned vector preserves input order.
pub async fn parallel_map<T, R, F, Fut>(items: Vec<T>, max_concurrent: usize, f: F) -> Vec<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + Clone + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    let bounded = items.len() > max_concurrent;
    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));

    let mut handles = Vec::with_capacity(items.len());
    for item in items {
        let f = f.clone();
        let semaphore = semaphore.clone();
        let handle = tokio::spawn(async move {
            let _permit = if bounded {
                match semaphore.acquire_owned().await {
                    Ok(permit) => Some(permit),
                    // The semaphore lives as long as the tasks; closure is
                    // unreachable, but degrade to unbounded rather than die.
                    Err(_) => None,
                }
            } else {
                None
            };
            f(item).await
        });
        handles.push(handle);
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(result) => results.push(result),
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => panic!("parallel_map task cancelled: {err}"),
        }
    }
    results
}
