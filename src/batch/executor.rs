//! Concurrent batch execution.

use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Outcome of a settled batch. Entries are `(input index, value)` in settlement order.
#[derive(Debug, Clone)]
pub struct BatchResult<T, E> {
    pub successes: Vec<(usize, T)>,
    pub failures: Vec<(usize, E)>,
    pub execution_time: Duration,
    pub total_processed: usize,
}

impl<T, E> BatchResult<T, E> {
    pub fn new() -> Self {
        Self {
            successes: Vec::new(),
            failures: Vec::new(),
            execution_time: Duration::ZERO,
            total_processed: 0,
        }
    }
    pub fn add_success(&mut self, i: usize, r: T) {
        self.successes.push((i, r));
    }
    pub fn add_failure(&mut self, i: usize, e: E) {
        self.failures.push((i, e));
    }
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }
    pub fn success_rate(&self) -> f64 {
        if self.total_processed == 0 {
            0.0
        } else {
            self.successes.len() as f64 / self.total_processed as f64
        }
    }

    /// Successful values only, in settlement order.
    pub fn into_values(self) -> Vec<T> {
        self.successes.into_iter().map(|(_, v)| v).collect()
    }
}

impl<T, E> Default for BatchResult<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Start every request at once and record each outcome as it settles.
pub async fn settled<T, E, F, Fut>(requests: Vec<F>) -> BatchResult<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let start = Instant::now();
    let total = requests.len();
    let mut pending: FuturesUnordered<_> = requests
        .into_iter()
        .enumerate()
        .map(|(i, request)| {
            let fut = request();
            async move { (i, fut.await) }
        })
        .collect();

    let mut result = BatchResult::new();
    while let Some((i, outcome)) = pending.next().await {
        match outcome {
            Ok(v) => result.add_success(i, v),
            Err(e) => result.add_failure(i, e),
        }
    }
    result.execution_time = start.elapsed();
    result.total_processed = total;
    result
}

/// Start every request at once; keep the fulfilled values and silently drop failures.
pub async fn fulfilled<T, E, F, Fut>(requests: Vec<F>) -> Vec<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    settled(requests).await.into_values()
}
