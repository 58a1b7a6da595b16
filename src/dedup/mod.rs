//! In-flight request deduplication.
//!
//! Concurrent callers asking for the same [`RequestSignature`] share one
//! underlying call through a [`Shared`] future. The call itself runs on a
//! spawned task, so it keeps going even if every caller stops awaiting it,
//! and the task unregisters its own entry once it settles.

use crate::cache::RequestSignature;
use crate::{Error, ErrorContext, Result};
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

type SharedCall<V> = Shared<BoxFuture<'static, Result<V>>>;

struct Pending<V: Clone> {
    generation: u64,
    call: SharedCall<V>,
}

pub struct Deduplicator<V: Clone + Send + Sync + 'static> {
    pending: Arc<Mutex<HashMap<RequestSignature, Pending<V>>>>,
    next_generation: AtomicU64,
}

impl<V: Clone + Send + Sync + 'static> Default for Deduplicator<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone + Send + Sync + 'static> Deduplicator<V> {
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Join the in-flight call for `key`, or start one with `request_fn`.
    ///
    /// Every caller joined on the same call receives a clone of the same
    /// result, success or error. Must be called from within a tokio runtime.
    pub async fn deduplicate<F, Fut>(&self, key: RequestSignature, request_fn: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let call = {
            let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
            match pending.get(&key) {
                Some(existing) => {
                    debug!(key = %key, "joining in-flight request");
                    existing.call.clone()
                }
                None => {
                    let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                    let call = self.start(key.clone(), generation, request_fn());
                    pending.insert(
                        key,
                        Pending {
                            generation,
                            call: call.clone(),
                        },
                    );
                    call
                }
            }
        };
        call.await
    }

    /// Number of calls currently in flight.
    pub fn in_flight(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_pending(&self, key: &RequestSignature) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    fn start<Fut>(&self, key: RequestSignature, generation: u64, fut: Fut) -> SharedCall<V>
    where
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let pending = Arc::clone(&self.pending);
        let task = tokio::spawn(async move {
            let result = fut.await;
            // The caller holds the map lock while registering, so this cannot
            // run before the entry exists.
            let mut map = pending.lock().unwrap_or_else(PoisonError::into_inner);
            if map.get(&key).map(|p| p.generation) == Some(generation) {
                map.remove(&key);
            }
            result
        });

        async move {
            match task.await {
                Ok(result) => result,
                Err(join_err) => Err(Error::runtime_with_context(
                    format!("in-flight request task failed: {}", join_err),
                    ErrorContext::new().with_source("deduplicator"),
                )),
            }
        }
        .boxed()
        .shared()
    }
}
