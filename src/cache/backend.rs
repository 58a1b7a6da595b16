//! Cache backend implementations.

use super::key::RequestSignature;
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Clone)]
struct CacheEntry {
    payload: Bytes,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn new(payload: Bytes, ttl: Duration) -> Self {
        Self {
            payload,
            stored_at: Instant::now(),
            ttl,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) > self.ttl
    }
}

#[async_trait]
pub trait CacheBackend: Send + Sync {
    async fn get(&self, key: &RequestSignature) -> Result<Option<Bytes>>;
    async fn set(&self, key: &RequestSignature, value: Bytes, ttl: Duration) -> Result<()>;
    async fn delete(&self, key: &RequestSignature) -> Result<bool>;
    async fn exists(&self, key: &RequestSignature) -> Result<bool>;
    async fn clear(&self) -> Result<()>;
    /// Remove every entry whose key contains `pattern`; returns the number removed.
    async fn invalidate_matching(&self, pattern: &str) -> Result<usize>;
    /// Remove every expired entry; returns the number removed.
    async fn sweep(&self) -> Result<usize>;
    /// Number of stored entries, including expired ones not yet purged.
    async fn len(&self) -> Result<usize>;
    fn name(&self) -> &'static str;
}

/// In-memory TTL store. No size bound: entries leave on expiry, invalidation or clear.
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<RequestSignature, CacheEntry>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, key: &RequestSignature) -> Result<Option<Bytes>> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            None => return Ok(None),
            Some(entry) if !entry.is_expired(Instant::now()) => {
                return Ok(Some(entry.payload.clone()))
            }
            Some(_) => {}
        }
        // expired: purge on read
        entries.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &RequestSignature, value: Bytes, ttl: Duration) -> Result<()> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), CacheEntry::new(value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &RequestSignature) -> Result<bool> {
        Ok(self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some())
    }

    async fn exists(&self, key: &RequestSignature) -> Result<bool> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        Ok(entries.get(key).map(|e| !e.is_expired(now)).unwrap_or(false))
    }

    async fn clear(&self) -> Result<()> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        Ok(())
    }

    async fn invalidate_matching(&self, pattern: &str) -> Result<usize> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|k, _| !k.contains(pattern));
        Ok(before - entries.len())
    }

    async fn sweep(&self) -> Result<usize> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired(now));
        Ok(before - entries.len())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

pub struct NullCache;
impl NullCache {
    pub fn new() -> Self {
        Self
    }
}
impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for NullCache {
    async fn get(&self, _: &RequestSignature) -> Result<Option<Bytes>> {
        Ok(None)
    }
    async fn set(&self, _: &RequestSignature, _: Bytes, _: Duration) -> Result<()> {
        Ok(())
    }
    async fn delete(&self, _: &RequestSignature) -> Result<bool> {
        Ok(false)
    }
    async fn exists(&self, _: &RequestSignature) -> Result<bool> {
        Ok(false)
    }
    async fn clear(&self) -> Result<()> {
        Ok(())
    }
    async fn invalidate_matching(&self, _: &str) -> Result<usize> {
        Ok(0)
    }
    async fn sweep(&self) -> Result<usize> {
        Ok(0)
    }
    async fn len(&self) -> Result<usize> {
        Ok(0)
    }
    fn name(&self) -> &'static str {
        "null"
    }
}
