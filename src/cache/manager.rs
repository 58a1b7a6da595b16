//! Cache manager.

use super::backend::{CacheBackend, MemoryCache};
use super::key::RequestSignature;
use crate::Result;
use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub default_ttl: Duration,
    pub sweep_interval: Duration,
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: DEFAULT_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            enabled: true,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub invalidations: u64,
    pub swept: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
    invalidations: AtomicU64,
    swept: AtomicU64,
}

impl AtomicStats {
    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            swept: self.swept.load(Ordering::Relaxed),
        }
    }
}

/// Response cache keyed by [`RequestSignature`], with per-entry TTL and statistics.
pub struct CacheManager {
    config: CacheConfig,
    backend: Arc<dyn CacheBackend>,
    stats: AtomicStats,
}

impl CacheManager {
    pub fn new(config: CacheConfig, backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            config,
            backend,
            stats: AtomicStats::default(),
        }
    }

    pub fn in_memory(config: CacheConfig) -> Self {
        Self::new(config, Arc::new(MemoryCache::new()))
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub async fn get(&self, key: &RequestSignature) -> Result<Option<Bytes>> {
        if !self.config.enabled {
            return Ok(None);
        }
        match self.backend.get(key).await? {
            Some(data) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "cache hit");
                Ok(Some(data))
            }
            None => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "cache miss");
                Ok(None)
            }
        }
    }

    pub async fn set(&self, key: &RequestSignature, value: Bytes) -> Result<()> {
        self.set_with_ttl(key, value, self.config.default_ttl).await
    }

    pub async fn set_with_ttl(
        &self,
        key: &RequestSignature,
        value: Bytes,
        ttl: Duration,
    ) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }
        self.backend.set(key, value, ttl).await?;
        self.stats.sets.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    pub async fn delete(&self, key: &RequestSignature) -> Result<bool> {
        let deleted = self.backend.delete(key).await?;
        if deleted {
            self.stats.deletes.fetch_add(1, Ordering::Relaxed);
        }
        Ok(deleted)
    }

    pub async fn clear(&self) -> Result<()> {
        self.backend.clear().await
    }

    /// Drop everything (`None`) or every key containing `pattern` as a substring.
    ///
    /// Substring matching is coarse: `/projects` also drops `/projects-archive`.
    pub async fn invalidate(&self, pattern: Option<&str>) -> Result<usize> {
        let removed = match pattern {
            None => {
                let n = self.backend.len().await?;
                self.backend.clear().await?;
                n
            }
            Some(p) => self.backend.invalidate_matching(p).await?,
        };
        self.stats
            .invalidations
            .fetch_add(removed as u64, Ordering::Relaxed);
        if removed > 0 {
            debug!(pattern = pattern.unwrap_or("*"), removed, "cache invalidated");
        }
        Ok(removed)
    }

    pub async fn sweep(&self) -> Result<usize> {
        let removed = self.backend.sweep().await?;
        self.stats.swept.fetch_add(removed as u64, Ordering::Relaxed);
        debug!(removed, "cache sweep");
        Ok(removed)
    }

    pub async fn len(&self) -> Result<usize> {
        self.backend.len().await
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Spawn a task sweeping expired entries every `sweep_interval`.
    ///
    /// The task only holds a weak reference and exits once the manager is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        let period = self.config.sweep_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(manager) = weak.upgrade() else {
                    break;
                };
                if let Err(e) = manager.sweep().await {
                    tracing::warn!(error = %e, "cache sweep failed");
                }
            }
        })
    }
}
