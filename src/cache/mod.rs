//! # Response Caching Module
//!
//! TTL-based response caching keyed by request signature.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheManager`] | TTL defaults, statistics, substring invalidation, background sweep |
//! | [`CacheConfig`] | Default TTL (5 min), sweep interval (10 min), on/off switch |
//! | [`CacheBackend`] | Trait for implementing custom cache backends |
//! | [`MemoryCache`] | In-memory TTL store |
//! | [`NullCache`] | No-op cache for disabling caching |
//! | [`RequestSignature`] | `method:url:params` key shared with the deduplicator |
//!
//! ## Example
//!
//! ```rust
//! use portfolio_client::cache::{CacheConfig, CacheManager, RequestSignature};
//! use std::time::Duration;
//!
//! # async fn demo() -> portfolio_client::Result<()> {
//! let cache = CacheManager::in_memory(CacheConfig::default());
//! let key = RequestSignature::from("get:/skills:{}");
//! cache
//!     .set_with_ttl(&key, r#"["Go","Rust"]"#.into(), Duration::from_millis(5000))
//!     .await?;
//! assert!(cache.get(&key).await?.is_some());
//! # Ok(())
//! # }
//! ```
//!
//! Entries are never evicted by size; they leave on expiry (lazily on read or
//! by the periodic sweep), on invalidation, or on clear.

mod backend;
mod key;
mod manager;

pub use backend::{CacheBackend, MemoryCache, NullCache};
pub use key::RequestSignature;
pub use manager::{CacheConfig, CacheManager, CacheStats, DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL};
