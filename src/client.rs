//! Public client facade.
//!
//! `get` goes through the cache and the in-flight deduplicator; `post`, `put`,
//! `patch` and `delete` invalidate matching cache entries and always reach the
//! server. Implementation details are split into submodules under `src/client/`.

pub mod builder;
pub mod core;
mod execution;
pub mod types;

pub use self::builder::HttpClientBuilder;
pub use self::core::HttpClient;
pub use self::types::{ApiResponse, RequestConfig};
