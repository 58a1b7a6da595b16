//! # portfolio-client
//!
//! Resilient HTTP access layer for the portfolio backend.
//!
//! ## Overview
//!
//! Every request goes through one client that knows where the backend lives
//! (server-side base URL or the page origin, both behind `/api/proxy`), attaches
//! the stored bearer token, and reacts to expired sessions. On top of that:
//!
//! - **Caching**: successful GETs are cached per request signature with a TTL
//! - **Deduplication**: identical concurrent GETs share one network call
//! - **Retry**: network errors, 5xx, 408 and 429 are retried with exponential backoff
//! - **Invalidation**: mutations drop cached reads that mention the mutated URL
//! - **Batching**: run a group of requests concurrently via [`batch`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use portfolio_client::{Environment, HttpClient, RequestConfig};
//! use serde_json::Value;
//!
//! #[tokio::main]
//! async fn main() -> portfolio_client::Result<()> {
//!     let client = HttpClient::new(Environment::server("http://localhost:3000"))?;
//!
//!     let skills = client.get::<Value>("/skills", &RequestConfig::new()).await?;
//!     println!("{} {}", skills.status, skills.data);
//!
//!     // Served from cache
//!     let again = client.get::<Value>("/skills", &RequestConfig::new()).await?;
//!     assert_eq!(again.status, 200);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Facade, builder and per-call options |
//! | [`cache`] | TTL cache with pluggable backends |
//! | [`dedup`] | In-flight request deduplication |
//! | [`transport`] | reqwest-based sender and request context |
//! | [`resilience`] | Retry policy |
//! | [`interceptors`] | Auth header, diagnostics and session handling |
//! | [`auth`] | Token storage and navigation hooks |
//! | [`batch`] | Concurrent batch execution |
//! | [`resources`] | Typed helpers for the backend's collections |
//! | [`config`] | Environment and file/env configuration |

pub mod auth;
pub mod batch;
pub mod cache;
pub mod client;
pub mod config;
pub mod dedup;
pub mod interceptors;
pub mod resilience;
pub mod resources;
pub mod transport;

// Re-export main types for convenience
pub use client::{ApiResponse, HttpClient, HttpClientBuilder, RequestConfig};
pub use config::{ClientConfig, Environment};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
