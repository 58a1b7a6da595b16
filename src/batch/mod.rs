//! # Request Batching
//!
//! Fire a group of requests concurrently and collect whatever succeeds.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`fulfilled`] | Values of the requests that succeeded; failures are dropped |
//! | [`settled`] | Every outcome, with the index of the request it came from |
//!
//! Both report results in the order the requests finish, not the order they
//! were given in.
//!
//! ## Example
//!
//! ```rust,no_run
//! use portfolio_client::{Environment, HttpClient, RequestConfig};
//! use serde_json::Value;
//!
//! # async fn demo() -> portfolio_client::Result<()> {
//! let client = HttpClient::new(Environment::server("http://localhost:3000"))?;
//! let requests: Vec<_> = (1..=3)
//!     .map(|page| {
//!         let client = client.clone();
//!         move || async move {
//!             let cfg = RequestConfig::new().param("page", page);
//!             client.get::<Value>("/projects", &cfg).await.map(|r| r.data)
//!         }
//!     })
//!     .collect();
//! let pages: Vec<Value> = client.batch(requests).await;
//! # Ok(())
//! # }
//! ```

mod executor;

pub use executor::{fulfilled, settled, BatchResult};
