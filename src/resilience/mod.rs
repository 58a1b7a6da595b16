//! # Resilience Module
//!
//! Retry handling for transient failures.
//!
//! | Failure | Retried |
//! |---------|---------|
//! | No response (connect error, reset, timeout) | yes |
//! | HTTP 5xx | yes |
//! | HTTP 408 / 429 | yes |
//! | Any other 4xx | no |
//!
//! Up to 3 retries (4 attempts in total), waiting 1s, 2s, 4s between them;
//! every wait is capped at 5s.
//!
//! ```rust
//! use portfolio_client::resilience::{RetryConfig, RetryPolicy};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::new(RetryConfig::default());
//! assert_eq!(policy.backoff(3), Duration::from_secs(4));
//! ```

pub mod retry;

pub use retry::{RetryConfig, RetryPolicy};
