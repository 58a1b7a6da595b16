//! Retry with capped exponential backoff.

use crate::transport::RequestContext;
use crate::Error;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(5000),
        }
    }
}

impl RetryConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = n;
        self
    }
    pub fn with_base_delay(mut self, d: Duration) -> Self {
        self.base_delay = d;
        self
    }
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = d;
        self
    }
    /// No retries at all.
    pub fn disabled() -> Self {
        Self::default().with_max_retries(0)
    }
}

/// Decides whether a failed attempt is re-sent, and after how long.
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Network failures, 5xx, 408 and 429 are transient; every other status is final.
    pub fn should_retry(error: &Error) -> bool {
        error.is_retryable_kind()
    }

    /// `min(base * 2^(retry_count - 1), max)` for a 1-based retry count.
    pub fn backoff(&self, retry_count: u32) -> Duration {
        let exp = retry_count.saturating_sub(1);
        let factor = 1u32.checked_shl(exp).unwrap_or(u32::MAX);
        self.config
            .base_delay
            .saturating_mul(factor)
            .min(self.config.max_delay)
    }

    /// Claim the current failure for a retry.
    ///
    /// Returns the delay to wait before re-sending, or `None` when the error is
    /// final, the failure was already claimed, or retries are exhausted.
    pub fn next_delay(&self, ctx: &mut RequestContext, error: &Error) -> Option<Duration> {
        if !Self::should_retry(error) || ctx.retry_attempted {
            return None;
        }
        ctx.retry_attempted = true;
        ctx.retry_count += 1;
        if ctx.retry_count > self.config.max_retries {
            return None;
        }
        Some(self.backoff(ctx.retry_count))
    }
}
