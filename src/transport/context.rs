//! Per-call diagnostics and retry bookkeeping.

use tokio::time::Instant;
use uuid::Uuid;

/// Attached to one logical request for its whole life, across retries.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub start_time: Instant,
    /// Retries performed so far (0 on the first attempt).
    pub retry_count: u32,
    /// Set once the current failure has been claimed for a retry, so
    /// overlapping handlers cannot retry the same failure twice.
    pub retry_attempted: bool,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: short_request_id(),
            start_time: Instant::now(),
            retry_count: 0,
            retry_attempted: false,
        }
    }

    /// Context for work tied to an already issued request.
    pub fn with_request_id(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            ..Self::new()
        }
    }

    /// Reset the per-failure guard before sending (or resending).
    pub fn begin_attempt(&mut self) {
        self.retry_attempted = false;
    }

    pub fn attempt(&self) -> u32 {
        self.retry_count + 1
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

fn short_request_id() -> String {
    Uuid::new_v4().simple().to_string()[..9].to_string()
}
