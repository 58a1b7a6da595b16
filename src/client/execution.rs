//! Request execution: interceptors around the transport, with retries.

use super::core::ClientInner;
use super::types::RequestConfig;
use crate::transport::{PreparedRequest, RawResponse, RequestContext};
use crate::Result;
use reqwest::Method;
use tracing::warn;

impl ClientInner {
    pub(crate) fn prepare(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
        config: &RequestConfig,
    ) -> PreparedRequest {
        PreparedRequest {
            method,
            url: url.to_string(),
            params: config.params.clone(),
            headers: config.headers.clone(),
            body,
            timeout: config.timeout,
        }
    }

    /// Send `request`, re-sending transient failures per the retry policy.
    ///
    /// The caller only sees the outcome of the last attempt. Error hooks run
    /// once, on the final error, including one raised by a hook itself.
    pub(crate) async fn execute(&self, request: PreparedRequest) -> Result<RawResponse> {
        let mut ctx = RequestContext::new();
        loop {
            ctx.begin_attempt();
            let prepared = match self.pipeline.apply_request(&ctx, request.clone()) {
                Ok(prepared) => prepared,
                Err(err) => return Err(self.pipeline.apply_error(&ctx, err)),
            };
            let err = match self.transport.send(&prepared, &ctx).await {
                Ok(resp) => {
                    return self
                        .pipeline
                        .apply_response(&ctx, resp)
                        .map_err(|err| self.pipeline.apply_error(&ctx, err))
                }
                Err(err) => err,
            };

            match self.retry.next_delay(&mut ctx, &err) {
                Some(delay) => {
                    warn!(
                        request_id = %ctx.request_id,
                        retry = ctx.retry_count,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => return Err(self.pipeline.apply_error(&ctx, err)),
            }
        }
    }
}
