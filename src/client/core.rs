use crate::auth::TokenStore;
use crate::cache::{CacheManager, RequestSignature};
use crate::client::types::{ApiResponse, RequestConfig};
use crate::config::Environment;
use crate::dedup::Deduplicator;
use crate::interceptors::InterceptorPipeline;
use crate::resilience::{RetryConfig, RetryPolicy};
use crate::transport::{HttpTransport, RawResponse, RequestContext};
use crate::Result;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Caching, deduplicating, retrying client for the portfolio backend.
///
/// Cheap to clone; clones share one cache and one set of in-flight requests.
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) environment: Environment,
    pub(crate) transport: HttpTransport,
    pub(crate) pipeline: InterceptorPipeline,
    pub(crate) retry: RetryPolicy,
    pub(crate) cache: Arc<CacheManager>,
    pub(crate) dedup: Deduplicator<RawResponse>,
    pub(crate) token_store: Arc<dyn TokenStore>,
    pub(crate) sweeper: Option<JoinHandle<()>>,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.take() {
            handle.abort();
        }
    }
}

impl HttpClient {
    pub(crate) fn from_inner(inner: ClientInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Client with default settings for `environment`.
    pub fn new(environment: Environment) -> Result<Self> {
        crate::client::builder::HttpClientBuilder::new(environment).build()
    }

    /// GET through the cache and the deduplicator.
    ///
    /// A fresh cached payload answers with a synthesized 200 and no network
    /// call. Otherwise concurrent identical GETs share one call, whose 200
    /// body is cached under the request signature.
    pub async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        config: &RequestConfig,
    ) -> Result<ApiResponse<T>> {
        let raw = self.get_raw(url, config).await?;
        self.respond(raw, config)
    }

    pub async fn post<T, B>(
        &self,
        url: &str,
        data: Option<&B>,
        config: &RequestConfig,
    ) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.mutate(Method::POST, url, data, config).await
    }

    pub async fn put<T, B>(
        &self,
        url: &str,
        data: Option<&B>,
        config: &RequestConfig,
    ) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.mutate(Method::PUT, url, data, config).await
    }

    pub async fn patch<T, B>(
        &self,
        url: &str,
        data: Option<&B>,
        config: &RequestConfig,
    ) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.mutate(Method::PATCH, url, data, config).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        url: &str,
        config: &RequestConfig,
    ) -> Result<ApiResponse<T>> {
        self.mutate::<T, ()>(Method::DELETE, url, None, config).await
    }

    /// Drop every cached response (`None`) or those whose key contains `pattern`.
    pub async fn invalidate_cache(&self, pattern: Option<&str>) -> Result<usize> {
        self.inner.cache.invalidate(pattern).await
    }

    /// Warm the cache for `url` in the background. Failures are logged and dropped.
    pub fn preload_data(&self, url: &str, config: &RequestConfig) -> JoinHandle<()> {
        let client = self.clone();
        let url = url.to_string();
        let config = config.clone();
        tokio::spawn(async move {
            if let Err(e) = client.get_raw(&url, &config).await {
                debug!(url = %url, error = %e, "preload failed");
            }
        })
    }

    /// Run every request concurrently; keep the fulfilled results in settlement order.
    pub async fn batch<T, F, Fut>(&self, requests: Vec<F>) -> Vec<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        crate::batch::fulfilled(requests).await
    }

    /// Like [`batch`](Self::batch) but also reports failures with their input index.
    pub async fn batch_settled<T, F, Fut>(
        &self,
        requests: Vec<F>,
    ) -> crate::batch::BatchResult<T, crate::Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        crate::batch::settled(requests).await
    }

    pub fn set_token(&self, token: &str) -> Result<()> {
        self.inner.token_store.set(token)
    }

    pub fn token(&self) -> Option<String> {
        self.inner.token_store.get()
    }

    pub fn logout(&self) -> Result<()> {
        self.inner.token_store.clear()
    }

    pub fn cache(&self) -> &CacheManager {
        &self.inner.cache
    }

    pub fn environment(&self) -> &Environment {
        &self.inner.environment
    }

    pub fn base_url(&self) -> &str {
        self.inner.transport.base_url()
    }

    pub fn retry_config(&self) -> &RetryConfig {
        self.inner.retry.config()
    }

    pub fn interceptor_names(&self) -> Vec<&'static str> {
        self.inner.pipeline.names()
    }

    /// Number of GETs currently in flight.
    pub fn in_flight(&self) -> usize {
        self.inner.dedup.in_flight()
    }

    pub(crate) async fn get_raw(&self, url: &str, config: &RequestConfig) -> Result<RawResponse> {
        let signature = RequestSignature::get(url, &config.params);
        if let Some(payload) = self.inner.cache.get(&signature).await? {
            return Ok(RawResponse::cached(Method::GET, url, payload));
        }

        let inner = Arc::clone(&self.inner);
        let request = inner.prepare(Method::GET, url, None, config);
        let ttl = config
            .cache_ttl
            .unwrap_or(inner.cache.config().default_ttl);
        let key = signature.clone();

        self.inner
            .dedup
            .deduplicate(signature, move || async move {
                let resp = inner.execute(request).await?;
                if resp.status == 200 {
                    if let Err(e) = inner.cache.set_with_ttl(&key, resp.body.clone(), ttl).await {
                        warn!(key = %key, error = %e, "failed to cache response");
                    }
                }
                Ok(resp)
            })
            .await
    }

    async fn mutate<T, B>(
        &self,
        method: Method,
        url: &str,
        data: Option<&B>,
        config: &RequestConfig,
    ) -> Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = match data.map(serde_json::to_value).transpose() {
            Ok(body) => body,
            Err(e) => {
                let ctx = RequestContext::new();
                return Err(self.inner.pipeline.apply_error(&ctx, e.into()));
            }
        };
        // Any cached read whose key contains `url` goes, before the write is sent.
        self.inner.cache.invalidate(Some(url)).await?;
        let request = self.inner.prepare(method, url, body, config);
        let raw = self.inner.execute(request).await?;
        self.respond(raw, config)
    }

    /// Decode the body; a payload that does not fit `T` goes through the error hooks.
    fn respond<T: DeserializeOwned>(
        &self,
        raw: RawResponse,
        config: &RequestConfig,
    ) -> Result<ApiResponse<T>> {
        let data = match raw.json() {
            Ok(data) => data,
            Err(err) => {
                let ctx = RequestContext::with_request_id(raw.request_id.clone());
                return Err(self.inner.pipeline.apply_error(&ctx, err));
            }
        };
        Ok(ApiResponse {
            data,
            status: raw.status,
            status_text: raw.status_text,
            headers: raw.headers,
            config: config.clone(),
        })
    }
}
