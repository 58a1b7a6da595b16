use crate::auth::{KeyringTokenStore, MemoryTokenStore, Navigator, NoopNavigator, TokenStore};
use crate::cache::{CacheBackend, CacheConfig, CacheManager, MemoryCache};
use crate::client::core::{ClientInner, HttpClient};
use crate::config::{ClientConfig, Environment, RouteConfig, DEFAULT_TIMEOUT, DEFAULT_TOKEN_KEY};
use crate::dedup::Deduplicator;
use crate::interceptors::{BearerAuth, Diagnostics, Interceptor, InterceptorPipeline, SessionGuard};
use crate::resilience::{RetryConfig, RetryPolicy};
use crate::transport::HttpTransport;
use crate::{Error, ErrorContext, Result};
use std::sync::Arc;
use std::time::Duration;

/// Builder for [`HttpClient`].
///
/// Defaults: 15s timeout, 5 min cache TTL swept every 10 min, 3 retries with
/// 1s/2s/4s backoff capped at 5s, in-memory token store, no navigation.
pub struct HttpClientBuilder {
    environment: Environment,
    timeout: Duration,
    cache: CacheConfig,
    cache_backend: Option<Arc<dyn CacheBackend>>,
    retry: RetryConfig,
    development: bool,
    routes: RouteConfig,
    token_key: String,
    token_store: Option<Arc<dyn TokenStore>>,
    navigator: Option<Arc<dyn Navigator>>,
    interceptors: Vec<Arc<dyn Interceptor>>,
    background_sweep: bool,
}

impl HttpClientBuilder {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            timeout: DEFAULT_TIMEOUT,
            cache: CacheConfig::default(),
            cache_backend: None,
            retry: RetryConfig::default(),
            development: false,
            routes: RouteConfig::default(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            token_store: None,
            navigator: None,
            interceptors: Vec::new(),
            background_sweep: true,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.environment.clone())
            .timeout(config.timeout())
            .cache_ttl(config.cache_ttl())
            .sweep_interval(config.sweep_interval())
            .retry(
                RetryConfig::new()
                    .with_max_retries(config.max_retries)
                    .with_base_delay(Duration::from_millis(config.retry_base_delay_ms))
                    .with_max_delay(Duration::from_millis(config.retry_max_delay_ms)),
            )
            .development(config.development)
            .routes(config.routes.clone())
            .token_key(config.token_key.clone())
    }

    /// Default per-request timeout. Overridable per call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache.default_ttl = ttl;
        self
    }

    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.cache.sweep_interval = interval;
        self
    }

    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.cache.enabled = enabled;
        self
    }

    pub fn cache_backend(mut self, backend: Arc<dyn CacheBackend>) -> Self {
        self.cache_backend = Some(backend);
        self
    }

    /// Do not spawn the periodic sweeper; expired entries are then only purged on read.
    pub fn without_background_sweep(mut self) -> Self {
        self.background_sweep = false;
        self
    }

    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Log `[request_id] METHOD url - N ms` for every successful request.
    pub fn development(mut self, enable: bool) -> Self {
        self.development = enable;
        self
    }

    pub fn routes(mut self, routes: RouteConfig) -> Self {
        self.routes = routes;
        self
    }

    pub fn token_key(mut self, key: impl Into<String>) -> Self {
        self.token_key = key.into();
        self
    }

    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Keep the token in the OS keychain under `(service, token_key)`.
    pub fn keyring_token_store(mut self, service: impl Into<String>) -> Self {
        self.token_store = Some(Arc::new(KeyringTokenStore::new(
            service,
            self.token_key.clone(),
        )));
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Append a custom interceptor after the built-in ones.
    pub fn interceptor<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Build the client.
    ///
    /// The background sweeper is only spawned when called inside a tokio runtime.
    pub fn build(self) -> Result<HttpClient> {
        self.environment.validate()?;
        if self.timeout.is_zero() {
            return Err(Error::configuration_with_context(
                "timeout must be greater than zero",
                ErrorContext::new().with_field_path("timeout"),
            ));
        }
        if self.cache.sweep_interval.is_zero() {
            return Err(Error::configuration_with_context(
                "sweep interval must be greater than zero",
                ErrorContext::new().with_field_path("sweep_interval"),
            ));
        }

        let transport = HttpTransport::new(&self.environment, self.timeout)?;
        let token_store = self
            .token_store
            .unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));
        let navigator = self.navigator.unwrap_or_else(|| Arc::new(NoopNavigator));

        // Token handling only exists client-side; server-side calls are anonymous.
        let mut pipeline = InterceptorPipeline::new();
        if self.environment.is_client() {
            pipeline.push(Arc::new(BearerAuth::new(Arc::clone(&token_store))));
        }
        pipeline.push(Arc::new(Diagnostics::new(self.development)));
        if self.environment.is_client() {
            pipeline.push(Arc::new(SessionGuard::new(
                Arc::clone(&token_store),
                navigator,
                self.routes,
            )));
        }
        for ic in self.interceptors {
            pipeline.push(ic);
        }

        let backend = self
            .cache_backend
            .unwrap_or_else(|| Arc::new(MemoryCache::new()));
        let cache = Arc::new(CacheManager::new(self.cache, backend));
        let sweeper = if self.background_sweep && tokio::runtime::Handle::try_current().is_ok() {
            Some(cache.spawn_sweeper())
        } else {
            None
        };

        Ok(HttpClient::from_inner(ClientInner {
            environment: self.environment,
            transport,
            pipeline,
            retry: RetryPolicy::new(self.retry),
            cache,
            dedup: Deduplicator::new(),
            token_store,
            sweeper,
        }))
    }
}
