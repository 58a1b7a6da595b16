//! Interceptor hooks run around every transport attempt.
//!
//! The pipeline is an explicit ordered list. Hooks are synchronous transforms:
//! - `on_request` may rewrite the outgoing request (or refuse it),
//! - `on_response` may rewrite a successful response,
//! - `on_error` sees the final error after retries are exhausted and returns
//!   the error to propagate.
//!
//! Built-ins: [`BearerAuth`], [`Diagnostics`], [`SessionGuard`].

use std::sync::Arc;
use tracing::{error, info};

use crate::auth::{Navigator, TokenStore};
use crate::config::RouteConfig;
use crate::transport::{PreparedRequest, RawResponse, RequestContext};
use crate::{Error, Result};

pub trait Interceptor: Send + Sync {
    fn name(&self) -> &'static str;

    fn on_request(&self, _ctx: &RequestContext, req: PreparedRequest) -> Result<PreparedRequest> {
        Ok(req)
    }

    fn on_response(&self, _ctx: &RequestContext, resp: RawResponse) -> Result<RawResponse> {
        Ok(resp)
    }

    fn on_error(&self, _ctx: &RequestContext, err: Error) -> Error {
        err
    }
}

/// Runs hooks in registration order.
#[derive(Clone, Default)]
pub struct InterceptorPipeline {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorPipeline {
    pub fn new() -> Self {
        Self {
            interceptors: Vec::new(),
        }
    }

    pub fn with<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn push(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    /// Names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn apply_request(&self, ctx: &RequestContext, req: PreparedRequest) -> Result<PreparedRequest> {
        self.interceptors
            .iter()
            .try_fold(req, |req, ic| ic.on_request(ctx, req))
    }

    pub fn apply_response(&self, ctx: &RequestContext, resp: RawResponse) -> Result<RawResponse> {
        self.interceptors
            .iter()
            .try_fold(resp, |resp, ic| ic.on_response(ctx, resp))
    }

    pub fn apply_error(&self, ctx: &RequestContext, err: Error) -> Error {
        self.interceptors
            .iter()
            .fold(err, |err, ic| ic.on_error(ctx, err))
    }
}

/// Adds `Authorization: Bearer <token>` when a token is stored.
pub struct BearerAuth {
    store: Arc<dyn TokenStore>,
}

impl BearerAuth {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }
}

impl Interceptor for BearerAuth {
    fn name(&self) -> &'static str {
        "bearer_auth"
    }

    fn on_request(&self, _ctx: &RequestContext, req: PreparedRequest) -> Result<PreparedRequest> {
        match self.store.get() {
            Some(token) if !token.is_empty() => {
                Ok(req.with_header("authorization", format!("Bearer {}", token)))
            }
            _ => Ok(req),
        }
    }
}

/// Timing lines in development mode, and one structured log line per failed request.
pub struct Diagnostics {
    development: bool,
}

impl Diagnostics {
    pub fn new(development: bool) -> Self {
        Self { development }
    }
}

impl Interceptor for Diagnostics {
    fn name(&self) -> &'static str {
        "diagnostics"
    }

    fn on_response(&self, ctx: &RequestContext, resp: RawResponse) -> Result<RawResponse> {
        if self.development {
            info!(
                "[{}] {} {} - {} ms",
                ctx.request_id,
                resp.method,
                resp.url,
                ctx.elapsed_ms()
            );
        }
        Ok(resp)
    }

    fn on_error(&self, ctx: &RequestContext, err: Error) -> Error {
        error!(
            url = err.url().unwrap_or_default(),
            method = err.method().unwrap_or_default(),
            status = err.status(),
            message = %err,
            request_id = %ctx.request_id,
            attempts = ctx.attempt(),
            "API error"
        );
        err
    }
}

/// Tears the session down on 401: clears the token and leaves protected pages.
pub struct SessionGuard {
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    routes: RouteConfig,
}

impl SessionGuard {
    pub fn new(store: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>, routes: RouteConfig) -> Self {
        Self {
            store,
            navigator,
            routes,
        }
    }
}

impl Interceptor for SessionGuard {
    fn name(&self) -> &'static str {
        "session_guard"
    }

    fn on_error(&self, _ctx: &RequestContext, err: Error) -> Error {
        if !err.is_auth_failure() {
            return err;
        }
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear auth token");
        }
        if let Some(path) = self.navigator.current_path() {
            if self.routes.requires_session(&path) {
                self.navigator.redirect(&self.routes.home_path);
            }
        }
        err
    }
}
