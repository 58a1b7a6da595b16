use super::context::RequestContext;
use crate::config::Environment;
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::Method;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Hint sent with every GET.
pub const CACHE_CONTROL_HINT: &str = "max-age=300";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// A fully described outgoing call. Cloned for every retry attempt.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    /// Path relative to the environment base, or an absolute URL.
    pub url: String,
    pub params: BTreeMap<String, serde_json::Value>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<serde_json::Value>,
    pub timeout: Option<Duration>,
}

impl PreparedRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: BTreeMap::new(),
            headers: BTreeMap::new(),
            body: None,
            timeout: None,
        }
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Query string pairs. Nulls are dropped, arrays become one pair per
    /// element (`tag=a&tag=b`), objects are sent as their JSON text.
    fn query_pairs(&self) -> Vec<(&str, String)> {
        self.params
            .iter()
            .flat_map(|(k, v)| {
                let items: Vec<&serde_json::Value> = match v {
                    serde_json::Value::Array(items) => items.iter().collect(),
                    other => vec![other],
                };
                items
                    .into_iter()
                    .filter(|v| !v.is_null())
                    .map(move |v| (k.as_str(), query_value(v)))
            })
            .collect()
    }
}

fn query_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A successful (2xx) response with its body fully read.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub method: Method,
    pub url: String,
    /// Id of the request that produced this response.
    pub request_id: String,
}

impl RawResponse {
    /// Response synthesized from a cached payload, under a fresh request id.
    pub fn cached(method: Method, url: impl Into<String>, body: Bytes) -> Self {
        Self {
            status: 200,
            status_text: "OK".to_string(),
            headers: HeaderMap::new(),
            body,
            method,
            url: url.into(),
            request_id: RequestContext::new().request_id,
        }
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        // empty bodies (204) decode as null so `()` and `Option<T>` work
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Performs the network call for one attempt.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    default_timeout: Duration,
}

impl HttpTransport {
    pub fn new(environment: &Environment, default_timeout: Duration) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(default_timeout)
            .gzip(true)
            .deflate(true)
            .brotli(true);

        if environment.is_server() {
            // Long-lived process: keep connections warm across requests.
            builder = builder
                .tcp_keepalive(Some(Duration::from_secs(60)))
                .pool_idle_timeout(Some(Duration::from_secs(90)))
                .pool_max_idle_per_host(32);
        }

        let client = builder.build().map_err(|e| {
            Error::configuration_with_context(
                "failed to build HTTP client",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("transport"),
            )
        })?;

        Ok(Self {
            client,
            base_url: environment.base_url(),
            default_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            return url.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            url.trim_start_matches('/')
        )
    }

    pub async fn send(&self, req: &PreparedRequest, ctx: &RequestContext) -> Result<RawResponse> {
        let url = self.resolve_url(&req.url);
        let mut builder = self
            .client
            .request(req.method.clone(), &url)
            .timeout(req.timeout.unwrap_or(self.default_timeout))
            .header(REQUEST_ID_HEADER, ctx.request_id.as_str());

        if req.method == Method::GET {
            builder = builder.header(CACHE_CONTROL, CACHE_CONTROL_HINT);
        }

        for (name, value) in &req.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid_header(name, e))?;
            let value = HeaderValue::from_str(value).map_err(|e| invalid_header(name.as_str(), e))?;
            builder = builder.header(name, value);
        }

        let query = req.query_pairs();
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| network_error(req, &url, ctx, e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| network_error(req, &url, ctx, e))?;

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                method: req.method.to_string(),
                url,
                request_id: ctx.request_id.clone(),
                body,
            });
        }

        Ok(RawResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
            method: req.method.clone(),
            url,
            request_id: ctx.request_id.clone(),
        })
    }
}

fn network_error(req: &PreparedRequest, url: &str, ctx: &RequestContext, e: reqwest::Error) -> Error {
    Error::Network {
        method: req.method.to_string(),
        url: url.to_string(),
        request_id: ctx.request_id.clone(),
        message: e.to_string(),
        timeout: e.is_timeout(),
        source: Some(Arc::new(e)),
    }
}

fn invalid_header(name: &str, e: impl std::fmt::Display) -> Error {
    Error::validation_with_context(
        "invalid request header",
        ErrorContext::new()
            .with_field_path(format!("headers.{}", name))
            .with_details(e.to_string()),
    )
}
