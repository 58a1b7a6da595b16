//! Client configuration: execution environment, timeouts, cache and retry knobs.
//!
//! Loaded from YAML or from `PORTFOLIO_*` environment variables, then handed
//! to [`crate::HttpClientBuilder::from_config`].

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Path segment every request is routed through.
pub const PROXY_PATH: &str = "/api/proxy";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_TOKEN_KEY: &str = "jwt_token";

/// Where the client runs. Chosen once at construction.
///
/// - `Server`: talks to the proxy through an absolute configured base URL,
///   with pooled keep-alive connections. No token storage, no navigation.
/// - `Client`: the relative proxy path resolved against the page origin;
///   reads the bearer token and may redirect on session loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Environment {
    Server { base_url: String },
    Client { origin: String },
}

impl Environment {
    pub fn server(base_url: impl Into<String>) -> Self {
        Environment::Server {
            base_url: base_url.into(),
        }
    }

    pub fn client(origin: impl Into<String>) -> Self {
        Environment::Client {
            origin: origin.into(),
        }
    }

    pub fn is_client(&self) -> bool {
        matches!(self, Environment::Client { .. })
    }

    pub fn is_server(&self) -> bool {
        matches!(self, Environment::Server { .. })
    }

    /// Base every relative request path is appended to.
    pub fn base_url(&self) -> String {
        let root = match self {
            Environment::Server { base_url } => base_url,
            Environment::Client { origin } => origin,
        };
        format!("{}{}", root.trim_end_matches('/'), PROXY_PATH)
    }

    /// The root must be an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        let (field, root) = match self {
            Environment::Server { base_url } => ("environment.base_url", base_url),
            Environment::Client { origin } => ("environment.origin", origin),
        };
        let parsed = url::Url::parse(root).map_err(|e| {
            Error::configuration_with_context(
                "environment root must be an absolute URL",
                ErrorContext::new()
                    .with_field_path(field)
                    .with_details(format!("{}: {}", root, e)),
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::configuration_with_context(
                "environment root must use http or https",
                ErrorContext::new()
                    .with_field_path(field)
                    .with_details(root.to_string()),
            ));
        }
        Ok(())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::server("http://localhost:3000")
    }
}

/// Route names the session guard cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RouteConfig {
    pub admin_prefix: String,
    pub login_path: String,
    pub home_path: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            admin_prefix: "/admin".to_string(),
            login_path: "/admin/login".to_string(),
            home_path: "/".to_string(),
        }
    }
}

impl RouteConfig {
    /// Admin pages other than the login page require a live session.
    pub fn requires_session(&self, path: &str) -> bool {
        path.starts_with(&self.admin_prefix) && path != self.login_path
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ClientConfig {
    pub environment: Environment,
    pub timeout_ms: u64,
    pub cache_ttl_ms: u64,
    pub sweep_interval_ms: u64,
    /// Log one timing line per successful request.
    pub development: bool,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub routes: RouteConfig,
    pub token_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            cache_ttl_ms: 5 * 60 * 1000,
            sweep_interval_ms: 10 * 60 * 1000,
            development: false,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            retry_max_delay_ms: 5000,
            routes: RouteConfig::default(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let cfg: Self = serde_yaml::from_str(yaml).map_err(|e| {
            Error::configuration_with_context(
                "invalid client configuration",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("config_loader"),
            )
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_with_context(
                format!("cannot read {}", path.display()),
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("config_loader"),
            )
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Defaults overridden by `PORTFOLIO_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();

        if let Some(origin) = lookup("PORTFOLIO_ORIGIN") {
            cfg.environment = Environment::client(origin);
        } else if let Some(base_url) = lookup("PORTFOLIO_API_BASE_URL") {
            cfg.environment = Environment::server(base_url);
        }

        let number = |key: &str| -> Option<u64> {
            let raw = lookup(key)?;
            match raw.trim().parse::<u64>() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::warn!(key, value = %raw, "ignoring non-numeric setting");
                    None
                }
            }
        };

        if let Some(v) = number("PORTFOLIO_HTTP_TIMEOUT_MS") {
            cfg.timeout_ms = v;
        }
        if let Some(v) = number("PORTFOLIO_CACHE_TTL_MS") {
            cfg.cache_ttl_ms = v;
        }
        if let Some(v) = number("PORTFOLIO_SWEEP_INTERVAL_MS") {
            cfg.sweep_interval_ms = v;
        }
        if let Some(v) = number("PORTFOLIO_MAX_RETRIES") {
            cfg.max_retries = v.min(u32::MAX as u64) as u32;
        }
        if let Some(v) = lookup("PORTFOLIO_DEV") {
            cfg.development = matches!(v.trim(), "1" | "true" | "yes");
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.environment.validate()?;

        for (field, value) in [
            ("timeout_ms", self.timeout_ms),
            ("sweep_interval_ms", self.sweep_interval_ms),
        ] {
            if value == 0 {
                return Err(Error::configuration_with_context(
                    "must be greater than zero",
                    ErrorContext::new().with_field_path(field),
                ));
            }
        }

        if self.retry_base_delay_ms > self.retry_max_delay_ms {
            return Err(Error::configuration_with_context(
                "retry_base_delay_ms exceeds retry_max_delay_ms",
                ErrorContext::new().with_field_path("retry_base_delay_ms"),
            ));
        }

        if self.token_key.trim().is_empty() {
            return Err(Error::configuration_with_context(
                "token_key must not be empty",
                ErrorContext::new().with_field_path("token_key"),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}
