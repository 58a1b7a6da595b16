use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;

/// Structured error context for configuration and runtime failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "environment.base_url")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config_loader", "deduplicator")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the client.
///
/// `Clone` so that every caller joined on one deduplicated request can receive
/// the same failure.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Runtime error: {message}{}", format_context(.context))]
    Runtime {
        message: String,
        context: ErrorContext,
    },

    /// No response was received (connect failure, reset, timeout).
    #[error("Network error [{request_id}] {method} {url}: {message}")]
    Network {
        method: String,
        url: String,
        request_id: String,
        message: String,
        timeout: bool,
        #[source]
        source: Option<Arc<reqwest::Error>>,
    },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} {status_text} [{request_id}] {method} {url}")]
    Http {
        status: u16,
        status_text: String,
        method: String,
        url: String,
        request_id: String,
        body: Bytes,
    },

    #[error("Serialization error: {0}")]
    Serialization(Arc<serde_json::Error>),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(Arc::new(e))
    }
}

impl Error {
    /// Create a new runtime error with structured context
    pub fn runtime_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Runtime {
            message: msg.into(),
            context,
        }
    }

    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. }
            | Error::Validation { context, .. }
            | Error::Runtime { context, .. } => Some(context),
            _ => None,
        }
    }

    /// HTTP status of the response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body for HTTP errors.
    pub fn body(&self) -> Option<&Bytes> {
        match self {
            Error::Http { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Best-effort JSON decoding of an HTTP error body.
    pub fn body_json(&self) -> Option<serde_json::Value> {
        self.body().and_then(|b| serde_json::from_slice(b).ok())
    }

    pub fn request_id(&self) -> Option<&str> {
        match self {
            Error::Network { request_id, .. } | Error::Http { request_id, .. } => {
                Some(request_id.as_str())
            }
            _ => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Network { url, .. } | Error::Http { url, .. } => Some(url.as_str()),
            _ => None,
        }
    }

    pub fn method(&self) -> Option<&str> {
        match self {
            Error::Network { method, .. } | Error::Http { method, .. } => Some(method.as_str()),
            _ => None,
        }
    }

    /// True when no response was received at all.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Network { timeout: true, .. })
    }

    /// Whether this kind of failure may succeed on a resend.
    pub fn is_retryable_kind(&self) -> bool {
        match self {
            Error::Network { .. } => true,
            Error::Http { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            _ => false,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        self.status() == Some(401)
    }
}
