//! Request signatures used as cache and deduplication keys.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Deterministic `method:url:params` key.
///
/// Params are a sorted map, so two logically identical requests always
/// serialize to the same signature regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestSignature(String);

impl RequestSignature {
    pub fn new(method: &str, url: &str, params: &BTreeMap<String, serde_json::Value>) -> Self {
        let params = serde_json::to_string(params).unwrap_or_else(|_| "{}".to_string());
        Self(format!("{}:{}:{}", method.to_lowercase(), url, params))
    }

    pub fn get(url: &str, params: &BTreeMap<String, serde_json::Value>) -> Self {
        Self::new("GET", url, params)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substring match used for coarse invalidation.
    pub fn contains(&self, pattern: &str) -> bool {
        self.0.contains(pattern)
    }
}

impl std::fmt::Display for RequestSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestSignature {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RequestSignature {
    fn from(s: String) -> Self {
        Self(s)
    }
}
