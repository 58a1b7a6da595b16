//! Typed helpers for the portfolio backend's REST collections.
//!
//! The backend wraps payloads as `{ "message": .., "data": .., "error": .. }`.
//! [`Envelope`] models that shape; everything here is sugar over
//! [`HttpClient`] and goes through the same cache, deduplication and retry
//! path as a plain `get`/`post`.

mod auth;
mod blogs;

pub use auth::{AuthApi, Credentials, LoginResponse};
pub use blogs::BlogApi;

use crate::client::{HttpClient, RequestConfig};
use crate::{Error, ErrorContext, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The backend's response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// The payload, or an error when the backend reported one or sent none.
    pub fn into_data(self) -> Result<T> {
        if let Some(err) = self.error {
            return Err(Error::runtime_with_context(
                err,
                ErrorContext::new().with_source("envelope"),
            ));
        }
        self.data.ok_or_else(|| {
            Error::validation_with_context(
                "response envelope carried no data",
                ErrorContext::new()
                    .with_field_path("data")
                    .with_details(self.message),
            )
        })
    }
}

/// One REST collection, e.g. `/projects`.
#[derive(Clone, Copy)]
pub struct Resource<'a> {
    client: &'a HttpClient,
    path: &'static str,
}

impl<'a> Resource<'a> {
    pub fn new(client: &'a HttpClient, path: &'static str) -> Self {
        Self { client, path }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    fn item(&self, id: &str) -> String {
        format!("{}/{}", self.path, id)
    }

    pub async fn list<T: DeserializeOwned>(&self, config: &RequestConfig) -> Result<Envelope<T>> {
        Ok(self.client.get(self.path, config).await?.data)
    }

    pub async fn get<T: DeserializeOwned>(&self, id: &str) -> Result<Envelope<T>> {
        Ok(self.client.get(&self.item(id), &RequestConfig::new()).await?.data)
    }

    pub async fn create<T, B>(&self, body: &B) -> Result<Envelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        Ok(self
            .client
            .post(self.path, Some(body), &RequestConfig::new())
            .await?
            .data)
    }

    pub async fn update<T, B>(&self, id: &str, body: &B) -> Result<Envelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        Ok(self
            .client
            .put(&self.item(id), Some(body), &RequestConfig::new())
            .await?
            .data)
    }

    pub async fn remove<T: DeserializeOwned>(&self, id: &str) -> Result<Envelope<T>> {
        Ok(self
            .client
            .delete(&self.item(id), &RequestConfig::new())
            .await?
            .data)
    }
}

impl HttpClient {
    pub fn projects(&self) -> Resource<'_> {
        Resource::new(self, "/projects")
    }

    pub fn experiences(&self) -> Resource<'_> {
        Resource::new(self, "/experiences")
    }

    pub fn certifications(&self) -> Resource<'_> {
        Resource::new(self, "/certifications")
    }

    pub fn skills(&self) -> Resource<'_> {
        Resource::new(self, "/skills")
    }

    pub fn blogs(&self) -> Resource<'_> {
        Resource::new(self, "/blogs")
    }

    pub fn blog(&self, id: &str) -> BlogApi<'_> {
        BlogApi::new(self, id)
    }

    /// Single comments by id; listing and creation live on [`BlogApi`].
    pub fn comments(&self) -> Resource<'_> {
        Resource::new(self, "/comments")
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }
}
