use super::Envelope;
use crate::client::{HttpClient, RequestConfig};
use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

/// Reader actions on one blog post: likes, bookmarks, view history and
/// comments.
///
/// Every action is a `POST` under `/blogs/{id}/..`. Plain write
/// invalidation would only drop keys under that sub-path, so each action
/// also drops the cached `/blogs/{id}` read whose counters it changes.
pub struct BlogApi<'a> {
    client: &'a HttpClient,
    path: String,
}

impl<'a> BlogApi<'a> {
    pub fn new(client: &'a HttpClient, id: &str) -> Self {
        Self {
            client,
            path: format!("/blogs/{id}"),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn action_path(&self, action: &str) -> String {
        format!("{}/{}", self.path, action)
    }

    async fn act(&self, action: &str) -> Result<Envelope<Value>> {
        let dropped = self.client.invalidate_cache(Some(&self.path)).await?;
        debug!(blog = %self.path, action, dropped, "blog action");
        Ok(self
            .client
            .post::<_, ()>(&self.action_path(action), None, &RequestConfig::new())
            .await?
            .data)
    }

    pub async fn like(&self) -> Result<Envelope<Value>> {
        self.act("like").await
    }

    pub async fn unlike(&self) -> Result<Envelope<Value>> {
        self.act("unlike").await
    }

    pub async fn bookmark(&self) -> Result<Envelope<Value>> {
        self.act("bookmark").await
    }

    pub async fn unbookmark(&self) -> Result<Envelope<Value>> {
        self.act("unbookmark").await
    }

    /// Record that the current user read this post.
    pub async fn record_view(&self) -> Result<Envelope<Value>> {
        self.act("history").await
    }

    pub async fn likes<T: DeserializeOwned>(&self, config: &RequestConfig) -> Result<Envelope<T>> {
        Ok(self.client.get(&self.action_path("likes"), config).await?.data)
    }

    pub async fn comments<T: DeserializeOwned>(&self, config: &RequestConfig) -> Result<Envelope<T>> {
        Ok(self
            .client
            .get(&self.action_path("comments"), config)
            .await?
            .data)
    }

    pub async fn add_comment<T, B>(&self, body: &B) -> Result<Envelope<T>>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.client.invalidate_cache(Some(&self.path)).await?;
        Ok(self
            .client
            .post(&self.action_path("comments"), Some(body), &RequestConfig::new())
            .await?
            .data)
    }
}
