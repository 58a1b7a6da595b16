//! Bearer auth and session-expiry handling.

use crate::mock_server::MockServerFixture;
use mockito::Matcher;
use portfolio_client::auth::{InMemoryNavigator, MemoryTokenStore, TokenStore};
use portfolio_client::interceptors::Interceptor;
use portfolio_client::transport::{PreparedRequest, RequestContext};
use portfolio_client::RequestConfig;
use serde_json::Value;
use std::sync::Arc;

#[tokio::test]
async fn test_client_side_requests_carry_bearer_token() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_with_header(
            "/admin/projects",
            "authorization",
            Matcher::Exact("Bearer t0k3n".into()),
            "[]",
            1,
        )
        .await;
    let client = fixture.client_builder().build().unwrap();
    client.set_token("t0k3n").unwrap();

    client
        .get::<Value>("/admin/projects", &RequestConfig::new())
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_side_requests_carry_no_token() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_with_header("/skills", "authorization", Matcher::Missing, "[]", 1)
        .await;
    let client = fixture
        .server_builder()
        .token_store(Arc::new(MemoryTokenStore::with_token("t0k3n")))
        .build()
        .unwrap();

    client.get::<Value>("/skills", &RequestConfig::new()).await.unwrap();
    mock.assert_async().await;
}

async fn expire_session_on(current_page: &str) -> (Arc<MemoryTokenStore>, Arc<InMemoryNavigator>) {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json("GET", "/admin/projects", 401, r#"{"error":"expired"}"#, 1)
        .await;
    let store = Arc::new(MemoryTokenStore::with_token("stale"));
    let nav = Arc::new(InMemoryNavigator::new(current_page));
    let client = fixture
        .client_builder()
        .token_store(store.clone())
        .navigator(nav.clone())
        .build()
        .unwrap();

    let err = client
        .get::<Value>("/admin/projects", &RequestConfig::new())
        .await
        .unwrap_err();

    assert!(err.is_auth_failure());
    mock.assert_async().await;
    (store, nav)
}

#[tokio::test]
async fn test_unauthorized_on_admin_page_clears_token_and_leaves() {
    let (store, nav) = expire_session_on("/admin/projects").await;
    assert_eq!(store.get(), None);
    assert_eq!(nav.redirects(), vec!["/".to_string()]);
}

#[tokio::test]
async fn test_unauthorized_on_login_page_stays_put() {
    let (store, nav) = expire_session_on("/admin/login").await;
    assert_eq!(store.get(), None);
    assert!(nav.redirects().is_empty());
}

#[tokio::test]
async fn test_unauthorized_on_public_page_stays_put() {
    let (store, nav) = expire_session_on("/blogs").await;
    assert_eq!(store.get(), None);
    assert!(nav.redirects().is_empty());
}

#[tokio::test]
async fn test_unauthorized_server_side_leaves_token_store_alone() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json("GET", "/admin/projects", 401, "{}", 1)
        .await;
    let store = Arc::new(MemoryTokenStore::with_token("service-token"));
    let nav = Arc::new(InMemoryNavigator::new("/admin/projects"));
    let client = fixture
        .server_builder()
        .token_store(store.clone())
        .navigator(nav.clone())
        .build()
        .unwrap();

    let err = client
        .get::<Value>("/admin/projects", &RequestConfig::new())
        .await
        .unwrap_err();

    assert!(err.is_auth_failure());
    assert_eq!(store.get().as_deref(), Some("service-token"));
    assert!(nav.redirects().is_empty());
    mock.assert_async().await;
}

struct ClientTag;

impl Interceptor for ClientTag {
    fn name(&self) -> &'static str {
        "client_tag"
    }

    fn on_request(&self, _ctx: &RequestContext, req: PreparedRequest) -> portfolio_client::Result<PreparedRequest> {
        Ok(req.with_header("x-client", "integration"))
    }
}

#[tokio::test]
async fn test_custom_interceptor_runs_after_builtins() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_with_header(
            "/skills",
            "x-client",
            Matcher::Exact("integration".into()),
            "[]",
            1,
        )
        .await;
    let client = fixture.server_builder().interceptor(ClientTag).build().unwrap();

    assert_eq!(
        client.interceptor_names(),
        vec!["diagnostics", "client_tag"]
    );
    client.get::<Value>("/skills", &RequestConfig::new()).await.unwrap();
    mock.assert_async().await;
}
