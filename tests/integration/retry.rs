//! Retry of transient failures and error surfacing.

use crate::mock_server::MockServerFixture;
use portfolio_client::resilience::RetryConfig;
use portfolio_client::{Environment, Error, HttpClientBuilder, RequestConfig};
use serde_json::Value;
use std::time::Duration;

#[tokio::test]
async fn test_server_error_is_retried_three_times() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json("GET", "/projects", 500, r#"{"error":"boom"}"#, 4)
        .await;
    let client = fixture.server_builder().build().unwrap();

    let err = client
        .get::<Value>("/projects", &RequestConfig::new())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(500));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_and_unavailable_are_retried() {
    for status in [429, 503] {
        let fixture = MockServerFixture::new().await;
        let mock = fixture.mock_json("GET", "/skills", status, "{}", 4).await;
        let client = fixture.server_builder().build().unwrap();

        let err = client
            .get::<Value>("/skills", &RequestConfig::new())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(status as u16));
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    for status in [400, 403, 404, 422] {
        let fixture = MockServerFixture::new().await;
        let mock = fixture.mock_json("GET", "/skills", status, "{}", 1).await;
        let client = fixture.server_builder().build().unwrap();

        let err = client
            .get::<Value>("/skills", &RequestConfig::new())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Http { .. }));
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_mutations_are_retried_too() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_json("DELETE", "/projects/7", 502, "", 4).await;
    let client = fixture.server_builder().build().unwrap();

    let err = client
        .delete::<Value>("/projects/7", &RequestConfig::new())
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(502));
    assert_eq!(err.method(), Some("DELETE"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_disabled_retry_makes_one_attempt() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_json("GET", "/skills", 500, "{}", 1).await;
    let client = fixture
        .server_builder()
        .retry(RetryConfig::disabled())
        .build()
        .unwrap();

    assert!(client
        .get::<Value>("/skills", &RequestConfig::new())
        .await
        .is_err());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_backend_surfaces_network_error() {
    // Nothing listens on port 9 (discard) on a test host.
    let client = HttpClientBuilder::new(Environment::server("http://127.0.0.1:9"))
        .retry(MockServerFixture::fast_retry())
        .timeout(Duration::from_secs(2))
        .without_background_sweep()
        .build()
        .unwrap();

    let err = client
        .get::<Value>("/skills", &RequestConfig::new())
        .await
        .unwrap_err();

    assert!(err.is_network());
    assert_eq!(err.status(), None);
    assert_eq!(err.url(), Some("http://127.0.0.1:9/api/proxy/skills"));
}
