//! Concurrent identical GETs share one network call.

use crate::mock_server::MockServerFixture;
use futures::future::join_all;
use portfolio_client::RequestConfig;
use serde_json::{json, Value};

#[tokio::test]
async fn test_concurrent_gets_share_one_call() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json("GET", "/projects", 200, r#"[{"id":1},{"id":2}]"#, 1)
        .await;
    let client = fixture.server_builder().build().unwrap();
    let cfg = RequestConfig::new();

    let results = join_all((0..5).map(|_| client.get::<Value>("/projects", &cfg))).await;

    for r in results {
        assert_eq!(r.unwrap().data, json!([{"id": 1}, {"id": 2}]));
    }
    assert_eq!(client.in_flight(), 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_concurrent_failure_reaches_every_caller() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json("GET", "/blogs/42", 404, r#"{"error":"not found"}"#, 1)
        .await;
    let client = fixture.server_builder().build().unwrap();
    let cfg = RequestConfig::new();

    let results = join_all((0..3).map(|_| client.get::<Value>("/blogs/42", &cfg))).await;

    for r in results {
        let err = r.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.body_json(), Some(json!({"error": "not found"})));
    }
    assert!(client.cache().is_empty().await.unwrap());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_different_params_are_not_merged() {
    let fixture = MockServerFixture::new().await;
    let a = fixture
        .mock_json_query("/blogs", vec![("tag", "rust")], "[]", 1)
        .await;
    let b = fixture
        .mock_json_query("/blogs", vec![("tag", "go")], "[]", 1)
        .await;
    let client = fixture.server_builder().build().unwrap();
    let rust = RequestConfig::new().param("tag", "rust");
    let go = RequestConfig::new().param("tag", "go");

    let (r1, r2) = tokio::join!(
        client.get::<Value>("/blogs", &rust),
        client.get::<Value>("/blogs", &go)
    );
    r1.unwrap();
    r2.unwrap();

    a.assert_async().await;
    b.assert_async().await;
}

#[tokio::test]
async fn test_mutations_are_never_deduplicated() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_json("POST", "/skills", 200, "{}", 3).await;
    let client = fixture.server_builder().build().unwrap();
    let cfg = RequestConfig::new();
    let body = json!({"name": "rust"});

    let results = join_all((0..3).map(|_| client.post::<Value, _>("/skills", Some(&body), &cfg))).await;

    assert!(results.iter().all(Result::is_ok));
    mock.assert_async().await;
}
