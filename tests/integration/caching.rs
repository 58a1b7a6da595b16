//! GET caching, invalidation and preloading against a mock backend.

use crate::mock_server::MockServerFixture;
use mockito::Matcher;
use portfolio_client::RequestConfig;
use serde_json::{json, Value};
use std::time::Duration;

#[tokio::test]
async fn test_repeated_get_is_served_from_cache() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json("GET", "/skills", 200, r#"{"data":["rust","go"]}"#, 1)
        .await;
    let client = fixture.server_builder().build().unwrap();
    let cfg = RequestConfig::new();

    let first = client.get::<Value>("/skills", &cfg).await.unwrap();
    let second = client.get::<Value>("/skills", &cfg).await.unwrap();

    assert_eq!(first.data, json!({"data": ["rust", "go"]}));
    assert_eq!(second.data, first.data);
    assert_eq!(second.status, 200);
    assert_eq!(second.status_text, "OK");
    assert!(second.headers.is_empty());
    assert_eq!(client.cache().stats().hits, 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cached_entry_expires_after_ttl() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_json("GET", "/blogs", 200, "[]", 2).await;
    let client = fixture.server_builder().build().unwrap();
    let cfg = RequestConfig::new().cache_ttl(Duration::from_millis(50));

    client.get::<Value>("/blogs", &cfg).await.unwrap();
    client.get::<Value>("/blogs", &cfg).await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;
    client.get::<Value>("/blogs", &cfg).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_params_are_part_of_the_cache_key() {
    let fixture = MockServerFixture::new().await;
    let page1 = fixture
        .mock_json_query("/projects", vec![("page", "1")], r#"{"page":1}"#, 1)
        .await;
    let page2 = fixture
        .mock_json_query("/projects", vec![("page", "2")], r#"{"page":2}"#, 1)
        .await;
    let client = fixture.server_builder().build().unwrap();

    for _ in 0..2 {
        let r1 = client
            .get::<Value>("/projects", &RequestConfig::new().param("page", 1))
            .await
            .unwrap();
        let r2 = client
            .get::<Value>("/projects", &RequestConfig::new().param("page", 2))
            .await
            .unwrap();
        assert_eq!(r1.data["page"], 1);
        assert_eq!(r2.data["page"], 2);
    }

    page1.assert_async().await;
    page2.assert_async().await;
}

#[tokio::test]
async fn test_only_200_responses_are_cached() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_json("GET", "/drafts", 203, "{}", 2).await;
    let client = fixture.server_builder().build().unwrap();

    client.get::<Value>("/drafts", &RequestConfig::new()).await.unwrap();
    client.get::<Value>("/drafts", &RequestConfig::new()).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_mutation_invalidates_matching_reads() {
    let fixture = MockServerFixture::new().await;
    let list = fixture.mock_json("GET", "/projects", 200, "[]", 2).await;
    let skills = fixture.mock_json("GET", "/skills", 200, "[]", 1).await;
    let create = fixture
        .mock_json("POST", "/projects", 201, r#"{"id":1}"#, 1)
        .await;
    let client = fixture.server_builder().build().unwrap();
    let cfg = RequestConfig::new();

    client.get::<Value>("/projects", &cfg).await.unwrap();
    client.get::<Value>("/skills", &cfg).await.unwrap();

    let created = client
        .post::<Value, _>("/projects", Some(&json!({"title": "x"})), &cfg)
        .await
        .unwrap();
    assert_eq!(created.status, 201);

    // /projects refetched, /skills still cached
    client.get::<Value>("/projects", &cfg).await.unwrap();
    client.get::<Value>("/skills", &cfg).await.unwrap();

    list.assert_async().await;
    skills.assert_async().await;
    create.assert_async().await;
}

#[tokio::test]
async fn test_collection_write_drops_cached_item_reads() {
    let fixture = MockServerFixture::new().await;
    let item = fixture
        .mock_json("GET", "/projects/123", 200, r#"{"id":123}"#, 2)
        .await;
    let create = fixture.mock_json("POST", "/projects", 201, "{}", 1).await;
    let client = fixture.server_builder().build().unwrap();
    let cfg = RequestConfig::new();

    client.get::<Value>("/projects/123", &cfg).await.unwrap();
    client.get::<Value>("/projects/123", &cfg).await.unwrap();
    client
        .post::<Value, _>("/projects", Some(&json!({"title": "y"})), &cfg)
        .await
        .unwrap();
    client.get::<Value>("/projects/123", &cfg).await.unwrap();

    item.assert_async().await;
    create.assert_async().await;
}

#[tokio::test]
async fn test_failed_write_still_invalidates() {
    // 404 fails on the first attempt, 500 after every retry.
    for (status, attempts) in [(404, 1), (500, 4)] {
        let fixture = MockServerFixture::new().await;
        let list = fixture.mock_json("GET", "/projects", 200, "[]", 2).await;
        let create = fixture
            .mock_json("POST", "/projects", status, r#"{"error":"no"}"#, attempts)
            .await;
        let client = fixture.server_builder().build().unwrap();
        let cfg = RequestConfig::new();

        client.get::<Value>("/projects", &cfg).await.unwrap();
        let err = client
            .post::<Value, _>("/projects", Some(&json!({"title": "z"})), &cfg)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(status as u16));
        client.get::<Value>("/projects", &cfg).await.unwrap();

        list.assert_async().await;
        create.assert_async().await;
    }
}

#[tokio::test]
async fn test_blog_like_drops_cached_post() {
    let fixture = MockServerFixture::new().await;
    let post = fixture
        .mock_json("GET", "/blogs/42", 200, r#"{"message":"","data":{"likes":0}}"#, 2)
        .await;
    let like = fixture
        .mock_json("POST", "/blogs/42/like", 200, r#"{"message":"liked","data":null}"#, 1)
        .await;
    let client = fixture.server_builder().build().unwrap();

    client.blogs().get::<Value>("42").await.unwrap();
    client.blogs().get::<Value>("42").await.unwrap();
    let liked = client.blog("42").like().await.unwrap();
    assert_eq!(liked.message, "liked");
    client.blogs().get::<Value>("42").await.unwrap();

    post.assert_async().await;
    like.assert_async().await;
}

#[tokio::test]
async fn test_invalidate_everything() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_json("GET", "/experiences", 200, "[]", 2).await;
    let client = fixture.server_builder().build().unwrap();
    let cfg = RequestConfig::new();

    client.get::<Value>("/experiences", &cfg).await.unwrap();
    assert_eq!(client.invalidate_cache(None).await.unwrap(), 1);
    client.get::<Value>("/experiences", &cfg).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_preload_warms_the_cache() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json("GET", "/certifications", 200, r#"[{"id":1}]"#, 1)
        .await;
    let client = fixture.server_builder().build().unwrap();
    let cfg = RequestConfig::new();

    client.preload_data("/certifications", &cfg).await.unwrap();
    let resp = client.get::<Value>("/certifications", &cfg).await.unwrap();

    assert_eq!(resp.data, json!([{"id": 1}]));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_preload_failure_is_swallowed() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_json("GET", "/missing", 404, "{}", 1).await;
    let client = fixture.server_builder().build().unwrap();

    client
        .preload_data("/missing", &RequestConfig::new())
        .await
        .unwrap();
    assert!(client.cache().is_empty().await.unwrap());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_sends_cache_hint_and_request_id() {
    let fixture = MockServerFixture::new().await;
    let hint = fixture
        .mock_with_header(
            "/skills",
            "cache-control",
            Matcher::Exact("max-age=300".into()),
            "[]",
            1,
        )
        .await;
    let client = fixture.server_builder().build().unwrap();
    client.get::<Value>("/skills", &RequestConfig::new()).await.unwrap();
    hint.assert_async().await;

    let fixture = MockServerFixture::new().await;
    let request_id = fixture
        .mock_with_header(
            "/skills",
            "x-request-id",
            Matcher::Regex("^[0-9a-f]{9}$".into()),
            "[]",
            1,
        )
        .await;
    let client = fixture.server_builder().build().unwrap();
    client.get::<Value>("/skills", &RequestConfig::new()).await.unwrap();
    request_id.assert_async().await;
}
