//! Failures raised outside the transport still reach the error hooks.

use crate::mock_server::MockServerFixture;
use portfolio_client::interceptors::Interceptor;
use portfolio_client::transport::{PreparedRequest, RequestContext};
use portfolio_client::{Error, ErrorContext, RequestConfig};
use serde::Deserialize;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts `on_error` calls; optionally refuses every request.
struct ErrorTally {
    seen: Arc<AtomicUsize>,
    refuse: bool,
}

impl Interceptor for ErrorTally {
    fn name(&self) -> &'static str {
        "error_tally"
    }

    fn on_request(&self, _ctx: &RequestContext, req: PreparedRequest) -> portfolio_client::Result<PreparedRequest> {
        if self.refuse {
            return Err(Error::validation_with_context(
                "request refused",
                ErrorContext::new().with_source("error_tally"),
            ));
        }
        Ok(req)
    }

    fn on_error(&self, _ctx: &RequestContext, err: Error) -> Error {
        self.seen.fetch_add(1, Ordering::SeqCst);
        err
    }
}

#[derive(Debug, Deserialize)]
struct Skill {
    #[allow(dead_code)]
    name: String,
}

#[tokio::test]
async fn test_decode_failure_reaches_error_hooks() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_json("GET", "/skills", 200, r#"[1, 2]"#, 1).await;
    let seen = Arc::new(AtomicUsize::new(0));
    let client = fixture
        .server_builder()
        .interceptor(ErrorTally {
            seen: seen.clone(),
            refuse: false,
        })
        .build()
        .unwrap();

    let err = client
        .get::<Vec<Skill>>("/skills", &RequestConfig::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Serialization(_)));
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_refused_request_reaches_error_hooks_without_sending() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_json("POST", "/projects", 201, "{}", 0).await;
    let seen = Arc::new(AtomicUsize::new(0));
    let client = fixture
        .server_builder()
        .interceptor(ErrorTally {
            seen: seen.clone(),
            refuse: true,
        })
        .build()
        .unwrap();

    let err = client
        .post::<Value, _>("/projects", Some(&serde_json::json!({})), &RequestConfig::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation { .. }));
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    mock.assert_async().await;
}
