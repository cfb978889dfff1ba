//! Request deadlines and credential rate limiting.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use bazaar_integration_tests::{TestApp, error_message};
use reqwest::StatusCode;

#[tokio::test]
async fn stalled_request_times_out_with_408() {
    let app = TestApp::spawn_with(|config| {
        config.request_timeout = Duration::from_millis(200);
    })
    .await;

    // The in-memory pool has a single connection; holding it stalls any
    // handler that needs the database.
    let held = app.pool.acquire().await.unwrap();
    let resp = app.get("/store/Acme").await;
    assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);
    drop(held);

    assert_eq!(app.get("/store/Acme").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn credential_routes_are_rate_limited_after_burst() {
    let app = TestApp::spawn_with(|config| config.rate_limit = true).await;

    for _ in 0..5 {
        let resp = app.login("nobody", "pw123").await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    let resp = app.login("nobody", "pw123").await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key("retry-after"));
    assert_eq!(error_message(resp).await, "Too many requests");

    let resp = app.register("carol", "pw123", "c@x.com").await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

    assert_eq!(app.get("/health").await.status(), StatusCode::OK);
}
