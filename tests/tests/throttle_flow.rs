//! Throttling behaviour over HTTP.

use api::nonce::NONCE_HEADER;
use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use integration_tests::fixtures;
use integration_tests::setup::{parse_addr, TestConfig, TestContext};

async fn submit(server: &TestServer, ctx: &TestContext) -> TestResponse {
    server
        .post("/submit")
        .add_header(NONCE_HEADER, &ctx.token())
        .json(&fixtures::submit_body(fixtures::contact_form()))
        .await
}

async fn submit_as(server: &TestServer, ctx: &TestContext, user_agent: &str) -> TestResponse {
    server
        .post("/submit")
        .add_header(NONCE_HEADER, &ctx.token())
        .add_header("User-Agent", user_agent)
        .json(&fixtures::submit_body(fixtures::contact_form()))
        .await
}

/// The eleventh submission inside the window is throttled.
#[tokio::test]
async fn test_limit_returns_429() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    for _ in 0..10 {
        submit(&server, &ctx).await.assert_status(StatusCode::OK);
    }

    let response = submit(&server, &ctx).await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.header("Retry-After"), "3600");

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["throttled"], true);
    assert_eq!(body["retry_after"], 3600);
    assert_eq!(body["remaining_time"], 60);
    assert_eq!(
        body["message"],
        "Too many submissions. Please wait 60 minutes before submitting again."
    );

    assert_eq!(ctx.repository.saved_count(), 10);
}

/// The wait shrinks as the window slides, rounded up to whole minutes.
#[tokio::test]
async fn test_retry_after_counts_down() {
    let mut config = TestConfig::default();
    config.throttle.max_submissions = 2;
    let ctx = TestContext::with_config(config);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    submit(&server, &ctx).await.assert_status(StatusCode::OK);
    ctx.advance(600);
    submit(&server, &ctx).await.assert_status(StatusCode::OK);

    ctx.advance(2930);
    let response = submit(&server, &ctx).await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);

    let body: serde_json::Value = response.json();
    assert_eq!(body["retry_after"], 70);
    assert_eq!(body["remaining_time"], 2);
}

/// Once the window has passed, submissions are accepted again.
#[tokio::test]
async fn test_window_expiry_restores_allowance() {
    let mut config = TestConfig::default();
    config.throttle.max_submissions = 1;
    let ctx = TestContext::with_config(config);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    submit(&server, &ctx).await.assert_status(StatusCode::OK);
    submit(&server, &ctx)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    ctx.advance(3601);
    submit(&server, &ctx).await.assert_status(StatusCode::OK);
}

/// Many browsers behind one address raise the limit.
#[tokio::test]
async fn test_shared_address_gets_larger_allowance() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    for _ in 0..10 {
        submit_as(&server, &ctx, fixtures::CHROME_UA)
            .await
            .assert_status(StatusCode::OK);
    }

    submit_as(&server, &ctx, fixtures::CHROME_UA)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
    submit_as(&server, &ctx, fixtures::FIREFOX_UA)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    // Third distinct browser marks the address as shared
    for _ in 0..20 {
        submit_as(&server, &ctx, fixtures::EDGE_UA)
            .await
            .assert_status(StatusCode::OK);
    }

    submit_as(&server, &ctx, fixtures::EDGE_UA)
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

/// Private addresses are never throttled.
#[tokio::test]
async fn test_private_address_is_not_throttled() {
    let mut config = TestConfig::default();
    config.throttle.max_submissions = 1;
    config.remote_addr = parse_addr("192.168.1.20:50000");
    let ctx = TestContext::with_config(config);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    for _ in 0..5 {
        submit(&server, &ctx).await.assert_status(StatusCode::OK);
    }

    assert_eq!(ctx.repository.saved()[0].client_ip, "192.168.1.20");
}

/// Whitelisted addresses are never throttled.
#[tokio::test]
async fn test_whitelisted_address_is_not_throttled() {
    let mut config = TestConfig::default();
    config.throttle.max_submissions = 1;
    config.throttle.whitelist = vec!["8.8.8.8".to_string()];
    let ctx = TestContext::with_config(config);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    for _ in 0..3 {
        submit(&server, &ctx).await.assert_status(StatusCode::OK);
    }
}

/// Behind a trusted proxy each forwarded client has its own allowance.
#[tokio::test]
async fn test_trusted_proxy_forwarded_clients() {
    let mut config = TestConfig::default();
    config.throttle.max_submissions = 1;
    config.remote_addr = parse_addr("10.0.0.5:443");
    config.api.security.trusted_proxies = vec!["10.0.0.5".to_string()];
    let ctx = TestContext::with_config(config);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let forwarded = |client: &'static str| {
        server
            .post("/submit")
            .add_header(NONCE_HEADER, &ctx.token())
            .add_header("X-Forwarded-For", client)
            .json(&fixtures::submit_body(fixtures::contact_form()))
    };

    forwarded("1.1.1.1, 10.0.0.5")
        .await
        .assert_status(StatusCode::OK);
    forwarded("1.1.1.1")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
    forwarded("9.9.9.9").await.assert_status(StatusCode::OK);

    let saved = ctx.repository.saved();
    assert_eq!(saved[0].client_ip, "1.1.1.1");
    assert_eq!(saved[1].client_ip, "9.9.9.9");
}

/// Forwarded headers from an untrusted peer are ignored.
#[tokio::test]
async fn test_untrusted_forwarded_header_is_ignored() {
    let mut config = TestConfig::default();
    config.throttle.max_submissions = 1;
    let ctx = TestContext::with_config(config);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let spoofed = |client: &'static str| {
        server
            .post("/submit")
            .add_header(NONCE_HEADER, &ctx.token())
            .add_header("X-Forwarded-For", client)
            .json(&fixtures::submit_body(fixtures::contact_form()))
    };

    spoofed("1.1.1.1").await.assert_status(StatusCode::OK);
    spoofed("9.9.9.9")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    assert_eq!(ctx.repository.saved()[0].client_ip, "8.8.8.8");
}
