//! Error handling tests for the submit endpoint.

use api::nonce::NONCE_HEADER;
use axum::http::StatusCode;
use axum_test::TestServer;
use intake_core::{FieldOverride, Submission};
use integration_tests::fixtures;
use integration_tests::setup::{TestConfig, TestContext};
use serde_json::json;

/// Requests without a form token are refused before the body is read.
#[tokio::test]
async fn test_missing_token_returns_403() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/submit")
        .content_type("application/json")
        .bytes(fixtures::contact_payload().into())
        .await;

    response.assert_status(StatusCode::FORBIDDEN);

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid or missing security token.");
    assert_eq!(ctx.repository.saved_count(), 0);
}

/// A forged token is refused.
#[tokio::test]
async fn test_invalid_token_returns_403() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/submit")
        .add_header(NONCE_HEADER, "0123456789abcdef")
        .json(&fixtures::submit_body(fixtures::contact_form()))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

/// Tokens stop working once their lifetime has passed.
#[tokio::test]
async fn test_expired_token_returns_403() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let token = ctx.token();
    ctx.advance(24 * 3600 + 1);

    let response = server
        .post("/submit")
        .add_header(NONCE_HEADER, &token)
        .json(&fixtures::submit_body(fixtures::contact_form()))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

/// Malformed JSON is rejected.
#[tokio::test]
async fn test_invalid_json_returns_400() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/submit")
        .content_type("application/json")
        .add_header(NONCE_HEADER, &ctx.token())
        .bytes("{not valid json".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Invalid request.");
}

/// Oversized bodies are rejected without being parsed.
#[tokio::test]
async fn test_oversized_body_returns_413() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let payload = fixtures::submit_body(json!({ "message": "x".repeat(300 * 1024) }));

    let response = server
        .post("/submit")
        .add_header(NONCE_HEADER, &ctx.token())
        .json(&payload)
        .await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Submission is too large.");
}

/// Form data that is not a field map is a structural error without field errors.
#[tokio::test]
async fn test_non_object_form_data_returns_400() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/submit")
        .add_header(NONCE_HEADER, &ctx.token())
        .json(&fixtures::submit_body(json!("name=Jo")))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Form data must be an array.");
    assert!(body.get("errors").is_none());
}

/// Empty form data is rejected.
#[tokio::test]
async fn test_empty_form_data_returns_400() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/submit")
        .add_header(NONCE_HEADER, &ctx.token())
        .json(&fixtures::submit_body(json!({})))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Form data cannot be empty.");
}

/// More than the maximum number of fields is rejected.
#[tokio::test]
async fn test_too_many_fields_returns_400() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/submit")
        .add_header(NONCE_HEADER, &ctx.token())
        .json(&fixtures::submit_body(fixtures::many_fields(51)))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Too many form fields. Maximum 50 fields allowed.");
    assert_eq!(ctx.repository.saved_count(), 0);
}

/// Field failures are reported per field.
#[tokio::test]
async fn test_field_errors_returns_400() {
    let ctx = TestContext::new();
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let form = json!({
        "name": "   ",
        "email": "not-an-email",
        "bad id!": "value",
        "company": "Acme"
    });

    let response = server
        .post("/submit")
        .add_header(NONCE_HEADER, &ctx.token())
        .json(&fixtures::submit_body(form))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Please correct the errors below.");
    assert_eq!(body["errors"]["name"], "This field is required.");
    assert_eq!(body["errors"]["email"], "Please enter a valid email address.");
    assert_eq!(body["errors"]["bad id!"], "Invalid field identifier.");
    assert!(body["errors"].get("company").is_none());

    assert_eq!(ctx.repository.saved_count(), 0);
    assert!(ctx.notifier.sent().is_empty());
}

/// Per-field overrides apply length and pattern rules.
#[tokio::test]
async fn test_override_rules_return_400() {
    let mut config = TestConfig::default();
    config.validation.fields.overrides.insert(
        "name".to_string(),
        FieldOverride {
            min_length: Some(3),
            ..FieldOverride::default()
        },
    );
    config.validation.fields.overrides.insert(
        "zip".to_string(),
        FieldOverride {
            pattern: Some(r"^\d{5}$".to_string()),
            ..FieldOverride::default()
        },
    );
    let ctx = TestContext::with_config(config);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let form = json!({ "name": "Jo", "email": "jo@example.com", "zip": "abc" });

    let response = server
        .post("/submit")
        .add_header(NONCE_HEADER, &ctx.token())
        .json(&fixtures::submit_body(form))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["errors"]["name"], "Please enter at least 3 characters.");
    assert_eq!(body["errors"]["zip"], "Please enter a valid value.");
}

fn reject_spam(submission: &Submission) -> Result<(), String> {
    match submission.get_str("company") {
        Some("spam") => Err("Submission rejected.".to_string()),
        _ => Ok(()),
    }
}

/// A host check can veto a valid submission.
#[tokio::test]
async fn test_host_check_rejection_returns_400() {
    let config = TestConfig {
        check: Some(reject_spam),
        ..TestConfig::default()
    };
    let ctx = TestContext::with_config(config);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let mut form = fixtures::contact_form();
    form["company"] = json!("spam");

    let response = server
        .post("/submit")
        .add_header(NONCE_HEADER, &ctx.token())
        .json(&fixtures::submit_body(form))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Submission rejected.");
    assert!(body.get("errors").is_none());
    assert_eq!(ctx.repository.saved_count(), 0);
}

/// Storage failures return a generic 500.
#[tokio::test]
async fn test_repository_failure_returns_500() {
    let ctx = TestContext::new();
    ctx.repository.set_should_fail(true);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let response = server
        .post("/submit")
        .add_header(NONCE_HEADER, &ctx.token())
        .json(&fixtures::submit_body(fixtures::contact_form()))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Form submission failed. Please try again.");
    assert_eq!(
        body["error"],
        "An error occurred while processing your submission."
    );
    assert!(!body.to_string().contains("Mock repository failure"));
    assert!(ctx.notifier.sent().is_empty());
}

/// A custom error message replaces the default failure message.
#[tokio::test]
async fn test_custom_error_message_on_failure() {
    let ctx = TestContext::new();
    ctx.notifier.set_should_fail(true);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    let payload = json!({
        "form_data": fixtures::contact_form(),
        "error_message": "Sorry, please call us instead."
    });

    let response = server
        .post("/submit")
        .add_header(NONCE_HEADER, &ctx.token())
        .json(&payload)
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Sorry, please call us instead.");
}

/// Failed submissions do not use up the throttle allowance.
#[tokio::test]
async fn test_failed_submission_is_not_counted() {
    let mut config = TestConfig::default();
    config.throttle.max_submissions = 1;
    let ctx = TestContext::with_config(config);
    let server = TestServer::new(ctx.router.clone()).expect("Failed to create test server");

    ctx.repository.set_should_fail(true);
    let response = server
        .post("/submit")
        .add_header(NONCE_HEADER, &ctx.token())
        .json(&fixtures::submit_body(fixtures::contact_form()))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let response = server
        .post("/submit")
        .add_header(NONCE_HEADER, &ctx.token())
        .json(&fixtures::submit_body(json!({ "email": "bad" })))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    ctx.repository.set_should_fail(false);
    let response = server
        .post("/submit")
        .add_header(NONCE_HEADER, &ctx.token())
        .json(&fixtures::submit_body(fixtures::contact_form()))
        .await;
    response.assert_status(StatusCode::OK);
}
