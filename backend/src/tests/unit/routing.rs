use axum::http::StatusCode;
use serde_json::json;

use crate::tests::helpers::*;
use crate::tests::TestContext;

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new();

    let (status, body) = send(&ctx.app, get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy", "service": "casedesk-api"}));
}

#[tokio::test]
async fn test_report_token_is_not_a_feedback_token() {
    let ctx = TestContext::new();

    let (status, _) = send(
        &ctx.app,
        get("/customers/ki-ticket/1", Some(&report_auth())),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_feedback_token_is_not_a_report_token() {
    let ctx = TestContext::new();

    let (status, body) = send(&ctx.app, get("/visitors", Some(&feedback_auth()))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_malformed_authorization_header() {
    let ctx = TestContext::new();

    let (status, body) = send(
        &ctx.app,
        get("/customers/accounts", Some("Basic dXNlcjpwYXNz")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing or invalid authorization header");
}

#[tokio::test]
async fn test_submission_routes_reject_get() {
    let ctx = TestContext::new();

    let (status, _) = send(
        &ctx.app,
        get("/customers/submit-feedback", Some(&feedback_auth())),
    )
    .await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
