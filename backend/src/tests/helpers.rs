use axum::{
    body::Body,
    http::{header::AUTHORIZATION, header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use chrono::Duration;
use serde_json::Value;
use tower::ServiceExt;

use super::{TEST_BEARER_TOKEN, TEST_JWT_SECRET};
use crate::auth::jwt::create_jwt;
use crate::crm::CrmCredentials;

pub fn test_credentials() -> CrmCredentials {
    CrmCredentials {
        username: "reports@casedesk.test".to_string(),
        password: "crm-password".to_string(),
    }
}

pub fn create_test_jwt(ttl: Duration) -> String {
    create_jwt(TEST_JWT_SECRET, &test_credentials(), ttl).expect("Failed to create test JWT")
}

pub fn report_auth() -> String {
    format!("Bearer {}", create_test_jwt(Duration::hours(1)))
}

pub fn feedback_auth() -> String {
    format!("Bearer {}", TEST_BEARER_TOKEN)
}

pub fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method("GET");
    if let Some(value) = authorization {
        builder = builder.header(AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, authorization: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .method("POST")
        .header(CONTENT_TYPE, "application/json");
    if let Some(value) = authorization {
        builder = builder.header(AUTHORIZATION, value);
    }
    builder
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap()
}

/// Runs one request through the router and decodes the JSON body.
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
