use axum::{
    body::Body,
    http::{header::AUTHORIZATION, Request, StatusCode},
};
use serde_json::json;

use crate::crm::schema::{case_survey, investor_survey, ki_survey};
use crate::tests::fixtures::*;
use crate::tests::helpers::*;
use crate::tests::{test_config, TestContext};

#[tokio::test]
async fn test_lookup_without_bearer_is_unauthorized() {
    let ctx = TestContext::new();

    let (status, body) = send(&ctx.app, get("/customers/by-ticket/00123", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unauthorized - Invalid bearer token");
}

#[tokio::test]
async fn test_unset_bearer_token_locks_feedback_endpoints() {
    let mut config = test_config();
    config.api_bearer_token = String::new();
    let ctx = TestContext::with_config(config);

    let (status, _) = send(
        &ctx.app,
        post_json("/customers/submit-feedback", Some("Bearer "), &json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customer_by_ticket_returns_contact() {
    let person = ContactFixture::default();
    let case = CaseFixture::new_with_customer(Some(person.reference())).numbered("00123");
    let ctx = TestContext::new().seed([person.entity(), case.entity()]);

    let (status, body) = send(
        &ctx.app,
        get("/customers/by-ticket/00123", Some(&feedback_auth())),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Customer retrieved successfully");
    assert_eq!(body["data"]["caseId"], case.id.to_string());
    assert_eq!(body["data"]["displayName"], person.full_name());
    assert_eq!(body["data"]["email"], person.email.as_str());
}

#[tokio::test]
async fn test_customer_by_ticket_rejects_non_digits() {
    let ctx = TestContext::new();

    let (status, body) = send(
        &ctx.app,
        get("/customers/by-ticket/KI-123", Some(&feedback_auth())),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Ticket number must contain digits only.");
}

#[tokio::test]
async fn test_customer_by_ticket_unknown_is_not_found() {
    let ctx = TestContext::new();

    let (status, body) = send(
        &ctx.app,
        get("/customers/by-ticket/999", Some(&feedback_auth())),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No case found for ticket number: 999");
}

#[tokio::test]
async fn test_case_feedback_is_accepted_once() {
    let person = ContactFixture::default();
    let case = CaseFixture::new_with_customer(Some(person.reference()));
    let ctx = TestContext::new().seed([person.entity(), case.entity()]);
    let payload = json!({
        "caseId": case.id.to_string(),
        "rating": 5,
        "timeAppropriate": 1,
        "comment": "Quick and helpful"
    });

    let (status, body) = send(
        &ctx.app,
        post_json("/customers/submit-feedback", Some(&feedback_auth()), &payload),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Feedback submitted successfully");
    assert!(body["data"]["feedbackId"].is_string());

    let (status, body) = send(
        &ctx.app,
        post_json("/customers/submit-feedback", Some(&feedback_auth()), &payload),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Feedback already submitted for this case.");
    assert_eq!(ctx.store.created(case_survey::ENTITY).len(), 1);
}

#[tokio::test]
async fn test_case_feedback_validation_is_bad_request() {
    let ctx = TestContext::new();

    let (status, body) = send(
        &ctx.app,
        post_json(
            "/customers/submit-feedback",
            Some(&feedback_auth()),
            &json!({"rating": 3, "timeAppropriate": 2}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Case ID is required.");
    assert!(ctx.store.created(case_survey::ENTITY).is_empty());
}

#[tokio::test]
async fn test_mistyped_feedback_body_gets_error_envelope() {
    let person = ContactFixture::default();
    let case = CaseFixture::new_with_customer(Some(person.reference()));
    let ctx = TestContext::new().seed([person.entity(), case.entity()]);

    let (status, body) = send(
        &ctx.app,
        post_json(
            "/customers/submit-feedback",
            Some(&feedback_auth()),
            &json!({"caseId": case.id.to_string(), "rating": "5"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
    assert!(body["details"]["body"].is_array());
    assert!(ctx.store.created(case_survey::ENTITY).is_empty());
}

#[tokio::test]
async fn test_feedback_without_json_content_type_gets_error_envelope() {
    let ctx = TestContext::new();
    let request = Request::builder()
        .uri("/customers/visitor-feedback")
        .method("POST")
        .header(AUTHORIZATION, feedback_auth())
        .body(Body::from("serviceSatisfaction=5"))
        .unwrap();

    let (status, body) = send(&ctx.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_ki_ticket_without_customer() {
    let case = CaseFixture::new_with_customer(None).numbered("4711");
    let ctx = TestContext::new().seed([case.entity()]);

    let (status, body) = send(
        &ctx.app,
        get("/customers/ki-ticket/4711", Some(&feedback_auth())),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Ticket found (no customer)");
    assert!(body["data"]["customerId"].is_null());
}

#[tokio::test]
async fn test_ki_feedback_alias_records_survey() {
    let acme = AccountFixture::default();
    let case = CaseFixture::new_with_customer(Some(acme.reference())).numbered("4712");
    let ctx = TestContext::new().seed([acme.entity(), case.entity()]);

    let (status, body) = send(
        &ctx.app,
        post_json(
            "/customers/submitkifeedback",
            Some(&feedback_auth()),
            &json!({
                "ticketNumber": "4712",
                "ratings": {"new_overallsatisfaction": 4},
                "timeAppropriate": 1
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "KI feedback submitted successfully");
    assert_eq!(body["data"]["ticket"], "4712");
    let created = ctx.store.created(ki_survey::ENTITY);
    assert_eq!(created.len(), 1);
    assert_eq!(
        created[0].get_reference(ki_survey::COMPANY).unwrap().id,
        acme.id
    );
}

#[tokio::test]
async fn test_visitor_lookup_prefers_contact() {
    let person = ContactFixture::default();
    let acme = AccountFixture::default();
    let ctx = TestContext::new().seed([
        person.entity(),
        acme.entity(),
        visitor_entity("V-100", Some(&person), Some(&acme)),
    ]);

    let (status, body) = send(
        &ctx.app,
        get("/customers/by-visitor-number/V-100", Some(&feedback_auth())),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Contact retrieved successfully");
    assert_eq!(body["data"]["entityType"], "Contact");
    assert_eq!(body["data"]["id"], person.id.to_string());
}

#[tokio::test]
async fn test_visitor_feedback_via_account() {
    let acme = AccountFixture::default();
    let visitor = visitor_entity("V-200", None, Some(&acme));
    let visitor_id = visitor.id;
    let ctx = TestContext::new().seed([acme.entity(), visitor]);

    let (status, body) = send(
        &ctx.app,
        post_json(
            "/customers/visitor-feedback",
            Some(&feedback_auth()),
            &json!({
                "visitorId": visitor_id.to_string(),
                "accountId": acme.id.to_string(),
                "serviceSatisfaction": 5,
                "staffEfficiency": 4,
                "reasons": [2]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Visitor feedback submitted successfully");
    assert_eq!(body["data"]["linkedVia"], "Account");
}

#[tokio::test]
async fn test_investor_lookup_and_feedback() {
    let person = ContactFixture::default();
    let communication = investor_communication_entity("REF-9", person.reference());
    let communication_id = communication.id;
    let ctx = TestContext::new().seed([person.entity(), communication]);

    let (status, body) = send(
        &ctx.app,
        get("/customers/by-reference-number/REF-9", Some(&feedback_auth())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Contact retrieved successfully");
    assert_eq!(body["data"]["recordId"], communication_id.to_string());

    let payload = json!({
        "referenceRecordId": communication_id.to_string(),
        "contactId": person.id.to_string(),
        "overallSatisfaction": 5,
        "responsiveness": 4,
        "professionalism": 5,
        "solutionProvided": 3
    });
    let (status, body) = send(
        &ctx.app,
        post_json("/customers/keyinvestors/feedback", Some(&feedback_auth()), &payload),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Feedback submitted successfully");

    let (status, _) = send(
        &ctx.app,
        post_json("/customers/keyinvestors/feedback", Some(&feedback_auth()), &payload),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(ctx.store.created(investor_survey::ENTITY).len(), 1);
}
