use axum::http::StatusCode;
use chrono::Duration;

use crate::tests::fixtures::*;
use crate::tests::helpers::*;
use crate::tests::TestContext;

#[tokio::test]
async fn test_case_report_requires_token() {
    let ctx = TestContext::new();

    let (status, body) = send(&ctx.app, get("/api/cases/report", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_case_report_rejects_expired_token() {
    let ctx = TestContext::new();
    let expired = format!("Bearer {}", create_test_jwt(Duration::hours(-2)));

    let (status, body) = send(&ctx.app, get("/api/cases/report", Some(&expired))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication token has expired");
}

#[tokio::test]
async fn test_case_report_returns_enriched_rows() {
    let acme = AccountFixture::default();
    let person = ContactFixture::default();
    let older = CaseFixture::new_with_customer(Some(acme.reference()));
    let mut newer = CaseFixture::new_with_customer(Some(person.reference()));
    newer.modified_on = older.modified_on + Duration::minutes(1);
    let ctx = TestContext::new().seed([
        acme.entity(),
        person.entity(),
        older.entity(),
        newer.entity(),
    ]);

    let (status, body) = send(
        &ctx.app,
        get("/api/cases/report?filter=all", Some(&report_auth())),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["totalTickets"], 2);
    assert_eq!(body["filteredTotalTickets"], 2);
    assert_eq!(body["totalPages"], 1);
    let records = body["records"].as_array().unwrap();
    assert_eq!(records[0]["ticketId"], newer.ticket_number.as_str());
    assert_eq!(records[1]["ticketId"], older.ticket_number.as_str());
    assert_eq!(records[1]["customerCrNumber"], acme.cr_number.as_str());
    assert_eq!(records[1]["currentStage"], "Processing- Department");
}

#[tokio::test]
async fn test_case_report_store_failure_is_upstream_error() {
    let ctx = TestContext::new();
    ctx.store.fail_entity("incident", "service unavailable");

    let (status, body) = send(&ctx.app, get("/api/cases/report", Some(&report_auth()))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_non_numeric_page_gets_error_envelope() {
    let ctx = TestContext::new();

    let (status, body) = send(
        &ctx.app,
        get("/api/cases/report?page=abc", Some(&report_auth())),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["details"]["query"].is_array());
}

#[tokio::test]
async fn test_visitor_report_totals_count_visitors() {
    let person = ContactFixture::default();
    let busy = visitor_entity("V-10", Some(&person), None);
    let quiet = visitor_entity("V-11", Some(&person), None);
    let surveys: Vec<_> = (0..3)
        .map(|n| visitor_survey_entity(busy.id, &format!("visit {n}")))
        .chain([visitor_survey_entity(quiet.id, "only visit")])
        .collect();
    let ctx = TestContext::new()
        .seed([person.entity(), busy, quiet])
        .seed(surveys);

    let (status, body) = send(
        &ctx.app,
        get("/visitors?pageSize=1", Some(&report_auth())),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalRecords"], 2);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["records"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_light_report_caps_page_size() {
    let cases: Vec<_> = (0..3)
        .map(|_| CaseFixture::new_with_customer(None).entity())
        .collect();
    let ctx = TestContext::new().seed(cases);

    let (status, body) = send(
        &ctx.app,
        get("/api/taadeen/cases/report?pageSize=500", Some(&report_auth())),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pageSize"], 100);
    assert_eq!(body["count"], 3);
    assert!(body["records"][0]["resolutionDateTime"].is_null());
}

#[tokio::test]
async fn test_account_report_groups_tickets_by_customer() {
    let acme = AccountFixture::default();
    let first = CaseFixture::new_with_customer(Some(acme.reference()));
    let second = CaseFixture::new_with_customer(Some(acme.reference()));
    let unlinked = CaseFixture::new_with_customer(None);
    let ctx = TestContext::new().seed([
        acme.entity(),
        first.entity(),
        second.entity(),
        unlinked.entity(),
    ]);

    let (status, body) = send(&ctx.app, get("/customers/accounts", Some(&report_auth()))).await;

    assert_eq!(status, StatusCode::OK);
    let groups = body["records"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["customer"]["type"], "Account");
    assert_eq!(groups[0]["customer"]["crNumber"], acme.cr_number.as_str());
    assert_eq!(groups[0]["tickets"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_contact_report_skips_account_cases() {
    let acme = AccountFixture::default();
    let person = ContactFixture::default();
    let ctx = TestContext::new().seed([
        acme.entity(),
        person.entity(),
        CaseFixture::new_with_customer(Some(acme.reference())).entity(),
        CaseFixture::new_with_customer(Some(person.reference())).entity(),
    ]);

    let (status, body) = send(&ctx.app, get("/customers/contacts", Some(&report_auth()))).await;

    assert_eq!(status, StatusCode::OK);
    let groups = body["records"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["customer"]["type"], "Contact");
    assert_eq!(groups[0]["customer"]["id"], person.id.to_string());
}

#[tokio::test]
async fn test_visitor_report_lists_visitors() {
    let person = ContactFixture::default();
    let acme = AccountFixture::default();
    let ctx = TestContext::new().seed([
        person.entity(),
        acme.entity(),
        visitor_entity("V-1", Some(&person), None),
        visitor_entity("V-2", None, Some(&acme)),
    ]);

    let (status, body) = send(&ctx.app, get("/visitors?filter=all", Some(&report_auth()))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalRecords"], 2);
    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    let by_account = records
        .iter()
        .find(|r| r["visitorNumber"] == "V-2")
        .unwrap();
    assert_eq!(by_account["crNumber"], acme.cr_number.as_str());
    assert_eq!(by_account["accountPhone"], acme.representative_phone.as_str());
}
