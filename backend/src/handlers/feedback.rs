//! Survey lookups and feedback submissions. All bearer-gated and answered
//! in the `{success, message, data}` envelope.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::auth::FeedbackToken;
use crate::error::ApiResult;
use crate::feedback::lookup;
use crate::AppState;
use casedesk_shared::{
    ApiResponse, CaseFeedbackRequest, FeedbackReceipt, InvestorCustomer, KeyInvestorFeedbackRequest,
    KiFeedbackRequest, KiTicket, SurveyReceipt, TicketCustomer, VisitorCustomer,
    VisitorFeedbackRequest,
};

/// Mounted under `/customers`.
pub fn customer_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/by-ticket/:ticket_number", get(customer_by_ticket))
        .route("/ki-ticket/:ticket_number", get(ki_ticket))
        .route("/by-visitor-number/:visitor_number", get(customer_by_visitor_number))
        .route("/by-reference-number/:reference_number", get(investor_by_reference))
        .route("/submit-feedback", post(submit_case_feedback))
        .route("/visitor-feedback", post(submit_visitor_feedback))
        .route("/submit-ki-feedback", post(submit_ki_feedback))
        .route("/submitkifeedback", post(submit_ki_feedback))
        .route("/keyinvestors/feedback", post(submit_key_investor_feedback))
}

async fn customer_by_ticket(
    State(state): State<Arc<AppState>>,
    _token: FeedbackToken,
    Path(ticket_number): Path<String>,
) -> ApiResult<Json<ApiResponse<TicketCustomer>>> {
    let store = state.stores.service();
    let customer = lookup::customer_by_ticket(store.as_ref(), &ticket_number).await?;
    Ok(Json(ApiResponse::success(customer, "Customer retrieved successfully")))
}

async fn ki_ticket(
    State(state): State<Arc<AppState>>,
    _token: FeedbackToken,
    Path(ticket_number): Path<String>,
) -> ApiResult<Json<ApiResponse<KiTicket>>> {
    let store = state.stores.service();
    let ticket = lookup::ki_ticket(store.as_ref(), &ticket_number).await?;
    let message = if ticket.customer_id.is_some() {
        "Ticket found"
    } else {
        "Ticket found (no customer)"
    };
    Ok(Json(ApiResponse::success(ticket, message)))
}

async fn customer_by_visitor_number(
    State(state): State<Arc<AppState>>,
    _token: FeedbackToken,
    Path(visitor_number): Path<String>,
) -> ApiResult<Json<ApiResponse<VisitorCustomer>>> {
    let store = state.stores.service();
    let customer = lookup::customer_by_visitor_number(store.as_ref(), &visitor_number).await?;
    let message = lookup::retrieved_message(&customer.party);
    Ok(Json(ApiResponse::success(customer, message)))
}

async fn investor_by_reference(
    State(state): State<Arc<AppState>>,
    _token: FeedbackToken,
    Path(reference_number): Path<String>,
) -> ApiResult<Json<ApiResponse<InvestorCustomer>>> {
    let store = state.stores.service();
    let investor = lookup::investor_by_reference(store.as_ref(), &reference_number).await?;
    let message = lookup::retrieved_message(&investor.party);
    Ok(Json(ApiResponse::success(investor, message)))
}

async fn submit_case_feedback(
    State(state): State<Arc<AppState>>,
    _token: FeedbackToken,
    body: Result<Json<CaseFeedbackRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<FeedbackReceipt>>> {
    let Json(request) = body?;
    let receipt = state.intake().submit_case_feedback(&request).await?;
    Ok(Json(ApiResponse::success(receipt, "Feedback submitted successfully")))
}

async fn submit_visitor_feedback(
    State(state): State<Arc<AppState>>,
    _token: FeedbackToken,
    body: Result<Json<VisitorFeedbackRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<FeedbackReceipt>>> {
    let Json(request) = body?;
    let receipt = state.intake().submit_visitor_feedback(&request).await?;
    Ok(Json(ApiResponse::success(
        receipt,
        "Visitor feedback submitted successfully",
    )))
}

async fn submit_ki_feedback(
    State(state): State<Arc<AppState>>,
    _token: FeedbackToken,
    body: Result<Json<KiFeedbackRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<SurveyReceipt>>> {
    let Json(request) = body?;
    let receipt = state.intake().submit_ki_feedback(&request).await?;
    Ok(Json(ApiResponse::success(receipt, "KI feedback submitted successfully")))
}

async fn submit_key_investor_feedback(
    State(state): State<Arc<AppState>>,
    _token: FeedbackToken,
    body: Result<Json<KeyInvestorFeedbackRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<SurveyReceipt>>> {
    let Json(request) = body?;
    let receipt = state.intake().submit_key_investor_feedback(&request).await?;
    Ok(Json(ApiResponse::success(receipt, "Feedback submitted successfully")))
}
