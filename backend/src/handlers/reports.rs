//! Report endpoints. Each request runs against the CRM as the caller.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::auth::CrmUser;
use crate::error::ApiResult;
use crate::pagination::{PageParams, ReportParams};
use crate::reports::CustomerKind;
use crate::AppState;
use casedesk_shared::{
    CaseReportRecord, CaseReportResponse, CompanyReportResponse, LightCaseReportRecord,
    VisitorReportResponse,
};

pub fn report_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/cases/report", get(case_report))
        .route("/api/taadeen/cases/report", get(light_case_report))
        .route("/customers/accounts", get(account_report))
        .route("/customers/contacts", get(contact_report))
        .route("/visitors", get(visitor_report))
}

async fn case_report(
    State(state): State<Arc<AppState>>,
    CrmUser(credentials): CrmUser,
    query: Result<Query<ReportParams>, QueryRejection>,
) -> ApiResult<Json<CaseReportResponse<CaseReportRecord>>> {
    let Query(params) = query?;
    let report = state.assembler(&credentials).case_report(&params).await?;
    Ok(Json(report))
}

async fn light_case_report(
    State(state): State<Arc<AppState>>,
    CrmUser(credentials): CrmUser,
    query: Result<Query<ReportParams>, QueryRejection>,
) -> ApiResult<Json<CaseReportResponse<LightCaseReportRecord>>> {
    let Query(params) = query?;
    let report = state
        .assembler(&credentials)
        .light_case_report(&params)
        .await?;
    Ok(Json(report))
}

async fn account_report(
    State(state): State<Arc<AppState>>,
    CrmUser(credentials): CrmUser,
    query: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Json<CompanyReportResponse>> {
    let Query(params) = query?;
    let report = state
        .assembler(&credentials)
        .company_report(CustomerKind::Account, &params)
        .await?;
    Ok(Json(report))
}

async fn contact_report(
    State(state): State<Arc<AppState>>,
    CrmUser(credentials): CrmUser,
    query: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<Json<CompanyReportResponse>> {
    let Query(params) = query?;
    let report = state
        .assembler(&credentials)
        .company_report(CustomerKind::Contact, &params)
        .await?;
    Ok(Json(report))
}

async fn visitor_report(
    State(state): State<Arc<AppState>>,
    CrmUser(credentials): CrmUser,
    query: Result<Query<ReportParams>, QueryRejection>,
) -> ApiResult<Json<VisitorReportResponse>> {
    let Query(params) = query?;
    let report = state.assembler(&credentials).visitor_report(&params).await?;
    Ok(Json(report))
}
