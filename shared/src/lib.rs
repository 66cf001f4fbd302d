use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ==================== Envelope ====================

/// Success envelope of the intake endpoints. Failures render the backend's
/// error envelope, which shares `success` and `message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

// ==================== Case reports ====================

/// Paged case report payload. `records` is either the full or the lightweight
/// row shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseReportResponse<R> {
    pub filter: String,
    pub page: i64,
    pub page_size: i64,
    pub count: i64,
    pub total_tickets: i64,
    pub filtered_total_tickets: i64,
    pub total_pages: i64,
    pub records: Vec<R>,
}

/// Fields every ticket projection carries.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TicketSummary {
    pub ticket_id: Option<String>,
    pub created_by: Option<String>,
    pub agent_name: Option<String>,
    pub customer_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub customer_cr_number: Option<String>,
    pub created_on: Option<String>,
    pub ticket_type: Option<String>,
    pub mineral_class: Option<String>,
    pub category: Option<String>,
    pub sub_category1: Option<String>,
    pub sub_category2: Option<String>,
    pub status: Option<String>,
    pub ticket_modified_date_time: Option<String>,
    pub department: Option<String>,
    pub ticket_channel: Option<String>,
    pub description: Option<String>,
    pub modified_by: Option<String>,
    pub priority: Option<String>,
    pub current_stage: String,
}

/// Escalation label, milestone timestamps and the per-level violation answers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlaStatus {
    pub escalation_level: String,
    pub reopened_on: Option<String>,
    pub assignment_succeeded_on: Option<String>,
    pub processing_succeeded_on: Option<String>,
    pub solution_verification_succeeded_on: Option<String>,
    pub assignment_sla_violation_l1: String,
    pub assignment_sla_violation_l2: String,
    pub assignment_sla_violation_l3: String,
    pub processing_sla_violation_l1: String,
    pub processing_sla_violation_l2: String,
    pub processing_sla_violation_l3: String,
    pub processing_sla_violation_l4: String,
    pub verification_sla_violation_l1: String,
    pub verification_sla_violation_l2: String,
    pub verification_sla_violation_l3: String,
}

/// Customer satisfaction answers linked to a case. All fields are null when
/// no survey exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SatisfactionSummary {
    pub survey_created_on: Option<String>,
    pub satisfaction_score: Option<i32>,
    pub satisfaction_comment: Option<String>,
    pub time_taken_appropriate: Option<String>,
    pub improvement_comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SlaKpiTimestamps {
    pub failure_time: Option<String>,
    pub succeeded_on: Option<String>,
}

/// Fully denormalised case report row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseReportRecord {
    #[serde(flatten)]
    pub ticket: TicketSummary,
    pub total_ticket_duration: Option<String>,
    pub resolution_date_time: Option<String>,
    pub is_reopened: String,
    #[serde(flatten)]
    pub satisfaction: SatisfactionSummary,
    #[serde(flatten)]
    pub sla: SlaStatus,
    pub sla_kpis: BTreeMap<String, SlaKpiTimestamps>,
}

/// Join-only case report row; no per-row sub-queries are issued for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightCaseReportRecord {
    #[serde(flatten)]
    pub ticket: TicketSummary,
    pub resolution_date_time: Option<String>,
}

// ==================== Company reports ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyTicketRecord {
    #[serde(flatten)]
    pub ticket: TicketSummary,
    #[serde(flatten)]
    pub sla: SlaStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub customer_type: String,
    pub name: Option<String>,
    pub cr_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerGroup {
    pub customer: CustomerSummary,
    pub tickets: Vec<CompanyTicketRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyReportResponse {
    pub page: i64,
    pub page_size: i64,
    pub records: Vec<CustomerGroup>,
}

// ==================== Visitors ====================

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisitorRecord {
    pub visitor_id: Uuid,
    pub visitor_number: Option<String>,

    pub account_id: Option<Uuid>,
    pub account_name: Option<String>,
    pub account_email: Option<String>,
    pub cr_number: Option<String>,
    pub account_phone: Option<String>,

    pub contact_id: Option<Uuid>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_mobile: Option<String>,

    pub purpose_of_visit: Option<String>,
    pub action_taken: Option<String>,
    pub category_value: Option<i32>,
    pub category: Option<String>,
    pub branch_value: Option<i32>,
    pub branch: Option<String>,
    pub created_on: Option<String>,
    pub modified_on: Option<String>,

    pub survey_created_on: Option<String>,
    pub service_satisfaction: Option<i32>,
    pub staff_efficiency: Option<i32>,
    pub visit_reason: Vec<String>,
    pub visitor_comments: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorReportResponse {
    pub filter: String,
    pub page: i64,
    pub page_size: i64,
    pub total_records: i64,
    pub total_pages: i64,
    pub records: Vec<VisitorRecord>,
}

// ==================== Feedback submissions ====================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaseFeedbackRequest {
    pub case_id: Option<String>,
    pub rating: i32,
    /// 1 = yes, 2 = no
    pub time_appropriate: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisitorFeedbackRequest {
    pub visitor_id: Option<String>,
    pub ticket_id: Option<String>,
    pub contact_id: Option<String>,
    pub account_id: Option<String>,
    pub service_satisfaction: i32,
    pub staff_efficiency: i32,
    pub reasons: Option<Vec<i32>>,
    pub specify_other: Option<String>,
    pub opinion: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KiFeedbackRequest {
    pub case_id: Option<String>,
    pub ticket_number: Option<String>,
    pub customer_id: Option<String>,
    /// "contact" or "account"
    pub customer_logical_name: Option<String>,
    /// Rating attribute name -> 1..5
    pub ratings: Option<BTreeMap<String, i32>>,
    pub time_appropriate: i32,
    pub comment: Option<String>,
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyInvestorFeedbackRequest {
    pub reference_record_id: Option<String>,
    pub contact_id: Option<String>,
    pub account_id: Option<String>,
    pub overall_satisfaction: i32,
    pub responsiveness: i32,
    pub professionalism: i32,
    pub solution_provided: i32,
    pub comments: Option<String>,
    pub owner_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackReceipt {
    pub feedback_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_via: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyReceipt {
    pub survey_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_via: Option<String>,
}

// ==================== Intake lookups ====================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TicketCustomer {
    pub case_id: Uuid,
    pub ticket_number: String,
    pub customer_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KiTicket {
    pub case_id: Uuid,
    pub ticket_number: Option<String>,
    pub customer_id: Option<Uuid>,
    pub customer_logical_name: Option<String>,
    pub customer_name: Option<String>,
}

/// Contact or account behind a visitor or an investor communication.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartyIdentity {
    /// "Contact" or "Account"
    pub entity_type: String,
    pub id: Uuid,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cr_number: Option<String>,
    pub status: Option<String>,
    pub created_on: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisitorCustomer {
    pub visitor_number: String,
    pub visitor_id: Uuid,
    #[serde(flatten)]
    pub party: PartyIdentity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvestorCustomer {
    pub record_id: Uuid,
    pub reference_number: String,
    #[serde(flatten)]
    pub party: PartyIdentity,
}
