//! Typed views over raw records. All "is this key present, what type is it"
//! branching for report rows lives here.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::duration;
use super::escalation::{yes_no, SlaViolationFlags};
use super::identity::CustomerRef;
use super::localtime::format_local;
use super::stage::map_stage;
use crate::crm::schema::{account, contact, incident, visitor, visitor_survey, CR_NUMBER};
use crate::crm::Entity;
use casedesk_shared::{SlaStatus, TicketSummary, VisitorRecord};

/// Join alias for the case's account customer.
pub const ACCOUNT_ALIAS: &str = "acc";
/// Join alias for the case's contact customer.
pub const CONTACT_ALIAS: &str = "con";

fn aliased(alias: &str, attribute: &str) -> String {
    format!("{}.{}", alias, attribute)
}

fn reference_name(record: &Entity, key: &str) -> Option<String> {
    record.get_reference(key).and_then(|r| r.name)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseRow {
    pub id: Uuid,
    pub ticket_number: Option<String>,
    pub created_on: Option<DateTime<Utc>>,
    pub modified_on: Option<DateTime<Utc>>,
    pub resolve_by: Option<DateTime<Utc>>,
    pub reopened_on: Option<DateTime<Utc>>,
    pub status_code: Option<i32>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub channel: Option<String>,
    pub mineral_class: Option<String>,
    pub description: Option<String>,
    pub created_by: Option<String>,
    pub modified_by: Option<String>,
    pub owner: Option<String>,
    pub department: Option<String>,
    pub customer: Option<CustomerRef>,
    pub customer_name: Option<String>,
    pub ticket_type: Option<String>,
    pub main_classification: Option<String>,
    pub sub_classification: Option<String>,
    pub is_reopened: Option<String>,
    pub assignment_succeeded_on: Option<DateTime<Utc>>,
    pub processing_succeeded_on: Option<DateTime<Utc>>,
    pub verification_succeeded_on: Option<DateTime<Utc>>,
    pub violations: SlaViolationFlags,
    /// CR number projected by the account/contact joins, account first.
    pub joined_cr_number: Option<String>,
}

impl CaseRow {
    pub fn decode(record: &Entity) -> Self {
        let customer_ref = record.get_reference(incident::CUSTOMER);

        Self {
            id: record.id,
            ticket_number: record.get_string(incident::TICKET_NUMBER),
            created_on: record.get_datetime(incident::CREATED_ON),
            modified_on: record.get_datetime(incident::MODIFIED_ON),
            resolve_by: record.get_datetime(incident::RESOLVE_BY),
            reopened_on: record.get_datetime(incident::REOPENED_ON),
            status_code: record.get_option(incident::STATUS_CODE),
            status: record.formatted(incident::STATUS_CODE).map(str::to_string),
            priority: record.formatted(incident::PRIORITY_CODE).map(str::to_string),
            channel: record.formatted(incident::CHANNEL).map(str::to_string),
            mineral_class: record.formatted(incident::MINERAL_CLASS).map(str::to_string),
            description: record.get_string(incident::DESCRIPTION),
            created_by: reference_name(record, incident::CREATED_BY),
            modified_by: reference_name(record, incident::MODIFIED_BY),
            owner: reference_name(record, incident::OWNER),
            department: reference_name(record, incident::DEPARTMENT),
            customer: customer_ref.as_ref().and_then(CustomerRef::from_reference),
            customer_name: customer_ref.and_then(|r| r.name),
            ticket_type: reference_name(record, incident::TICKET_TYPE),
            main_classification: reference_name(record, incident::MAIN_CLASSIFICATION),
            sub_classification: reference_name(record, incident::SUB_CLASSIFICATION),
            is_reopened: reopened_label(record),
            assignment_succeeded_on: record.get_datetime(incident::ASSIGNMENT_SUCCEEDED_ON),
            processing_succeeded_on: record.get_datetime(incident::PROCESSING_SUCCEEDED_ON),
            verification_succeeded_on: record.get_datetime(incident::VERIFICATION_SUCCEEDED_ON),
            violations: SlaViolationFlags::from_entity(record),
            joined_cr_number: record
                .get_text(&aliased(ACCOUNT_ALIAS, CR_NUMBER))
                .or_else(|| record.get_text(&aliased(CONTACT_ALIAS, CR_NUMBER))),
        }
    }

    /// Customer id of the case, whatever the customer type.
    pub fn customer_id(&self) -> Option<Uuid> {
        self.customer.map(|c| c.id())
    }

    pub fn resolution_time(&self) -> Option<DateTime<Utc>> {
        duration::resolution_time(self.resolve_by, self.status_code, self.modified_on)
    }

    pub fn total_duration(&self) -> Option<String> {
        duration::ticket_duration(self.created_on, self.resolution_time())
    }

    pub fn summary(&self, cr_number: Option<String>) -> TicketSummary {
        TicketSummary {
            ticket_id: self.ticket_number.clone(),
            created_by: self.created_by.clone(),
            agent_name: self.owner.clone(),
            customer_id: self.customer_id(),
            customer_name: self.customer_name.clone(),
            customer_cr_number: cr_number,
            created_on: format_local(self.created_on),
            ticket_type: self.ticket_type.clone(),
            mineral_class: self.mineral_class.clone(),
            category: self.ticket_type.clone(),
            sub_category1: self.main_classification.clone(),
            sub_category2: self.sub_classification.clone(),
            status: self.status.clone(),
            ticket_modified_date_time: format_local(self.modified_on),
            department: self.department.clone(),
            ticket_channel: self.channel.clone(),
            description: self.description.clone(),
            modified_by: self.modified_by.clone(),
            priority: self.priority.clone(),
            current_stage: map_stage(self.status_code).to_string(),
        }
    }

    pub fn sla_status(&self) -> SlaStatus {
        let v = &self.violations;
        SlaStatus {
            escalation_level: v.classify(),
            reopened_on: format_local(self.reopened_on),
            assignment_succeeded_on: format_local(self.assignment_succeeded_on),
            processing_succeeded_on: format_local(self.processing_succeeded_on),
            solution_verification_succeeded_on: format_local(self.verification_succeeded_on),
            assignment_sla_violation_l1: yes_no(v.approval[0]),
            assignment_sla_violation_l2: yes_no(v.approval[1]),
            assignment_sla_violation_l3: yes_no(v.approval[2]),
            processing_sla_violation_l1: yes_no(v.processing[0]),
            processing_sla_violation_l2: yes_no(v.processing[1]),
            processing_sla_violation_l3: yes_no(v.processing[2]),
            processing_sla_violation_l4: yes_no(v.processing[3]),
            verification_sla_violation_l1: yes_no(v.verification[0]),
            verification_sla_violation_l2: yes_no(v.verification[1]),
            verification_sla_violation_l3: yes_no(v.verification[2]),
        }
    }

    /// Blank means "No".
    pub fn is_reopened_label(&self) -> String {
        self.is_reopened.clone().unwrap_or_else(|| "No".to_string())
    }
}

fn reopened_label(record: &Entity) -> Option<String> {
    if let Some(text) = record.get_text(incident::IS_REOPENED) {
        return Some(text);
    }
    if let Some(text) = record.formatted(incident::IS_REOPENED) {
        return Some(text.to_string()).filter(|t| !t.trim().is_empty());
    }
    record.get_bool(incident::IS_REOPENED).map(yes_no)
}

/// Visitor row with its account and contact joined in, plus the visitor's
/// most recent survey when there is one.
pub fn decode_visitor(record: &Entity, survey: Option<&Entity>) -> VisitorRecord {
    let survey_text = |attribute: &str| survey.and_then(|s| s.get_string(attribute));
    let survey_option = |attribute: &str| survey.and_then(|s| s.get_option(attribute));

    VisitorRecord {
        visitor_id: record.id,
        visitor_number: record.get_string(visitor::NUMBER),

        account_id: record.get_guid(visitor::ACCOUNT),
        account_name: record.get_string(&aliased(ACCOUNT_ALIAS, account::NAME)),
        account_email: record.get_string(&aliased(ACCOUNT_ALIAS, account::EMAIL)),
        cr_number: record.get_string(&aliased(ACCOUNT_ALIAS, CR_NUMBER)),
        account_phone: record.get_string(&aliased(ACCOUNT_ALIAS, account::REPRESENTATIVE_PHONE)),

        contact_id: record.get_guid(visitor::CONTACT),
        contact_name: record.get_string(&aliased(CONTACT_ALIAS, contact::FULL_NAME)),
        contact_email: record.get_string(&aliased(CONTACT_ALIAS, contact::EMAIL)),
        contact_mobile: record.get_string(&aliased(CONTACT_ALIAS, contact::MOBILE)),

        purpose_of_visit: record.get_string(visitor::PURPOSE),
        action_taken: record.get_string(visitor::ACTION),
        category_value: record.get_option(visitor::CATEGORY),
        category: record.formatted(visitor::CATEGORY).map(str::to_string),
        branch_value: record.get_option(visitor::BRANCH),
        branch: record.formatted(visitor::BRANCH).map(str::to_string),
        created_on: format_local(record.get_datetime(visitor::CREATED_ON)),
        modified_on: format_local(record.get_datetime(visitor::MODIFIED_ON)),

        survey_created_on: format_local(
            survey.and_then(|s| s.get_datetime(visitor_survey::CREATED_ON)),
        ),
        service_satisfaction: survey_option(visitor_survey::SERVICE),
        staff_efficiency: survey_option(visitor_survey::EFFICIENCY),
        // Multi-select: the formatted value lists the labels separated by ';'.
        visit_reason: survey
            .and_then(|s| s.formatted(visitor_survey::REASONS))
            .into_iter()
            .flat_map(|text| text.split(';'))
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(str::to_string)
            .collect(),
        visitor_comments: survey_text(visitor_survey::OPINION),
    }
}
