//! The four feedback submission flows.
//!
//! Each flow validates its input, claims the submission key, checks the
//! store for an existing record under that key, resolves any links, builds
//! the record and inserts it once.

use regex::Regex;
use std::sync::{Arc, LazyLock};
use uuid::Uuid;

use super::guard::{SubmissionGuard, SubmissionPermit};
use crate::crm::schema::{
    account, case_survey, incident, investor_communication, investor_survey, ki_survey, visitor,
    visitor_survey, CR_NUMBER, SYSTEM_USER,
};
use crate::crm::{
    AttributeValue, ColumnSet, Condition, CrmStore, Entity, EntityReference, QueryExpression,
};
use crate::error::{ApiResult, AppError};
use crate::reports::identity::CustomerRef;
use crate::validation::{guid, rating, string, ticket, yes_no};
use casedesk_shared::{
    CaseFeedbackRequest, FeedbackReceipt, KeyInvestorFeedbackRequest, KiFeedbackRequest,
    SurveyReceipt, VisitorFeedbackRequest,
};

/// Stored when the customer leaves the comment box empty.
pub const NO_COMMENT: &str = "No comments added by customer";

static RATING_ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^new_[a-z0-9_]+$").expect("rating attribute pattern compiles"));

pub struct FeedbackIntake {
    store: Arc<dyn CrmStore>,
    guard: SubmissionGuard,
}

impl FeedbackIntake {
    pub fn new(store: Arc<dyn CrmStore>, guard: SubmissionGuard) -> Self {
        Self { store, guard }
    }

    fn claim(&self, key: String, duplicate: &str) -> ApiResult<SubmissionPermit> {
        self.guard
            .claim(key)
            .ok_or_else(|| AppError::Conflict(duplicate.to_string()))
    }

    /// True when any `entity` record has `attribute` pointing at `id`.
    async fn exists(&self, entity: &str, attribute: &str, id: Uuid) -> ApiResult<bool> {
        let query = QueryExpression::new(entity)
            .columns(ColumnSet::new([attribute]))
            .filter(Condition::equal(attribute, id))
            .top(1);
        Ok(self.store.retrieve_multiple(&query).await?.first().is_some())
    }

    /// Case satisfaction feedback, one per case.
    pub async fn submit_case_feedback(
        &self,
        request: &CaseFeedbackRequest,
    ) -> ApiResult<FeedbackReceipt> {
        const DUPLICATE: &str = "Feedback already submitted for this case.";

        let raw_case = string::required(&request.case_id, "Case ID is required.")?;
        let score = rating::required(request.rating, "Rating must be between 1 and 5.")?;
        let time_appropriate = yes_no::parse(request.time_appropriate).ok_or_else(|| {
            AppError::BadRequest(
                "Please answer whether the time taken was appropriate.".to_string(),
            )
        })?;
        let case_id = guid::parse(&raw_case, "Invalid Case ID format.")?;

        let _permit = self.claim(format!("case:{}", case_id), DUPLICATE)?;
        if self.exists(case_survey::ENTITY, case_survey::CASE, case_id).await? {
            return Err(AppError::Conflict(DUPLICATE.to_string()));
        }

        let case = self
            .store
            .retrieve(incident::ENTITY, case_id, &ColumnSet::new([incident::CUSTOMER]))
            .await
            .map_err(|err| {
                if err.is_not_found() {
                    AppError::NotFound(format!("Case {} not found.", case_id))
                } else {
                    err.into()
                }
            })?;
        let customer = case
            .get_reference(incident::CUSTOMER)
            .ok_or_else(|| AppError::BadRequest("No customer linked to this case.".to_string()))?;

        let comment = string::or_placeholder(&request.comment, NO_COMMENT);
        let record = Entity::new(case_survey::ENTITY, Uuid::nil())
            .with(case_survey::RATING, AttributeValue::OptionSet(score))
            .with(case_survey::COMMENT, comment.as_str())
            .with(case_survey::SCORE_TEXT, comment)
            .with(case_survey::CASE, EntityReference::new(incident::ENTITY, case_id))
            .with(case_survey::TIME_APPROPRIATE, time_appropriate)
            .with(
                case_survey::CUSTOMER,
                EntityReference::new(customer.logical_name, customer.id),
            );

        let feedback_id = self.store.create(&record).await?;
        tracing::info!(%case_id, %feedback_id, rating = score, "Case feedback recorded");

        Ok(FeedbackReceipt {
            feedback_id,
            linked_via: None,
        })
    }

    /// Visitor satisfaction survey. A contact may answer once; account-linked
    /// surveys carry the account's representative details instead.
    pub async fn submit_visitor_feedback(
        &self,
        request: &VisitorFeedbackRequest,
    ) -> ApiResult<FeedbackReceipt> {
        const DUPLICATE: &str = "Feedback already submitted for this contact.";

        let contact_id = guid::optional(&request.contact_id, "Invalid ContactId format.")?;
        let account_id = guid::optional(&request.account_id, "Invalid AccountId format.")?;
        if contact_id.is_none()
            && account_id.is_none()
            && string::present(&request.visitor_id).is_none()
        {
            return Err(AppError::BadRequest(
                "VisitorId, ContactId or AccountId is required.".to_string(),
            ));
        }
        let raw_visitor = string::required(&request.visitor_id, "VisitorId is required.")?;
        let visitor_id = guid::parse(&raw_visitor, "Invalid VisitorId format.")?;

        let mut record = Entity::new(visitor_survey::ENTITY, Uuid::nil());
        let mut _permit = None;
        let linked_via = if let Some(contact_id) = contact_id {
            _permit = Some(self.claim(format!("visitor-contact:{}", contact_id), DUPLICATE)?);
            if self
                .exists(visitor_survey::ENTITY, visitor_survey::CONTACT, contact_id)
                .await?
            {
                return Err(AppError::Conflict(DUPLICATE.to_string()));
            }
            record.set(
                visitor_survey::CONTACT,
                EntityReference::new("contact", contact_id),
            );
            Some("Contact")
        } else if let Some(account_id) = account_id {
            let columns = ColumnSet::new([
                account::NAME,
                account::REPRESENTATIVE_PHONE,
                CR_NUMBER,
                account::EMAIL,
            ]);
            let company = self
                .store
                .retrieve(account::ENTITY, account_id, &columns)
                .await
                .map_err(|err| {
                    if err.is_not_found() {
                        AppError::NotFound(format!("Account {} not found.", account_id))
                    } else {
                        err.into()
                    }
                })?;
            if let Some(name) = company.get_string(account::NAME) {
                record.set(visitor_survey::NAME, name);
            }
            record.set(
                visitor_survey::OPINION,
                format!(
                    "Representative Phone: {}, CR Number: {}",
                    company
                        .get_string(account::REPRESENTATIVE_PHONE)
                        .unwrap_or_default(),
                    company.get_string(CR_NUMBER).unwrap_or_default()
                ),
            );
            record.set(
                visitor_survey::COMPANY,
                EntityReference::new(account::ENTITY, account_id),
            );
            Some("Account")
        } else {
            None
        };

        record.set(
            visitor_survey::VISITOR,
            EntityReference::new(visitor::ENTITY, visitor_id),
        );
        if let Some(score) = rating::optional(request.service_satisfaction) {
            record.set(visitor_survey::SERVICE, AttributeValue::OptionSet(score));
        }
        if let Some(score) = rating::optional(request.staff_efficiency) {
            record.set(visitor_survey::EFFICIENCY, AttributeValue::OptionSet(score));
        }
        if let Some(reasons) = request.reasons.as_ref().filter(|r| !r.is_empty()) {
            record.set(
                visitor_survey::REASONS,
                AttributeValue::OptionSetCollection(reasons.clone()),
            );
        }
        if let Some(other) = string::present(&request.specify_other) {
            record.set(visitor_survey::NAME, other);
        }
        if let Some(opinion) = string::present(&request.opinion) {
            record.set(visitor_survey::OPINION, opinion);
        }

        let feedback_id = self.store.create(&record).await?;
        tracing::info!(%visitor_id, %feedback_id, linked_via = ?linked_via, "Visitor feedback recorded");

        Ok(FeedbackReceipt {
            feedback_id,
            linked_via: linked_via.map(str::to_string),
        })
    }

    /// Key-investor ticket survey, one per ticket. The case comes from
    /// `caseId` when given, else from the ticket number.
    pub async fn submit_ki_feedback(&self, request: &KiFeedbackRequest) -> ApiResult<SurveyReceipt> {
        const DUPLICATE: &str = "Feedback already submitted for this ticket.";

        let normalized_ticket = match string::present(&request.ticket_number) {
            Some(raw) => Some(ticket::normalize(&raw).ok_or_else(|| {
                AppError::BadRequest("TicketNumber must contain digits only.".to_string())
            })?),
            None => None,
        };

        let mut customer_id = string::present(&request.customer_id);
        let mut customer_logical_name = string::present(&request.customer_logical_name);

        let case_id = match string::present(&request.case_id) {
            Some(raw) => guid::parse(&raw, "Invalid CaseId GUID")?,
            None => {
                let number = normalized_ticket
                    .as_deref()
                    .ok_or_else(|| AppError::BadRequest("TicketNumber is required.".to_string()))?;
                let case = self.case_by_ticket(number).await?.ok_or_else(|| {
                    AppError::NotFound(format!("Ticket Number not found: {}", number))
                })?;
                if let Some(customer) = case.get_reference(incident::CUSTOMER) {
                    customer_id.get_or_insert_with(|| customer.id.to_string());
                    customer_logical_name.get_or_insert(customer.logical_name);
                }
                case.id
            }
        };

        let _permit = self.claim(format!("ki-ticket:{}", case_id), DUPLICATE)?;
        if self.exists(ki_survey::ENTITY, ki_survey::TICKET, case_id).await? {
            return Err(AppError::Conflict(DUPLICATE.to_string()));
        }

        let comment = string::or_placeholder(&request.comment, NO_COMMENT);
        let mut record = Entity::new(ki_survey::ENTITY, Uuid::nil())
            .with(ki_survey::SURVEY_TEXT, comment.as_str())
            .with(ki_survey::SUGGESTIONS, comment);

        for (attribute, value) in request.ratings.iter().flatten() {
            let attribute = attribute.trim();
            if !RATING_ATTRIBUTE.is_match(attribute) {
                tracing::warn!(attribute, "Ignoring rating for an unrecognised attribute");
                continue;
            }
            if let Some(score) = rating::optional(*value) {
                record.set(attribute, AttributeValue::OptionSet(score));
            }
        }
        if yes_no::parse(request.time_appropriate).is_some() {
            record.set(
                ki_survey::TIME_APPROPRIATE,
                AttributeValue::OptionSet(request.time_appropriate),
            );
        }

        record.set(ki_survey::TICKET, EntityReference::new(incident::ENTITY, case_id));
        let customer = match (customer_logical_name, customer_id) {
            (Some(logical_name), Some(raw_id)) => Uuid::parse_str(&raw_id)
                .ok()
                .and_then(|id| CustomerRef::from_reference(&EntityReference::new(logical_name, id))),
            _ => None,
        };
        match customer {
            Some(CustomerRef::Account(id)) => {
                record.set(ki_survey::COMPANY, EntityReference::new(account::ENTITY, id))
            }
            Some(CustomerRef::Contact(id)) => {
                record.set(ki_survey::CONTACT, EntityReference::new("contact", id))
            }
            None => {}
        }

        let survey_id = self.store.create(&record).await?;
        tracing::info!(%case_id, %survey_id, "KI feedback recorded");

        Ok(SurveyReceipt {
            survey_id,
            ticket: normalized_ticket.or_else(|| request.ticket_number.clone()),
            case_id: Some(case_id),
            linked_via: None,
        })
    }

    /// Communication satisfaction survey for a key-investor communication.
    /// Contacts may answer once.
    pub async fn submit_key_investor_feedback(
        &self,
        request: &KeyInvestorFeedbackRequest,
    ) -> ApiResult<SurveyReceipt> {
        const DUPLICATE: &str = "Feedback already submitted for this contact.";

        let raw_reference = string::required(
            &request.reference_record_id,
            "ReferenceRecordId is required.",
        )?;
        let contact_id = guid::optional(&request.contact_id, "Invalid ContactId format.")?;
        let account_id = guid::optional(&request.account_id, "Invalid AccountId format.")?;
        let party = match (contact_id, account_id) {
            (Some(contact_id), _) => CustomerRef::Contact(contact_id),
            (None, Some(account_id)) => CustomerRef::Account(account_id),
            (None, None) => {
                return Err(AppError::BadRequest(
                    "ContactId or AccountId is required.".to_string(),
                ))
            }
        };
        let reference_id = guid::parse(&raw_reference, "Invalid ReferenceRecordId format.")?;

        let mut record = Entity::new(investor_survey::ENTITY, Uuid::nil());
        let mut _permit = None;
        let linked_via = match party {
            CustomerRef::Contact(contact_id) => {
                _permit = Some(self.claim(format!("investor-contact:{}", contact_id), DUPLICATE)?);
                if self
                    .exists(investor_survey::ENTITY, investor_survey::CONTACT, contact_id)
                    .await?
                {
                    return Err(AppError::Conflict(DUPLICATE.to_string()));
                }
                record.set(
                    investor_survey::CONTACT,
                    EntityReference::new("contact", contact_id),
                );
                "Contact"
            }
            CustomerRef::Account(account_id) => {
                record.set(
                    investor_survey::ACCOUNT,
                    EntityReference::new(account::ENTITY, account_id),
                );
                "Account"
            }
        };

        record.set(
            investor_survey::COMMUNICATION,
            EntityReference::new(investor_communication::ENTITY, reference_id),
        );
        let answers = [
            (investor_survey::OVERALL, request.overall_satisfaction),
            (investor_survey::RESPONSIVENESS, request.responsiveness),
            (investor_survey::PROFESSIONALISM, request.professionalism),
            (investor_survey::SOLUTION, request.solution_provided),
        ];
        for (attribute, value) in answers {
            if let Some(score) = rating::optional(value) {
                record.set(attribute, AttributeValue::OptionSet(score));
            }
        }
        if let Some(comments) = string::present(&request.comments) {
            record.set(investor_survey::COMMENTS, comments);
        }
        if let Some(owner) = string::present(&request.owner_id).and_then(|raw| Uuid::parse_str(&raw).ok()) {
            record.set(investor_survey::OWNER, EntityReference::new(SYSTEM_USER, owner));
        }

        let survey_id = self.store.create(&record).await?;
        tracing::info!(%reference_id, %survey_id, linked_via, "Key investor feedback recorded");

        Ok(SurveyReceipt {
            survey_id,
            ticket: None,
            case_id: None,
            linked_via: Some(linked_via.to_string()),
        })
    }

    async fn case_by_ticket(&self, number: &str) -> ApiResult<Option<Entity>> {
        let query = QueryExpression::new(incident::ENTITY)
            .columns(ColumnSet::new([incident::TICKET_NUMBER, incident::CUSTOMER]))
            .filter(Condition::equal(incident::TICKET_NUMBER, number))
            .top(1);
        Ok(self.store.retrieve_multiple(&query).await?.into_first())
    }
}
