//! Lookups the survey pages run before showing a form: who the ticket,
//! visitor or investor communication belongs to.

use crate::crm::schema::{
    account, case_survey, contact, incident, investor_communication, visitor, CR_NUMBER,
};
use crate::crm::{ColumnSet, Condition, CrmStore, Entity, EntityReference, QueryExpression};
use crate::error::{ApiResult, AppError};
use crate::reports::identity::CustomerRef;
use crate::reports::localtime::format_local;
use crate::validation::{string, ticket};
use casedesk_shared::{InvestorCustomer, KiTicket, PartyIdentity, TicketCustomer, VisitorCustomer};

async fn first_match(
    store: &dyn CrmStore,
    entity: &str,
    columns: &[&str],
    attribute: &str,
    value: &str,
) -> ApiResult<Option<Entity>> {
    let query = QueryExpression::new(entity)
        .columns(ColumnSet::new(columns.iter().copied()))
        .filter(Condition::equal(attribute, value))
        .top(1);
    Ok(store.retrieve_multiple(&query).await?.into_first())
}

fn normalized_ticket(raw: &str, label: &str) -> ApiResult<String> {
    if raw.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} is required.", label)));
    }
    ticket::normalize(raw)
        .ok_or_else(|| AppError::BadRequest(format!("{} must contain digits only.", label)))
}

fn full_name(first: Option<String>, last: Option<String>) -> Option<String> {
    let joined = format!(
        "{} {}",
        first.unwrap_or_default(),
        last.unwrap_or_default()
    );
    Some(joined.trim().to_string()).filter(|name| !name.is_empty())
}

/// Customer of a case, for the case satisfaction page. Rejects cases that
/// already have feedback.
pub async fn customer_by_ticket(store: &dyn CrmStore, raw: &str) -> ApiResult<TicketCustomer> {
    let number = normalized_ticket(raw, "Ticket number")?;
    let case = first_match(
        store,
        incident::ENTITY,
        &[incident::TICKET_NUMBER, incident::CUSTOMER],
        incident::TICKET_NUMBER,
        &number,
    )
    .await?
    .ok_or_else(|| AppError::NotFound(format!("No case found for ticket number: {}", number)))?;

    let reference = case.get_reference(incident::CUSTOMER).ok_or_else(|| {
        AppError::BadRequest("Customer is not linked with the specified case.".to_string())
    })?;
    let customer = CustomerRef::from_reference(&reference).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Unsupported customer type: {}",
            reference.logical_name
        ))
    })?;

    let (columns, label): (&[&str], &str) = match customer {
        CustomerRef::Contact(_) => (&[contact::FIRST_NAME, contact::LAST_NAME, contact::EMAIL], "Contact"),
        CustomerRef::Account(_) => (&[account::NAME, account::EMAIL], "Account"),
    };
    let record = store
        .retrieve(
            customer.kind().logical_name(),
            customer.id(),
            &ColumnSet::new(columns.iter().copied()),
        )
        .await
        .map_err(|err| {
            if err.is_not_found() {
                AppError::NotFound(format!("Customer record ({}) does not exist.", label))
            } else {
                err.into()
            }
        })?;

    let already_submitted = store
        .retrieve_multiple(
            &QueryExpression::new(case_survey::ENTITY)
                .columns(ColumnSet::new([case_survey::CASE]))
                .filter(Condition::equal(case_survey::CASE, case.id))
                .top(1),
        )
        .await?
        .first()
        .is_some();
    if already_submitted {
        return Err(AppError::Conflict(
            "Feedback already submitted for this case.".to_string(),
        ));
    }

    let email = record.get_string(contact::EMAIL);
    let found = match customer {
        CustomerRef::Contact(_) => {
            let first_name = record.get_string(contact::FIRST_NAME);
            let last_name = record.get_string(contact::LAST_NAME);
            TicketCustomer {
                case_id: case.id,
                ticket_number: number,
                customer_id: record.id,
                display_name: full_name(first_name.clone(), last_name.clone()),
                first_name,
                last_name,
                full_name: None,
                email,
            }
        }
        CustomerRef::Account(_) => {
            let name = record.get_string(account::NAME);
            TicketCustomer {
                case_id: case.id,
                ticket_number: number,
                customer_id: record.id,
                first_name: None,
                last_name: None,
                full_name: name.clone(),
                display_name: name,
                email,
            }
        }
    };
    Ok(found)
}

/// Case and customer behind a key-investor ticket number.
pub async fn ki_ticket(store: &dyn CrmStore, raw: &str) -> ApiResult<KiTicket> {
    let number = normalized_ticket(raw, "TicketNumber")?;
    let case = first_match(
        store,
        incident::ENTITY,
        &[incident::ID, incident::TICKET_NUMBER, incident::CUSTOMER],
        incident::TICKET_NUMBER,
        &number,
    )
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Ticket Number not found: {}", number)))?;

    let mut found = KiTicket {
        case_id: case.id,
        ticket_number: case.get_string(incident::TICKET_NUMBER),
        customer_id: None,
        customer_logical_name: None,
        customer_name: None,
    };
    let Some(reference) = case.get_reference(incident::CUSTOMER) else {
        return Ok(found);
    };

    found.customer_name = match CustomerRef::from_reference(&reference) {
        Some(CustomerRef::Account(id)) => store
            .retrieve(account::ENTITY, id, &ColumnSet::new([account::NAME]))
            .await?
            .get_string(account::NAME),
        Some(CustomerRef::Contact(id)) => {
            let record = store
                .retrieve(
                    contact::ENTITY,
                    id,
                    &ColumnSet::new([contact::FULL_NAME, contact::FIRST_NAME, contact::LAST_NAME]),
                )
                .await?;
            record.get_text(contact::FULL_NAME).or_else(|| {
                full_name(
                    record.get_string(contact::FIRST_NAME),
                    record.get_string(contact::LAST_NAME),
                )
            })
        }
        None => None,
    };
    found.customer_id = Some(reference.id);
    found.customer_logical_name = Some(reference.logical_name);
    Ok(found)
}

fn contact_party(record: &Entity) -> PartyIdentity {
    PartyIdentity {
        entity_type: "Contact".to_string(),
        id: record.id,
        name: record.get_string(contact::FULL_NAME),
        first_name: record.get_string(contact::FIRST_NAME),
        last_name: record.get_string(contact::LAST_NAME),
        email: record.get_string(contact::EMAIL),
        phone: record.get_string(contact::MOBILE),
        cr_number: None,
        status: record.formatted(contact::STATUS_CODE).map(str::to_string),
        created_on: format_local(record.get_datetime(contact::CREATED_ON)),
    }
}

fn account_party(record: &Entity, phone_attribute: &str) -> PartyIdentity {
    PartyIdentity {
        entity_type: "Account".to_string(),
        id: record.id,
        name: record.get_string(account::NAME),
        first_name: None,
        last_name: None,
        email: record.get_string(account::EMAIL),
        phone: record.get_string(phone_attribute),
        cr_number: record.get_string(CR_NUMBER),
        status: record.formatted(account::STATUS_CODE).map(str::to_string),
        created_on: format_local(record.get_datetime(account::CREATED_ON)),
    }
}

async fn load_party(
    store: &dyn CrmStore,
    party: CustomerRef,
    account_phone: &str,
) -> ApiResult<PartyIdentity> {
    match party {
        CustomerRef::Contact(id) => {
            let columns = ColumnSet::new([
                contact::ID,
                contact::FULL_NAME,
                contact::FIRST_NAME,
                contact::LAST_NAME,
                contact::EMAIL,
                contact::MOBILE,
                contact::STATUS_CODE,
                contact::CREATED_ON,
            ]);
            Ok(contact_party(&store.retrieve(contact::ENTITY, id, &columns).await?))
        }
        CustomerRef::Account(id) => {
            let columns = ColumnSet::new([
                account::ID,
                account::NAME,
                account::EMAIL,
                account_phone,
                CR_NUMBER,
                account::STATUS_CODE,
                account::CREATED_ON,
            ]);
            Ok(account_party(
                &store.retrieve(account::ENTITY, id, &columns).await?,
                account_phone,
            ))
        }
    }
}

/// Contact (preferred) or account a visitor registered under.
pub async fn customer_by_visitor_number(
    store: &dyn CrmStore,
    raw: &str,
) -> ApiResult<VisitorCustomer> {
    let number = string::required(&Some(raw.to_string()), "Visitor number is required.")?;
    let found = first_match(
        store,
        visitor::ENTITY,
        &[visitor::ID, visitor::NUMBER, visitor::CONTACT, visitor::ACCOUNT],
        visitor::NUMBER,
        &number,
    )
    .await?
    .ok_or_else(|| AppError::NotFound(format!("No visitor found with number: {}", number)))?;

    let party = found
        .get_reference(visitor::CONTACT)
        .map(|r| CustomerRef::Contact(r.id))
        .or_else(|| {
            found
                .get_reference(visitor::ACCOUNT)
                .map(|r| CustomerRef::Account(r.id))
        })
        .ok_or_else(|| {
            AppError::NotFound("Visitor has no associated Contact or Account.".to_string())
        })?;

    Ok(VisitorCustomer {
        visitor_number: number,
        visitor_id: found.id,
        party: load_party(store, party, account::REPRESENTATIVE_PHONE).await?,
    })
}

/// Investor linked to a key-investor communication.
pub async fn investor_by_reference(
    store: &dyn CrmStore,
    raw: &str,
) -> ApiResult<InvestorCustomer> {
    let reference = string::required(&Some(raw.to_string()), "Reference number is required.")?;
    let communication = first_match(
        store,
        investor_communication::ENTITY,
        &[
            investor_communication::REFERENCE_NUMBER,
            investor_communication::INVESTOR,
        ],
        investor_communication::REFERENCE_NUMBER,
        &reference,
    )
    .await?
    .ok_or_else(|| {
        AppError::NotFound(format!(
            "No Key Investors Communication found with reference number: {}",
            reference
        ))
    })?;

    let investor: EntityReference = communication
        .get_reference(investor_communication::INVESTOR)
        .ok_or_else(|| AppError::NotFound("Record has no linked investor.".to_string()))?;
    let party = CustomerRef::from_reference(&investor).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Unsupported investor lookup type: {}",
            investor.logical_name
        ))
    })?;

    Ok(InvestorCustomer {
        record_id: communication.id,
        reference_number: reference,
        party: load_party(store, party, account::TELEPHONE).await?,
    })
}

/// Message shown with a successful party lookup.
pub fn retrieved_message(party: &PartyIdentity) -> String {
    format!("{} retrieved successfully", party.entity_type)
}
