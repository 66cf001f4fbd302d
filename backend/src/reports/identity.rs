//! Customer identity: the polymorphic customer reference, CR-number
//! resolution and batched contact details.

use std::collections::HashMap;
use uuid::Uuid;

use super::enrichment::Enrichment;
use crate::crm::schema::{account, contact, CR_NUMBER};
use crate::crm::{ColumnSet, Condition, CrmStore, EntityReference, QueryExpression};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerKind {
    Account,
    Contact,
}

impl CustomerKind {
    pub fn logical_name(&self) -> &'static str {
        match self {
            Self::Account => account::ENTITY,
            Self::Contact => contact::ENTITY,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Account => "Account",
            Self::Contact => "Contact",
        }
    }

    pub fn primary_id(&self) -> &'static str {
        match self {
            Self::Account => account::ID,
            Self::Contact => contact::ID,
        }
    }
}

/// Customer lookup on a case or visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerRef {
    Account(Uuid),
    Contact(Uuid),
}

impl CustomerRef {
    /// `None` for references to anything but an account or a contact.
    pub fn from_reference(reference: &EntityReference) -> Option<Self> {
        match reference.logical_name.to_ascii_lowercase().as_str() {
            account::ENTITY => Some(Self::Account(reference.id)),
            contact::ENTITY => Some(Self::Contact(reference.id)),
            _ => None,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::Account(id) | Self::Contact(id) => *id,
        }
    }

    pub fn kind(&self) -> CustomerKind {
        match self {
            Self::Account(_) => CustomerKind::Account,
            Self::Contact(_) => CustomerKind::Contact,
        }
    }
}

/// CR number of a customer. Accounts carry it directly; a contact's own value
/// wins, else the value of the account its company lookup points at. A failed
/// read of the contact's own value counts as no value and the parent hop
/// still runs.
pub async fn resolve_cr_number(store: &dyn CrmStore, customer: CustomerRef) -> Enrichment<String> {
    match customer {
        CustomerRef::Account(id) => account_cr_number(store, id).await,
        CustomerRef::Contact(id) => {
            match store
                .retrieve(contact::ENTITY, id, &ColumnSet::new([CR_NUMBER]))
                .await
            {
                Ok(record) => {
                    if let Some(cr) = record.get_text(CR_NUMBER) {
                        return Enrichment::Found(cr);
                    }
                }
                Err(err) if err.is_not_found() => return Enrichment::Missing,
                Err(err) => {
                    tracing::debug!(contact_id = %id, error = %err, "Contact CR number unreadable, trying parent account");
                }
            }

            let parent = match store
                .retrieve(contact::ENTITY, id, &ColumnSet::new([contact::COMPANY]))
                .await
            {
                Ok(record) => record
                    .get_reference(contact::COMPANY)
                    .and_then(|r| CustomerRef::from_reference(&r)),
                Err(err) => return Enrichment::from_error(err),
            };
            match parent {
                Some(CustomerRef::Account(parent_id)) => account_cr_number(store, parent_id).await,
                Some(CustomerRef::Contact(_)) | None => Enrichment::Missing,
            }
        }
    }
}

async fn account_cr_number(store: &dyn CrmStore, id: Uuid) -> Enrichment<String> {
    match store
        .retrieve(account::ENTITY, id, &ColumnSet::new([CR_NUMBER]))
        .await
    {
        Ok(record) => Enrichment::from_option(record.get_text(CR_NUMBER)),
        Err(err) => Enrichment::from_error(err),
    }
}

/// Contact details shown for a customer group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerDetails {
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Accounts only.
    pub cr_number: Option<String>,
}

/// One `IN` query for every customer of a page.
pub async fn customer_details(
    store: &dyn CrmStore,
    kind: CustomerKind,
    ids: &[Uuid],
) -> Enrichment<HashMap<Uuid, CustomerDetails>> {
    if ids.is_empty() {
        return Enrichment::Found(HashMap::new());
    }

    let columns = match kind {
        CustomerKind::Account => ColumnSet::new([
            account::ID,
            account::NAME,
            account::EMAIL,
            CR_NUMBER,
            account::REPRESENTATIVE_PHONE,
        ]),
        CustomerKind::Contact => ColumnSet::new([
            contact::ID,
            contact::FULL_NAME,
            contact::EMAIL,
            contact::MOBILE,
        ]),
    };
    let query = QueryExpression::new(kind.logical_name())
        .columns(columns)
        .filter(Condition::is_in(kind.primary_id(), ids.iter().copied()));

    let records = match store.retrieve_multiple(&query).await {
        Ok(result) => result.entities,
        Err(err) => return Enrichment::from_error(err),
    };

    let details = records
        .into_iter()
        .map(|record| {
            let details = match kind {
                CustomerKind::Account => CustomerDetails {
                    email: record.get_text(account::EMAIL),
                    phone: record.get_text(account::REPRESENTATIVE_PHONE),
                    cr_number: record.get_text(CR_NUMBER),
                },
                CustomerKind::Contact => CustomerDetails {
                    email: record.get_text(contact::EMAIL),
                    phone: record.get_text(contact::MOBILE),
                    cr_number: None,
                },
            };
            (record.id, details)
        })
        .collect();
    Enrichment::Found(details)
}
