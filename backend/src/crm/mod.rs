//! Access to the case-management store.
//!
//! The rest of the service only sees [`CrmStore`]: filtered/paged/joined
//! queries, retrieve-by-id and insert. [`StoreProvider`] hands out stores bound
//! to either the caller's CRM credentials or the service identity.

pub mod entity;
pub mod fetchxml;
#[cfg(test)]
pub mod memory;
pub mod query;
pub mod schema;
pub mod webapi;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

pub use entity::{AttributeValue, Entity, EntityReference};
pub use query::{ColumnSet, Condition, EntityCollection, LinkEntity, Order, QueryExpression};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} does not exist")]
    NotFound(String),
    #[error("request to the CRM timed out")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("CRM returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("unexpected CRM payload: {0}")]
    Decode(String),
    #[error("authentication with the CRM failed: {0}")]
    Auth(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CrmStore: Send + Sync {
    async fn retrieve_multiple(&self, query: &QueryExpression) -> StoreResult<EntityCollection>;

    /// Fails with [`StoreError::NotFound`] when no record has this id.
    async fn retrieve(&self, entity: &str, id: Uuid, columns: &ColumnSet) -> StoreResult<Entity>;

    /// Inserts `record` and returns the new id. `record.id` is ignored.
    async fn create(&self, record: &Entity) -> StoreResult<Uuid>;
}

/// CRM user credentials carried by a verified report token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrmCredentials {
    pub username: String,
    pub password: String,
}

pub trait StoreProvider: Send + Sync {
    /// Store acting as the given CRM user.
    fn for_credentials(&self, credentials: &CrmCredentials) -> Arc<dyn CrmStore>;

    /// Store acting as the service identity.
    fn service(&self) -> Arc<dyn CrmStore>;
}
