//! Outcome of a single enrichment lookup.
//!
//! Sub-lookups (CR numbers, KPIs, surveys) never fail a report. Each one
//! yields an [`Enrichment`]; the row assembler collapses it to an `Option`
//! and logs degraded outcomes.

use std::future::Future;
use std::time::Duration;

use crate::crm::StoreError;

#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment<T> {
    Found(T),
    Missing,
    Degraded { reason: String },
}

impl<T> Enrichment<T> {
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Self::Missing, Self::Found)
    }

    /// A record that does not exist is a missing value, not a degradation.
    pub fn from_error(err: StoreError) -> Self {
        if err.is_not_found() {
            Self::Missing
        } else {
            Self::Degraded {
                reason: err.to_string(),
            }
        }
    }

    pub fn from_result(result: Result<Option<T>, StoreError>) -> Self {
        match result {
            Ok(value) => Self::from_option(value),
            Err(err) => Self::from_error(err),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Missing | Self::Degraded { .. } => None,
        }
    }

    /// Collapses to `Option`, logging degradation against `subject`.
    pub fn settle(self, subject: &str, lookup: &str) -> Option<T> {
        if let Self::Degraded { reason } = &self {
            tracing::warn!(subject, lookup, reason = %reason, "Enrichment degraded to null");
        }
        self.into_option()
    }
}

/// Runs `lookup` with a deadline; running out of time degrades the lookup.
pub async fn bounded<T, F>(limit: Duration, lookup: F) -> Enrichment<T>
where
    F: Future<Output = Enrichment<T>>,
{
    tokio::time::timeout(limit, lookup)
        .await
        .unwrap_or_else(|_| Enrichment::Degraded {
            reason: format!("timed out after {}ms", limit.as_millis()),
        })
}
