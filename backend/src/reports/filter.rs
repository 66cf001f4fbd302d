use chrono::{DateTime, Duration, Utc};

use super::localtime::{local_midnight, local_month_start};
use crate::crm::Condition;

/// Named date-range filter over a modification timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    All,
    Daily,
    Weekly,
    Monthly,
    Yesterday,
}

impl DateFilter {
    /// Case-insensitive; anything unrecognised means no filter.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "daily" => Self::Daily,
            "weekly" => Self::Weekly,
            "monthly" => Self::Monthly,
            "yesterday" => Self::Yesterday,
            _ => Self::All,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn condition(&self, attribute: &str, now: DateTime<Utc>) -> Option<Condition> {
        match self {
            Self::All => None,
            Self::Daily => Some(Condition::on_or_after(attribute, local_midnight(now, 0))),
            Self::Weekly => Some(Condition::on_or_after(attribute, local_midnight(now, 7))),
            Self::Monthly => Some(Condition::on_or_after(attribute, local_month_start(now))),
            Self::Yesterday => Some(Condition::between(
                attribute,
                local_midnight(now, 1),
                local_midnight(now, 0) - Duration::seconds(1),
            )),
        }
    }
}
