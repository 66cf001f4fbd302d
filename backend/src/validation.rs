//! Input validation for the intake endpoints.
//!
//! Validators return the cleaned value or a `BadRequest` carrying the message
//! the survey pages display verbatim.

use crate::error::AppError;

pub type ValidationResult<T> = Result<T, AppError>;

pub mod string {
    use super::*;

    /// Trimmed value, `None` when absent or blank.
    pub fn present(value: &Option<String>) -> Option<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn required(value: &Option<String>, message: &str) -> ValidationResult<String> {
        present(value).ok_or_else(|| AppError::BadRequest(message.to_string()))
    }

    /// Trimmed text, or `placeholder` when blank.
    pub fn or_placeholder(value: &Option<String>, placeholder: &str) -> String {
        present(value).unwrap_or_else(|| placeholder.to_string())
    }
}

pub mod guid {
    use super::*;
    use uuid::Uuid;

    pub fn parse(value: &str, message: &str) -> ValidationResult<Uuid> {
        Uuid::parse_str(value.trim()).map_err(|_| AppError::BadRequest(message.to_string()))
    }

    /// Parses when present, `Ok(None)` when blank.
    pub fn optional(value: &Option<String>, message: &str) -> ValidationResult<Option<Uuid>> {
        super::string::present(value)
            .map(|raw| parse(&raw, message))
            .transpose()
    }
}

pub mod rating {
    use super::*;

    pub const MIN: i32 = 1;
    pub const MAX: i32 = 5;

    pub fn in_range(value: i32) -> bool {
        (MIN..=MAX).contains(&value)
    }

    pub fn required(value: i32, message: &str) -> ValidationResult<i32> {
        if in_range(value) {
            Ok(value)
        } else {
            Err(AppError::BadRequest(message.to_string()))
        }
    }

    /// Out-of-range answers are treated as "not answered".
    pub fn optional(value: i32) -> Option<i32> {
        in_range(value).then_some(value)
    }
}

/// Yes/no questions arrive coded 1 (yes) or 2 (no).
pub mod yes_no {
    pub const YES: i32 = 1;
    pub const NO: i32 = 2;

    pub fn parse(value: i32) -> Option<bool> {
        match value {
            YES => Some(true),
            NO => Some(false),
            _ => None,
        }
    }
}

pub mod ticket {
    use regex::Regex;
    use std::sync::LazyLock;

    static DIGITS_ONLY: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\d+$").expect("ticket pattern compiles"));

    /// Trimmed ticket number when it is all digits. Leading zeros are kept and
    /// no prefix is stripped.
    pub fn normalize(raw: &str) -> Option<String> {
        let cleaned = raw.trim();
        DIGITS_ONLY
            .is_match(cleaned)
            .then(|| cleaned.to_string())
    }
}
