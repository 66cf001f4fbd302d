//! Request-level error taxonomy and the JSON envelope every failure renders to.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::crm::StoreError;

/// Error envelope. Shares `success`/`message` with the success envelope so
/// survey pages can branch on `success` alone.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub success: bool,
    /// e.g. "BAD_REQUEST", "CONFLICT", "UPSTREAM_ERROR"
    pub code: String,
    pub message: String,
    /// ISO 8601 timestamp
    pub timestamp: String,
    /// Field-level problems for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code: code.into(),
            message: message.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: HashMap<String, Vec<String>>) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Debug)]
pub enum AppError {
    /// Missing or invalid credential or bearer token
    Unauthorized(String),
    BadRequest(String),
    /// Request body or query string that does not deserialize
    ValidationError {
        message: String,
        details: HashMap<String, Vec<String>>,
    },
    NotFound(String),
    /// Duplicate submission
    Conflict(String),
    /// The store failed a query or an insert
    Upstream(String),
    InternalError(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) | Self::ValidationError { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Upstream(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::ValidationError { .. } => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Upstream(_) => "UPSTREAM_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Unauthorized(msg)
            | Self::BadRequest(msg)
            | Self::NotFound(msg)
            | Self::Conflict(msg)
            | Self::ValidationError { message: msg, .. } => msg.clone(),
            Self::Upstream(msg) => format!("CRM error: {}", msg),
            Self::InternalError(msg) => format!("Internal error: {}", msg),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!("{}", message);
        }
        let mut error = ApiError::new(self.error_code(), message);

        if let Self::ValidationError { details, .. } = self {
            error = error.with_details(details);
        }

        (status, Json(error)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => Self::NotFound(format!("{} not found", what)),
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                Self::Unauthorized("Authentication token has expired".to_string())
            }
            _ => Self::Unauthorized(format!("Invalid token: {}", err)),
        }
    }
}

/// Result type alias for handlers
pub type ApiResult<T> = Result<T, AppError>;

/// Single-field validation failure.
pub fn validation_error(field: &str, message: &str) -> AppError {
    let mut details = HashMap::new();
    details.insert(field.to_string(), vec![message.to_string()]);
    AppError::ValidationError {
        message: message.to_string(),
        details,
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        validation_error("body", &rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        validation_error("query", &rejection.body_text())
    }
}
