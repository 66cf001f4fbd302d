use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::jwt;
use crate::crm::CrmCredentials;
use crate::error::AppError;
use crate::AppState;

/// CRM credentials of the caller, taken from a verified report token.
#[derive(Debug, Clone)]
pub struct CrmUser(pub CrmCredentials);

/// Marker for requests carrying the configured feedback bearer token.
#[derive(Debug, Clone, Copy)]
pub struct FeedbackToken;

const INVALID_BEARER: &str = "Unauthorized - Invalid bearer token";

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CrmUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            AppError::Unauthorized("Missing or invalid authorization header".to_string())
                .into_response()
        })?;

        let data = jwt::verify_jwt(&state.config.jwt_secret, token)
            .map_err(|e| AppError::from(e).into_response())?;

        let credentials = data.claims.credentials();
        if credentials.username.trim().is_empty() || credentials.password.is_empty() {
            return Err(AppError::Unauthorized(
                "CRM credentials are missing from the token".to_string(),
            )
            .into_response());
        }

        Ok(CrmUser(credentials))
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for FeedbackToken {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let expected = state.config.api_bearer_token.as_str();
        // An unset token locks the endpoints rather than opening them.
        match bearer_token(parts) {
            Some(token) if !expected.is_empty() && token == expected => Ok(FeedbackToken),
            _ => {
                tracing::warn!(path = %parts.uri.path(), "Rejected feedback request with invalid bearer token");
                Err(AppError::Unauthorized(INVALID_BEARER.to_string()).into_response())
            }
        }
    }
}
