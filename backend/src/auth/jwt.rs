use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData as JwtTokenData, Validation};
use serde::{Deserialize, Serialize};

use crate::crm::CrmCredentials;

/// Identity token for the report endpoints. The issuer has already checked
/// the CRM credentials it embeds; report queries run as that CRM user.
#[derive(Debug, Serialize, Deserialize)]
pub struct CrmClaims {
    pub sub: String,
    pub crm_username: String,
    pub crm_password: String,
    pub exp: i64,     // Expiration time
    pub iat: i64,     // Issued at
}

impl CrmClaims {
    pub fn credentials(&self) -> CrmCredentials {
        CrmCredentials {
            username: self.crm_username.clone(),
            password: self.crm_password.clone(),
        }
    }
}

pub fn create_jwt(
    secret: &str,
    credentials: &CrmCredentials,
    ttl: Duration,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = CrmClaims {
        sub: credentials.username.clone(),
        crm_username: credentials.username.clone(),
        crm_password: credentials.password.clone(),
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

pub fn verify_jwt(secret: &str, token: &str) -> Result<JwtTokenData<CrmClaims>, jsonwebtoken::errors::Error> {
    decode::<CrmClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
}
