use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    /// Verifies report tokens carrying CRM credentials.
    pub jwt_secret: String,
    /// Static bearer token gating the feedback endpoints.
    pub api_bearer_token: String,
    pub crm: CrmConfig,
    /// Per sub-lookup timeout during report enrichment.
    pub lookup_timeout: Duration,
    /// Rows enriched concurrently within one report request.
    pub enrichment_concurrency: usize,
    /// Directory holding the survey pages.
    pub static_dir: String,
}

/// Connection settings for the CRM Web API
#[derive(Debug, Clone)]
pub struct CrmConfig {
    /// Organisation URL, e.g. https://contoso.crm4.dynamics.com
    pub url: String,
    pub api_version: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Defaults to `<url>/.default`
    pub scope: String,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let crm_url = env::var("CRM_URL").unwrap_or_else(|_| "http://localhost:5555".to_string());
        let crm_url = crm_url.trim_end_matches('/').to_string();

        Ok(Config {
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            api_bearer_token: env::var("API_BEARER_TOKEN").unwrap_or_default(),
            crm: CrmConfig {
                scope: env::var("CRM_SCOPE").unwrap_or_else(|_| format!("{}/.default", crm_url)),
                api_version: env::var("CRM_API_VERSION").unwrap_or_else(|_| "v9.2".to_string()),
                token_url: env::var("CRM_TOKEN_URL").unwrap_or_else(|_| {
                    "https://login.microsoftonline.com/common/oauth2/v2.0/token".to_string()
                }),
                client_id: env::var("CRM_CLIENT_ID").unwrap_or_default(),
                client_secret: env::var("CRM_CLIENT_SECRET").unwrap_or_default(),
                request_timeout: Duration::from_secs(parse_or("CRM_REQUEST_TIMEOUT_SECS", 30)),
                url: crm_url,
            },
            lookup_timeout: Duration::from_secs(parse_or("LOOKUP_TIMEOUT_SECS", 10)),
            enrichment_concurrency: parse_or::<usize>("ENRICHMENT_CONCURRENCY", 8).max(1),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "./wwwroot".to_string()),
        })
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl CrmConfig {
    /// Check if the service identity is configured
    pub fn has_service_identity(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}
