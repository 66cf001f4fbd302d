pub mod unit;
pub mod integration;
pub mod helpers;

// Shared setup: the full router over an in-memory CRM.
use axum::Router;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, CrmConfig};
use crate::crm::memory::{MemoryProvider, MemoryStore};
use crate::crm::Entity;
use crate::{build_router, AppState};

pub const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_only";
pub const TEST_BEARER_TOKEN: &str = "test-feedback-token";

pub fn test_config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".to_string(),
        jwt_secret: TEST_JWT_SECRET.to_string(),
        api_bearer_token: TEST_BEARER_TOKEN.to_string(),
        crm: CrmConfig {
            url: "http://crm.test".to_string(),
            api_version: "v9.2".to_string(),
            token_url: "http://crm.test/token".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            scope: "http://crm.test/.default".to_string(),
            request_timeout: Duration::from_secs(5),
        },
        lookup_timeout: Duration::from_millis(200),
        enrichment_concurrency: 4,
        static_dir: "./wwwroot".to_string(),
    }
}

pub struct TestContext {
    pub store: MemoryStore,
    pub app: Router,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let store = MemoryStore::new();
        let provider = Arc::new(MemoryProvider {
            store: store.clone(),
        });
        let app = build_router(Arc::new(AppState::new(config, provider)));
        Self { store, app }
    }

    pub fn seed(self, records: impl IntoIterator<Item = Entity>) -> Self {
        for record in records {
            self.store.insert(record);
        }
        self
    }
}
