use axum::{
    http::Method,
    routing::get,
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod auth;
mod config;
mod crm;
mod error;
mod feedback;
mod handlers;
mod pagination;
mod reports;
mod validation;

#[cfg(test)]
mod tests;

use crm::{CrmCredentials, StoreProvider};
use feedback::{FeedbackIntake, SubmissionGuard};
use reports::{EnrichmentSettings, ReportAssembler};

pub struct AppState {
    pub config: config::Config,
    pub stores: Arc<dyn StoreProvider>,
    /// In-flight submission claims. Only de-duplicates requests handled by
    /// this process; replicas rely on the store's duplicate check.
    pub submissions: SubmissionGuard,
}

impl AppState {
    pub fn new(config: config::Config, stores: Arc<dyn StoreProvider>) -> Self {
        Self {
            config,
            stores,
            submissions: SubmissionGuard::new(),
        }
    }

    /// Report assembler acting as the caller's CRM user.
    pub fn assembler(&self, credentials: &CrmCredentials) -> ReportAssembler {
        let settings = EnrichmentSettings {
            lookup_timeout: self.config.lookup_timeout,
            concurrency: self.config.enrichment_concurrency,
        };
        ReportAssembler::new(self.stores.for_credentials(credentials), settings)
    }

    /// Feedback intake acting as the service identity.
    pub fn intake(&self) -> FeedbackIntake {
        FeedbackIntake::new(self.stores.service(), self.submissions.clone())
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(handlers::report_routes())
        .nest("/customers", handlers::customer_routes())
        .merge(handlers::page_routes(&state.config.static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("casedesk_backend=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env()?;
    if config.api_bearer_token.is_empty() {
        tracing::warn!("API_BEARER_TOKEN is not set; feedback endpoints will reject every request");
    }
    if !config.crm.has_service_identity() {
        tracing::warn!("CRM service identity is not configured; feedback endpoints will fail upstream");
    }

    let stores = Arc::new(crm::webapi::WebApiProvider::new(config.crm.clone())?);
    let addr = config.server_addr.clone();
    tracing::info!(crm = %config.crm.url, "Using CRM organisation");

    let app = build_router(Arc::new(AppState::new(config, stores)));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
