use axum::{http::StatusCode, response::Json};
use serde_json::json;

pub mod feedback;
pub mod pages;
pub mod reports;

pub use feedback::customer_routes;
pub use pages::page_routes;
pub use reports::report_routes;

pub async fn health_check() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({"status": "healthy", "service": "casedesk-api"})))
}
