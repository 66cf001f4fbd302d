//! Static survey pages.

use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};

use crate::AppState;

/// Page routes and the file fallback for their assets.
pub fn page_routes(static_dir: &str) -> Router<Arc<AppState>> {
    let dir = Path::new(static_dir);
    Router::new()
        .route_service("/Visitor", ServeFile::new(dir.join("Visitor.html")))
        .route_service("/KITicket", ServeFile::new(dir.join("KITicket.html")))
        .route_service("/KICommunication", ServeFile::new(dir.join("KICommunication.html")))
        .fallback_service(ServeDir::new(dir))
}
