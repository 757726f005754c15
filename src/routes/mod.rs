//! Route modules for the manuals server

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod health;
pub mod proxy;

/// Build the full application router
pub fn router(state: AppState) -> Router {
    // The proxy sets its own CORS headers; a CorsLayer here would overwrite
    // its `Vary` header.
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1/health", health::router())
        .nest("/proxy", proxy::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
