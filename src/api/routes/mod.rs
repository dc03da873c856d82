pub mod anime;
pub mod health;
pub mod proxy;

use axum::{Router, routing::get};
use serde::Serialize;

use crate::api::state::ApiState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create the main API router
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Passthrough relay (JSON and image payloads)
        .route("/api/proxy", get(proxy::relay))
        // Typed gateway routes
        .route("/api/feed", get(anime::get_feed))
        .route("/api/search", get(anime::search_anime))
        .route("/api/details/{id}", get(anime::get_details))
        .with_state(state)
}
