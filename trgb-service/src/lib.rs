//! trgb Service Library
//!
//! HTTP handlers and routing for the terrain-RGB query service.
//! This library is used by both the trgb-service binary and integration tests.

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use trgb::TileStore;

/// Application state shared across handlers.
pub struct AppState {
    /// Tile store for terrain queries.
    pub store: TileStore,
}

/// Build the API router with tracing and CORS layers.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/terrain",
            get(handlers::get_terrain).post(handlers::post_terrain),
        )
        .route("/health", get(handlers::health_check))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

// Re-export commonly used types for convenience
pub use handlers::{
    BatchRequest, BatchResponse, ErrorResponse, HealthResponse, TerrainQuery, TerrainResponse,
};
