//! trgb Service - HTTP microservice for terrain-RGB queries.
//!
//! A REST API returning elevation, slope, aspect and roughness for points
//! on a local directory of terrain-RGB tiles.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TRGB_DATA_DIR` | Root of the `{z}/{x}/{y}` tile tree | Required |
//! | `TRGB_TILE_EXT` | Tile file extension | `png` |
//! | `TRGB_PORT` | HTTP server port | 8080 |
//! | `RUST_LOG` | Log level (e.g., "info", "debug") | "info" |
//!
//! ## Endpoints
//!
//! - `GET /terrain?lon=X&lat=Y&zoom=Z` - Terrain sample at a coordinate
//! - `POST /terrain` - Batch query (`{"zoom": Z, "points": [[lon, lat], ...]}`)
//! - `GET /health` - Health check
//! - `GET /docs` - OpenAPI documentation (Swagger UI)

use std::net::SocketAddr;
use std::sync::Arc;

use trgb::TileStoreBuilder;
use trgb_service::{handlers, router, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// OpenAPI documentation for the trgb service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "trgb Terrain Service",
        version = "0.1.0",
        description = "REST API for elevation and surface metrics from terrain-RGB tiles.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    paths(
        handlers::get_terrain,
        handlers::post_terrain,
        handlers::health_check,
    ),
    components(
        schemas(
            handlers::TerrainQuery,
            handlers::BatchRequest,
            handlers::TerrainResponse,
            handlers::BatchResponse,
            handlers::ErrorResponse,
            handlers::HealthResponse,
        )
    ),
    tags(
        (name = "terrain", description = "Terrain query endpoints"),
        (name = "system", description = "System and health endpoints")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trgb_service=info,trgb=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port: u16 = std::env::var("TRGB_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080);

    let store = match TileStoreBuilder::from_env() {
        Ok(builder) => builder.build(),
        Err(_) => {
            tracing::warn!("TRGB_DATA_DIR not set, using current directory");
            TileStoreBuilder::new(".").build()
        }
    };

    tracing::info!(
        data_dir = %store.data_dir().display(),
        tile_ext = store.tile_ext(),
        tiles = store.list_tiles().len(),
        port = port,
        "Starting trgb service"
    );

    let state = Arc::new(AppState { store });

    let app = router(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
