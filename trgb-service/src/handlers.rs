//! HTTP request handlers for the terrain service.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use trgb::{GeoCoordinate, TerrainError, TerrainSample};
use utoipa::{IntoParams, ToSchema};

use crate::AppState;

/// Query parameters for the terrain endpoint.
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct TerrainQuery {
    /// Longitude in decimal degrees (-180 to 180).
    pub lon: f64,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Zoom level of the tile to sample.
    pub zoom: i32,
    /// Return the aspect as a Chinese compass label.
    #[serde(default)]
    pub zh: bool,
}

/// Batch terrain request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchRequest {
    /// Zoom level of the tiles to sample.
    pub zoom: i32,
    /// Points as `[lon, lat]` pairs.
    #[schema(value_type = Vec<Vec<f64>>)]
    pub points: Vec<[f64; 2]>,
}

/// Elevation and surface metrics at one point.
#[derive(Debug, Serialize, ToSchema)]
pub struct TerrainResponse {
    /// Longitude queried.
    pub lon: f64,
    /// Latitude queried.
    pub lat: f64,
    /// Elevation in meters.
    pub elevation: f64,
    /// Slope in degrees.
    pub slope: f64,
    /// Compass octant the surface faces.
    pub aspect: String,
    /// Aspect angle in degrees (0 to 360).
    pub aspect_degrees: f64,
    /// RMS height difference to the 8 neighbouring pixels, in meters.
    pub roughness: f64,
    /// Tile address as `z/x/y`.
    pub tile: String,
}

impl TerrainResponse {
    pub fn from_sample(sample: &TerrainSample, zh: bool) -> Self {
        let aspect = if zh {
            sample.aspect.label_zh()
        } else {
            sample.aspect.label()
        };

        Self {
            lon: sample.lon,
            lat: sample.lat,
            elevation: sample.elevation,
            slope: sample.slope,
            aspect: aspect.to_string(),
            aspect_degrees: sample.aspect_degrees,
            roughness: sample.roughness,
            tile: sample.tile.to_string(),
        }
    }
}

/// Batch terrain response, one entry per requested point.
#[derive(Debug, Serialize, ToSchema)]
pub struct BatchResponse {
    /// Results in request order; `null` where no data was available.
    pub results: Vec<Option<TerrainResponse>>,
}

/// Error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Get elevation, slope, aspect and roughness at a coordinate.
///
/// # Returns
///
/// - `200 OK` with terrain data on success
/// - `400 Bad Request` if the zoom or coordinate is invalid
/// - `404 Not Found` if the tile is not in the store
/// - `500 Internal Server Error` on unreadable tiles
#[utoipa::path(
    get,
    path = "/terrain",
    tag = "terrain",
    params(TerrainQuery),
    responses(
        (status = 200, description = "Terrain sample", body = TerrainResponse),
        (status = 400, description = "Invalid zoom or coordinate", body = ErrorResponse),
        (status = 404, description = "Tile not available", body = ErrorResponse),
    )
)]
pub async fn get_terrain(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TerrainQuery>,
) -> impl IntoResponse {
    tracing::debug!(
        lon = query.lon,
        lat = query.lat,
        zoom = query.zoom,
        "Terrain query"
    );

    match state.store.query(query.lon, query.lat, query.zoom) {
        Ok(sample) => {
            tracing::info!(
                lon = query.lon,
                lat = query.lat,
                zoom = query.zoom,
                elevation = sample.elevation,
                slope = sample.slope,
                "Terrain found"
            );
            (
                StatusCode::OK,
                Json(TerrainResponse::from_sample(&sample, query.zh)),
            )
                .into_response()
        }
        Err(e) => error_response(query.lon, query.lat, e),
    }
}

/// Query a batch of points at one zoom level.
///
/// Each tile is read once per request. Points without data yield `null`.
#[utoipa::path(
    post,
    path = "/terrain",
    tag = "terrain",
    request_body = BatchRequest,
    responses(
        (status = 200, description = "Terrain samples in request order", body = BatchResponse),
        (status = 400, description = "Invalid zoom", body = ErrorResponse),
    )
)]
pub async fn post_terrain(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchRequest>,
) -> impl IntoResponse {
    if request.zoom < 0 {
        let e = TerrainError::InvalidZoom { zoom: request.zoom };
        tracing::warn!(error = %e, "Batch query rejected");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response();
    }

    let coords: Vec<GeoCoordinate> = request
        .points
        .iter()
        .map(|&[lon, lat]| GeoCoordinate::new(lon, lat))
        .collect();

    let results = state
        .store
        .query_batch(&coords, request.zoom)
        .iter()
        .map(|s| s.as_ref().map(|s| TerrainResponse::from_sample(s, false)))
        .collect();

    tracing::info!(
        points = coords.len(),
        zoom = request.zoom,
        "Batch terrain query"
    );

    (StatusCode::OK, Json(BatchResponse { results })).into_response()
}

/// Create an error response for terrain queries.
fn error_response(lon: f64, lat: f64, e: TerrainError) -> axum::response::Response {
    let status = match &e {
        TerrainError::InvalidZoom { .. }
        | TerrainError::OutOfBounds { .. }
        | TerrainError::InvalidElevation { .. } => StatusCode::BAD_REQUEST,
        TerrainError::TileNotFound { .. } => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    tracing::warn!(lon = lon, lat = lat, error = %e, "Terrain query failed");

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

/// Health check endpoint.
///
/// Returns service status and version.
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
