//! # trgb - Terrain-RGB Elevation Library
//!
//! Decode elevation and local surface metrics from terrain-RGB raster tiles
//! addressed in the spherical Web-Mercator XYZ scheme.
//!
//! ## Features
//!
//! - **Tile math**: longitude/latitude to tile address and pixel offset
//! - **Exact decoding**: fixed-point 0.1 m elevations from RGB triplets
//! - **Surface metrics**: slope and aspect via Horn's method, RMS roughness
//! - **Tile store**: queries over a local `{z}/{x}/{y}` tile directory
//!
//! ## Quick Start
//!
//! ```ignore
//! use trgb::{query, tiling, RasterTile};
//!
//! let (lon, lat, zoom) = (120.1551, 30.2741, 12);
//!
//! // Which tile to load
//! let address = tiling::tile_address(lon, lat, zoom)?;
//! assert_eq!(address.path("png"), "12/3415/1686.png");
//!
//! // Load the tile and query the terrain
//! let tile = RasterTile::from_file(format!("/data/{}", address.path("png")))?;
//! let sample = query(lon, lat, zoom, &tile)?;
//! println!(
//!     "{:.1}m, slope {:.1}°, aspect {}, roughness {:.2}m",
//!     sample.elevation, sample.slope, sample.aspect, sample.roughness
//! );
//! ```
//!
//! ## Terrain-RGB Format
//!
//! Tiles are 256×256 RGBA rasters. Each pixel stores
//! `-10000 + (R × 65536 + G × 256 + B) × 0.1` meters; alpha is ignored.

pub mod error;
pub mod metrics;
pub mod query;
pub mod store;
pub mod tile;
pub mod tiling;

// Re-export main types at crate root for convenience
pub use error::{Result, TerrainError};
pub use metrics::{Aspect, ElevationGrid, SurfaceMetrics, CELL_SIZE_M};
pub use query::{query, query_batch, sample_grid, TerrainSample};
pub use store::{TileStore, TileStoreBuilder};
pub use tile::RasterTile;
pub use tiling::{GeoCoordinate, PixelCoordinate, TileAddress};
