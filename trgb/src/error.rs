//! Error types for the trgb library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when decoding terrain-RGB tiles.
#[derive(Error, Debug)]
pub enum TerrainError {
    /// Zoom level is negative.
    #[error("Invalid zoom level: {zoom} (must be >= 0)")]
    InvalidZoom { zoom: i32 },

    /// Pixel coordinate falls outside the 256×256 tile raster.
    #[error("Pixel out of bounds: x={x}, y={y} (valid: 0..256)")]
    OutOfBounds { x: i64, y: i64 },

    /// Decoded elevation is NaN or infinite.
    #[error("Invalid elevation value: {value}")]
    InvalidElevation { value: f64 },

    /// Raw tile buffer is not 256 × 256 × 4 bytes.
    #[error("Invalid tile size: {size} bytes (expected 262144)")]
    InvalidTileSize { size: usize },

    /// Decoded image is not 256 × 256 pixels.
    #[error("Invalid tile dimensions: {width}x{height} (expected 256x256)")]
    InvalidDimensions { width: u32, height: u32 },

    /// Path does not follow the `{z}/{x}/{y}` layout.
    #[error("Invalid tile path: {path}")]
    InvalidTilePath { path: String },

    /// The tile file for an address was not found in the store.
    #[error("Tile file not found: {}", .path.display())]
    TileNotFound { path: PathBuf },

    /// PNG decoding failed.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// IO error when reading files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using [`TerrainError`].
pub type Result<T> = std::result::Result<T, TerrainError>;
