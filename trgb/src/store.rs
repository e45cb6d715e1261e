//! Terrain queries backed by a directory of XYZ tiles.
//!
//! This module provides [`TileStore`], which resolves the tile containing a
//! coordinate inside a `{z}/{x}/{y}.{ext}` directory tree, reads it, and runs
//! a [`query`](crate::query::query) against it.
//!
//! Tiles are read from disk on every call and dropped afterwards. Batch
//! queries read each distinct tile once per batch.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, TerrainError};
use crate::query::{query, TerrainSample};
use crate::tile::RasterTile;
use crate::tiling::{tile_address, GeoCoordinate, TileAddress};

/// Default tile file extension.
pub const DEFAULT_TILE_EXT: &str = "png";

/// A directory of terrain-RGB tiles laid out as `{z}/{x}/{y}.{ext}`.
///
/// # Example
///
/// ```ignore
/// use trgb::TileStore;
///
/// let store = TileStore::new("/data/terrain-rgb");
///
/// let sample = store.query(120.1551, 30.2741, 12)?;
/// println!("{:.1}m, slope {:.1}°, facing {}", sample.elevation, sample.slope, sample.aspect);
/// ```
#[derive(Debug, Clone)]
pub struct TileStore {
    /// Root of the tile tree.
    data_dir: PathBuf,
    /// File extension of tiles, without the dot.
    tile_ext: String,
}

impl TileStore {
    /// Create a store over `data_dir` using `.png` tiles.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            tile_ext: DEFAULT_TILE_EXT.to_string(),
        }
    }

    /// Create a builder for more configuration options.
    pub fn builder<P: AsRef<Path>>(data_dir: P) -> TileStoreBuilder {
        TileStoreBuilder::new(data_dir)
    }

    /// Path where the tile for `address` is expected.
    pub fn tile_path(&self, address: &TileAddress) -> PathBuf {
        self.data_dir.join(address.path(&self.tile_ext))
    }

    /// Read the tile at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::TileNotFound`] if the file does not exist, or
    /// any error from [`RasterTile::from_file`].
    pub fn load_tile(&self, address: &TileAddress) -> Result<RasterTile> {
        let path = self.tile_path(address);

        if !path.exists() {
            return Err(TerrainError::TileNotFound { path });
        }

        debug!(tile = %address, path = %path.display(), "Loading tile");
        RasterTile::from_file(&path)
    }

    /// Query elevation and surface metrics at a coordinate.
    ///
    /// # Errors
    ///
    /// Returns an error if the zoom is negative, the tile is missing or
    /// unreadable, or the decoded elevation is invalid.
    pub fn query(&self, lon: f64, lat: f64, zoom: i32) -> Result<TerrainSample> {
        let address = tile_address(lon, lat, zoom)?;
        let tile = self.load_tile(&address)?;
        query(lon, lat, zoom, &tile)
    }

    /// Query a batch of coordinates at one zoom level.
    ///
    /// Coordinates are grouped by tile so that each tile is read only once.
    /// Results are returned in input order; coordinates whose tile is missing
    /// or whose query fails yield `None`.
    pub fn query_batch(&self, coords: &[GeoCoordinate], zoom: i32) -> Vec<Option<TerrainSample>> {
        let mut results = vec![None; coords.len()];

        let mut groups: HashMap<TileAddress, Vec<usize>> = HashMap::new();
        for (i, c) in coords.iter().enumerate() {
            match tile_address(c.lon, c.lat, zoom) {
                Ok(address) => groups.entry(address).or_default().push(i),
                Err(e) => {
                    warn!(lon = c.lon, lat = c.lat, error = %e, "Skipping coordinate");
                }
            }
        }

        for (address, indices) in &groups {
            let tile = match self.load_tile(address) {
                Ok(t) => t,
                Err(e) => {
                    warn!(tile = %address, error = %e, "Tile unavailable for batch");
                    continue;
                }
            };

            for &i in indices {
                let c = coords[i];
                match query(c.lon, c.lat, zoom, &tile) {
                    Ok(sample) => results[i] = Some(sample),
                    Err(e) => {
                        warn!(lon = c.lon, lat = c.lat, error = %e, "Terrain query failed");
                    }
                }
            }
        }

        results
    }

    /// Scan the data directory for tiles.
    ///
    /// Returns a sorted list of tile addresses whose file has the configured
    /// extension. Entries that don't follow the `{z}/{x}/{y}` layout are skipped.
    pub fn list_tiles(&self) -> Vec<TileAddress> {
        let mut tiles = Vec::new();

        for z_dir in read_subdirs(&self.data_dir) {
            for x_dir in read_subdirs(&z_dir) {
                let entries = match std::fs::read_dir(&x_dir) {
                    Ok(entries) => entries,
                    Err(_) => continue,
                };

                for entry in entries.flatten() {
                    let path = entry.path();
                    let has_ext = path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e == self.tile_ext);
                    if !has_ext {
                        continue;
                    }

                    if let Some(address) = path.to_str().and_then(TileAddress::parse) {
                        tiles.push(address);
                    }
                }
            }
        }

        tiles.sort_by_key(|t| (t.zoom, t.x, t.y));
        tiles
    }

    /// Get the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Get the tile file extension.
    pub fn tile_ext(&self) -> &str {
        &self.tile_ext
    }
}

/// Subdirectories of `dir`, or nothing if it can't be read.
fn read_subdirs(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_dir())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Builder for creating [`TileStore`] with custom configuration.
///
/// # Example
///
/// ```ignore
/// use trgb::TileStoreBuilder;
///
/// let store = TileStoreBuilder::new("/data/terrain-rgb")
///     .tile_ext("pngraw")
///     .build();
/// ```
pub struct TileStoreBuilder {
    data_dir: PathBuf,
    tile_ext: String,
}

impl TileStoreBuilder {
    /// Create a new builder with the specified data directory.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            tile_ext: DEFAULT_TILE_EXT.to_string(),
        }
    }

    /// Create a builder configured from environment variables.
    ///
    /// # Environment Variables
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `TRGB_DATA_DIR` | Root of the `{z}/{x}/{y}` tile tree | Required |
    /// | `TRGB_TILE_EXT` | Tile file extension (`png`, `pngraw`, `bin`) | `png` |
    ///
    /// # Errors
    ///
    /// Returns an error if `TRGB_DATA_DIR` is not set.
    pub fn from_env() -> Result<Self> {
        let data_dir = std::env::var("TRGB_DATA_DIR").map_err(|_| {
            TerrainError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "TRGB_DATA_DIR environment variable not set",
            ))
        })?;

        let tile_ext = std::env::var("TRGB_TILE_EXT")
            .ok()
            .map(|s| s.trim_start_matches('.').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_TILE_EXT.to_string());

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            tile_ext,
        })
    }

    /// Set the data directory.
    ///
    /// Overrides the directory set in the constructor or from environment.
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// Set the tile file extension (with or without the leading dot).
    pub fn tile_ext(mut self, ext: &str) -> Self {
        self.tile_ext = ext.trim_start_matches('.').to_string();
        self
    }

    /// Build the [`TileStore`].
    pub fn build(self) -> TileStore {
        TileStore {
            data_dir: self.data_dir,
            tile_ext: self.tile_ext,
        }
    }
}
