//! Spherical Web-Mercator tile math.
//!
//! This module converts geographic coordinates to XYZ tile addresses and to the
//! pixel position inside a 256×256 tile, and formats tile addresses as the
//! `{z}/{x}/{y}` paths used by slippy-map tile servers.
//!
//! # Formulas
//!
//! With `n = 2^zoom`:
//!
//! - `x = floor((lon + 180) / 360 · n)`
//! - `y = floor((1 − ln(tan(φ) + sec(φ)) / π) / 2 · n)`
//!
//! Latitude is not clamped to the Mercator limit (±85.0511°). Near the poles the
//! projected value grows without bound or becomes non-finite, and the integer
//! conversion saturates (NaN maps to 0). Use [`is_valid_mercator_coord`] to check
//! inputs up front.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TerrainError};

/// Width and height of a raster tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// Maximum latitude representable in spherical Web-Mercator.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// A geographic coordinate in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    /// Longitude, -180 to 180.
    pub lon: f64,
    /// Latitude, -90 to 90.
    pub lat: f64,
}

impl GeoCoordinate {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Address of one tile in the XYZ tiling scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileAddress {
    /// Zoom level.
    pub zoom: u32,
    /// Column, 0 = west edge.
    pub x: i64,
    /// Row, 0 = north edge.
    pub y: i64,
}

/// Pixel position inside a tile raster.
///
/// Values are signed so that out-of-range positions (negative longitudes past
/// the antimeridian, for instance) can be reported instead of wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelCoordinate {
    /// Column, 0 = west edge.
    pub x: i64,
    /// Row, 0 = north edge.
    pub y: i64,
}

impl PixelCoordinate {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Returns `true` if both axes are inside `[0, 256)`.
    pub fn in_tile(&self) -> bool {
        let size = TILE_SIZE as i64;
        (0..size).contains(&self.x) && (0..size).contains(&self.y)
    }

    /// Returns the pixel shifted by `(dx, dy)`. The result may be outside the tile.
    pub fn offset(&self, dx: i64, dy: i64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Number of tiles along one axis at `zoom`, as a float.
fn tiles_per_axis(zoom: i32) -> Result<f64> {
    if zoom < 0 {
        return Err(TerrainError::InvalidZoom { zoom });
    }
    Ok(2f64.powi(zoom))
}

/// Normalised Mercator X in world units (0 = antimeridian west, 1 = east).
fn world_x(lon: f64) -> f64 {
    (lon + 180.0) / 360.0
}

/// Normalised Mercator Y in world units (0 = north limit, 1 = south limit).
fn world_y(lat: f64) -> f64 {
    let phi = lat * PI / 180.0;
    (1.0 - (phi.tan() + 1.0 / phi.cos()).ln() / PI) / 2.0
}

/// Compute the tile containing a coordinate at the given zoom.
///
/// # Errors
///
/// Returns [`TerrainError::InvalidZoom`] if `zoom` is negative.
///
/// # Examples
///
/// ```
/// use trgb::tiling::tile_address;
///
/// let tile = tile_address(0.0, 0.0, 1).unwrap();
/// assert_eq!((tile.x, tile.y), (1, 1));
///
/// let tile = tile_address(120.0, 30.0, 0).unwrap();
/// assert_eq!((tile.zoom, tile.x, tile.y), (0, 0, 0));
/// ```
pub fn tile_address(lon: f64, lat: f64, zoom: i32) -> Result<TileAddress> {
    let n = tiles_per_axis(zoom)?;

    Ok(TileAddress {
        zoom: zoom as u32,
        x: (world_x(lon) * n).floor() as i64,
        y: (world_y(lat) * n).floor() as i64,
    })
}

/// Compute the pixel inside its tile that a coordinate falls on.
///
/// The fractional world position is scaled to pixels and reduced modulo 256.
/// The remainder keeps the sign of the dividend, so coordinates west of -180°
/// produce negative pixels rather than wrapping.
///
/// # Errors
///
/// Returns [`TerrainError::InvalidZoom`] if `zoom` is negative.
///
/// # Examples
///
/// ```
/// use trgb::tiling::pixel_in_tile;
///
/// let px = pixel_in_tile(0.0, 0.0, 0).unwrap();
/// assert_eq!((px.x, px.y), (128, 128));
/// ```
pub fn pixel_in_tile(lon: f64, lat: f64, zoom: i32) -> Result<PixelCoordinate> {
    let n = tiles_per_axis(zoom)?;
    let size = TILE_SIZE as f64;

    Ok(PixelCoordinate {
        x: (world_x(lon) * n * size % size).floor() as i64,
        y: (world_y(lat) * n * size % size).floor() as i64,
    })
}

/// Check that a coordinate is inside the area Web-Mercator can represent.
///
/// # Examples
///
/// ```
/// use trgb::tiling::is_valid_mercator_coord;
///
/// assert!(is_valid_mercator_coord(120.0, 30.0));
/// assert!(!is_valid_mercator_coord(0.0, 89.0));
/// ```
pub fn is_valid_mercator_coord(lon: f64, lat: f64) -> bool {
    (-MAX_MERCATOR_LAT..=MAX_MERCATOR_LAT).contains(&lat) && (-180.0..=180.0).contains(&lon)
}

impl TileAddress {
    /// Create a tile address without validating the column/row range.
    pub fn new(zoom: u32, x: i64, y: i64) -> Self {
        Self { zoom, x, y }
    }

    /// Returns `true` if `x` and `y` are within `[0, 2^zoom)`.
    pub fn is_valid(&self) -> bool {
        let n = 1i64.checked_shl(self.zoom).unwrap_or(i64::MAX);
        (0..n).contains(&self.x) && (0..n).contains(&self.y)
    }

    /// Geographic coordinate of the tile's centre.
    pub fn center(&self) -> GeoCoordinate {
        let n = 2f64.powi(i32::try_from(self.zoom).unwrap_or(i32::MAX));
        let fx = (self.x as f64 + 0.5) / n;
        let fy = (self.y as f64 + 0.5) / n;

        GeoCoordinate {
            lon: fx * 360.0 - 180.0,
            lat: (PI * (1.0 - 2.0 * fy)).sinh().atan() * 180.0 / PI,
        }
    }

    /// Relative path of this tile in an XYZ directory layout.
    ///
    /// # Examples
    ///
    /// ```
    /// use trgb::tiling::TileAddress;
    ///
    /// assert_eq!(TileAddress::new(12, 3370, 1552).path("png"), "12/3370/1552.png");
    /// ```
    pub fn path(&self, ext: &str) -> String {
        format!("{}/{}/{}.{}", self.zoom, self.x, self.y, ext)
    }

    /// Parse a `{z}/{x}/{y}` path.
    ///
    /// Leading directories and a single trailing extension are ignored, and both
    /// `/` and `\` are accepted as separators. A file stem that is not a whole
    /// integer (`4.5.png`) does not parse.
    ///
    /// # Examples
    ///
    /// ```
    /// use trgb::tiling::TileAddress;
    ///
    /// assert_eq!(TileAddress::parse("12/3370/1552.png"), Some(TileAddress::new(12, 3370, 1552)));
    /// assert_eq!(TileAddress::parse("/data/tiles/3/6/3"), Some(TileAddress::new(3, 6, 3)));
    /// assert_eq!(TileAddress::parse("invalid"), None);
    /// ```
    pub fn parse(path: &str) -> Option<Self> {
        let mut parts = path.rsplit(['/', '\\']).filter(|p| !p.is_empty());

        let y_part = parts.next()?;
        let y_part = y_part.rsplit_once('.').map_or(y_part, |(stem, _)| stem);
        let x_part = parts.next()?;
        let z_part = parts.next()?;

        Some(Self {
            zoom: z_part.parse().ok()?,
            x: x_part.parse().ok()?,
            y: y_part.parse().ok()?,
        })
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

impl FromStr for TileAddress {
    type Err = TerrainError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| TerrainError::InvalidTilePath {
            path: s.to_string(),
        })
    }
}
