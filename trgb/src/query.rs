//! Terrain queries against a single raster tile.
//!
//! [`query`] is the main entry point: it locates a coordinate inside a
//! terrain-RGB tile, decodes the 3×3 neighbourhood around it and derives
//! surface metrics from that neighbourhood.
//!
//! # Tile edges
//!
//! Neighbours that fall outside the tile are filled with 0 m rather than
//! sampled from the adjacent tile or replicated from the edge. Points on the
//! outer ring of pixels therefore report inflated slope and roughness.

use tracing::debug;

use crate::error::{Result, TerrainError};
use crate::metrics::{Aspect, ElevationGrid};
use crate::tile::RasterTile;
use crate::tiling::{pixel_in_tile, tile_address, GeoCoordinate, PixelCoordinate, TileAddress};

/// Elevation used for neighbours outside the tile raster.
pub const EDGE_FILL_ELEVATION: f64 = 0.0;

/// Elevation and surface metrics at one queried coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainSample {
    /// Elevation of the queried pixel, in meters.
    pub elevation: f64,
    /// Longitude as supplied by the caller.
    pub lon: f64,
    /// Latitude as supplied by the caller.
    pub lat: f64,
    /// Slope in degrees.
    pub slope: f64,
    /// Compass octant of the aspect.
    pub aspect: Aspect,
    /// Aspect angle in degrees, `[0, 360)`.
    pub aspect_degrees: f64,
    /// RMS height difference to the 8 neighbours, in meters.
    pub roughness: f64,
    /// Tile the coordinate falls in.
    pub tile: TileAddress,
    /// Pixel inside the tile.
    pub pixel: PixelCoordinate,
}

/// Decode the 3×3 elevation grid centred on `center`.
///
/// The centre pixel must be inside the tile. Neighbours outside the tile are
/// set to [`EDGE_FILL_ELEVATION`].
///
/// # Errors
///
/// Returns [`TerrainError::OutOfBounds`] if the centre pixel is outside the tile.
pub fn sample_grid(tile: &RasterTile, center: PixelCoordinate) -> Result<ElevationGrid> {
    let mut cells = [EDGE_FILL_ELEVATION; 9];
    cells[4] = tile.decode(center)?;

    for (i, cell) in cells.iter_mut().enumerate() {
        if i == 4 {
            continue;
        }

        let dx = (i % 3) as i64 - 1;
        let dy = (i / 3) as i64 - 1;
        let neighbour = center.offset(dx, dy);

        if neighbour.in_tile() {
            *cell = tile.decode(neighbour)?;
        }
    }

    Ok(ElevationGrid(cells))
}

/// Query elevation and surface metrics at a coordinate.
///
/// `tile` must be the tile that contains the coordinate at `zoom`; only the
/// pixel offset is derived from the coordinate.
///
/// # Errors
///
/// Returns an error if:
/// - `zoom` is negative ([`TerrainError::InvalidZoom`])
/// - The coordinate maps outside the tile raster ([`TerrainError::OutOfBounds`])
/// - The decoded centre elevation is not finite ([`TerrainError::InvalidElevation`])
///
/// # Example
///
/// ```
/// use trgb::{query, RasterTile};
/// use trgb::tile::encode_elevation;
///
/// let tile = RasterTile::filled(encode_elevation(1200.0));
/// let sample = query(0.0, 0.0, 0, &tile).unwrap();
///
/// assert!((sample.elevation - 1200.0).abs() < 1e-6);
/// assert_eq!(sample.slope, 0.0);
/// ```
pub fn query(lon: f64, lat: f64, zoom: i32, tile: &RasterTile) -> Result<TerrainSample> {
    let address = tile_address(lon, lat, zoom)?;
    let pixel = pixel_in_tile(lon, lat, zoom)?;

    let grid = sample_grid(tile, pixel)?;
    let metrics = grid.metrics();

    let elevation = grid.center();
    if !elevation.is_finite() {
        return Err(TerrainError::InvalidElevation { value: elevation });
    }

    debug!(
        lon,
        lat,
        zoom,
        tile = %address,
        px = pixel.x,
        py = pixel.y,
        elevation,
        slope = metrics.slope,
        "Terrain query"
    );

    Ok(TerrainSample {
        elevation,
        lon,
        lat,
        slope: metrics.slope,
        aspect: metrics.aspect,
        aspect_degrees: metrics.aspect_degrees,
        roughness: metrics.roughness,
        tile: address,
        pixel,
    })
}

/// Query several coordinates against the same tile.
///
/// Results are returned in input order, one per coordinate.
pub fn query_batch(
    coords: &[GeoCoordinate],
    zoom: i32,
    tile: &RasterTile,
) -> Vec<Result<TerrainSample>> {
    coords
        .iter()
        .map(|c| query(c.lon, c.lat, zoom, tile))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tile::encode_elevation;

    /// Tile whose elevation rises 10 m per pixel eastward.
    fn eastward_ramp() -> RasterTile {
        RasterTile::from_fn(|x, _| 1000.0 + x as f64 * 10.0)
    }

    /// Longitude/latitude landing on pixel `(x, y)` of the single z=0 tile.
    fn coord_for_pixel(x: u32, y: u32) -> (f64, f64) {
        let tile = TileAddress::new(8, x as i64, y as i64);
        let c = tile.center();
        (c.lon, c.lat)
    }

    #[test]
    fn test_query_flat_tile() {
        let tile = RasterTile::filled(encode_elevation(250.0));
        let sample = query(10.0, 20.0, 0, &tile).unwrap();

        assert!((sample.elevation - 250.0).abs() < 1e-6);
        assert_eq!(sample.lon, 10.0);
        assert_eq!(sample.lat, 20.0);
        assert_eq!(sample.slope, 0.0);
        assert_eq!(sample.roughness, 0.0);
        assert_eq!(sample.tile, TileAddress::new(0, 0, 0));
    }

    #[test]
    fn test_query_ramp() {
        let tile = eastward_ramp();
        let (lon, lat) = coord_for_pixel(100, 100);
        let sample = query(lon, lat, 0, &tile).unwrap();

        assert_eq!(sample.pixel, PixelCoordinate::new(100, 100));
        assert!((sample.elevation - 2000.0).abs() < 1e-6);

        // (4 * 20 m) / (8 * 30 m)
        let expected_slope = (80.0f64 / 240.0).atan().to_degrees();
        assert!((sample.slope - expected_slope).abs() < 1e-6);
        assert_eq!(sample.aspect, Aspect::South);

        // Six neighbours differ by 10 m, two by 0 m
        assert!((sample.roughness - (600.0f64 / 8.0).sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_metrics_come_from_same_grid() {
        let tile = eastward_ramp();
        let (lon, lat) = coord_for_pixel(40, 200);
        let sample = query(lon, lat, 0, &tile).unwrap();

        let grid = sample_grid(&tile, sample.pixel).unwrap();
        let metrics = grid.metrics();
        assert_eq!(sample.elevation, grid.center());
        assert_eq!(sample.slope, metrics.slope);
        assert_eq!(sample.aspect, metrics.aspect);
        assert_eq!(sample.roughness, metrics.roughness);
    }

    #[test]
    fn test_edge_zero_fill() {
        let tile = RasterTile::filled(encode_elevation(500.0));

        let grid = sample_grid(&tile, PixelCoordinate::new(0, 128)).unwrap();
        assert_eq!(grid.0[0], EDGE_FILL_ELEVATION);
        assert_eq!(grid.0[3], EDGE_FILL_ELEVATION);
        assert_eq!(grid.0[6], EDGE_FILL_ELEVATION);
        assert!((grid.0[2] - 500.0).abs() < 1e-6);

        let grid = sample_grid(&tile, PixelCoordinate::new(255, 255)).unwrap();
        assert_eq!(grid.0[8], EDGE_FILL_ELEVATION);
        assert_eq!(grid.0[5], EDGE_FILL_ELEVATION);
        assert!((grid.0[0] - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_edge_roughness_differs_from_interior() {
        let tile = RasterTile::filled(encode_elevation(500.0));

        let (lon, lat) = coord_for_pixel(0, 128);
        let left_edge = query(lon, lat, 0, &tile).unwrap();
        let (lon, lat) = coord_for_pixel(128, 255);
        let bottom_edge = query(lon, lat, 0, &tile).unwrap();
        let (lon, lat) = coord_for_pixel(128, 128);
        let interior = query(lon, lat, 0, &tile).unwrap();

        assert_eq!(left_edge.pixel.x, 0);
        assert_eq!(bottom_edge.pixel.y, 255);
        assert_eq!(interior.roughness, 0.0);
        assert!(left_edge.roughness > 0.0);
        assert!(bottom_edge.roughness > 0.0);
        assert_ne!(left_edge.roughness, interior.roughness);

        // Three of eight neighbours zero-filled, each 500 m below the centre
        let expected = (3.0 * 500.0f64.powi(2) / 8.0).sqrt();
        assert!((left_edge.roughness - expected).abs() < 1e-6);
    }

    #[test]
    fn test_center_out_of_bounds() {
        let tile = RasterTile::filled(encode_elevation(0.0));
        assert!(matches!(
            sample_grid(&tile, PixelCoordinate::new(-1, 10)),
            Err(TerrainError::OutOfBounds { x: -1, y: 10 })
        ));

        // West of the antimeridian the pixel offset goes negative
        assert!(matches!(
            query(-180.5, 0.0, 3, &tile),
            Err(TerrainError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_invalid_zoom() {
        let tile = RasterTile::filled(encode_elevation(0.0));
        assert!(matches!(
            query(0.0, 0.0, -1, &tile),
            Err(TerrainError::InvalidZoom { zoom: -1 })
        ));
        assert!(query(0.0, 0.0, 0, &tile).is_ok());
    }

    #[test]
    fn test_query_batch_preserves_order() {
        let tile = eastward_ramp();
        let coords: Vec<GeoCoordinate> = [10, 200, 55]
            .iter()
            .map(|&x| {
                let (lon, lat) = coord_for_pixel(x, 50);
                GeoCoordinate::new(lon, lat)
            })
            .collect();

        let results = query_batch(&coords, 0, &tile);
        assert_eq!(results.len(), 3);

        let xs: Vec<i64> = results.iter().map(|r| r.as_ref().unwrap().pixel.x).collect();
        assert_eq!(xs, vec![10, 200, 55]);
    }
}
