//! Terrain-RGB raster tiles and elevation decoding.
//!
//! This module provides the [`RasterTile`] struct holding one 256×256 RGBA
//! tile and decoding the elevation stored in each pixel.
//!
//! # Encoding
//!
//! Each pixel packs a fixed-point elevation into its colour channels:
//!
//! ```text
//! elevation = -10000 + (R × 65536 + G × 256 + B) × 0.1
//! ```
//!
//! giving 0.1 m resolution from -10000 m up to about 1667721 m. The alpha
//! channel is ignored.

use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use image::ImageFormat;
use memmap2::Mmap;

use crate::error::{Result, TerrainError};
use crate::tiling::{PixelCoordinate, TILE_SIZE};

/// Bytes per pixel (R, G, B, A).
pub const BYTES_PER_PIXEL: usize = 4;

/// Byte length of a raw RGBA tile: 256 × 256 × 4.
pub const TILE_BYTES: usize = TILE_SIZE as usize * TILE_SIZE as usize * BYTES_PER_PIXEL;

/// Elevation encoded by RGB (0, 0, 0).
pub const BASE_ELEVATION: f64 = -10000.0;

/// Elevation step per encoded unit, in meters.
pub const ELEVATION_INTERVAL: f64 = 0.1;

/// Largest value that fits in the 24-bit RGB triplet.
const MAX_ENCODED: u32 = 0x00FF_FFFF;

/// Decode an RGB triplet into an elevation in meters.
///
/// # Examples
///
/// ```
/// use trgb::tile::decode_rgb;
///
/// assert_eq!(decode_rgb(0, 0, 0), -10000.0);
/// assert_eq!(decode_rgb(1, 134, 160), 0.0);
/// ```
pub fn decode_rgb(r: u8, g: u8, b: u8) -> f64 {
    let encoded = (r as u32) << 16 | (g as u32) << 8 | b as u32;
    BASE_ELEVATION + encoded as f64 * ELEVATION_INTERVAL
}

/// Encode an elevation in meters as an RGB triplet.
///
/// The value is rounded to the nearest 0.1 m and clamped to the representable
/// range.
///
/// # Examples
///
/// ```
/// use trgb::tile::{decode_rgb, encode_elevation};
///
/// let [r, g, b] = encode_elevation(3776.2);
/// assert!((decode_rgb(r, g, b) - 3776.2).abs() < 1e-6);
/// ```
pub fn encode_elevation(elevation: f64) -> [u8; 3] {
    let units = ((elevation - BASE_ELEVATION) / ELEVATION_INTERVAL).round();
    let encoded = units.clamp(0.0, MAX_ENCODED as f64) as u32;

    [
        (encoded >> 16 & 0xFF) as u8,
        (encoded >> 8 & 0xFF) as u8,
        (encoded & 0xFF) as u8,
    ]
}

/// Backing storage of a tile.
enum TileData {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for TileData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            TileData::Owned(bytes) => bytes,
            TileData::Mapped(mmap) => mmap,
        }
    }
}

/// A read-only 256×256 terrain-RGB tile.
///
/// Pixels are stored row-major with 4 bytes each (R, G, B, A); row 0 is the
/// north edge.
///
/// # Example
///
/// ```ignore
/// use trgb::RasterTile;
///
/// let tile = RasterTile::from_file("tiles/12/3415/1686.png")?;
/// let elevation = tile.decode_pixel(25, 77)?;
/// println!("Elevation: {:.1}m", elevation);
/// ```
pub struct RasterTile {
    data: TileData,
}

impl RasterTile {
    /// Wrap a raw RGBA buffer.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::InvalidTileSize`] unless the buffer is exactly
    /// 262144 bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() != TILE_BYTES {
            return Err(TerrainError::InvalidTileSize { size: bytes.len() });
        }

        Ok(Self {
            data: TileData::Owned(bytes),
        })
    }

    /// Decode a PNG-encoded tile held in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the PNG cannot be decoded or is not 256×256.
    pub fn from_png_bytes(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.to_rgba8();

        let (width, height) = image.dimensions();
        if width != TILE_SIZE || height != TILE_SIZE {
            return Err(TerrainError::InvalidDimensions { width, height });
        }

        Self::from_bytes(image.into_raw())
    }

    /// Load a tile from disk.
    ///
    /// Files ending in `.png` or `.pngraw` are decoded as PNG. Anything else is
    /// memory-mapped and treated as a raw RGBA dump.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be opened, read or memory-mapped
    /// - The PNG cannot be decoded or is not 256×256
    /// - A raw file is not exactly 262144 bytes
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png") || e.eq_ignore_ascii_case("pngraw"));

        if is_png {
            let bytes = std::fs::read(path)?;
            return Self::from_png_bytes(&bytes);
        }

        let file = File::open(path)?;

        // SAFETY: Memory mapping is safe as long as the file is not modified
        // while mapped. We open the file read-only and don't expose the mapping.
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() != TILE_BYTES {
            return Err(TerrainError::InvalidTileSize { size: mmap.len() });
        }

        Ok(Self {
            data: TileData::Mapped(mmap),
        })
    }

    /// Build a tile where every pixel encodes the same RGB triplet.
    pub fn filled(rgb: [u8; 3]) -> Self {
        let mut bytes = Vec::with_capacity(TILE_BYTES);
        for _ in 0..TILE_BYTES / BYTES_PER_PIXEL {
            bytes.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
        }

        Self {
            data: TileData::Owned(bytes),
        }
    }

    /// Build a tile from an elevation function of `(x, y)`.
    pub fn from_fn(mut elevation: impl FnMut(u32, u32) -> f64) -> Self {
        let mut bytes = Vec::with_capacity(TILE_BYTES);
        for y in 0..TILE_SIZE {
            for x in 0..TILE_SIZE {
                let [r, g, b] = encode_elevation(elevation(x, y));
                bytes.extend_from_slice(&[r, g, b, 255]);
            }
        }

        Self {
            data: TileData::Owned(bytes),
        }
    }

    /// Decode the elevation at pixel `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::OutOfBounds`] if either axis is outside `[0, 256)`.
    pub fn decode_pixel(&self, x: i64, y: i64) -> Result<f64> {
        if !PixelCoordinate::new(x, y).in_tile() {
            return Err(TerrainError::OutOfBounds { x, y });
        }

        let offset = (y as usize * TILE_SIZE as usize + x as usize) * BYTES_PER_PIXEL;
        let px = &self.data[offset..offset + 3];

        Ok(decode_rgb(px[0], px[1], px[2]))
    }

    /// Decode the elevation at a pixel coordinate.
    pub fn decode(&self, pixel: PixelCoordinate) -> Result<f64> {
        self.decode_pixel(pixel.x, pixel.y)
    }

    /// Minimum and maximum decoded elevation over the whole tile.
    pub fn elevation_range(&self) -> (f64, f64) {
        self.data
            .chunks_exact(BYTES_PER_PIXEL)
            .map(|px| decode_rgb(px[0], px[1], px[2]))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), e| {
                (min.min(e), max.max(e))
            })
    }

    /// Raw RGBA bytes of the tile.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Raw tile with a known pixel at (10, 20) and one at the last pixel.
    fn create_test_bytes() -> Vec<u8> {
        let mut data = vec![0u8; TILE_BYTES];

        // (10, 20) = 0x01 0x86 0xA0 -> 100000 units -> 0m
        let offset = (20 * 256 + 10) * 4;
        data[offset..offset + 4].copy_from_slice(&[0x01, 0x86, 0xA0, 0xFF]);

        // (255, 255) = 0x01 0xE7 0x6D -> 124781 units -> 2478.1m
        let offset = TILE_BYTES - 4;
        data[offset..offset + 4].copy_from_slice(&[0x01, 0xE7, 0x6D, 0x00]);

        data
    }

    #[test]
    fn test_decode_rgb_formula() {
        // All of R and G, a spread of B values.
        for r in 0..=255u8 {
            for g in 0..=255u8 {
                for b in (0..=255u8).step_by(17) {
                    let expected =
                        -10000.0 + (r as f64 * 65536.0 + g as f64 * 256.0 + b as f64) * 0.1;
                    assert_eq!(decode_rgb(r, g, b), expected, "rgb=({r},{g},{b})");
                }
            }
        }
    }

    #[test]
    fn test_decode_extremes() {
        assert_eq!(decode_rgb(0, 0, 0), -10000.0);
        assert_eq!(decode_rgb(1, 134, 160), 0.0);
        assert!((decode_rgb(255, 255, 255) - 1_667_721.5).abs() < 1e-6);
    }

    #[test]
    fn test_encode_decode() {
        for elevation in [-10000.0, -432.1, 0.0, 8848.8, 3776.2] {
            let [r, g, b] = encode_elevation(elevation);
            assert!((decode_rgb(r, g, b) - elevation).abs() < 1e-6);
        }

        // Clamped to the representable range
        assert_eq!(encode_elevation(-20000.0), [0, 0, 0]);
        assert_eq!(encode_elevation(2.0e6), [255, 255, 255]);
    }

    #[test]
    fn test_from_bytes_invalid_size() {
        let result = RasterTile::from_bytes(vec![0u8; 1000]);
        if let Err(TerrainError::InvalidTileSize { size }) = result {
            assert_eq!(size, 1000);
        } else {
            panic!("Expected InvalidTileSize error");
        }
    }

    #[test]
    fn test_decode_pixel_known_values() {
        let tile = RasterTile::from_bytes(create_test_bytes()).unwrap();

        assert_eq!(tile.decode_pixel(10, 20).unwrap(), 0.0);
        assert!((tile.decode_pixel(255, 255).unwrap() - 2478.1).abs() < 1e-9);
        assert_eq!(tile.decode_pixel(0, 0).unwrap(), -10000.0);
    }

    #[test]
    fn test_decode_pixel_out_of_bounds() {
        let tile = RasterTile::filled([1, 134, 160]);

        for (x, y) in [(-1, 0), (0, -1), (256, 0), (0, 256), (1000, 1000)] {
            assert!(matches!(
                tile.decode_pixel(x, y),
                Err(TerrainError::OutOfBounds { .. })
            ));
        }
    }

    #[test]
    fn test_decode_does_not_mutate() {
        let bytes = create_test_bytes();
        let tile = RasterTile::from_bytes(bytes.clone()).unwrap();
        let _ = tile.decode_pixel(10, 20).unwrap();
        let _ = tile.elevation_range();
        assert_eq!(tile.as_bytes(), bytes.as_slice());
    }

    #[test]
    fn test_from_raw_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&create_test_bytes()).unwrap();

        let tile = RasterTile::from_file(file.path()).unwrap();
        assert_eq!(tile.decode_pixel(10, 20).unwrap(), 0.0);
    }

    #[test]
    fn test_from_raw_file_invalid_size() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 512]).unwrap();

        assert!(matches!(
            RasterTile::from_file(file.path()),
            Err(TerrainError::InvalidTileSize { size: 512 })
        ));
    }

    #[test]
    fn test_from_png_file() {
        let source = RasterTile::from_fn(|x, y| (x + y) as f64);
        let image = image::RgbaImage::from_raw(256, 256, source.as_bytes().to_vec()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tile.png");
        image.save_with_format(&path, ImageFormat::Png).unwrap();

        let tile = RasterTile::from_file(&path).unwrap();
        assert_eq!(tile.as_bytes(), source.as_bytes());
        assert!((tile.decode_pixel(100, 20).unwrap() - 120.0).abs() < 1e-6);
    }

    #[test]
    fn test_png_wrong_dimensions() {
        let image = image::RgbaImage::new(512, 512);
        let mut bytes = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();

        assert!(matches!(
            RasterTile::from_png_bytes(&bytes),
            Err(TerrainError::InvalidDimensions {
                width: 512,
                height: 512
            })
        ));
    }

    #[test]
    fn test_elevation_range() {
        let tile = RasterTile::from_fn(|x, _| x as f64 * 10.0);
        let (min, max) = tile.elevation_range();
        assert!(min.abs() < 1e-6);
        assert!((max - 2550.0).abs() < 1e-6);
    }
}
