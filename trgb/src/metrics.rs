//! Surface metrics from a 3×3 elevation neighbourhood.
//!
//! Slope and aspect use Horn's weighted finite differences. Roughness is the
//! root-mean-square of the absolute height differences between the centre
//! cell and its 8 neighbours.
//!
//! Cells are numbered row-major, north row first:
//!
//! ```text
//! z1 z2 z3
//! z4 z5 z6
//! z7 z8 z9
//! ```

use std::f64::consts::PI;
use std::fmt;

/// Horizontal spacing between grid cells, in meters.
///
/// This is the nominal ground resolution of terrain-RGB tiles at their
/// reference zoom and is applied at every zoom level.
pub const CELL_SIZE_M: f64 = 30.0;

/// Compass octant the surface faces, clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Aspect {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Aspect {
    const ALL: [Aspect; 8] = [
        Aspect::North,
        Aspect::NorthEast,
        Aspect::East,
        Aspect::SouthEast,
        Aspect::South,
        Aspect::SouthWest,
        Aspect::West,
        Aspect::NorthWest,
    ];

    /// Bucket an aspect angle in degrees into one of the 8 octants.
    ///
    /// Each octant spans 45° centred on its compass direction, so north covers
    /// `[337.5, 360) ∪ [0, 22.5)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use trgb::Aspect;
    ///
    /// assert_eq!(Aspect::from_degrees(0.0), Aspect::North);
    /// assert_eq!(Aspect::from_degrees(180.0), Aspect::South);
    /// assert_eq!(Aspect::from_degrees(350.0), Aspect::North);
    /// ```
    pub fn from_degrees(degrees: f64) -> Self {
        let index = (((degrees + 22.5) % 360.0) / 45.0).floor() as usize;
        Self::ALL[index.min(7)]
    }

    /// Short English label ("N", "NE", ...).
    pub fn label(&self) -> &'static str {
        match self {
            Aspect::North => "N",
            Aspect::NorthEast => "NE",
            Aspect::East => "E",
            Aspect::SouthEast => "SE",
            Aspect::South => "S",
            Aspect::SouthWest => "SW",
            Aspect::West => "W",
            Aspect::NorthWest => "NW",
        }
    }

    /// Chinese label as shown on the map info panel.
    pub fn label_zh(&self) -> &'static str {
        match self {
            Aspect::North => "北",
            Aspect::NorthEast => "东北",
            Aspect::East => "东",
            Aspect::SouthEast => "东南",
            Aspect::South => "南",
            Aspect::SouthWest => "西南",
            Aspect::West => "西",
            Aspect::NorthWest => "西北",
        }
    }
}

impl fmt::Display for Aspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A 3×3 window of elevations in meters, row-major, centre at index 4.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationGrid(pub [f64; 9]);

impl ElevationGrid {
    /// Elevation of the centre cell (z5).
    pub fn center(&self) -> f64 {
        self.0[4]
    }

    /// Horn gradient `(dx, dy)` for the given cell size.
    pub fn gradient(&self, cell_size: f64) -> (f64, f64) {
        let [z1, z2, z3, z4, _, z6, z7, z8, z9] = self.0;

        let dx = ((z3 + 2.0 * z6 + z9) - (z1 + 2.0 * z4 + z7)) / (8.0 * cell_size);
        let dy = ((z7 + 2.0 * z8 + z9) - (z1 + 2.0 * z2 + z3)) / (8.0 * cell_size);

        (dx, dy)
    }

    /// Slope in degrees, 0 = flat.
    pub fn slope(&self, cell_size: f64) -> f64 {
        let (dx, dy) = self.gradient(cell_size);
        (dx * dx + dy * dy).sqrt().atan() * 180.0 / PI
    }

    /// Aspect in degrees, `[0, 360)`.
    ///
    /// A flat grid has no defined direction. Its gradient is `(+0, +0)`, so the
    /// angle is `atan2(+0, -0) = 180°` and the label is south.
    pub fn aspect_degrees(&self, cell_size: f64) -> f64 {
        let (dx, dy) = self.gradient(cell_size);
        (dy.atan2(-dx) * 180.0 / PI + 360.0) % 360.0
    }

    /// Root-mean-square of `|zi - z5|` over the 8 neighbours.
    pub fn roughness(&self) -> f64 {
        let center = self.center();
        let sum_sq: f64 = self
            .0
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 4)
            .map(|(_, z)| (z - center).abs().powi(2))
            .sum();

        (sum_sq / 8.0).sqrt()
    }

    /// Compute all surface metrics with the standard [`CELL_SIZE_M`] spacing.
    pub fn metrics(&self) -> SurfaceMetrics {
        self.metrics_with_cell_size(CELL_SIZE_M)
    }

    /// Compute all surface metrics with a custom cell spacing.
    pub fn metrics_with_cell_size(&self, cell_size: f64) -> SurfaceMetrics {
        let aspect_degrees = self.aspect_degrees(cell_size);

        SurfaceMetrics {
            slope: self.slope(cell_size),
            aspect_degrees,
            aspect: Aspect::from_degrees(aspect_degrees),
            roughness: self.roughness(),
        }
    }
}

/// Slope, aspect and roughness derived from one [`ElevationGrid`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMetrics {
    /// Slope in degrees.
    pub slope: f64,
    /// Aspect angle in degrees, `[0, 360)`.
    pub aspect_degrees: f64,
    /// Aspect bucketed into a compass octant.
    pub aspect: Aspect,
    /// RMS height difference to the neighbours, in meters.
    pub roughness: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_grid() {
        let grid = ElevationGrid([512.3; 9]);
        let m = grid.metrics();

        assert_eq!(m.slope, 0.0);
        assert_eq!(m.roughness, 0.0);
        assert!((m.aspect_degrees - 180.0).abs() < 1e-9);
        assert_eq!(m.aspect, Aspect::South);
    }

    #[test]
    fn test_west_to_east_ramp() {
        let grid = ElevationGrid([0.0, 50.0, 100.0, 0.0, 50.0, 100.0, 0.0, 50.0, 100.0]);

        // (100 + 200 + 100) / (8 * 30)
        let (dx, dy) = grid.gradient(CELL_SIZE_M);
        assert!((dx - 400.0 / 240.0).abs() < 1e-12);
        assert_eq!(dy, 0.0);

        let m = grid.metrics();
        assert!((m.slope - (400.0f64 / 240.0).atan().to_degrees()).abs() < 1e-9);
        assert!((m.slope - 59.04).abs() < 0.01);
        assert!((m.aspect_degrees - 180.0).abs() < 1e-9);
        assert_eq!(m.aspect, Aspect::South);
        assert_eq!(m.aspect.label_zh(), "南");
    }

    #[test]
    fn test_ramp_ignores_centre_column_for_dx() {
        // Horn's dx only reads the outer columns.
        let a = ElevationGrid([0.0, 0.0, 100.0, 0.0, 0.0, 100.0, 0.0, 0.0, 100.0]);
        let b = ElevationGrid([0.0, 70.0, 100.0, 0.0, -5.0, 100.0, 0.0, 20.0, 100.0]);
        assert_eq!(a.gradient(CELL_SIZE_M).0, b.gradient(CELL_SIZE_M).0);
    }

    #[test]
    fn test_north_to_south_ramp() {
        // South row higher: dy > 0, atan2(dy, 0) = 90°
        let grid = ElevationGrid([0.0, 0.0, 0.0, 30.0, 30.0, 30.0, 60.0, 60.0, 60.0]);
        let m = grid.metrics();

        assert!((m.aspect_degrees - 90.0).abs() < 1e-9);
        assert_eq!(m.aspect, Aspect::East);
        assert!((m.slope - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_roughness_population_rms() {
        let mut cells = [10.0; 9];
        cells[0] = 18.0;
        let grid = ElevationGrid(cells);

        // One neighbour differs by 8: sqrt(64 / 8)
        assert!((grid.roughness() - 8.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_roughness_ignores_sign() {
        let up = ElevationGrid([5.0, 5.0, 5.0, 5.0, 0.0, 5.0, 5.0, 5.0, 5.0]);
        let down = ElevationGrid([-5.0, -5.0, -5.0, -5.0, 0.0, -5.0, -5.0, -5.0, -5.0]);
        assert_eq!(up.roughness(), 5.0);
        assert_eq!(down.roughness(), 5.0);
    }

    #[test]
    fn test_custom_cell_size() {
        let grid = ElevationGrid([0.0, 50.0, 100.0, 0.0, 50.0, 100.0, 0.0, 50.0, 100.0]);
        let m = grid.metrics_with_cell_size(100.0);
        assert!((m.slope - 0.5f64.atan().to_degrees()).abs() < 1e-9);
    }

    #[test]
    fn test_aspect_buckets() {
        assert_eq!(Aspect::from_degrees(0.0), Aspect::North);
        assert_eq!(Aspect::from_degrees(22.4), Aspect::North);
        assert_eq!(Aspect::from_degrees(22.5), Aspect::NorthEast);
        assert_eq!(Aspect::from_degrees(90.0), Aspect::East);
        assert_eq!(Aspect::from_degrees(202.5), Aspect::SouthWest);
        assert_eq!(Aspect::from_degrees(292.4), Aspect::West);
        assert_eq!(Aspect::from_degrees(337.5), Aspect::North);
        assert_eq!(Aspect::from_degrees(359.9), Aspect::North);
    }

    #[test]
    fn test_aspect_labels() {
        assert_eq!(Aspect::NorthEast.label(), "NE");
        assert_eq!(Aspect::East.label_zh(), "东");
        assert_eq!(Aspect::NorthWest.to_string(), "NW");
    }
}
