//! Bicubic Bezier patches sampled onto regular grids.
//!
//! A [`BezierPatch`] is a 4×4 grid of control points `(x, y, value)` laid out
//! on a rectilinear lattice. Sampling evaluates the tensor-product surface in
//! two passes: every control row is interpolated along x, then the row
//! results are interpolated down each column along y.
//!
//! # Example
//!
//! ```
//! use glam::Vec3;
//! use rhizome_resin_surface::interpolate;
//!
//! let mut points = [[Vec3::ZERO; 4]; 4];
//! for (row, y) in [0.0, 1.0, 2.0, 3.0].into_iter().enumerate() {
//!     for (col, x) in [0.0, 1.0, 2.0, 3.0].into_iter().enumerate() {
//!         points[row][col] = Vec3::new(x, y, x + y);
//!     }
//! }
//!
//! let grid = interpolate(points, 7).unwrap();
//! assert_eq!(grid.get(0, 0), 0.0);
//! assert_eq!(grid.get(6, 6), 6.0);
//! ```

use glam::{Vec2, Vec3};
use thiserror::Error;

mod curve;

pub use curve::{CubicBezier, evenly_spaced};

/// Errors that can occur while building or sampling a patch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    /// Control points do not lie on a strictly increasing rectilinear lattice.
    #[error("invalid patch: {0}")]
    InvalidPatch(String),

    /// Fewer samples were requested than there are control rows.
    #[error("at least 4 samples per axis are required, got {0}")]
    TooFewSamples(usize),
}

/// Maps a control index in `0..4` to its sample index in an `n`-sample axis.
///
/// The inner control rows sit right next to the patch border
/// (`{0, 1, n-2, n-1}`), which keeps the interior of the surface flat.
pub fn control_sample_index(k: usize, n: usize) -> usize {
    match k {
        0 => 0,
        1 => 1,
        2 => n - 2,
        _ => n - 1,
    }
}

/// A square grid of scalar samples in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    size: usize,
    values: Vec<f32>,
}

impl SampleGrid {
    /// Creates a zero-filled grid with `size × size` samples.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            values: vec![0.0; size * size],
        }
    }

    /// Returns the number of samples along each axis.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the sample at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.values[row * self.size + col]
    }

    /// Sets the sample at (row, col).
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.values[row * self.size + col] = value;
    }

    /// Returns one row of samples.
    pub fn row(&self, row: usize) -> &[f32] {
        &self.values[row * self.size..(row + 1) * self.size]
    }

    /// Returns all samples in row-major order.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Consumes the grid, returning its samples in row-major order.
    pub fn into_values(self) -> Vec<f32> {
        self.values
    }
}

/// A bicubic Bezier patch over a rectilinear 4×4 control lattice.
///
/// `points[row][col]` holds `(x, y, value)`. Every row shares one y
/// coordinate and every column shares one x coordinate, both strictly
/// increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct BezierPatch {
    points: [[Vec3; 4]; 4],
}

impl BezierPatch {
    /// Creates a patch, validating the control lattice.
    pub fn new(points: [[Vec3; 4]; 4]) -> Result<Self, SurfaceError> {
        for (row, cps) in points.iter().enumerate() {
            if cps.iter().any(|p| p.y != cps[0].y) {
                return Err(SurfaceError::InvalidPatch(format!(
                    "control row {row} does not share one y coordinate"
                )));
            }
        }
        for col in 0..4 {
            if points.iter().any(|cps| cps[col].x != points[0][col].x) {
                return Err(SurfaceError::InvalidPatch(format!(
                    "control column {col} does not share one x coordinate"
                )));
            }
        }
        for k in 0..3 {
            if points[0][k].x >= points[0][k + 1].x {
                return Err(SurfaceError::InvalidPatch(
                    "control x coordinates must be strictly increasing".to_string(),
                ));
            }
            if points[k][0].y >= points[k + 1][0].y {
                return Err(SurfaceError::InvalidPatch(
                    "control y coordinates must be strictly increasing".to_string(),
                ));
            }
        }

        Ok(Self { points })
    }

    /// Returns the control point at (row, col).
    pub fn control_point(&self, row: usize, col: usize) -> Vec3 {
        self.points[row][col]
    }

    /// Returns the (min, max) x coordinate covered by the patch.
    pub fn x_range(&self) -> (f32, f32) {
        (self.points[0][0].x, self.points[0][3].x)
    }

    /// Returns the (min, max) y coordinate covered by the patch.
    pub fn y_range(&self) -> (f32, f32) {
        (self.points[0][0].y, self.points[3][0].y)
    }

    /// Samples the surface on an `n × n` grid spanning the patch.
    ///
    /// Row `i` of the result lies at the `i`-th of `n` evenly spaced y
    /// coordinates, column `j` at the `j`-th evenly spaced x coordinate.
    pub fn sample(&self, n: usize) -> Result<SampleGrid, SurfaceError> {
        if n < 4 {
            return Err(SurfaceError::TooFewSamples(n));
        }

        let (x0, x1) = self.x_range();
        let (y0, y1) = self.y_range();
        let xs = evenly_spaced(x0, x1, n);
        let ys = evenly_spaced(y0, y1, n);

        // Pass 1: interpolate each control row along x. Results are staged
        // in the sample rows their control index maps to.
        let mut staged = SampleGrid::new(n);
        for (k, cps) in self.points.iter().enumerate() {
            let curve = CubicBezier::from_points(cps.map(|p| Vec2::new(p.x, p.z)));
            let row = control_sample_index(k, n);
            for (col, value) in curve.sample_at(&xs).into_iter().enumerate() {
                staged.set(row, col, value);
            }
        }

        // Pass 2: the staged rows, read down each column, are the control
        // values for a curve along y.
        let mut grid = SampleGrid::new(n);
        for col in 0..n {
            let curve = CubicBezier::from_points(std::array::from_fn(|k| {
                Vec2::new(
                    self.points[k][0].y,
                    staged.get(control_sample_index(k, n), col),
                )
            }));
            for (row, value) in curve.sample_at(&ys).into_iter().enumerate() {
                grid.set(row, col, value);
            }
        }

        Ok(grid)
    }
}

/// Validates `points` as a [`BezierPatch`] and samples it on an `n × n` grid.
pub fn interpolate(points: [[Vec3; 4]; 4], n: usize) -> Result<SampleGrid, SurfaceError> {
    BezierPatch::new(points)?.sample(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lattice_points(coords: [f32; 4], value: impl Fn(f32, f32) -> f32) -> [[Vec3; 4]; 4] {
        let mut points = [[Vec3::ZERO; 4]; 4];
        for (row, &y) in coords.iter().enumerate() {
            for (col, &x) in coords.iter().enumerate() {
                points[row][col] = Vec3::new(x, y, value(x, y));
            }
        }
        points
    }

    #[test]
    fn test_control_sample_index() {
        assert_eq!(control_sample_index(0, 10), 0);
        assert_eq!(control_sample_index(1, 10), 1);
        assert_eq!(control_sample_index(2, 10), 8);
        assert_eq!(control_sample_index(3, 10), 9);
    }

    #[test]
    fn test_corners_reproduced_exactly() {
        let points = lattice_points([-0.5, 0.5, 8.5, 9.5], |x, y| 0.3 * x * x - 1.7 * y + 0.1);
        let grid = interpolate(points, 11).unwrap();

        assert_eq!(grid.get(0, 0), points[0][0].z);
        assert_eq!(grid.get(0, 10), points[0][3].z);
        assert_eq!(grid.get(10, 0), points[3][0].z);
        assert_eq!(grid.get(10, 10), points[3][3].z);
    }

    #[test]
    fn test_deterministic() {
        let points = lattice_points([-0.5, 0.5, 3.5, 4.5], |x, y| (x * 1.3).sin() + y);
        let a = interpolate(points, 6).unwrap();
        let b = interpolate(points, 6).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_linear_surface_is_reproduced() {
        // Evenly spaced controls make the coordinate functions linear in t,
        // so a linear value field must come back unchanged.
        let points = lattice_points([0.0, 1.0, 2.0, 3.0], |x, y| 2.0 * x + 3.0 * y);
        let grid = interpolate(points, 7).unwrap();

        for row in 0..7 {
            for col in 0..7 {
                let x = col as f32 * 0.5;
                let y = row as f32 * 0.5;
                assert!((grid.get(row, col) - (2.0 * x + 3.0 * y)).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_constant_surface() {
        let points = lattice_points([-0.5, 0.5, 5.5, 6.5], |_, _| 4.25);
        let grid = interpolate(points, 8).unwrap();
        assert!(grid.values().iter().all(|&v| (v - 4.25).abs() < 1e-5));
    }

    #[test]
    fn test_invalid_patch_rows() {
        let mut points = lattice_points([0.0, 1.0, 2.0, 3.0], |_, _| 0.0);
        points[2][1].y += 0.25;
        assert!(matches!(
            BezierPatch::new(points),
            Err(SurfaceError::InvalidPatch(_))
        ));
    }

    #[test]
    fn test_invalid_patch_columns() {
        let mut points = lattice_points([0.0, 1.0, 2.0, 3.0], |_, _| 0.0);
        points[3][2].x = 5.0;
        assert!(matches!(
            interpolate(points, 5),
            Err(SurfaceError::InvalidPatch(_))
        ));
    }

    #[test]
    fn test_invalid_patch_ordering() {
        let points = lattice_points([0.0, 2.0, 1.0, 3.0], |_, _| 0.0);
        assert!(BezierPatch::new(points).is_err());
    }

    #[test]
    fn test_too_few_samples() {
        let points = lattice_points([0.0, 1.0, 2.0, 3.0], |_, _| 0.0);
        assert_eq!(interpolate(points, 3), Err(SurfaceError::TooFewSamples(3)));
    }

    #[test]
    fn test_sample_grid_rows() {
        let mut grid = SampleGrid::new(3);
        grid.set(1, 2, 7.0);
        assert_eq!(grid.row(1), &[0.0, 0.0, 7.0]);
        assert_eq!(grid.size(), 3);
        assert_eq!(grid.into_values().len(), 9);
    }
}
