//! Flow tiles: velocity fields derived from an interpolated stream function.

use crate::error::FlowError;
use crate::flux::{CornerVelocity, Flux};
use glam::{Vec2, Vec3};
use rhizome_resin_surface::interpolate;

/// Distance in grid units within which a query snaps to an exact sample.
const GRID_TOLERANCE: f32 = 1e-4;

/// A divergence-free 2D velocity field over one lattice cell.
///
/// The tile has `resolution × resolution` velocity samples. Sample `(i, j)`
/// sits at column `i` and row `j`, with `j` counted up from the bottom edge.
/// Velocities are derived from a stream function ψ defined on the
/// `(resolution + 1)²` points halfway between samples:
///
/// ```text
/// vx = -∂ψ/∂y    vy = ∂ψ/∂x
/// ```
///
/// so the discrete divergence around every stream point is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamField {
    resolution: usize,
    flux: Flux,
    corners: CornerVelocity,
    /// Row-major from the bottom row: index `j * resolution + i`.
    velocities: Vec<Vec2>,
}

impl StreamField {
    /// Builds a tile from its edge fluxes and corner velocities.
    ///
    /// The right-edge flux is implied by the other three edges and is not
    /// read, so an unbalanced `flux` still produces a tile (with a warning).
    pub fn new(resolution: usize, flux: Flux, corners: CornerVelocity) -> Result<Self, FlowError> {
        if resolution < 3 {
            return Err(FlowError::Configuration(format!(
                "tile resolution must be at least 3, got {resolution}"
            )));
        }
        if !flux.is_balanced() {
            tracing::warn!(
                ?flux,
                net_outflow = flux.net_outflow(),
                "building flow tile from unbalanced flux"
            );
        }

        let stream = stream_function(resolution, &flux, &corners)?;
        let velocities = velocity_grid(resolution, &stream);

        Ok(Self {
            resolution,
            flux,
            corners,
            velocities,
        })
    }

    /// Builds the still tile: zero flux and zero corner velocities.
    pub fn zero(resolution: usize) -> Result<Self, FlowError> {
        Self::new(resolution, Flux::zero(), CornerVelocity::zero())
    }

    /// Replaces the velocity samples with a previously exported grid.
    pub fn with_velocities(mut self, velocities: Vec<Vec2>) -> Result<Self, FlowError> {
        let expected = self.resolution * self.resolution;
        if velocities.len() != expected {
            return Err(FlowError::Configuration(format!(
                "expected {expected} velocity samples, got {}",
                velocities.len()
            )));
        }
        self.velocities = velocities;
        Ok(self)
    }

    /// Returns the number of velocity samples along each side.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Returns the edge fluxes this tile was built from.
    pub fn flux(&self) -> Flux {
        self.flux
    }

    /// Returns the corner velocities this tile was built from.
    pub fn corners(&self) -> CornerVelocity {
        self.corners
    }

    /// Returns all velocity samples, row-major from the bottom row.
    pub fn velocities(&self) -> &[Vec2] {
        &self.velocities
    }

    /// Samples the velocity at a normalized position.
    ///
    /// `x` and `y` must lie in `[0, 1]`, with `y = 0` at the bottom edge.
    /// Positions on a sample return it exactly; anything else is bilinearly
    /// interpolated from the four enclosing samples.
    pub fn velocity(&self, x: f32, y: f32) -> Result<Vec2, FlowError> {
        if !(0.0..=1.0).contains(&x) {
            return Err(FlowError::OutOfRange(format!(
                "x-coordinate {x} outside [0, 1]"
            )));
        }
        if !(0.0..=1.0).contains(&y) {
            return Err(FlowError::OutOfRange(format!(
                "y-coordinate {y} outside [0, 1]"
            )));
        }

        let last = self.resolution - 1;
        let gx = x * last as f32;
        let gy = y * last as f32;

        let (rx, ry) = (gx.round(), gy.round());
        if (gx - rx).abs() < GRID_TOLERANCE && (gy - ry).abs() < GRID_TOLERANCE {
            return Ok(self.sample(rx as usize, ry as usize));
        }

        let i0 = (gx.floor() as usize).min(last - 1);
        let j0 = (gy.floor() as usize).min(last - 1);
        let sx = gx - i0 as f32;
        let sy = gy - j0 as f32;

        let v00 = self.sample(i0, j0);
        let v10 = self.sample(i0 + 1, j0);
        let v01 = self.sample(i0, j0 + 1);
        let v11 = self.sample(i0 + 1, j0 + 1);

        let bottom = v00.lerp(v10, sx);
        let top = v01.lerp(v11, sx);
        Ok(bottom.lerp(top, sy))
    }

    /// Returns the velocity sample at column `i`, row `j`.
    pub fn velocity_at(&self, i: usize, j: usize) -> Result<Vec2, FlowError> {
        if i >= self.resolution || j >= self.resolution {
            return Err(FlowError::OutOfRange(format!(
                "sample ({i}, {j}) outside [0, {})",
                self.resolution
            )));
        }
        Ok(self.sample(i, j))
    }

    pub(crate) fn set_velocity_at(&mut self, i: usize, j: usize, velocity: Vec2) {
        self.velocities[j * self.resolution + i] = velocity;
    }

    fn sample(&self, i: usize, j: usize) -> Vec2 {
        self.velocities[j * self.resolution + i]
    }
}

/// Builds the 4×4 stream-function control patch for a tile.
///
/// Control coordinates are `-0.5, 0.5, max - 0.5, max + 0.5` on both axes,
/// i.e. the first two and last two stream points. Corner values accumulate
/// the edge fluxes walking round the boundary from the bottom-left corner.
/// The three points next to each corner are offset so the velocity stencil
/// over that 2×2 block returns the corner velocity: one unit up changes ψ
/// by -vx, one unit right by +vy.
fn control_patch(resolution: usize, flux: &Flux, corners: &CornerVelocity) -> [[Vec3; 4]; 4] {
    let max = (resolution - 1) as f32;
    let coords = [-0.5, 0.5, max - 0.5, max + 0.5];

    // v[row][col], rows counted up from the bottom.
    let mut v = [[0.0_f32; 4]; 4];
    v[0][0] = 0.0;
    v[0][3] = flux.bottom as f32;
    v[3][0] = -flux.left as f32;
    v[3][3] = v[3][0] + flux.top as f32;

    let bl = corners.bottom_left;
    v[1][0] = v[0][0] - bl.x;
    v[0][1] = v[0][0] + bl.y;
    v[1][1] = v[0][1] - bl.x;

    let tl = corners.top_left;
    v[2][0] = v[3][0] + tl.x;
    v[3][1] = v[3][0] + tl.y;
    v[2][1] = v[3][1] + tl.x;

    let tr = corners.top_right;
    v[2][3] = v[3][3] + tr.x;
    v[3][2] = v[3][3] - tr.y;
    v[2][2] = v[3][2] + tr.x;

    let br = corners.bottom_right;
    v[1][3] = v[0][3] - br.x;
    v[0][2] = v[0][3] - br.y;
    v[1][2] = v[0][2] - br.x;

    std::array::from_fn(|row| {
        std::array::from_fn(|col| Vec3::new(coords[col], coords[row], v[row][col]))
    })
}

/// Interpolates the `(resolution + 1)²` stream-function grid, row-major from the bottom.
fn stream_function(
    resolution: usize,
    flux: &Flux,
    corners: &CornerVelocity,
) -> Result<Vec<f32>, FlowError> {
    let patch = control_patch(resolution, flux, corners);
    Ok(interpolate(patch, resolution + 1)?.into_values())
}

/// Differentiates the stream function onto the velocity samples.
///
/// Stream point `(i, j)` lies at `(i - 0.5, j - 0.5)`, so the four points
/// around velocity sample `(i, j)` are `(i..=i+1, j..=j+1)`.
fn velocity_grid(resolution: usize, stream: &[f32]) -> Vec<Vec2> {
    let n = resolution + 1;
    let psi = |i: usize, j: usize| stream[j * n + i];

    let mut velocities = Vec::with_capacity(resolution * resolution);
    for j in 0..resolution {
        for i in 0..resolution {
            let below = 0.5 * (psi(i, j) + psi(i + 1, j));
            let above = 0.5 * (psi(i, j + 1) + psi(i + 1, j + 1));
            let right = 0.5 * (psi(i + 1, j) + psi(i + 1, j + 1));
            let left = 0.5 * (psi(i, j) + psi(i, j + 1));
            velocities.push(Vec2::new(below - above, right - left));
        }
    }
    velocities
}
