//! Row-major lattice filling driven by the constraint oracle.

use crate::error::TilingError;
use crate::oracle::{ConstraintOracle, FluxBounds};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rhizome_resin_flowtile::{Corner, CornerVelocity, Direction, FlowError, Flux, Lattice, StreamField};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Configuration
// ============================================================================

/// Parameters for assembling a lattice.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TilingConfig {
    /// Cells along each side of the lattice.
    pub dimension: usize,
    /// Velocity samples along each side of a tile.
    pub resolution: usize,
    /// Flux limits for interior edges.
    pub bounds: FluxBounds,
    /// Velocities a free corner may take.
    pub corner_palette: Vec<Vec2>,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            dimension: 3,
            resolution: 15,
            bounds: FluxBounds::default(),
            corner_palette: vec![Vec2::ZERO],
        }
    }
}

impl TilingConfig {
    /// Creates a config for a `dimension × dimension` lattice.
    pub fn new(dimension: usize, resolution: usize) -> Self {
        Self {
            dimension,
            resolution,
            ..Default::default()
        }
    }

    /// Sets the flux bounds.
    pub fn with_bounds(mut self, bounds: FluxBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Sets the corner palette.
    pub fn with_corner_palette(mut self, palette: Vec<Vec2>) -> Self {
        self.corner_palette = palette;
        self
    }

    /// Checks the config for values no lattice can be built from.
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.dimension == 0 {
            return Err(FlowError::Configuration(
                "lattice dimension must be at least 1".into(),
            ));
        }
        if self.resolution < 3 {
            return Err(FlowError::Configuration(format!(
                "tile resolution must be at least 3, got {}",
                self.resolution
            )));
        }
        if self.corner_palette.is_empty() {
            return Err(FlowError::Configuration(
                "corner palette must not be empty".into(),
            ));
        }
        self.bounds.validate()
    }
}

// ============================================================================
// Candidates and selection
// ============================================================================

/// A possible tile for one cell: its edge fluxes and corner velocities.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileCandidate {
    /// Edge fluxes.
    pub flux: Flux,
    /// Corner velocities.
    pub corners: CornerVelocity,
}

impl TileCandidate {
    /// Creates a candidate.
    pub fn new(flux: Flux, corners: CornerVelocity) -> Self {
        Self { flux, corners }
    }

    /// Builds the flow tile this candidate describes.
    pub fn materialize(&self, resolution: usize) -> Result<StreamField, FlowError> {
        StreamField::new(resolution, self.flux, self.corners)
    }
}

/// Picks one tile from the feasible candidates for a cell.
///
/// `candidates` is never empty. Returning an index past its end aborts the
/// fill with [`FlowError::OutOfRange`].
pub trait TileSelector {
    /// Returns the index of the chosen candidate.
    fn select(&mut self, row: usize, col: usize, candidates: &[TileCandidate]) -> usize;
}

impl<F> TileSelector for F
where
    F: FnMut(usize, usize, &[TileCandidate]) -> usize,
{
    fn select(&mut self, row: usize, col: usize, candidates: &[TileCandidate]) -> usize {
        self(row, col, candidates)
    }
}

/// Chooses uniformly among the candidates.
#[derive(Debug, Clone)]
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    /// Creates a selector with a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Creates a selector seeded from the thread-local generator.
    pub fn from_thread_rng() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }
}

impl TileSelector for RandomSelector {
    fn select(&mut self, _row: usize, _col: usize, candidates: &[TileCandidate]) -> usize {
        if candidates.is_empty() {
            return 0;
        }
        self.rng.random_range(0..candidates.len())
    }
}

// ============================================================================
// Assembler
// ============================================================================

/// Fills a lattice cell by cell so that every tile agrees with its neighbors.
///
/// Cells are visited in row-major order. For each one the assembler asks the
/// oracle which flux each edge may carry, pins corners already fixed by
/// placed neighbors, enumerates every combination, drops the infeasible
/// ones and commits the tile the selector picks.
#[derive(Debug, Clone)]
pub struct TileAssembler {
    config: TilingConfig,
    lattice: Lattice,
    selector: RandomSelector,
}

impl TileAssembler {
    /// Creates an assembler with an unseeded random selector.
    pub fn new(config: TilingConfig) -> Result<Self, TilingError> {
        Self::with_selector(config, RandomSelector::from_thread_rng())
    }

    /// Creates an assembler whose random fills are reproducible.
    pub fn with_seed(config: TilingConfig, seed: u64) -> Result<Self, TilingError> {
        Self::with_selector(config, RandomSelector::new(seed))
    }

    fn with_selector(config: TilingConfig, selector: RandomSelector) -> Result<Self, TilingError> {
        config.validate()?;
        let lattice = Lattice::new(config.dimension, config.resolution)?;
        Ok(Self {
            config,
            lattice,
            selector,
        })
    }

    /// Returns the config.
    pub fn config(&self) -> &TilingConfig {
        &self.config
    }

    /// Returns the lattice in its current state.
    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Consumes the assembler, returning its lattice.
    pub fn into_lattice(self) -> Lattice {
        self.lattice
    }

    /// Clears the lattice and fills every cell with a random feasible tile.
    pub fn fill_random(&mut self) -> Result<(), TilingError> {
        let mut selector = self.selector.clone();
        let result = self.fill_with(&mut selector);
        self.selector = selector;
        result
    }

    /// Clears the lattice and fills every cell with the tile `selector` picks.
    pub fn fill_with<S: TileSelector + ?Sized>(&mut self, selector: &mut S) -> Result<(), TilingError> {
        self.lattice.clear();

        for (row, col) in self.lattice.cells().collect::<Vec<_>>() {
            let candidates = self.candidates(row, col)?;
            if candidates.is_empty() {
                return Err(TilingError::NoValidTile { row, col });
            }

            let choice = selector.select(row, col, &candidates);
            let candidate = candidates.get(choice).copied().ok_or_else(|| {
                FlowError::OutOfRange(format!(
                    "selected candidate {choice} of {} at ({row}, {col})",
                    candidates.len()
                ))
            })?;
            self.commit(row, col, candidate)?;
        }

        tracing::info!(
            dimension = self.config.dimension,
            resolution = self.config.resolution,
            "filled lattice"
        );
        Ok(())
    }

    /// Returns every feasible tile for an empty cell, given the tiles
    /// already placed.
    pub fn candidates(&self, row: usize, col: usize) -> Result<Vec<TileCandidate>, TilingError> {
        if self.lattice.has_tile(row, col) {
            return Err(FlowError::AlreadyOccupied { row, col }.into());
        }

        let mut oracle = ConstraintOracle::build(self.config.bounds, &self.lattice)?;
        let ranges = ranges_from(&oracle, row, col)?;
        let corners = self.corner_restrictions(row, col)?;

        let fluxes = flux_combinations(&ranges);
        let corner_sets = corner_combinations(&corners);
        let candidates: Vec<TileCandidate> = fluxes
            .iter()
            .flat_map(|&flux| {
                corner_sets
                    .iter()
                    .map(move |&corners| TileCandidate::new(flux, corners))
            })
            .collect();

        let survivors = oracle.feasible(&candidates, row, col)?;
        oracle.free();

        tracing::debug!(
            row,
            col,
            ?ranges,
            candidates = candidates.len(),
            survivors = survivors.len(),
            "evaluated cell"
        );
        Ok(survivors)
    }

    /// Returns the feasible flux range of each edge of `(row, col)`, in
    /// [`Direction::all`] order.
    pub fn flux_ranges(&self, row: usize, col: usize) -> Result<[(i32, i32); 4], TilingError> {
        let oracle = ConstraintOracle::build(self.config.bounds, &self.lattice)?;
        ranges_from(&oracle, row, col)
    }

    /// Returns the velocities each corner of `(row, col)` may take, in
    /// [`Corner::all`] order.
    ///
    /// A corner touched by a placed tile is pinned to that tile's velocity
    /// there. Free corners range over the palette.
    pub fn corner_restrictions(&self, row: usize, col: usize) -> Result<[Vec<Vec2>; 4], TilingError> {
        let n = self.lattice.dimension();
        if row >= n || col >= n {
            return Err(FlowError::OutOfRange(format!(
                "cell ({row}, {col}) outside {n}×{n} lattice"
            ))
            .into());
        }

        Ok(Corner::all().map(|corner| {
            let fixed = corner.sharing().into_iter().find_map(|(dr, dc, shared)| {
                let r = row.checked_add_signed(dr)?;
                let c = col.checked_add_signed(dc)?;
                self.lattice
                    .tile(r, c)
                    .map(|tile| tile.corners().get(shared))
            });
            match fixed {
                Some(velocity) => vec![velocity],
                None => self.config.corner_palette.clone(),
            }
        }))
    }

    /// Builds and places the tile for `candidate`.
    pub fn commit(&mut self, row: usize, col: usize, candidate: TileCandidate) -> Result<(), TilingError> {
        let tile = candidate.materialize(self.config.resolution)?;
        self.lattice.add_tile(row, col, tile)?;
        Ok(())
    }
}

fn ranges_from(
    oracle: &ConstraintOracle,
    row: usize,
    col: usize,
) -> Result<[(i32, i32); 4], TilingError> {
    let mut ranges = [(0, 0); 4];
    for (range, direction) in ranges.iter_mut().zip(Direction::all()) {
        *range = oracle.query_range(row, col, direction)?;
    }
    Ok(ranges)
}

/// Every flux within `ranges`, in [`Direction::all`] order.
fn flux_combinations(ranges: &[(i32, i32); 4]) -> Vec<Flux> {
    let [top, right, bottom, left] = *ranges;
    let mut fluxes = Vec::new();
    for t in top.0..=top.1 {
        for r in right.0..=right.1 {
            for b in bottom.0..=bottom.1 {
                for l in left.0..=left.1 {
                    fluxes.push(Flux::new(t, r, b, l));
                }
            }
        }
    }
    fluxes
}

/// Every corner assignment drawn from `options`, in [`Corner::all`] order.
fn corner_combinations(options: &[Vec<Vec2>; 4]) -> Vec<CornerVelocity> {
    let [top_left, top_right, bottom_right, bottom_left] = options;
    let mut combinations = Vec::new();
    for &tl in top_left {
        for &tr in top_right {
            for &br in bottom_right {
                for &bl in bottom_left {
                    combinations.push(CornerVelocity::new(tl, tr, bl, br));
                }
            }
        }
    }
    combinations
}
