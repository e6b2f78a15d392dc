//! Flux feasibility over a lattice, posed as a linear program.
//!
//! Every grid edge is one LP variable. Two cells that share an edge resolve
//! it to the same variable, so matching fluxes across neighbors needs no
//! extra constraint.

use std::collections::HashMap;

use crate::assembler::TileCandidate;
use crate::error::TilingError;
use crate::lp::{LinearModel, Objective, SolveStatus};
use rhizome_resin_flowtile::{Direction, FlowError, Flux, Lattice};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Flux bounds
// ============================================================================

/// Allowed integer flux through interior edges.
///
/// `x` bounds apply to left/right edges, `y` bounds to top/bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FluxBounds {
    /// Smallest flux along x.
    pub min_x: i32,
    /// Largest flux along x.
    pub max_x: i32,
    /// Smallest flux along y.
    pub min_y: i32,
    /// Largest flux along y.
    pub max_y: i32,
}

impl Default for FluxBounds {
    fn default() -> Self {
        Self::symmetric(1)
    }
}

impl FluxBounds {
    /// Creates flux bounds.
    pub fn new(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Bounds of `[-limit, limit]` on both axes.
    pub fn symmetric(limit: i32) -> Self {
        Self::new(-limit, limit, -limit, limit)
    }

    /// Returns the bounds that apply to an edge.
    pub fn range(&self, direction: Direction) -> (i32, i32) {
        if direction.carries_y_flux() {
            (self.min_y, self.max_y)
        } else {
            (self.min_x, self.max_x)
        }
    }

    /// Checks that each minimum is at most its maximum.
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.min_x > self.max_x || self.min_y > self.max_y {
            return Err(FlowError::Configuration(format!(
                "empty flux bounds: x in [{}, {}], y in [{}, {}]",
                self.min_x, self.max_x, self.min_y, self.max_y
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Edge indexing
// ============================================================================

/// Returns the number of edges in a `dimension × dimension` lattice.
pub fn edge_count(dimension: usize) -> usize {
    2 * dimension * (dimension + 1)
}

/// Returns the canonical id of one edge of cell `(row, col)`.
///
/// Horizontal edges come first, `dimension + 1` rows of `dimension` each,
/// followed by vertical edges, `dimension` rows of `dimension + 1` each.
/// The edge between two neighbors gets the same id from either side.
pub fn edge_index(dimension: usize, row: usize, col: usize, direction: Direction) -> usize {
    let n = dimension;
    match direction {
        Direction::Top => row * n + col,
        Direction::Bottom => (row + 1) * n + col,
        Direction::Left => n * (n + 1) + row * (n + 1) + col,
        Direction::Right => n * (n + 1) + row * (n + 1) + col + 1,
    }
}

/// Returns true if the edge lies on the outside of the lattice.
pub fn is_world_boundary(dimension: usize, row: usize, col: usize, direction: Direction) -> bool {
    match direction {
        Direction::Top => row == 0,
        Direction::Bottom => row + 1 == dimension,
        Direction::Left => col == 0,
        Direction::Right => col + 1 == dimension,
    }
}

// ============================================================================
// Oracle
// ============================================================================

/// Answers flux range and feasibility queries against a lattice snapshot.
///
/// Edges of filled cells are pinned to the committed flux. Every empty cell
/// must conserve flow. World-boundary edges carry no flux.
///
/// The constraint matrix is a network matrix, so with integer bounds every
/// range endpoint is an integer.
#[derive(Debug, Clone)]
pub struct ConstraintOracle {
    dimension: usize,
    bounds: FluxBounds,
    model: LinearModel,
}

impl ConstraintOracle {
    /// Builds the model for the current state of `lattice`.
    pub fn build(bounds: FluxBounds, lattice: &Lattice) -> Result<Self, TilingError> {
        bounds.validate()?;
        let mut oracle = Self {
            dimension: lattice.dimension(),
            bounds,
            model: LinearModel::new(),
        };
        oracle.rebuild(lattice)?;
        Ok(oracle)
    }

    /// Discards the current model and builds a fresh one for `lattice`.
    pub fn rebuild(&mut self, lattice: &Lattice) -> Result<(), TilingError> {
        let n = lattice.dimension();
        self.dimension = n;

        let mut model = LinearModel::new();
        for _ in 0..edge_count(n) {
            model.add_variable(0.0, 0.0);
        }

        let mut pinned: Vec<Option<i32>> = vec![None; edge_count(n)];
        let mut free_cells = 0;

        for (row, col, tile) in lattice.iter() {
            match tile {
                Some(tile) => {
                    let flux = tile.flux();
                    for direction in Direction::all() {
                        let edge = edge_index(n, row, col, direction);
                        let value = flux.get(direction);
                        if is_world_boundary(n, row, col, direction) && value != 0 {
                            return Err(FlowError::Configuration(format!(
                                "tile ({row}, {col}) has flux {value} on the {direction:?} lattice boundary"
                            ))
                            .into());
                        }
                        match pinned[edge] {
                            Some(existing) if existing != value => {
                                return Err(FlowError::Configuration(format!(
                                    "tile ({row}, {col}) pins its {direction:?} edge to {value}, \
                                     neighbor pins it to {existing}"
                                ))
                                .into());
                            }
                            _ => pinned[edge] = Some(value),
                        }
                    }
                }
                None => {
                    free_cells += 1;
                    let edge = |direction| edge_index(n, row, col, direction);
                    model.add_constraint(
                        &[
                            (edge(Direction::Left), 1.0),
                            (edge(Direction::Bottom), 1.0),
                            (edge(Direction::Right), -1.0),
                            (edge(Direction::Top), -1.0),
                        ],
                        0.0,
                    );
                }
            }
        }

        for (row, col) in lattice.cells() {
            for direction in Direction::all() {
                let edge = edge_index(n, row, col, direction);
                let (min, max) = match pinned[edge] {
                    Some(value) => (value, value),
                    None if is_world_boundary(n, row, col, direction) => (0, 0),
                    None => self.bounds.range(direction),
                };
                model.set_bounds(edge, min as f64, max as f64);
            }
        }

        tracing::trace!(
            dimension = n,
            free_cells,
            variables = model.variable_count(),
            constraints = model.constraint_count(),
            "built constraint model"
        );
        self.model = model;
        Ok(())
    }

    /// Returns the lattice dimension the model was built for.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the smallest and largest flux the edge can carry.
    pub fn query_range(
        &self,
        row: usize,
        col: usize,
        direction: Direction,
    ) -> Result<(i32, i32), TilingError> {
        self.check_cell(row, col)?;
        if is_world_boundary(self.dimension, row, col, direction) {
            return Ok((0, 0));
        }

        let edge = edge_index(self.dimension, row, col, direction);
        let min = self.optimum(Objective::Minimize(edge), row, col, direction)?;
        let max = self.optimum(Objective::Maximize(edge), row, col, direction)?;
        Ok((min, max))
    }

    /// Keeps the candidates whose flux can be placed at `(row, col)`.
    ///
    /// Each distinct flux is tested once by pinning the cell's four edges,
    /// solving, then removing the pins again. Order is preserved.
    pub fn feasible(
        &mut self,
        candidates: &[TileCandidate],
        row: usize,
        col: usize,
    ) -> Result<Vec<TileCandidate>, TilingError> {
        self.check_cell(row, col)?;

        let mut verdicts: HashMap<Flux, bool> = HashMap::new();
        let mut survivors = Vec::new();
        for candidate in candidates {
            let keep = match verdicts.get(&candidate.flux) {
                Some(&keep) => keep,
                None => {
                    let keep = self.admits(row, col, &candidate.flux);
                    verdicts.insert(candidate.flux, keep);
                    keep
                }
            };
            if keep {
                survivors.push(*candidate);
            }
        }
        Ok(survivors)
    }

    /// Releases the model.
    pub fn free(self) {}

    fn admits(&mut self, row: usize, col: usize, flux: &Flux) -> bool {
        let n = self.dimension;
        let added: Vec<usize> = Direction::all()
            .into_iter()
            .map(|direction| {
                let edge = edge_index(n, row, col, direction);
                self.model
                    .add_constraint(&[(edge, 1.0)], flux.get(direction) as f64)
            })
            .collect();

        let status = self.model.solve(Objective::Feasibility);

        for &index in added.iter().rev() {
            self.model.del_constraint(index);
        }
        matches!(status, SolveStatus::Optimal(_))
    }

    fn optimum(
        &self,
        objective: Objective,
        row: usize,
        col: usize,
        direction: Direction,
    ) -> Result<i32, TilingError> {
        match self.model.solve(objective) {
            SolveStatus::Optimal(value) => Ok(value.round() as i32),
            status => Err(TilingError::InfeasibleModel(format!(
                "{objective:?} of {direction:?} edge at ({row}, {col}) is {status:?}"
            ))),
        }
    }

    fn check_cell(&self, row: usize, col: usize) -> Result<(), TilingError> {
        if row >= self.dimension || col >= self.dimension {
            return Err(FlowError::OutOfRange(format!(
                "cell ({row}, {col}) outside {0}×{0} lattice",
                self.dimension
            ))
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rhizome_resin_flowtile::{CornerVelocity, StreamField};
    use std::collections::HashSet;

    fn candidate(flux: Flux) -> TileCandidate {
        TileCandidate::new(flux, CornerVelocity::zero())
    }

    fn place(lattice: &mut Lattice, row: usize, col: usize, flux: Flux) {
        let tile = StreamField::new(lattice.resolution(), flux, CornerVelocity::zero()).unwrap();
        lattice.add_tile(row, col, tile).unwrap();
    }

    #[test]
    fn test_edge_index_is_bijective() {
        for n in 1..6 {
            let mut seen = HashSet::new();
            for row in 0..n {
                for col in 0..n {
                    for direction in Direction::all() {
                        let edge = edge_index(n, row, col, direction);
                        assert!(edge < edge_count(n));
                        seen.insert(edge);
                    }
                }
            }
            assert_eq!(seen.len(), edge_count(n));
        }
    }

    #[test]
    fn test_shared_edges_share_index() {
        let n: usize = 4;
        for row in 0..n {
            for col in 0..n {
                for direction in Direction::all() {
                    let (dr, dc) = direction.delta();
                    let (Some(r), Some(c)) =
                        (row.checked_add_signed(dr), col.checked_add_signed(dc))
                    else {
                        continue;
                    };
                    if r >= n || c >= n {
                        continue;
                    }
                    assert_eq!(
                        edge_index(n, row, col, direction),
                        edge_index(n, r, c, direction.opposite())
                    );
                }
            }
        }
    }

    #[test]
    fn test_world_boundary() {
        assert!(is_world_boundary(3, 0, 1, Direction::Top));
        assert!(is_world_boundary(3, 2, 1, Direction::Bottom));
        assert!(is_world_boundary(3, 1, 0, Direction::Left));
        assert!(is_world_boundary(3, 1, 2, Direction::Right));
        assert!(!is_world_boundary(3, 1, 1, Direction::Top));
        for direction in Direction::all() {
            assert!(is_world_boundary(1, 0, 0, direction));
        }
    }

    #[test]
    fn test_bounds_validate() {
        assert!(FluxBounds::default().validate().is_ok());
        assert!(FluxBounds::new(1, 0, 0, 0).validate().is_err());
        assert_eq!(FluxBounds::new(-2, 3, -1, 1).range(Direction::Left), (-2, 3));
        assert_eq!(FluxBounds::new(-2, 3, -1, 1).range(Direction::Top), (-1, 1));
    }

    #[test]
    fn test_empty_lattice_ranges() {
        let lattice = Lattice::new(3, 4).unwrap();
        let oracle = ConstraintOracle::build(FluxBounds::default(), &lattice).unwrap();

        assert_eq!(oracle.query_range(0, 0, Direction::Top).unwrap(), (0, 0));
        assert_eq!(oracle.query_range(0, 0, Direction::Left).unwrap(), (0, 0));
        assert_eq!(oracle.query_range(0, 0, Direction::Right).unwrap(), (-1, 1));
        assert_eq!(oracle.query_range(1, 1, Direction::Bottom).unwrap(), (-1, 1));
        assert!(oracle.query_range(3, 0, Direction::Top).is_err());
    }

    #[test]
    fn test_single_cell_admits_only_zero() {
        let lattice = Lattice::new(1, 4).unwrap();
        let mut oracle = ConstraintOracle::build(FluxBounds::default(), &lattice).unwrap();
        for direction in Direction::all() {
            assert_eq!(oracle.query_range(0, 0, direction).unwrap(), (0, 0));
        }

        let survivors = oracle
            .feasible(
                &[
                    candidate(Flux::new(0, 1, 0, 1)),
                    candidate(Flux::zero()),
                    candidate(Flux::new(1, 0, 1, 0)),
                ],
                0,
                0,
            )
            .unwrap();
        assert_eq!(survivors, vec![candidate(Flux::zero())]);
    }

    #[test]
    fn test_pinned_neighbor_restricts_range() {
        let mut lattice = Lattice::new(3, 4).unwrap();
        // Flow enters from below and leaves to the right.
        place(&mut lattice, 0, 0, Flux::new(0, 1, 1, 0));
        let oracle = ConstraintOracle::build(FluxBounds::default(), &lattice).unwrap();

        assert_eq!(oracle.query_range(0, 1, Direction::Left).unwrap(), (1, 1));
        assert_eq!(oracle.query_range(1, 0, Direction::Top).unwrap(), (1, 1));
    }

    #[test]
    fn test_feasible_restores_model() {
        let lattice = Lattice::new(2, 4).unwrap();
        let mut oracle = ConstraintOracle::build(FluxBounds::default(), &lattice).unwrap();
        let before = oracle.model.clone();

        let candidates: Vec<_> = (-1..=1)
            .flat_map(|a| (-1..=1).map(move |b| candidate(Flux::new(0, a, b, 0))))
            .collect();
        let survivors = oracle.feasible(&candidates, 0, 0).unwrap();

        assert_eq!(oracle.model, before);
        // The top-left cell must balance: right equals bottom.
        assert!(survivors.iter().all(|c| c.flux.is_balanced()));
        assert_eq!(survivors.len(), 3);
    }

    #[test]
    fn test_conflicting_pins() {
        let mut lattice = Lattice::new(2, 4).unwrap();
        place(&mut lattice, 0, 0, Flux::new(0, 1, 1, 0));
        place(&mut lattice, 0, 1, Flux::new(0, 0, 0, 0));
        assert!(matches!(
            ConstraintOracle::build(FluxBounds::default(), &lattice),
            Err(TilingError::Flow(FlowError::Configuration(_)))
        ));
    }

    #[test]
    fn test_boundary_flux_rejected() {
        let mut lattice = Lattice::new(2, 4).unwrap();
        place(&mut lattice, 0, 0, Flux::new(1, 0, 0, 1));
        assert!(matches!(
            ConstraintOracle::build(FluxBounds::default(), &lattice),
            Err(TilingError::Flow(FlowError::Configuration(_)))
        ));
    }

    #[test]
    fn test_unbalanced_tile_makes_model_infeasible() {
        let mut lattice = Lattice::new(2, 4).unwrap();
        // One unit enters from below and never leaves.
        place(&mut lattice, 0, 0, Flux::new(0, 1, 0, 0));
        let oracle = ConstraintOracle::build(FluxBounds::default(), &lattice).unwrap();
        assert!(matches!(
            oracle.query_range(0, 1, Direction::Bottom),
            Err(TilingError::InfeasibleModel(_))
        ));
    }

    #[test]
    fn test_rebuild_tracks_lattice() {
        let mut lattice = Lattice::new(2, 4).unwrap();
        let mut oracle = ConstraintOracle::build(FluxBounds::default(), &lattice).unwrap();
        assert_eq!(oracle.query_range(0, 1, Direction::Left).unwrap(), (-1, 1));

        place(&mut lattice, 0, 0, Flux::new(0, -1, -1, 0));
        oracle.rebuild(&lattice).unwrap();
        assert_eq!(oracle.query_range(0, 1, Direction::Left).unwrap(), (-1, -1));
        oracle.free();
    }
}
