//! Error types for resin-tiling.

use rhizome_resin_flowtile::FlowError;
use thiserror::Error;

/// Errors raised while assembling a lattice.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TilingError {
    /// A tile or lattice operation failed.
    #[error(transparent)]
    Flow(#[from] FlowError),

    /// The constraint model has no solution. This points at a bug in how the
    /// model was built and is never retried.
    #[error("constraint model is infeasible: {0}")]
    InfeasibleModel(String),

    /// Every candidate for a cell was rejected.
    #[error("no valid tile for cell ({row}, {col})")]
    NoValidTile {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
    },
}
