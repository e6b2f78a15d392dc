//! Error types for resin-flowtile.

use rhizome_resin_surface::SurfaceError;
use thiserror::Error;

/// Errors raised by flow tiles and lattices.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    /// Inconsistent dimensions or otherwise malformed input.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The stream-function control patch was rejected.
    #[error("invalid control patch: {0}")]
    InvalidPatch(#[from] SurfaceError),

    /// A tile was placed on a slot that already holds one.
    #[error("slot ({row}, {col}) is already occupied")]
    AlreadyOccupied {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
    },

    /// A tile was requested from an empty slot.
    #[error("no tile in slot ({row}, {col})")]
    EmptySlot {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
    },

    /// A coordinate or index lies outside its valid range.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// An operation needed every lattice slot to be filled.
    #[error("lattice is incomplete: {filled} of {total} slots filled")]
    IncompleteLattice {
        /// Number of populated slots.
        filled: usize,
        /// Total number of slots.
        total: usize,
    },
}
