//! Serialization error types.

use rhizome_resin_flowtile::FlowError;
use thiserror::Error;

/// Errors that can occur during lattice import/export.
#[derive(Debug, Error)]
pub enum SerdeError {
    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bincode deserialization error.
    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::error::DecodeError),

    /// Bincode encoding error.
    #[error("bincode encode error: {0}")]
    BincodeEncode(#[from] bincode::error::EncodeError),

    /// The input is larger than the format accepts.
    #[error("input of {len} bytes exceeds limit of {limit}")]
    InputTooLarge {
        /// Input length in bytes.
        len: usize,
        /// Accepted length in bytes.
        limit: usize,
    },

    /// Reading from a source or writing to a sink failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The decoded description does not form a valid lattice.
    #[error("lattice error: {0}")]
    Lattice(#[from] FlowError),
}
