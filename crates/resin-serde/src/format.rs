//! Format trait for lattice serialization.

use crate::error::SerdeError;
use crate::serial::SerialLattice;

/// Default cap on the bytes a format will decode.
pub const MAX_INPUT_BYTES: usize = 64 * 1024 * 1024;

/// A byte encoding for [`SerialLattice`].
pub trait LatticeFormat {
    /// Encodes a lattice description to bytes.
    fn serialize(&self, lattice: &SerialLattice) -> Result<Vec<u8>, SerdeError>;

    /// Decodes a lattice description from bytes.
    fn deserialize(&self, bytes: &[u8]) -> Result<SerialLattice, SerdeError>;

    /// Returns the format name for display.
    fn name(&self) -> &'static str;

    /// Returns the conventional file extension (without dot).
    fn extension(&self) -> &'static str;
}
