//! JSON lattice format.

use crate::error::SerdeError;
use crate::format::{LatticeFormat, MAX_INPUT_BYTES};
use crate::serial::SerialLattice;

/// Lattice descriptions as JSON text.
///
/// Velocities survive the round trip exactly. Inputs longer than `limit`
/// bytes are refused before parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonFormat {
    /// Indent the output.
    pub pretty: bool,
    /// Largest input accepted by `deserialize`.
    pub limit: usize,
}

impl Default for JsonFormat {
    fn default() -> Self {
        Self {
            pretty: false,
            limit: MAX_INPUT_BYTES,
        }
    }
}

impl JsonFormat {
    /// Compact output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented output.
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }

    /// Sets the input limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

impl LatticeFormat for JsonFormat {
    fn serialize(&self, lattice: &SerialLattice) -> Result<Vec<u8>, SerdeError> {
        if self.pretty {
            Ok(serde_json::to_vec_pretty(lattice)?)
        } else {
            Ok(serde_json::to_vec(lattice)?)
        }
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<SerialLattice, SerdeError> {
        if bytes.len() > self.limit {
            return Err(SerdeError::InputTooLarge {
                len: bytes.len(),
                limit: self.limit,
            });
        }
        Ok(serde_json::from_slice(bytes)?)
    }

    fn name(&self) -> &'static str {
        "JSON"
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}
