//! Bincode format implementation.

use crate::error::SerdeError;
use crate::format::{LatticeFormat, MAX_INPUT_BYTES};
use crate::serial::SerialLattice;

/// Bincode serialization format.
///
/// Compact binary format, faster than JSON but not human-readable.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeFormat;

impl BincodeFormat {
    /// Creates a new BincodeFormat.
    pub fn new() -> Self {
        Self
    }
}

impl LatticeFormat for BincodeFormat {
    fn serialize(&self, lattice: &SerialLattice) -> Result<Vec<u8>, SerdeError> {
        let bytes = bincode::serde::encode_to_vec(lattice, bincode::config::standard())?;
        Ok(bytes)
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<SerialLattice, SerdeError> {
        let config = bincode::config::standard().with_limit::<MAX_INPUT_BYTES>();
        let (lattice, _) = bincode::serde::decode_from_slice(bytes, config)?;
        Ok(lattice)
    }

    fn name(&self) -> &'static str {
        "bincode"
    }

    fn extension(&self) -> &'static str {
        "bin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::SerialTile;
    use glam::Vec2;
    use rhizome_resin_flowtile::{CornerVelocity, Flux};

    fn serial(tiles: usize) -> SerialLattice {
        let mut lattice = SerialLattice::new(4, 3);
        for i in 0..tiles {
            lattice.tiles.push(SerialTile {
                row: i / 4,
                col: i % 4,
                flux: Flux::zero(),
                corners: CornerVelocity::uniform(Vec2::new(0.5, -0.5)),
                velocities: Some(vec![Vec2::new(i as f32, 0.125); 9]),
            });
        }
        lattice
    }

    #[test]
    fn test_bincode_roundtrip() {
        let format = BincodeFormat::new();
        let bytes = format.serialize(&serial(3)).unwrap();
        assert_eq!(format.deserialize(&bytes).unwrap(), serial(3));
    }

    #[test]
    fn test_bincode_smaller_than_json() {
        let json = crate::json::JsonFormat::new();
        let bincode = BincodeFormat::new();

        let json_bytes = json.serialize(&serial(16)).unwrap();
        let bincode_bytes = bincode.serialize(&serial(16)).unwrap();
        assert!(bincode_bytes.len() < json_bytes.len());
    }

    #[test]
    fn test_bincode_truncated() {
        let format = BincodeFormat::new();
        let bytes = format.serialize(&serial(2)).unwrap();
        assert!(matches!(
            format.deserialize(&bytes[..bytes.len() / 2]),
            Err(SerdeError::Bincode(_))
        ));
    }
}
