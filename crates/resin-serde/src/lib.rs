//! Import and export for flow-tile lattices.
//!
//! A lattice is stored as a [`SerialLattice`]: its dimensions plus, for
//! every filled cell, the flux and corner velocities the tile was built
//! from. Tiles are rebuilt on import, so the description stays small.
//! Lattices whose samples were edited after construction (for example by
//! edge smoothing) can also carry the full velocity grid of each tile.
//!
//! Two byte formats are provided, [`JsonFormat`] and [`BincodeFormat`],
//! plus [`write_velocity_table`], a plain-text dump for plotting tools.
//!
//! # Example
//!
//! ```
//! use rhizome_resin_flowtile::{CornerVelocity, Flux, Lattice, StreamField};
//! use rhizome_resin_serde::{ExportOptions, JsonFormat, export_lattice, import_lattice};
//!
//! let mut lattice = Lattice::new(1, 4).unwrap();
//! let tile = StreamField::new(4, Flux::zero(), CornerVelocity::zero()).unwrap();
//! lattice.add_tile(0, 0, tile).unwrap();
//!
//! let format = JsonFormat::pretty();
//! let bytes = export_lattice(&lattice, &format, ExportOptions::default()).unwrap();
//! let loaded = import_lattice(&bytes, &format).unwrap();
//! assert_eq!(loaded, lattice);
//! ```

mod bincode;
mod error;
mod format;
mod json;
mod serial;
mod table;

pub use crate::bincode::BincodeFormat;
pub use crate::error::SerdeError;
pub use crate::format::{LatticeFormat, MAX_INPUT_BYTES};
pub use crate::json::JsonFormat;
pub use crate::serial::{
    ExportOptions, MAX_DIMENSION, MAX_RESOLUTION, MAX_SAMPLES, SerialLattice, SerialTile,
    lattice_to_serial, serial_to_lattice,
};
pub use crate::table::write_velocity_table;

use std::io::{Read, Write};

use rhizome_resin_flowtile::Lattice;

/// Serializes a lattice to bytes.
pub fn export_lattice<Fmt>(
    lattice: &Lattice,
    format: &Fmt,
    options: ExportOptions,
) -> Result<Vec<u8>, SerdeError>
where
    Fmt: LatticeFormat + ?Sized,
{
    let serial = lattice_to_serial(lattice, options);
    let bytes = format.serialize(&serial)?;
    tracing::debug!(
        format = format.name(),
        tiles = serial.tile_count(),
        bytes = bytes.len(),
        "exported lattice"
    );
    Ok(bytes)
}

/// Deserializes a lattice from bytes.
pub fn import_lattice<Fmt>(bytes: &[u8], format: &Fmt) -> Result<Lattice, SerdeError>
where
    Fmt: LatticeFormat + ?Sized,
{
    let serial = format.deserialize(bytes)?;
    tracing::debug!(
        format = format.name(),
        dimension = serial.dimension,
        tiles = serial.tile_count(),
        "imported lattice"
    );
    Ok(serial_to_lattice(serial)?)
}

/// Writes a lattice to `sink`.
pub fn export<W, Fmt>(
    lattice: &Lattice,
    mut sink: W,
    format: &Fmt,
    options: ExportOptions,
) -> Result<(), SerdeError>
where
    W: Write,
    Fmt: LatticeFormat + ?Sized,
{
    let bytes = export_lattice(lattice, format, options)?;
    sink.write_all(&bytes)?;
    sink.flush()?;
    Ok(())
}

/// Reads a lattice from `source`.
pub fn import<R, Fmt>(mut source: R, format: &Fmt) -> Result<Lattice, SerdeError>
where
    R: Read,
    Fmt: LatticeFormat + ?Sized,
{
    let mut bytes = Vec::new();
    source.read_to_end(&mut bytes)?;
    import_lattice(&bytes, format)
}
