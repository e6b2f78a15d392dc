//! Serializable descriptions of lattices.

use glam::Vec2;
use rhizome_resin_flowtile::{CornerVelocity, FlowError, Flux, Lattice, StreamField};
use serde::{Deserialize, Serialize};

/// Largest lattice dimension accepted on import.
pub const MAX_DIMENSION: usize = 256;

/// Largest tile resolution accepted on import.
pub const MAX_RESOLUTION: usize = 256;

/// Largest total number of velocity samples an import may build.
///
/// Counted as `tiles × resolution²` before any tile is constructed.
pub const MAX_SAMPLES: usize = 1 << 20;

/// One filled cell of a lattice.
///
/// A tile is fully described by its flux and corner velocities. The
/// sample grid is only needed when it was edited after construction, for
/// example by edge smoothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialTile {
    /// Row of the cell, 0 at the top.
    pub row: usize,
    /// Column of the cell.
    pub col: usize,
    /// Edge fluxes.
    pub flux: Flux,
    /// Corner velocities.
    pub corners: CornerVelocity,
    /// Velocity samples, row-major from the bottom row of the tile.
    pub velocities: Option<Vec<Vec2>>,
}

/// Serializable representation of a lattice.
///
/// Empty cells are omitted; tiles are listed in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialLattice {
    /// Cells along each side.
    pub dimension: usize,
    /// Velocity samples along each side of a tile.
    pub resolution: usize,
    /// Filled cells.
    pub tiles: Vec<SerialTile>,
}

impl SerialLattice {
    /// Creates a description with no tiles.
    pub fn new(dimension: usize, resolution: usize) -> Self {
        Self {
            dimension,
            resolution,
            tiles: Vec::new(),
        }
    }

    /// Returns the number of tiles.
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }
}

/// Options for [`lattice_to_serial`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Whether to write every tile's velocity samples.
    pub include_velocities: bool,
}

impl ExportOptions {
    /// Options that also export the velocity samples.
    pub fn with_velocities() -> Self {
        Self {
            include_velocities: true,
        }
    }
}

/// Converts a runtime [`Lattice`] to a [`SerialLattice`].
pub fn lattice_to_serial(lattice: &Lattice, options: ExportOptions) -> SerialLattice {
    let tiles = lattice
        .iter()
        .filter_map(|(row, col, tile)| {
            tile.map(|tile| SerialTile {
                row,
                col,
                flux: tile.flux(),
                corners: tile.corners(),
                velocities: options
                    .include_velocities
                    .then(|| tile.velocities().to_vec()),
            })
        })
        .collect();

    SerialLattice {
        dimension: lattice.dimension(),
        resolution: lattice.resolution(),
        tiles,
    }
}

/// Rebuilds a [`Lattice`] from its description.
///
/// Each tile is rebuilt from its flux and corners. When velocity samples
/// are present they replace the rebuilt grid.
///
/// # Errors
///
/// Fails if the dimension or resolution is out of range, the tiles would
/// need more than [`MAX_SAMPLES`] samples, a velocity list has the wrong
/// length, or two tiles claim the same cell.
pub fn serial_to_lattice(serial: SerialLattice) -> Result<Lattice, FlowError> {
    check_budget(&serial)?;


    let mut lattice = Lattice::new(serial.dimension, serial.resolution)?;
    for tile in serial.tiles {
        let mut field = StreamField::new(serial.resolution, tile.flux, tile.corners)?;
        if let Some(velocities) = tile.velocities {
            field = field.with_velocities(velocities)?;
        }
        lattice.add_tile(tile.row, tile.col, field)?;
    }
    Ok(lattice)
}

/// Rejects descriptions that would be too expensive to rebuild.
fn check_budget(serial: &SerialLattice) -> Result<(), FlowError> {
    if serial.dimension > MAX_DIMENSION {
        return Err(FlowError::Configuration(format!(
            "lattice dimension {} exceeds {MAX_DIMENSION}",
            serial.dimension
        )));
    }
    if serial.resolution > MAX_RESOLUTION {
        return Err(FlowError::Configuration(format!(
            "tile resolution {} exceeds {MAX_RESOLUTION}",
            serial.resolution
        )));
    }

    let cells = serial.dimension * serial.dimension;
    if serial.tiles.len() > cells {
        return Err(FlowError::Configuration(format!(
            "{} tiles for {cells} cells",
            serial.tiles.len()
        )));
    }

    let samples = serial
        .tiles
        .len()
        .saturating_mul(serial.resolution * serial.resolution);
    if samples > MAX_SAMPLES {
        return Err(FlowError::Configuration(format!(
            "{samples} velocity samples exceed {MAX_SAMPLES}"
        )));
    }
    Ok(())
}
