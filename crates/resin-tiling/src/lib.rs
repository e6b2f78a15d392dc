//! Constraint-driven assembly of flow-tile lattices.
//!
//! [`TileAssembler`] fills a [`Lattice`](rhizome_resin_flowtile::Lattice)
//! one cell at a time. Before each placement a [`ConstraintOracle`] poses
//! the remaining lattice as a linear program over edge fluxes, so every
//! committed tile leaves the rest of the lattice solvable and neighbors
//! always agree on the flux through their shared edge.
//!
//! # Example
//!
//! ```
//! use rhizome_resin_tiling::{TileAssembler, TilingConfig};
//!
//! let mut assembler = TileAssembler::with_seed(TilingConfig::new(3, 8), 7).unwrap();
//! assembler.fill_random().unwrap();
//!
//! let mut lattice = assembler.into_lattice();
//! lattice.smoothen_edges().unwrap();
//! assert!(lattice.is_full());
//! ```

mod assembler;
mod error;
mod lp;
mod oracle;

pub use assembler::{RandomSelector, TileAssembler, TileCandidate, TileSelector, TilingConfig};
pub use error::TilingError;
pub use lp::{LinearModel, Objective, SolveStatus};
pub use oracle::{ConstraintOracle, FluxBounds, edge_count, edge_index, is_world_boundary};
