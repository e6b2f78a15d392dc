//! Divergence-free flow tiles for resin.
//!
//! A [`StreamField`] is a small velocity grid whose boundary carries fixed
//! integer fluxes and pinned corner velocities. Because the field is the
//! curl of an interpolated stream function, it has no sources or sinks, and
//! tiles with matching edges can be laid side by side in a [`Lattice`]
//! without breaking continuity.
//!
//! # Example
//!
//! ```
//! use rhizome_resin_flowtile::{CornerVelocity, Flux, Lattice, StreamField};
//!
//! // One unit of flow enters on the left and leaves through the top.
//! let tile = StreamField::new(8, Flux::new(1, 0, 0, 1), CornerVelocity::zero()).unwrap();
//!
//! let mut lattice = Lattice::new(1, 8).unwrap();
//! lattice.add_tile(0, 0, tile).unwrap();
//!
//! let v = lattice.velocity_at_world(0.5, 0.5, 1.0).unwrap();
//! assert!(v.is_finite());
//! ```

mod error;
mod flux;
mod lattice;
mod stream;

pub use error::FlowError;
pub use flux::{Corner, CornerVelocity, Direction, Flux};
pub use lattice::{Lattice, world_to_cell};
pub use stream::StreamField;
