//! Fills a lattice with random flow tiles, smooths it and prints the
//! velocity table.
//!
//! ```sh
//! RUST_LOG=rhizome_resin_tiling=debug cargo run --example fill_lattice -- 4 15 1
//! ```
//!
//! Arguments are the lattice dimension, tile resolution and seed.

use std::io;

use rhizome_resin_serde::write_velocity_table;
use rhizome_resin_tiling::{TileAssembler, TilingConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let dimension = args.next().map(|s| s.parse::<usize>()).transpose()?.unwrap_or(3);
    let resolution = args.next().map(|s| s.parse::<usize>()).transpose()?.unwrap_or(15);
    let seed = args.next().map(|s| s.parse::<u64>()).transpose()?.unwrap_or(0);

    let mut assembler = TileAssembler::with_seed(TilingConfig::new(dimension, resolution), seed)?;
    assembler.fill_random()?;

    let mut lattice = assembler.into_lattice();
    lattice.smoothen_edges()?;

    for (row, col, tile) in lattice.iter() {
        if let Some(tile) = tile {
            tracing::info!(row, col, flux = ?tile.flux(), "tile");
        }
    }

    write_velocity_table(&lattice, io::stdout().lock())?;
    Ok(())
}
