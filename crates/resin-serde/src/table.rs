//! Plain-text velocity table.

use std::io::Write;

use crate::error::SerdeError;
use rhizome_resin_flowtile::Lattice;

/// Writes every tile's velocity samples as text.
///
/// Tiles are written in row-major order, empty cells skipped. Each tile
/// contributes one line per sample row, bottom row first, made of
/// `vx,vy;` pairs with two decimals:
///
/// ```text
/// 0.00,0.00;0.12,-0.50;...
/// ```
pub fn write_velocity_table<W: Write>(lattice: &Lattice, mut sink: W) -> Result<(), SerdeError> {
    let resolution = lattice.resolution();
    for (_, _, tile) in lattice.iter() {
        let Some(tile) = tile else { continue };
        for row in tile.velocities().chunks(resolution) {
            for v in row {
                write!(sink, "{:.2},{:.2};", v.x, v.y)?;
            }
            writeln!(sink)?;
        }
    }
    sink.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use rhizome_resin_flowtile::StreamField;

    #[test]
    fn test_table_layout() {
        let mut lattice = Lattice::new(2, 3).unwrap();
        let mut samples = vec![Vec2::ZERO; 9];
        samples[1] = Vec2::new(0.25, -1.5);
        samples[3] = Vec2::new(2.0, 0.0);
        let tile = StreamField::zero(3).unwrap().with_velocities(samples).unwrap();
        lattice.add_tile(0, 1, tile).unwrap();
        lattice.add_tile(1, 0, StreamField::zero(3).unwrap()).unwrap();

        let mut out = Vec::new();
        write_velocity_table(&lattice, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "0.00,0.00;0.25,-1.50;0.00,0.00;");
        assert_eq!(lines[1], "2.00,0.00;0.00,0.00;0.00,0.00;");
        assert_eq!(lines[5], "0.00,0.00;0.00,0.00;0.00,0.00;");
    }
}
