//! Square lattices of flow tiles.

use crate::error::FlowError;
use crate::flux::{Corner, Direction};
use crate::stream::StreamField;
use glam::Vec2;

/// An `N × N` grid of optional flow tiles.
///
/// Row 0 is the top of the lattice; rows grow downward. Every tile placed
/// in the lattice must share its resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    dimension: usize,
    resolution: usize,
    slots: Vec<Option<StreamField>>,
}

impl Lattice {
    /// Creates an empty lattice.
    pub fn new(dimension: usize, resolution: usize) -> Result<Self, FlowError> {
        if dimension == 0 {
            return Err(FlowError::Configuration(
                "lattice dimension must be at least 1".into(),
            ));
        }
        if resolution < 3 {
            return Err(FlowError::Configuration(format!(
                "tile resolution must be at least 3, got {resolution}"
            )));
        }

        Ok(Self {
            dimension,
            resolution,
            slots: vec![None; dimension * dimension],
        })
    }

    /// Returns the number of cells along each side.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the velocity samples per tile side.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Returns true if `(row, col)` is in range and holds a tile.
    pub fn has_tile(&self, row: usize, col: usize) -> bool {
        self.tile(row, col).is_some()
    }

    /// Places a tile in an empty slot.
    pub fn add_tile(&mut self, row: usize, col: usize, tile: StreamField) -> Result<(), FlowError> {
        if tile.resolution() != self.resolution {
            return Err(FlowError::Configuration(format!(
                "tile resolution {} does not match lattice resolution {}",
                tile.resolution(),
                self.resolution
            )));
        }

        let index = self.index(row, col)?;
        let slot = &mut self.slots[index];
        if slot.is_some() {
            return Err(FlowError::AlreadyOccupied { row, col });
        }
        *slot = Some(tile);
        Ok(())
    }

    /// Returns the tile at `(row, col)`.
    pub fn get_tile(&self, row: usize, col: usize) -> Result<&StreamField, FlowError> {
        self.slot(row, col)?
            .as_ref()
            .ok_or(FlowError::EmptySlot { row, col })
    }

    /// Returns the tile at `(row, col)` if the slot is in range and filled.
    pub fn tile(&self, row: usize, col: usize) -> Option<&StreamField> {
        self.slot(row, col).ok().and_then(Option::as_ref)
    }

    /// Returns the tile across `direction` from `(row, col)`, if any.
    pub fn neighbor(&self, row: usize, col: usize, direction: Direction) -> Option<&StreamField> {
        let (dr, dc) = direction.delta();
        let r = row.checked_add_signed(dr)?;
        let c = col.checked_add_signed(dc)?;
        self.tile(r, c)
    }

    /// Returns true once every slot holds a tile.
    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Returns the number of filled slots.
    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Empties every slot.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Iterates over every slot in row-major order as `(row, col, tile)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Option<&StreamField>)> {
        let n = self.dimension;
        self.slots
            .iter()
            .enumerate()
            .map(move |(index, slot)| (index / n, index % n, slot.as_ref()))
    }

    /// Iterates over every `(row, col)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> {
        let n = self.dimension;
        (0..n * n).map(move |index| (index / n, index % n))
    }

    /// Averages velocities where neighboring tiles meet.
    ///
    /// Samples on a shared edge (excluding its endpoints) become the mean of
    /// the two coincident samples. Samples at a lattice vertex become the
    /// mean over every tile touching that vertex. Requires a full lattice.
    pub fn smoothen_edges(&mut self) -> Result<(), FlowError> {
        if !self.is_full() {
            return Err(FlowError::IncompleteLattice {
                filled: self.filled_count(),
                total: self.slots.len(),
            });
        }

        let n = self.dimension;
        let last = self.resolution - 1;

        // ====================================================================
        // Shared vertical edges: right column of (r, c), left column of (r, c + 1)
        // ====================================================================
        for r in 0..n {
            for c in 0..n.saturating_sub(1) {
                for j in 1..last {
                    let a = self.sample(r, c, last, j);
                    let b = self.sample(r, c + 1, 0, j);
                    let mean = (a + b) * 0.5;
                    self.set_sample(r, c, last, j, mean);
                    self.set_sample(r, c + 1, 0, j, mean);
                }
            }
        }

        // ====================================================================
        // Shared horizontal edges: bottom row of (r, c), top row of (r + 1, c)
        // ====================================================================
        for r in 0..n.saturating_sub(1) {
            for c in 0..n {
                for i in 1..last {
                    let a = self.sample(r, c, i, 0);
                    let b = self.sample(r + 1, c, i, last);
                    let mean = (a + b) * 0.5;
                    self.set_sample(r, c, i, 0, mean);
                    self.set_sample(r + 1, c, i, last, mean);
                }
            }
        }

        // ====================================================================
        // Lattice vertices
        // ====================================================================
        for vr in 0..=n {
            for vc in 0..=n {
                let group: Vec<(usize, usize, Corner)> = [
                    (vr.checked_sub(1), vc.checked_sub(1), Corner::BottomRight),
                    (vr.checked_sub(1), Some(vc), Corner::BottomLeft),
                    (Some(vr), vc.checked_sub(1), Corner::TopRight),
                    (Some(vr), Some(vc), Corner::TopLeft),
                ]
                .into_iter()
                .filter_map(|(r, c, corner)| match (r, c) {
                    (Some(r), Some(c)) if r < n && c < n => Some((r, c, corner)),
                    _ => None,
                })
                .collect();

                if group.len() < 2 {
                    continue;
                }

                let resolution = self.resolution;
                let sum: Vec2 = group
                    .iter()
                    .map(|&(r, c, corner)| {
                        let (i, j) = corner.sample_index(resolution);
                        self.sample(r, c, i, j)
                    })
                    .sum();
                let mean = sum / group.len() as f32;

                for &(r, c, corner) in &group {
                    let (i, j) = corner.sample_index(resolution);
                    self.set_sample(r, c, i, j, mean);
                }
            }
        }

        tracing::debug!(dimension = n, "smoothed lattice edges");
        Ok(())
    }

    /// Samples the lattice velocity at a world position.
    ///
    /// The lattice spans `[0, extent]` on both axes with `y` pointing up,
    /// so world `y = extent` lies along the top of row 0.
    pub fn velocity_at_world(&self, x: f32, y: f32, extent: f32) -> Result<Vec2, FlowError> {
        let (row, col) = world_to_cell(x, y, extent, self.dimension)?;
        let n = self.dimension as f32;
        let local_x = (x / extent * n - col as f32).clamp(0.0, 1.0);
        let local_y = (y / extent * n - (self.dimension - 1 - row) as f32).clamp(0.0, 1.0);
        self.get_tile(row, col)?.velocity(local_x, local_y)
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, FlowError> {
        if row >= self.dimension || col >= self.dimension {
            return Err(FlowError::OutOfRange(format!(
                "cell ({row}, {col}) outside {0}×{0} lattice",
                self.dimension
            )));
        }
        Ok(row * self.dimension + col)
    }

    fn slot(&self, row: usize, col: usize) -> Result<&Option<StreamField>, FlowError> {
        Ok(&self.slots[self.index(row, col)?])
    }

    // Only called on a full lattice with in-range indices.
    fn sample(&self, row: usize, col: usize, i: usize, j: usize) -> Vec2 {
        match &self.slots[row * self.dimension + col] {
            Some(tile) => tile.velocities()[j * self.resolution + i],
            None => Vec2::ZERO,
        }
    }

    fn set_sample(&mut self, row: usize, col: usize, i: usize, j: usize, velocity: Vec2) {
        if let Some(tile) = &mut self.slots[row * self.dimension + col] {
            tile.set_velocity_at(i, j, velocity);
        }
    }
}

/// Maps a world position to the lattice cell containing it.
///
/// The lattice covers `[0, extent]` on both axes. Row 0 is at the top, so
/// larger `y` maps to smaller rows. Positions on the far boundary belong to
/// the last cell. A lattice with no cells is a configuration error.
pub fn world_to_cell(
    x: f32,
    y: f32,
    extent: f32,
    dimension: usize,
) -> Result<(usize, usize), FlowError> {
    if dimension == 0 {
        return Err(FlowError::Configuration(
            "lattice dimension must be at least 1".into(),
        ));
    }
    if !(extent > 0.0) {
        return Err(FlowError::Configuration(format!(
            "lattice extent must be positive, got {extent}"
        )));
    }
    if !(0.0..=extent).contains(&x) || !(0.0..=extent).contains(&y) {
        return Err(FlowError::OutOfRange(format!(
            "world position ({x}, {y}) outside [0, {extent}]"
        )));
    }

    let last = dimension - 1;
    let n = dimension as f32;
    let col = ((x / extent * n).floor() as usize).min(last);
    let from_bottom = ((y / extent * n).floor() as usize).min(last);
    Ok((last - from_bottom, col))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flux::{CornerVelocity, Flux};

    fn tile(resolution: usize, velocity: Vec2) -> StreamField {
        StreamField::zero(resolution)
            .unwrap()
            .with_velocities(vec![velocity; resolution * resolution])
            .unwrap()
    }

    fn full_lattice(n: usize, resolution: usize) -> Lattice {
        let mut lattice = Lattice::new(n, resolution).unwrap();
        for (row, col) in lattice.cells().collect::<Vec<_>>() {
            let v = Vec2::new(row as f32, col as f32);
            lattice.add_tile(row, col, tile(resolution, v)).unwrap();
        }
        lattice
    }

    #[test]
    fn test_new_lattice_is_empty() {
        let lattice = Lattice::new(3, 5).unwrap();
        assert_eq!(lattice.dimension(), 3);
        assert_eq!(lattice.filled_count(), 0);
        assert!(!lattice.is_full());
        assert!(!lattice.has_tile(2, 2));
        assert!(!lattice.has_tile(3, 0));
        assert!(Lattice::new(0, 5).is_err());
        assert!(Lattice::new(2, 2).is_err());
    }

    #[test]
    fn test_add_and_get() {
        let mut lattice = Lattice::new(2, 4).unwrap();
        lattice.add_tile(1, 0, tile(4, Vec2::X)).unwrap();

        assert!(lattice.has_tile(1, 0));
        assert_eq!(lattice.get_tile(1, 0).unwrap().velocity_at(0, 0).unwrap(), Vec2::X);
        assert_eq!(
            lattice.get_tile(0, 0),
            Err(FlowError::EmptySlot { row: 0, col: 0 })
        );
        assert_eq!(
            lattice.add_tile(1, 0, tile(4, Vec2::Y)),
            Err(FlowError::AlreadyOccupied { row: 1, col: 0 })
        );
        assert!(matches!(
            lattice.add_tile(2, 0, tile(4, Vec2::Y)),
            Err(FlowError::OutOfRange(_))
        ));
        assert!(matches!(
            lattice.add_tile(0, 0, tile(5, Vec2::Y)),
            Err(FlowError::Configuration(_))
        ));
        assert!(!lattice.has_tile(0, 2));
    }

    #[test]
    fn test_neighbor() {
        let lattice = full_lattice(3, 3);
        let above = lattice.neighbor(1, 1, Direction::Top).unwrap();
        assert_eq!(above.velocity_at(0, 0).unwrap(), Vec2::new(0.0, 1.0));
        let right = lattice.neighbor(1, 1, Direction::Right).unwrap();
        assert_eq!(right.velocity_at(0, 0).unwrap(), Vec2::new(1.0, 2.0));
        assert!(lattice.neighbor(0, 0, Direction::Top).is_none());
        assert!(lattice.neighbor(2, 2, Direction::Right).is_none());
    }

    #[test]
    fn test_clear() {
        let mut lattice = full_lattice(2, 3);
        assert!(lattice.is_full());
        assert!(lattice.iter().all(|(_, _, tile)| tile.is_some()));
        lattice.clear();
        assert_eq!(lattice.filled_count(), 0);
        assert_eq!(lattice.iter().count(), 4);
        assert!(lattice.iter().all(|(_, _, tile)| tile.is_none()));
    }

    #[test]
    fn test_iter_row_major() {
        let mut lattice = Lattice::new(2, 3).unwrap();
        lattice.add_tile(1, 0, tile(3, Vec2::X)).unwrap();
        let slots: Vec<_> = lattice
            .iter()
            .map(|(row, col, tile)| (row, col, tile.is_some()))
            .collect();
        assert_eq!(
            slots,
            vec![(0, 0, false), (0, 1, false), (1, 0, true), (1, 1, false)]
        );
    }

    #[test]
    fn test_smoothen_requires_full_lattice() {
        let mut lattice = Lattice::new(2, 3).unwrap();
        lattice.add_tile(0, 0, tile(3, Vec2::X)).unwrap();
        assert_eq!(
            lattice.smoothen_edges(),
            Err(FlowError::IncompleteLattice {
                filled: 1,
                total: 4
            })
        );
    }

    #[test]
    fn test_smoothen_shared_edges() {
        let mut lattice = full_lattice(2, 5);
        lattice.smoothen_edges().unwrap();

        // Vertical edge between (0, 0) and (0, 1).
        for j in 1..4 {
            let a = lattice.get_tile(0, 0).unwrap().velocity_at(4, j).unwrap();
            let b = lattice.get_tile(0, 1).unwrap().velocity_at(0, j).unwrap();
            assert_eq!(a, b);
            assert_eq!(a, Vec2::new(0.0, 0.5));
        }

        // Horizontal edge between (0, 1) and (1, 1).
        for i in 1..4 {
            let a = lattice.get_tile(0, 1).unwrap().velocity_at(i, 0).unwrap();
            let b = lattice.get_tile(1, 1).unwrap().velocity_at(i, 4).unwrap();
            assert_eq!(a, b);
            assert_eq!(a, Vec2::new(0.5, 1.0));
        }

        // Interior samples are untouched.
        let inner = lattice.get_tile(1, 0).unwrap().velocity_at(2, 2).unwrap();
        assert_eq!(inner, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_smoothen_vertices() {
        let mut lattice = full_lattice(2, 4);
        lattice.smoothen_edges().unwrap();

        // The center vertex is shared by all four tiles.
        let expected = Vec2::new(0.5, 0.5);
        let tl = lattice.get_tile(0, 0).unwrap().velocity_at(3, 0).unwrap();
        let tr = lattice.get_tile(0, 1).unwrap().velocity_at(0, 0).unwrap();
        let bl = lattice.get_tile(1, 0).unwrap().velocity_at(3, 3).unwrap();
        let br = lattice.get_tile(1, 1).unwrap().velocity_at(0, 3).unwrap();
        for v in [tl, tr, bl, br] {
            assert!((v - expected).length() < 1e-6);
        }

        // A boundary vertex is shared by two tiles.
        let top = lattice.get_tile(0, 0).unwrap().velocity_at(3, 3).unwrap();
        assert!((top - Vec2::new(0.0, 0.5)).length() < 1e-6);

        // Outer corners of the lattice belong to a single tile.
        let corner = lattice.get_tile(0, 0).unwrap().velocity_at(0, 3).unwrap();
        assert_eq!(corner, Vec2::ZERO);
    }

    #[test]
    fn test_smoothen_single_tile_is_noop() {
        let mut lattice = Lattice::new(1, 4).unwrap();
        let before = StreamField::new(4, Flux::new(0, 1, 0, 1), CornerVelocity::zero()).unwrap();
        lattice.add_tile(0, 0, before.clone()).unwrap();
        lattice.smoothen_edges().unwrap();
        assert_eq!(lattice.get_tile(0, 0).unwrap(), &before);
    }

    #[test]
    fn test_world_to_cell() {
        assert_eq!(world_to_cell(0.0, 0.0, 3.0, 3).unwrap(), (2, 0));
        assert_eq!(world_to_cell(2.5, 2.5, 3.0, 3).unwrap(), (0, 2));
        assert_eq!(world_to_cell(3.0, 3.0, 3.0, 3).unwrap(), (0, 2));
        assert_eq!(world_to_cell(1.5, 0.2, 3.0, 3).unwrap(), (2, 1));
        assert!(matches!(
            world_to_cell(3.1, 0.0, 3.0, 3),
            Err(FlowError::OutOfRange(_))
        ));
        assert!(world_to_cell(-0.1, 0.0, 3.0, 3).is_err());
        assert!(matches!(
            world_to_cell(0.0, 0.0, 0.0, 3),
            Err(FlowError::Configuration(_))
        ));
    }

    #[test]
    fn test_world_to_cell_without_cells() {
        assert!(matches!(
            world_to_cell(0.0, 0.0, 1.0, 0),
            Err(FlowError::Configuration(_))
        ));
    }

    #[test]
    fn test_velocity_at_world() {
        let lattice = full_lattice(2, 3);
        // Bottom-left quadrant is row 1, col 0.
        assert_eq!(
            lattice.velocity_at_world(0.25, 0.25, 1.0).unwrap(),
            Vec2::new(1.0, 0.0)
        );
        assert_eq!(
            lattice.velocity_at_world(0.75, 0.75, 1.0).unwrap(),
            Vec2::new(0.0, 1.0)
        );
        assert_eq!(
            lattice.velocity_at_world(1.0, 1.0, 1.0).unwrap(),
            Vec2::new(0.0, 1.0)
        );
        assert!(lattice.velocity_at_world(1.5, 0.5, 1.0).is_err());

        let empty = Lattice::new(2, 3).unwrap();
        assert!(matches!(
            empty.velocity_at_world(0.1, 0.1, 1.0),
            Err(FlowError::EmptySlot { .. })
        ));
    }
}
