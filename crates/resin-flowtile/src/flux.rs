//! Boundary constraints of a flow tile: edge fluxes and corner velocities.

use glam::Vec2;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Edge of a lattice cell.
///
/// Rows grow downward in the lattice, so `Top` faces row - 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    /// Returns the opposite direction.
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Right => Direction::Left,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
        }
    }

    /// Returns all four directions, clockwise from the top.
    pub fn all() -> [Direction; 4] {
        [
            Direction::Top,
            Direction::Right,
            Direction::Bottom,
            Direction::Left,
        ]
    }

    /// Returns the (row, col) delta to the neighbor across this edge.
    pub fn delta(&self) -> (isize, isize) {
        match self {
            Direction::Top => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Bottom => (1, 0),
            Direction::Left => (0, -1),
        }
    }

    /// Returns true for the edges that carry flux along y (top and bottom).
    pub fn carries_y_flux(&self) -> bool {
        matches!(self, Direction::Top | Direction::Bottom)
    }
}

/// Corner of a lattice cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Corner {
    /// Returns all four corners, clockwise from the top left.
    pub fn all() -> [Corner; 4] {
        [
            Corner::TopLeft,
            Corner::TopRight,
            Corner::BottomRight,
            Corner::BottomLeft,
        ]
    }

    /// Returns the other cells meeting at this corner.
    ///
    /// Each entry is the (row, col) delta to the cell and the corner of that
    /// cell which coincides with this one.
    pub fn sharing(&self) -> [(isize, isize, Corner); 3] {
        match self {
            Corner::TopLeft => [
                (-1, 0, Corner::BottomLeft),
                (0, -1, Corner::TopRight),
                (-1, -1, Corner::BottomRight),
            ],
            Corner::TopRight => [
                (-1, 0, Corner::BottomRight),
                (0, 1, Corner::TopLeft),
                (-1, 1, Corner::BottomLeft),
            ],
            Corner::BottomRight => [
                (1, 0, Corner::TopRight),
                (0, 1, Corner::BottomLeft),
                (1, 1, Corner::TopLeft),
            ],
            Corner::BottomLeft => [
                (1, 0, Corner::TopLeft),
                (0, -1, Corner::BottomRight),
                (1, -1, Corner::TopRight),
            ],
        }
    }

    /// Returns the (i, j) velocity sample at this corner of a tile with
    /// `resolution` samples per side. `j` counts up from the bottom edge.
    pub fn sample_index(&self, resolution: usize) -> (usize, usize) {
        let last = resolution - 1;
        match self {
            Corner::TopLeft => (0, last),
            Corner::TopRight => (last, last),
            Corner::BottomRight => (last, 0),
            Corner::BottomLeft => (0, 0),
        }
    }
}

/// Signed integer flux through each edge of a tile.
///
/// Left and right values are flow along +x, top and bottom values flow
/// along +y, so two tiles sharing an edge carry the same value for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Flux {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Flux {
    /// Creates a flux from its edges, clockwise from the top.
    pub fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Returns the flux with every edge at zero.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Returns the flux through one edge.
    pub fn get(&self, direction: Direction) -> i32 {
        match direction {
            Direction::Top => self.top,
            Direction::Right => self.right,
            Direction::Bottom => self.bottom,
            Direction::Left => self.left,
        }
    }

    /// Sets the flux through one edge.
    pub fn set(&mut self, direction: Direction, value: i32) {
        match direction {
            Direction::Top => self.top = value,
            Direction::Right => self.right = value,
            Direction::Bottom => self.bottom = value,
            Direction::Left => self.left = value,
        }
    }

    /// Returns outflow minus inflow.
    pub fn net_outflow(&self) -> i32 {
        self.right + self.top - self.left - self.bottom
    }

    /// Returns true if as much flows in as flows out.
    pub fn is_balanced(&self) -> bool {
        self.net_outflow() == 0
    }
}

/// Velocity vectors pinned at the four corners of a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CornerVelocity {
    pub top_left: Vec2,
    pub top_right: Vec2,
    pub bottom_left: Vec2,
    pub bottom_right: Vec2,
}

impl CornerVelocity {
    /// Creates corner velocities.
    pub fn new(top_left: Vec2, top_right: Vec2, bottom_left: Vec2, bottom_right: Vec2) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }
    }

    /// Returns zero velocity at every corner.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Returns the same velocity at every corner.
    pub fn uniform(velocity: Vec2) -> Self {
        Self::new(velocity, velocity, velocity, velocity)
    }

    /// Returns the velocity at one corner.
    pub fn get(&self, corner: Corner) -> Vec2 {
        match corner {
            Corner::TopLeft => self.top_left,
            Corner::TopRight => self.top_right,
            Corner::BottomRight => self.bottom_right,
            Corner::BottomLeft => self.bottom_left,
        }
    }

    /// Sets the velocity at one corner.
    pub fn set(&mut self, corner: Corner, velocity: Vec2) {
        match corner {
            Corner::TopLeft => self.top_left = velocity,
            Corner::TopRight => self.top_right = velocity,
            Corner::BottomRight => self.bottom_right = velocity,
            Corner::BottomLeft => self.bottom_left = velocity,
        }
    }
}
