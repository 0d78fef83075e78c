//! Grid coordinates and movement directions.
//!
//! The grid is square with the origin `(0,0)` in the top-left corner:
//! `Up` decreases `y`, `Down` increases it. Neighbor enumeration always
//! follows [`Direction::ALL`], which doubles as the deterministic tie-break
//! order for every "first best candidate wins" choice in the crate.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell coordinate on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Column, growing to the right.
    pub x: usize,
    /// Row, growing downwards.
    pub y: usize,
}

impl Position {
    /// The entry and exit cell of every episode.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Creates a position.
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Returns true if this position lies on a `grid_size` square grid.
    #[must_use]
    pub const fn in_bounds(self, grid_size: usize) -> bool {
        self.x < grid_size && self.y < grid_size
    }

    /// Returns the adjacent position in `direction`, if it stays on the grid.
    #[must_use]
    pub fn step(self, direction: Direction, grid_size: usize) -> Option<Self> {
        let next = match direction {
            Direction::Up => Self::new(self.x, self.y.checked_sub(1)?),
            Direction::Right => Self::new(self.x + 1, self.y),
            Direction::Down => Self::new(self.x, self.y + 1),
            Direction::Left => Self::new(self.x.checked_sub(1)?, self.y),
        };
        next.in_bounds(grid_size).then_some(next)
    }

    /// In-bounds 4-connected neighbors, in [`Direction::ALL`] order.
    pub fn neighbors(self, grid_size: usize) -> impl Iterator<Item = Self> {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| self.step(dir, grid_size))
    }

    /// Direction leading from `self` to an adjacent `other`.
    ///
    /// Returns `None` when the two cells are not 4-adjacent.
    #[must_use]
    pub fn direction_to(self, other: Self) -> Option<Direction> {
        Direction::ALL.into_iter().find(|dir| match dir {
            Direction::Up => other.x == self.x && other.y + 1 == self.y,
            Direction::Right => other.x == self.x + 1 && other.y == self.y,
            Direction::Down => other.x == self.x && other.y == self.y + 1,
            Direction::Left => other.x + 1 == self.x && other.y == self.y,
        })
    }

    /// Iterates every cell of a `grid_size` grid in row-major order.
    pub fn all(grid_size: usize) -> impl Iterator<Item = Self> {
        (0..grid_size).flat_map(move |y| (0..grid_size).map(move |x| Self::new(x, y)))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// One of the four grid moves. Diagonals never occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Towards `y - 1`.
    Up,
    /// Towards `x + 1`.
    Right,
    /// Towards `y + 1`.
    Down,
    /// Towards `x - 1`.
    Left,
}

impl Direction {
    /// Enumeration and tie-break order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Upper-case label used in rule labels (`Move_UP`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Right => "RIGHT",
            Self::Down => "DOWN",
            Self::Left => "LEFT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
