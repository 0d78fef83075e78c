//! The physical wumpus world the agent explores.
//!
//! The agent never reads a [`WumpusWorld`] directly. It only sees the
//! [`PerceptSet`] the [`Environment`] reports for its current cell.

use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, AgentResult, ExecutionError, ValidationError};
use crate::knowledge::{Percept, PerceptSet};
use crate::position::{Direction, Position};

/// Smallest supported grid.
pub const MIN_GRID_SIZE: usize = 2;

/// One row of a world file: tile symbols, optionally space separated.
const ROW_SYNTAX: &str = r"^\s*[-PWG](?:\s*[-PWG])*\s*$";

static ROW_PATTERN: OnceLock<Regex> = OnceLock::new();

fn row_pattern() -> AgentResult<&'static Regex> {
    if let Some(re) = ROW_PATTERN.get() {
        return Ok(re);
    }
    let re = Regex::new(ROW_SYNTAX)
        .map_err(|e| AgentError::internal(format!("world row pattern: {e}")))?;
    Ok(ROW_PATTERN.get_or_init(|| re))
}

/// Ground truth contents of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tile {
    /// Nothing.
    #[default]
    Empty,
    /// A pit; entering is fatal.
    Pit,
    /// A live wumpus; entering is fatal.
    Wumpus,
    /// The gold.
    Gold,
}

impl Tile {
    /// World file symbol.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Empty => '-',
            Self::Pit => 'P',
            Self::Wumpus => 'W',
            Self::Gold => 'G',
        }
    }

    fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '-' => Some(Self::Empty),
            'P' => Some(Self::Pit),
            'W' => Some(Self::Wumpus),
            'G' => Some(Self::Gold),
            _ => None,
        }
    }

    /// Returns true if entering this tile kills the agent.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::Pit | Self::Wumpus)
    }
}

/// What the agent can observe and affect.
pub trait Environment {
    /// Side length of the square grid.
    fn grid_size(&self) -> usize;

    /// Percepts reported at `position`. Breeze and Stench are reported
    /// together when both apply.
    fn percepts(&self, position: Position) -> PerceptSet;

    /// Returns true if `position` lies on the grid.
    fn is_valid_position(&self, position: Position) -> bool {
        position.in_bounds(self.grid_size())
    }

    /// Fires into the cell adjacent to `from`. Returns true iff a wumpus was
    /// there; it is removed, so a second shot at the same cell misses.
    fn shoot_arrow(&mut self, from: Position, direction: Direction) -> bool;

    /// Ground truth at `position`.
    fn contents(&self, position: Position) -> Tile;

    /// Removes the gold from `position`. Returns false if none was there.
    fn take_gold(&mut self, position: Position) -> bool;
}

/// A square grid of [`Tile`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WumpusWorld {
    size: usize,
    tiles: Vec<Tile>,
}

impl WumpusWorld {
    /// Creates an empty world.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is below [`MIN_GRID_SIZE`].
    pub fn empty(size: usize) -> AgentResult<Self> {
        if size < MIN_GRID_SIZE {
            return Err(ValidationError::GridTooSmall {
                size,
                min: MIN_GRID_SIZE,
            }
            .into());
        }
        Ok(Self {
            size,
            tiles: vec![Tile::Empty; size * size],
        })
    }

    /// Parses a world from text.
    ///
    /// One row per line, top row first, using `-`, `P`, `W` and `G`. Blank
    /// lines and lines starting with `#` are ignored. The grid must be
    /// square, hold at most one gold, and leave the origin empty.
    ///
    /// # Errors
    ///
    /// Returns a validation error describing the first offending line.
    pub fn parse(text: &str) -> AgentResult<Self> {
        let pattern = row_pattern()?;
        let mut rows: Vec<(usize, Vec<Tile>)> = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if !pattern.is_match(trimmed) {
                return Err(malformed(line_no, format!("unexpected symbols in '{trimmed}'")));
            }
            let row = trimmed
                .chars()
                .filter(|c| !c.is_whitespace())
                .filter_map(Tile::from_symbol)
                .collect();
            rows.push((line_no, row));
        }

        let size = rows.len();
        if size < MIN_GRID_SIZE {
            return Err(ValidationError::GridTooSmall {
                size,
                min: MIN_GRID_SIZE,
            }
            .into());
        }

        let mut tiles = Vec::with_capacity(size * size);
        for (line_no, row) in rows {
            if row.len() != size {
                return Err(malformed(
                    line_no,
                    format!("row has {} cells, expected {size}", row.len()),
                ));
            }
            tiles.extend(row);
        }

        let world = Self { size, tiles };
        if world.contents(Position::ORIGIN) != Tile::Empty {
            return Err(malformed(1, "the origin (0,0) must be empty".to_string()));
        }
        if world.tiles.iter().filter(|t| **t == Tile::Gold).count() > 1 {
            return Err(malformed(1, "at most one gold is allowed".to_string()));
        }
        Ok(world)
    }

    /// Loads and parses a world file.
    ///
    /// # Errors
    ///
    /// Returns an execution error if the file cannot be read and a
    /// validation error if its content is malformed.
    pub fn from_file(path: impl AsRef<Path>) -> AgentResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ExecutionError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&text)
    }

    /// Generates a random world from `seed`.
    ///
    /// One gold away from the origin, 2 to 6 wumpuses and 4 to 8 pits, each
    /// clamped to the free cells that remain.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is below [`MIN_GRID_SIZE`].
    pub fn random(size: usize, seed: u64) -> AgentResult<Self> {
        let mut world = Self::empty(size)?;
        let mut rng = StdRng::seed_from_u64(seed);

        let mut free: Vec<Position> = Position::all(size)
            .filter(|p| *p != Position::ORIGIN)
            .collect();
        free.shuffle(&mut rng);

        let wumpuses = rng.gen_range(2..=6);
        let pits = rng.gen_range(4..=8);

        if let Some(gold) = free.pop() {
            world.set(gold, Tile::Gold);
        }
        for _ in 0..wumpuses {
            let Some(cell) = free.pop() else { break };
            world.set(cell, Tile::Wumpus);
        }
        for _ in 0..pits {
            let Some(cell) = free.pop() else { break };
            world.set(cell, Tile::Pit);
        }
        Ok(world)
    }

    /// Places `tile` at `position`; ignored off the grid.
    pub fn set(&mut self, position: Position, tile: Tile) {
        if let Some(idx) = self.index(position) {
            self.tiles[idx] = tile;
        }
    }

    /// Where the gold lies, if it is still in the world.
    #[must_use]
    pub fn gold(&self) -> Option<Position> {
        Position::all(self.size).find(|p| self.contents(*p) == Tile::Gold)
    }

    /// Number of cells holding `tile`.
    #[must_use]
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|t| **t == tile).count()
    }

    /// Text rendering, one row per line, symbols separated by spaces.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }

    fn index(&self, position: Position) -> Option<usize> {
        position
            .in_bounds(self.size)
            .then_some(position.y * self.size + position.x)
    }

    fn any_adjacent(&self, position: Position, tile: Tile) -> bool {
        position
            .neighbors(self.size)
            .any(|n| self.contents(n) == tile)
    }
}

fn malformed(line: usize, reason: String) -> AgentError {
    ValidationError::MalformedWorld { line, reason }.into()
}

impl Environment for WumpusWorld {
    fn grid_size(&self) -> usize {
        self.size
    }

    fn percepts(&self, position: Position) -> PerceptSet {
        let mut percepts = PerceptSet::empty();
        if self.any_adjacent(position, Tile::Pit) {
            percepts.insert(Percept::Breeze);
        }
        if self.any_adjacent(position, Tile::Wumpus) {
            percepts.insert(Percept::Stench);
        }
        if self.contents(position) == Tile::Gold {
            percepts.insert(Percept::Glitter);
        }
        percepts
    }

    fn shoot_arrow(&mut self, from: Position, direction: Direction) -> bool {
        let Some(target) = from.step(direction, self.size) else {
            return false;
        };
        if self.contents(target) != Tile::Wumpus {
            return false;
        }
        self.set(target, Tile::Empty);
        true
    }

    fn contents(&self, position: Position) -> Tile {
        self.index(position)
            .map_or(Tile::Empty, |idx| self.tiles[idx])
    }

    fn take_gold(&mut self, position: Position) -> bool {
        if self.contents(position) != Tile::Gold {
            return false;
        }
        self.set(position, Tile::Empty);
        true
    }
}

impl fmt::Display for WumpusWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.tiles.chunks(self.size) {
            let symbols: Vec<String> = row.iter().map(|t| t.symbol().to_string()).collect();
            writeln!(f, "{}", symbols.join(" "))?;
        }
        Ok(())
    }
}
