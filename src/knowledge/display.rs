//! Read-only per-cell status view derived from facts and confidence.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fact::Predicate;
use crate::position::Position;

use super::confidence::{Hazard, ThreatLevel};
use super::KnowledgeBase;

/// Derived status of one cell, highest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStatus {
    /// The agent has stood here.
    Visited,
    /// Known to be free of hazards.
    Safe,
    /// Pit confidence is 1.0.
    DefinitePit,
    /// Wumpus confidence is 1.0.
    DefiniteWumpus,
    /// Both pit and wumpus confidence are 0.5.
    PitOrWumpus,
    /// Pit confidence is 0.5.
    PossiblePit,
    /// Wumpus confidence is 0.5.
    PossibleWumpus,
    /// Nothing is known.
    Unknown,
}

impl CellStatus {
    /// Single-character glyph for text rendering.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Visited => '.',
            Self::Safe => 'o',
            Self::DefinitePit => 'P',
            Self::DefiniteWumpus => 'W',
            Self::PitOrWumpus => '?',
            Self::PossiblePit => 'p',
            Self::PossibleWumpus => 'w',
            Self::Unknown => '#',
        }
    }
}

/// Square grid of [`CellStatus`] values.
///
/// Always rebuilt from the knowledge base; never mutated on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayingGrid {
    size: usize,
    cells: Vec<CellStatus>,
}

impl PlayingGrid {
    /// Projects the current knowledge into a status grid.
    #[must_use]
    pub fn project(kb: &KnowledgeBase) -> Self {
        let size = kb.grid_size();
        let cells = Position::all(size).map(|p| status_of(kb, p)).collect();
        Self { size, cells }
    }

    /// Grid side length.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Status at `position`, or `None` when off the grid or missing from a
    /// truncated grid.
    #[must_use]
    pub fn get(&self, position: Position) -> Option<CellStatus> {
        if !position.in_bounds(self.size) {
            return None;
        }
        self.cells.get(position.y * self.size + position.x).copied()
    }

    /// Rows from `y = 0` downwards.
    pub fn rows(&self) -> impl Iterator<Item = &[CellStatus]> {
        self.cells.chunks(self.size.max(1))
    }
}

impl fmt::Display for PlayingGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: String = row.iter().map(|s| s.glyph()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

fn status_of(kb: &KnowledgeBase, p: Position) -> CellStatus {
    let pit = kb.level(p, Hazard::Pit);
    let wumpus = kb.level(p, Hazard::Wumpus);

    if kb.holds(&Predicate::Visited.at(p)) {
        CellStatus::Visited
    } else if kb.holds(&Predicate::Safe.at(p)) {
        CellStatus::Safe
    } else if pit == ThreatLevel::Certain {
        CellStatus::DefinitePit
    } else if wumpus == ThreatLevel::Certain {
        CellStatus::DefiniteWumpus
    } else if pit == ThreatLevel::Possible && wumpus == ThreatLevel::Possible {
        CellStatus::PitOrWumpus
    } else if pit == ThreatLevel::Possible {
        CellStatus::PossiblePit
    } else if wumpus == ThreatLevel::Possible {
        CellStatus::PossibleWumpus
    } else {
        CellStatus::Unknown
    }
}
