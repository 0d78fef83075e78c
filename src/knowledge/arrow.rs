//! The single arrow: target selection inputs and result correction.

use serde::{Deserialize, Serialize};

use crate::fact::Predicate;
use crate::position::Position;

use super::confidence::{Hazard, ThreatLevel};
use super::KnowledgeBase;

/// Arrow availability for one episode.
///
/// Goes from available to used exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrowState {
    /// The arrow can still be fired.
    pub available: bool,
    /// The arrow has been fired.
    pub used: bool,
    /// Where it was fired, once fired.
    pub last_target: Option<Position>,
}

impl Default for ArrowState {
    fn default() -> Self {
        Self {
            available: true,
            used: false,
            last_target: None,
        }
    }
}

/// What the knowledge base concluded from an arrow result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowOutcome {
    /// A scream was heard; the wumpus is dead and the cell is safe.
    Killed,
    /// No scream; the cell held no wumpus and nothing else was suspected.
    Missed,
    /// No scream, but the cell is still suspected of holding a pit.
    MissedPitSuspected,
}

impl KnowledgeBase {
    /// Current arrow state.
    #[must_use]
    pub const fn arrow(&self) -> ArrowState {
        self.arrow
    }

    /// Adjacent unvisited cells with wumpus confidence of at least 0.5.
    ///
    /// Empty once the arrow has been used.
    #[must_use]
    pub fn arrow_targets(&self, position: Position) -> Vec<Position> {
        if !self.arrow.available {
            return Vec::new();
        }
        self.neighbors(position)
            .into_iter()
            .filter(|n| !self.is_visited(*n) && self.confidence(*n, Hazard::Wumpus) >= 0.5)
            .collect()
    }

    /// Spends the arrow on `target`.
    pub fn use_arrow(&mut self, target: Position) {
        self.arrow = ArrowState {
            available: false,
            used: true,
            last_target: Some(target),
        };
    }

    /// Corrects knowledge about `target` after a shot.
    pub fn resolve_arrow(&mut self, target: Position, heard_scream: bool) -> ArrowOutcome {
        if heard_scream {
            self.set_confidence(target, Hazard::Wumpus, ThreatLevel::Absent);
            self.assert_fact(Predicate::Safe.at(target));
            self.assert_fact(Predicate::WumpusKilled.at(target));
            return ArrowOutcome::Killed;
        }

        let ambiguous =
            self.confidence(target, Hazard::Pit) > 0.0 && self.confidence(target, Hazard::Wumpus) > 0.0;
        self.set_confidence(target, Hazard::Wumpus, ThreatLevel::Absent);
        if ambiguous {
            return ArrowOutcome::MissedPitSuspected;
        }
        self.set_confidence(target, Hazard::Pit, ThreatLevel::Absent);
        self.assert_fact(Predicate::Safe.at(target));
        ArrowOutcome::Missed
    }
}
