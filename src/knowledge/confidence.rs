//! Three-level threat confidence per cell and hazard kind.
//!
//! Confidence here is a heuristic, not a calibrated probability: a cell is
//! either proven clear of a hazard (0.0), suspected (0.5) or proven to hold
//! it (1.0). The decision thresholds elsewhere (0.1, 0.2, 0.5, 0.8) are
//! tuned against exactly these three levels.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::position::Position;

/// The hazard a confidence value refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hazard {
    /// A bottomless pit.
    Pit,
    /// The wumpus.
    Wumpus,
}

impl Hazard {
    /// Both hazard kinds, pit first.
    pub const ALL: [Self; 2] = [Self::Pit, Self::Wumpus];
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pit => write!(f, "Pit"),
            Self::Wumpus => write!(f, "Wumpus"),
        }
    }
}

/// How strongly a hazard is believed to occupy a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatLevel {
    /// Proven absent.
    #[default]
    Absent,
    /// Suspected.
    Possible,
    /// Proven present.
    Certain,
}

impl ThreatLevel {
    /// Numeric value of the level: 0.0, 0.5 or 1.0.
    #[must_use]
    pub const fn value(self) -> f32 {
        match self {
            Self::Absent => 0.0,
            Self::Possible => 0.5,
            Self::Certain => 1.0,
        }
    }
}

impl fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.value())
    }
}

/// Sparse map from `(cell, hazard)` to a threat level.
///
/// Unrecorded entries read as [`ThreatLevel::Absent`]. Escalation is the
/// caller's job; the map itself accepts any level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfidenceMap {
    levels: HashMap<(Position, Hazard), ThreatLevel>,
}

impl ConfidenceMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Numeric confidence for `hazard` at `position` (default 0.0).
    #[must_use]
    pub fn get(&self, position: Position, hazard: Hazard) -> f32 {
        self.level(position, hazard).value()
    }

    /// Level for `hazard` at `position` (default `Absent`).
    #[must_use]
    pub fn level(&self, position: Position, hazard: Hazard) -> ThreatLevel {
        self.levels
            .get(&(position, hazard))
            .copied()
            .unwrap_or_default()
    }

    /// Records a level for `hazard` at `position`.
    pub fn set(&mut self, position: Position, hazard: Hazard, level: ThreatLevel) {
        self.levels.insert((position, hazard), level);
    }

    /// Combined threat score, pit + wumpus, in `[0, 2]`.
    #[must_use]
    pub fn threat_score(&self, position: Position) -> f32 {
        self.get(position, Hazard::Pit) + self.get(position, Hazard::Wumpus)
    }

    /// Returns true if both confidences at `position` are below `threshold`.
    #[must_use]
    pub fn both_below(&self, position: Position, threshold: f32) -> bool {
        self.get(position, Hazard::Pit) < threshold && self.get(position, Hazard::Wumpus) < threshold
    }

    /// Returns true if either hazard is certain at `position`.
    #[must_use]
    pub fn any_certain(&self, position: Position) -> bool {
        Hazard::ALL
            .into_iter()
            .any(|hazard| self.level(position, hazard) == ThreatLevel::Certain)
    }

    /// Nonzero entries, sorted by position then hazard.
    #[must_use]
    pub fn nonzero(&self) -> Vec<(Position, Hazard, ThreatLevel)> {
        let mut entries: Vec<_> = self
            .levels
            .iter()
            .filter(|(_, level)| **level != ThreatLevel::Absent)
            .map(|(&(position, hazard), &level)| (position, hazard, level))
            .collect();
        entries.sort();
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threat_level_values() {
        assert!((ThreatLevel::Absent.value() - 0.0).abs() < f32::EPSILON);
        assert!((ThreatLevel::Possible.value() - 0.5).abs() < f32::EPSILON);
        assert!((ThreatLevel::Certain.value() - 1.0).abs() < f32::EPSILON);
        assert!(ThreatLevel::Absent < ThreatLevel::Possible);
        assert!(ThreatLevel::Possible < ThreatLevel::Certain);
    }

    #[test]
    fn test_default_is_absent() {
        let map = ConfidenceMap::new();
        let p = Position::new(3, 2);
        assert_eq!(map.level(p, Hazard::Pit), ThreatLevel::Absent);
        assert_eq!(map.get(p, Hazard::Wumpus), 0.0);
        assert!(map.both_below(p, 0.1));
    }

    #[test]
    fn test_set_and_score() {
        let mut map = ConfidenceMap::new();
        let p = Position::new(1, 1);
        map.set(p, Hazard::Pit, ThreatLevel::Possible);
        map.set(p, Hazard::Wumpus, ThreatLevel::Certain);

        assert_eq!(map.get(p, Hazard::Pit), 0.5);
        assert_eq!(map.threat_score(p), 1.5);
        assert!(map.any_certain(p));
        assert!(!map.both_below(p, 0.2));
    }

    #[test]
    fn test_nonzero_sorted() {
        let mut map = ConfidenceMap::new();
        map.set(Position::new(2, 0), Hazard::Wumpus, ThreatLevel::Possible);
        map.set(Position::new(1, 0), Hazard::Pit, ThreatLevel::Certain);
        map.set(Position::new(0, 1), Hazard::Pit, ThreatLevel::Absent);

        let entries = map.nonzero();
        assert_eq!(
            entries,
            vec![
                (Position::new(1, 0), Hazard::Pit, ThreatLevel::Certain),
                (Position::new(2, 0), Hazard::Wumpus, ThreatLevel::Possible),
            ]
        );
    }
}
