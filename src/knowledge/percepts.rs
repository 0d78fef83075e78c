//! Percepts and the per-percept abductive update steps.
//!
//! Each processor performs one step of local reasoning about the neighbors
//! of the agent's cell. No global constraint propagation happens here: two
//! ambiguous breezes sharing an unvisited neighbor stay ambiguous.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fact::Predicate;
use crate::position::Position;

use super::confidence::{Hazard, ThreatLevel};
use super::KnowledgeBase;

/// A sensory signal reported at the agent's cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Percept {
    /// A pit is adjacent.
    Breeze,
    /// A live wumpus is adjacent.
    Stench,
    /// The gold is on this cell.
    Glitter,
    /// The arrow fired last step killed a wumpus.
    Scream,
}

impl Percept {
    const ALL: [Self; 4] = [Self::Breeze, Self::Stench, Self::Glitter, Self::Scream];

    const fn bit(self) -> u8 {
        match self {
            Self::Breeze => 1,
            Self::Stench => 1 << 1,
            Self::Glitter => 1 << 2,
            Self::Scream => 1 << 3,
        }
    }
}

impl fmt::Display for Percept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Breeze => write!(f, "Breeze"),
            Self::Stench => write!(f, "Stench"),
            Self::Glitter => write!(f, "Glitter"),
            Self::Scream => write!(f, "Scream"),
        }
    }
}

/// The set of percepts reported in one step.
///
/// Breeze and Stench are reported together when both apply; they are never
/// merged into a third signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Percept>", into = "Vec<Percept>")]
pub struct PerceptSet(u8);

impl PerceptSet {
    /// The empty set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Adds a percept.
    pub fn insert(&mut self, percept: Percept) {
        self.0 |= percept.bit();
    }

    /// Returns a copy with `percept` added.
    #[must_use]
    pub fn with(mut self, percept: Percept) -> Self {
        self.insert(percept);
        self
    }

    /// Returns true if `percept` is present.
    #[must_use]
    pub const fn contains(self, percept: Percept) -> bool {
        self.0 & percept.bit() != 0
    }

    /// Returns true if nothing was perceived.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the contained percepts in a fixed order.
    pub fn iter(self) -> impl Iterator<Item = Percept> {
        Percept::ALL.into_iter().filter(move |p| self.contains(*p))
    }

    /// Breeze/stench classification; Glitter and Scream are ignored.
    #[must_use]
    pub const fn classify(self) -> PerceptClass {
        match (self.contains(Percept::Breeze), self.contains(Percept::Stench)) {
            (false, false) => PerceptClass::Clear,
            (true, false) => PerceptClass::Breeze,
            (false, true) => PerceptClass::Stench,
            (true, true) => PerceptClass::BreezeAndStench,
        }
    }
}

impl FromIterator<Percept> for PerceptSet {
    fn from_iter<I: IntoIterator<Item = Percept>>(iter: I) -> Self {
        let mut set = Self::empty();
        for percept in iter {
            set.insert(percept);
        }
        set
    }
}

impl From<Vec<Percept>> for PerceptSet {
    fn from(value: Vec<Percept>) -> Self {
        value.into_iter().collect()
    }
}

impl From<PerceptSet> for Vec<Percept> {
    fn from(value: PerceptSet) -> Self {
        value.iter().collect()
    }
}

impl fmt::Display for PerceptSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        for (idx, percept) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{percept}")?;
        }
        Ok(())
    }
}

/// Which threat processor a percept set is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerceptClass {
    /// Neither breeze nor stench.
    Clear,
    /// Breeze only.
    Breeze,
    /// Stench only.
    Stench,
    /// Breeze and stench together.
    BreezeAndStench,
}

impl KnowledgeBase {
    pub(super) fn process_clear(&mut self, cell: Position) {
        self.assert_fact(Predicate::NoBreeze.at(cell));
        self.assert_fact(Predicate::NoStench.at(cell));
        self.assert_fact(Predicate::Safe.at(cell));
        for n in self.neighbors(cell) {
            self.assert_fact(Predicate::Safe.at(n));
            self.set_confidence(n, Hazard::Pit, ThreatLevel::Absent);
            self.set_confidence(n, Hazard::Wumpus, ThreatLevel::Absent);
        }
    }

    pub(super) fn process_breeze(&mut self, cell: Position) {
        self.assert_fact(Predicate::Breeze.at(cell));
        self.assert_fact(Predicate::NoStench.at(cell));

        let neighbors = self.neighbors(cell);
        let unexplained: Vec<Position> = neighbors
            .iter()
            .copied()
            .filter(|n| !self.is_visited(*n) && !self.is_safe(*n))
            .collect();

        if let [pit] = unexplained.as_slice() {
            self.mark_definite(*pit, Hazard::Pit);
            return;
        }

        for n in neighbors {
            if self.is_visited(n) {
                continue;
            }
            if self.confidence(n, Hazard::Pit) < 1.0 && self.confidence(n, Hazard::Wumpus) < 1.0 {
                self.set_confidence(n, Hazard::Pit, ThreatLevel::Possible);
                self.assert_fact(Predicate::PossiblePit.at(n));
            }
        }
    }

    pub(super) fn process_stench(&mut self, cell: Position) {
        self.assert_fact(Predicate::Stench.at(cell));
        self.assert_fact(Predicate::NoBreeze.at(cell));

        let neighbors = self.neighbors(cell);
        let unvisited: Vec<Position> = neighbors
            .iter()
            .copied()
            .filter(|n| !self.is_visited(*n))
            .collect();
        let suspected: Vec<Position> = neighbors
            .iter()
            .copied()
            .filter(|n| self.level(*n, Hazard::Wumpus) == ThreatLevel::Possible)
            .collect();

        if let [wumpus] = suspected.as_slice() {
            self.mark_definite(*wumpus, Hazard::Wumpus);
        } else if let [wumpus] = unvisited.as_slice() {
            self.mark_definite(*wumpus, Hazard::Wumpus);
        } else {
            for n in unvisited {
                if self.threats.any_certain(n) {
                    continue;
                }
                if !self.is_safe(n) || self.level(n, Hazard::Wumpus) == ThreatLevel::Absent {
                    self.set_confidence(n, Hazard::Wumpus, ThreatLevel::Possible);
                    self.assert_fact(Predicate::PossibleWumpus.at(n));
                }
            }
        }
    }

    pub(super) fn process_breeze_and_stench(&mut self, cell: Position) {
        self.assert_fact(Predicate::Breeze.at(cell));
        self.assert_fact(Predicate::Stench.at(cell));

        for n in self.neighbors(cell) {
            if self.is_visited(n) || self.is_safe(n) || self.threats.any_certain(n) {
                continue;
            }
            self.set_confidence(n, Hazard::Pit, ThreatLevel::Possible);
            self.set_confidence(n, Hazard::Wumpus, ThreatLevel::Possible);
            self.assert_fact(Predicate::PossiblePit.at(n));
            self.assert_fact(Predicate::PossibleWumpus.at(n));
        }
    }

    /// Marks `cell` as certainly holding `hazard` and raises its unexplored
    /// neighbors to at least a suspicion of the same hazard.
    fn mark_definite(&mut self, cell: Position, hazard: Hazard) {
        let (definite, possible) = match hazard {
            Hazard::Pit => (Predicate::DefinitePit, Predicate::PossiblePit),
            Hazard::Wumpus => (Predicate::DefiniteWumpus, Predicate::PossibleWumpus),
        };
        self.set_confidence(cell, hazard, ThreatLevel::Certain);
        self.assert_fact(definite.at(cell));

        for n in self.neighbors(cell) {
            if self.is_visited(n) || self.is_safe(n) {
                continue;
            }
            if self.level(n, hazard) < ThreatLevel::Possible {
                self.set_confidence(n, hazard, ThreatLevel::Possible);
                self.assert_fact(possible.at(n));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percept_set_membership() {
        let set: PerceptSet = [Percept::Breeze, Percept::Stench].into_iter().collect();
        assert!(set.contains(Percept::Breeze));
        assert!(set.contains(Percept::Stench));
        assert!(!set.contains(Percept::Glitter));
        assert_eq!(set.iter().count(), 2);
    }

    #[test]
    fn test_classify() {
        assert_eq!(PerceptSet::empty().classify(), PerceptClass::Clear);
        assert_eq!(
            PerceptSet::empty().with(Percept::Glitter).classify(),
            PerceptClass::Clear
        );
        assert_eq!(
            PerceptSet::empty().with(Percept::Breeze).with(Percept::Scream).classify(),
            PerceptClass::Breeze
        );
        assert_eq!(
            PerceptSet::empty().with(Percept::Stench).classify(),
            PerceptClass::Stench
        );
        assert_eq!(
            PerceptSet::empty()
                .with(Percept::Stench)
                .with(Percept::Breeze)
                .classify(),
            PerceptClass::BreezeAndStench
        );
    }

    #[test]
    fn test_percept_set_serializes_as_list() {
        let set = PerceptSet::empty().with(Percept::Glitter).with(Percept::Breeze);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["breeze","glitter"]"#);
        let back: PerceptSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_display() {
        assert_eq!(PerceptSet::empty().to_string(), "none");
        let set = PerceptSet::empty().with(Percept::Stench).with(Percept::Breeze);
        assert_eq!(set.to_string(), "Breeze, Stench");
    }
}
