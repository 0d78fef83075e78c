//! Knowledge base: facts, threat confidence and percept ingestion.
//!
//! The [`KnowledgeBase`] is created together with an episode and discarded
//! with it. Facts only grow; threat confidence escalates through the percept
//! processors and is corrected only by arrow results and by visiting a cell.
//!
//! # Invariants
//!
//! - The origin is `Safe` and `Visited` from construction.
//! - Every `Visited` cell has pit and wumpus confidence 0.0.
//! - [`PlayingGrid::project`] is a pure function of the current state.

pub mod arrow;
pub mod confidence;
pub mod display;
pub mod percepts;
pub mod store;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fact::{Fact, Predicate};
use crate::position::Position;
use crate::rule::wumpus_rules;

pub use arrow::{ArrowOutcome, ArrowState};
pub use confidence::{ConfidenceMap, Hazard, ThreatLevel};
pub use display::{CellStatus, PlayingGrid};
pub use percepts::{Percept, PerceptClass, PerceptSet};
pub use store::FactStore;

/// Kind of an entry in the fact summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryKind {
    /// A fact that holds with certainty.
    Fact,
    /// A nonzero threat confidence.
    Confidence,
}

/// One line of the observable knowledge summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    /// Fact or confidence entry.
    pub kind: SummaryKind,
    /// `Safe(1,0)` for facts, `Pit(2,0)` for confidences.
    pub label: String,
    /// 1.0 for facts, the threat level for confidences.
    pub confidence: f32,
}

impl fmt::Display for SummaryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            SummaryKind::Fact => f.write_str(&self.label),
            SummaryKind::Confidence => write!(f, "{} = {:.1}", self.label, self.confidence),
        }
    }
}

/// Everything the agent knows about the current episode's grid.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    grid_size: usize,
    store: FactStore,
    threats: ConfidenceMap,
    arrow: ArrowState,
    gold_cell: Option<Position>,
}

impl KnowledgeBase {
    /// Creates the knowledge base for a fresh `grid_size` episode.
    ///
    /// The caller validates the grid size; see [`crate::Agent::new`].
    #[must_use]
    pub fn new(grid_size: usize) -> Self {
        let mut store = FactStore::with_rules(wumpus_rules(grid_size));
        store.assert(Predicate::Safe.at(Position::ORIGIN));
        store.assert(Predicate::Visited.at(Position::ORIGIN));
        Self {
            grid_size,
            store,
            threats: ConfidenceMap::new(),
            arrow: ArrowState::default(),
            gold_cell: None,
        }
    }

    /// Side length of the grid.
    #[must_use]
    pub const fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Ingests the percepts reported at `position`.
    ///
    /// Glitter is recorded first, then the breeze/stench processor for the
    /// percept class runs. Afterwards the cell is marked visited, its own
    /// confidences are cleared and forward chaining runs to a fixpoint.
    pub fn update(&mut self, position: Position, percepts: PerceptSet) -> PerceptClass {
        if percepts.contains(Percept::Glitter) {
            self.record_gold(position);
        }

        let class = percepts.classify();
        match class {
            PerceptClass::Clear => self.process_clear(position),
            PerceptClass::Breeze => self.process_breeze(position),
            PerceptClass::Stench => self.process_stench(position),
            PerceptClass::BreezeAndStench => self.process_breeze_and_stench(position),
        }

        self.assert_fact(Predicate::Visited.at(position));
        for hazard in Hazard::ALL {
            self.set_confidence(position, hazard, ThreatLevel::Absent);
        }
        self.forward_chain();
        class
    }

    fn record_gold(&mut self, position: Position) {
        self.assert_fact(Predicate::Glitter.at(position));
        self.assert_fact(Predicate::Gold.at(position));
        if self.gold_cell.is_none() {
            self.gold_cell = Some(position);
        }
    }

    /// Asserts a fact. Returns true if it is new.
    pub(crate) fn assert_fact(&mut self, fact: Fact) -> bool {
        self.store.assert(fact)
    }

    /// Returns true if the fact holds.
    #[must_use]
    pub fn holds(&self, fact: &Fact) -> bool {
        self.store.holds(fact)
    }

    /// Runs forward chaining to a fixpoint; returns the number of new facts.
    pub fn forward_chain(&mut self) -> usize {
        self.store.forward_chain()
    }

    /// Returns true once the agent has stood on `position`.
    #[must_use]
    pub fn is_visited(&self, position: Position) -> bool {
        self.holds(&Predicate::Visited.at(position))
    }

    /// Returns true if `position` is known to be safe.
    #[must_use]
    pub fn is_safe(&self, position: Position) -> bool {
        self.holds(&Predicate::Safe.at(position))
    }

    /// In-bounds neighbors of `position`, in direction order.
    #[must_use]
    pub fn neighbors(&self, position: Position) -> Vec<Position> {
        position.neighbors(self.grid_size).collect()
    }

    /// Numeric confidence of `hazard` at `position`.
    #[must_use]
    pub fn confidence(&self, position: Position, hazard: Hazard) -> f32 {
        self.threats.get(position, hazard)
    }

    /// Threat level of `hazard` at `position`.
    #[must_use]
    pub fn level(&self, position: Position, hazard: Hazard) -> ThreatLevel {
        self.threats.level(position, hazard)
    }

    /// Overwrites the threat level of `hazard` at `position`.
    pub(crate) fn set_confidence(&mut self, position: Position, hazard: Hazard, level: ThreatLevel) {
        self.threats.set(position, hazard, level);
    }

    /// Pit plus wumpus confidence at `position`.
    #[must_use]
    pub fn threat_score(&self, position: Position) -> f32 {
        self.threats.threat_score(position)
    }

    /// Read access to the confidence map.
    #[must_use]
    pub const fn confidence_map(&self) -> &ConfidenceMap {
        &self.threats
    }

    /// Where glitter was first perceived, if anywhere.
    #[must_use]
    pub const fn gold_cell(&self) -> Option<Position> {
        self.gold_cell
    }

    /// Current display projection.
    #[must_use]
    pub fn display_grid(&self) -> PlayingGrid {
        PlayingGrid::project(self)
    }

    /// Facts sorted by predicate name and position, followed by the nonzero
    /// confidences sorted by position and hazard.
    #[must_use]
    pub fn fact_summary(&self) -> Vec<SummaryEntry> {
        let mut facts: Vec<&Fact> = self.store.iter().collect();
        facts.sort_by_key(|fact| (fact.predicate.name(), fact.position));

        let fact_entries = facts.into_iter().map(|fact| SummaryEntry {
            kind: SummaryKind::Fact,
            label: fact.to_string(),
            confidence: 1.0,
        });
        let confidence_entries =
            self.threats
                .nonzero()
                .into_iter()
                .map(|(position, hazard, level)| SummaryEntry {
                    kind: SummaryKind::Confidence,
                    label: format!("{hazard}{position}"),
                    confidence: level.value(),
                });
        fact_entries.chain(confidence_entries).collect()
    }

    /// Stable content hash of the summary, as lowercase hex.
    ///
    /// Two knowledge bases with the same facts and confidences produce the
    /// same digest regardless of insertion order.
    #[must_use]
    pub fn digest(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for entry in self.fact_summary() {
            hasher.update(entry.to_string().as_bytes());
            hasher.update(b"\n");
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear() -> PerceptSet {
        PerceptSet::empty()
    }

    fn breeze() -> PerceptSet {
        PerceptSet::empty().with(Percept::Breeze)
    }

    fn stench() -> PerceptSet {
        PerceptSet::empty().with(Percept::Stench)
    }

    fn assert_visited_cells_are_clear(kb: &KnowledgeBase) {
        for p in Position::all(kb.grid_size()) {
            if kb.is_visited(p) {
                assert_eq!(kb.confidence(p, Hazard::Pit), 0.0, "pit at {p}");
                assert_eq!(kb.confidence(p, Hazard::Wumpus), 0.0, "wumpus at {p}");
            }
        }
    }

    fn assert_confidences_are_levels(kb: &KnowledgeBase) {
        for p in Position::all(kb.grid_size()) {
            for hazard in Hazard::ALL {
                let value = kb.confidence(p, hazard);
                assert!(
                    value == 0.0 || value == 0.5 || value == 1.0,
                    "{hazard}{p} = {value}"
                );
            }
        }
    }

    #[test]
    fn test_new_marks_origin() {
        let kb = KnowledgeBase::new(4);
        assert!(kb.is_safe(Position::ORIGIN));
        assert!(kb.is_visited(Position::ORIGIN));
        assert_eq!(kb.gold_cell(), None);
        assert!(kb.arrow().available);
    }

    #[test]
    fn test_clear_marks_neighbors_safe() {
        let mut kb = KnowledgeBase::new(3);
        assert_eq!(kb.update(Position::ORIGIN, clear()), PerceptClass::Clear);

        assert!(kb.is_safe(Position::new(1, 0)));
        assert!(kb.is_safe(Position::new(0, 1)));
        assert!(!kb.is_safe(Position::new(1, 1)));
        assert!(kb.holds(&Predicate::NoBreeze.at(Position::ORIGIN)));
    }

    #[test]
    fn test_breeze_with_three_explained_neighbors_pins_the_pit() {
        let mut kb = KnowledgeBase::new(3);
        let center = Position::new(1, 1);
        kb.assert_fact(Predicate::Visited.at(Position::new(1, 0)));
        kb.assert_fact(Predicate::Safe.at(Position::new(0, 1)));
        kb.assert_fact(Predicate::Visited.at(Position::new(1, 2)));

        kb.update(center, breeze());

        let pit = Position::new(2, 1);
        assert_eq!(kb.confidence(pit, Hazard::Pit), 1.0);
        assert!(kb.holds(&Predicate::DefinitePit.at(pit)));
        // Propagated suspicion to the pit's own unexplored neighbors.
        assert_eq!(kb.confidence(Position::new(2, 0), Hazard::Pit), 0.5);
        assert_eq!(kb.confidence(Position::new(2, 2), Hazard::Pit), 0.5);
        assert_visited_cells_are_clear(&kb);
    }

    #[test]
    fn test_ambiguous_breeze_marks_possible_pits() {
        let mut kb = KnowledgeBase::new(3);
        kb.update(Position::ORIGIN, clear());
        kb.update(Position::new(1, 0), breeze());

        assert_eq!(kb.confidence(Position::new(2, 0), Hazard::Pit), 0.5);
        assert_eq!(kb.confidence(Position::new(1, 1), Hazard::Pit), 0.5);
        assert_eq!(kb.confidence(Position::ORIGIN, Hazard::Pit), 0.0);
        assert_confidences_are_levels(&kb);
    }

    #[test]
    fn test_second_stench_confirms_single_suspect() {
        let mut kb = KnowledgeBase::new(3);
        kb.update(Position::ORIGIN, clear());
        kb.update(Position::new(1, 0), stench());
        assert_eq!(kb.confidence(Position::new(2, 0), Hazard::Wumpus), 0.5);
        assert_eq!(kb.confidence(Position::new(1, 1), Hazard::Wumpus), 0.5);

        kb.update(Position::new(0, 1), clear());
        assert_eq!(kb.confidence(Position::new(1, 1), Hazard::Wumpus), 0.0);

        kb.update(Position::new(1, 1), PerceptSet::empty());
        kb.update(Position::new(2, 1), stench());
        assert_eq!(kb.confidence(Position::new(2, 0), Hazard::Wumpus), 1.0);
        assert!(kb.holds(&Predicate::DefiniteWumpus.at(Position::new(2, 0))));
        assert_visited_cells_are_clear(&kb);
    }

    #[test]
    fn test_glitter_records_gold_and_still_processes_threats() {
        let mut kb = KnowledgeBase::new(3);
        let cell = Position::new(1, 0);
        let percepts = PerceptSet::empty().with(Percept::Glitter).with(Percept::Breeze);

        assert_eq!(kb.update(cell, percepts), PerceptClass::Breeze);
        assert_eq!(kb.gold_cell(), Some(cell));
        assert!(kb.holds(&Predicate::Gold.at(cell)));
        assert!(kb.holds(&Predicate::Breeze.at(cell)));
        assert!(kb.is_visited(cell));
    }

    #[test]
    fn test_visiting_clears_confidence() {
        let mut kb = KnowledgeBase::new(3);
        let cell = Position::new(1, 0);
        kb.set_confidence(cell, Hazard::Pit, ThreatLevel::Possible);
        kb.set_confidence(cell, Hazard::Wumpus, ThreatLevel::Possible);
        kb.update(cell, breeze());
        assert_visited_cells_are_clear(&kb);
    }

    #[test]
    fn test_summary_orders_facts_then_confidences() {
        let mut kb = KnowledgeBase::new(3);
        kb.update(Position::ORIGIN, clear());
        kb.update(Position::new(1, 0), breeze());

        let summary = kb.fact_summary();
        let first_confidence = summary
            .iter()
            .position(|e| e.kind == SummaryKind::Confidence)
            .unwrap();
        assert!(summary[..first_confidence]
            .iter()
            .all(|e| e.kind == SummaryKind::Fact && e.confidence == 1.0));
        assert!(summary[first_confidence..]
            .iter()
            .all(|e| e.kind == SummaryKind::Confidence && e.confidence > 0.0));

        let labels: Vec<&str> = summary.iter().map(|e| e.label.as_str()).collect();
        assert!(labels.contains(&"Breeze(1,0)"));
        assert!(labels.contains(&"Pit(2,0)"));
        let breeze_idx = labels.iter().position(|l| *l == "Breeze(1,0)").unwrap();
        let safe_idx = labels.iter().position(|l| *l == "Safe(0,0)").unwrap();
        assert!(breeze_idx < safe_idx);
    }

    #[test]
    fn test_digest_is_stable_and_content_sensitive() {
        let mut a = KnowledgeBase::new(3);
        let mut b = KnowledgeBase::new(3);
        assert_eq!(a.digest(), b.digest());

        a.update(Position::ORIGIN, clear());
        assert_ne!(a.digest(), b.digest());

        b.update(Position::ORIGIN, clear());
        assert_eq!(a.digest(), b.digest());
        assert_eq!(a.digest().len(), 64);
    }
}
