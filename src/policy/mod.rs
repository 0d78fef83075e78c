//! Decision policy: one prioritized decision per step.
//!
//! Priority, first match wins:
//!
//! 1. Resolve last step's arrow against this step's Scream.
//! 2. Glitter: grab.
//! 3. Gold location known and away from the origin: head for the exit.
//! 4. Arrow available, no safe route onward and a suspect adjacent: shoot.
//! 5. Move-selection cascade, then least-threat fallbacks.

pub mod cascade;
pub mod decision;
pub mod history;

use crate::knowledge::{Hazard, KnowledgeBase, Percept, PerceptSet, ThreatLevel};
use crate::position::{Direction, Position};
use crate::search::{can_reach_unvisited_safely, Navigator, SAFETY_THRESHOLD};

pub use cascade::{choose_move, MoveChoice};
pub use decision::{Action, Decision, DecisionRule};
pub use history::{MoveHistory, PositionCounts, MOVE_HISTORY_CAPACITY};

/// Move memory and the pending arrow target of one episode.
#[derive(Debug, Clone, Default)]
pub struct DecisionPolicy {
    history: MoveHistory,
    counts: PositionCounts,
    pending_arrow: Option<Position>,
}

impl DecisionPolicy {
    /// Creates a policy with empty memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recent positions.
    #[must_use]
    pub const fn history(&self) -> &MoveHistory {
        &self.history
    }

    /// Lifetime visit counts.
    #[must_use]
    pub const fn counts(&self) -> &PositionCounts {
        &self.counts
    }

    /// Arrow target awaiting its result, if any.
    #[must_use]
    pub const fn pending_arrow(&self) -> Option<Position> {
        self.pending_arrow
    }

    /// Chooses the action for `position` given already-ingested `percepts`.
    ///
    /// Always produces an action on grids of size 2 or more.
    pub fn decide(&mut self, kb: &mut KnowledgeBase, position: Position, percepts: PerceptSet) -> Decision {
        self.history.push(position);
        self.counts.record(position);

        let arrow_outcome = self
            .pending_arrow
            .take()
            .map(|target| kb.resolve_arrow(target, percepts.contains(Percept::Scream)));

        let mut decision = self.select(kb, position, percepts);
        decision.arrow_outcome = arrow_outcome;
        decision
    }

    fn select(&mut self, kb: &mut KnowledgeBase, position: Position, percepts: PerceptSet) -> Decision {
        let glitter = percepts.contains(Percept::Glitter);
        if glitter {
            return Decision::grab(position);
        }

        if kb.gold_cell().is_some() && position != Position::ORIGIN {
            let nav = Navigator::new(kb, &self.history, &self.counts);
            if let Some(direction) = nav.path_to_exit(position) {
                return Decision::return_to_exit(position, direction);
            }
        }

        if kb.arrow().available && !can_reach_unvisited_safely(kb, position) {
            if let Some(target) = pick_arrow_target(kb, position) {
                if let Some(direction) = position.direction_to(target) {
                    let confidence = kb.confidence(target, Hazard::Wumpus);
                    kb.use_arrow(target);
                    self.pending_arrow = Some(target);
                    return Decision::shoot(target, direction, confidence);
                }
            }
        }

        self.explore(kb, position)
    }

    fn explore(&self, kb: &KnowledgeBase, position: Position) -> Decision {
        let nav = Navigator::new(kb, &self.history, &self.counts);
        let (target, rule, reason) = match choose_move(kb, &nav, position) {
            Some(choice) => (choice.target, choice.rule, choice.reason),
            None => fallback_move(kb, &nav, position),
        };

        // Grids of size 2 or more always have a neighbor, so `target` is
        // adjacent here.
        let direction = position.direction_to(target).unwrap_or(Direction::Up);
        let pit = kb.confidence(target, Hazard::Pit);
        let wumpus = kb.confidence(target, Hazard::Wumpus);
        let (rationale, rule_label) = if pit < SAFETY_THRESHOLD && wumpus < SAFETY_THRESHOLD {
            (
                format!("{reason}; moving to safe cell {target}"),
                format!("Safe{target} → Move_{direction}"),
            )
        } else {
            (
                format!(
                    "{reason}; risky move to {target}, pit risk: {:.0}%, wumpus risk: {:.0}%",
                    pit * 100.0,
                    wumpus * 100.0
                ),
                format!("RiskyMove → Move_{direction}"),
            )
        };

        Decision {
            action: Action::Move(direction),
            rationale,
            rule,
            rule_label,
            arrow_outcome: None,
        }
    }
}

/// A definite wumpus first, otherwise the first target of maximal wumpus
/// confidence in direction order.
fn pick_arrow_target(kb: &KnowledgeBase, position: Position) -> Option<Position> {
    let targets = kb.arrow_targets(position);
    targets
        .iter()
        .copied()
        .find(|t| kb.level(*t, Hazard::Wumpus) == ThreatLevel::Certain)
        .or_else(|| {
            targets
                .iter()
                .copied()
                .min_by(|a, b| {
                    kb.confidence(*b, Hazard::Wumpus)
                        .total_cmp(&kb.confidence(*a, Hazard::Wumpus))
                })
        })
}

fn least_threat(nav: &Navigator<'_>, cells: impl Iterator<Item = Position>) -> Option<Position> {
    cells.min_by(|a, b| nav.threat(*a).total_cmp(&nav.threat(*b)))
}

/// Least threatening adjacent cell that is not deadly, or the least
/// threatening adjacent cell when every one is deadly.
fn fallback_move(kb: &KnowledgeBase, nav: &Navigator<'_>, position: Position) -> (Position, DecisionRule, String) {
    let adjacent = kb.neighbors(position);

    if let Some(target) = least_threat(nav, adjacent.iter().copied().filter(|n| !nav.is_deadly(*n))) {
        let reason = format!(
            "Moving to least threatening non-deadly cell {target}, threat: {:.2}",
            nav.threat(target)
        );
        return (target, DecisionRule::LeastThreat, reason);
    }

    let target = least_threat(nav, adjacent.into_iter()).unwrap_or(position);
    let reason = format!(
        "Forced move to least dangerous cell {target}, threat: {:.2} (all options deadly)",
        nav.threat(target)
    );
    (target, DecisionRule::ForcedMove, reason)
}
