//! Actions and the decision trace returned for every step.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::knowledge::ArrowOutcome;
use crate::position::{Direction, Position};

/// What the agent does this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "direction", rename_all = "snake_case")]
pub enum Action {
    /// Pick up the gold on the current cell.
    Grab,
    /// Step to the adjacent cell in a direction.
    Move(Direction),
    /// Fire the arrow into the adjacent cell in a direction.
    Shoot(Direction),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grab => f.write_str("GRAB"),
            Self::Move(direction) => write!(f, "MOVE_{direction}"),
            Self::Shoot(direction) => write!(f, "SHOOT_{direction}"),
        }
    }
}

/// The policy branch that produced a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    /// Glitter on the current cell.
    Grab,
    /// Gold location known, heading back to the origin.
    ReturnToExit,
    /// No safe route onward and a wumpus suspect is adjacent.
    Shoot,
    /// Adjacent safe, unvisited cell.
    ExploreSafe,
    /// First step of a bounded search toward unvisited cells.
    PathToUnvisited,
    /// Stepping back onto a visited cell.
    RevisitVisited,
    /// Adjacent unvisited cell with low threat.
    LowThreat,
    /// First step of a bounded search toward strictly safe ground.
    Backtrack,
    /// Least threatening adjacent cell that is not deadly.
    LeastThreat,
    /// Every adjacent cell is deadly; least threatening one.
    ForcedMove,
}

/// One step's action together with its human-readable trace.
///
/// The trace fields are outputs only; nothing reads them back for control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// The chosen action.
    pub action: Action,
    /// Why it was chosen, in prose.
    pub rationale: String,
    /// Which branch chose it.
    pub rule: DecisionRule,
    /// Symbolic form, e.g. `Safe(1,0) → Move_RIGHT`.
    pub rule_label: String,
    /// Result of resolving last step's arrow, when one was pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrow_outcome: Option<ArrowOutcome>,
}

impl Decision {
    pub(crate) fn grab(position: Position) -> Self {
        Self {
            action: Action::Grab,
            rationale: "Gold detected, grabbing it".to_string(),
            rule: DecisionRule::Grab,
            rule_label: format!("Glitter{position} → Grab"),
            arrow_outcome: None,
        }
    }

    pub(crate) fn return_to_exit(position: Position, direction: Direction) -> Self {
        Self {
            action: Action::Move(direction),
            rationale: format!("Returning to {} with gold", Position::ORIGIN),
            rule: DecisionRule::ReturnToExit,
            rule_label: format!("GoldFound ∧ Position{position} ≠ {} → MoveToExit", Position::ORIGIN),
            arrow_outcome: None,
        }
    }

    pub(crate) fn shoot(target: Position, direction: Direction, wumpus_confidence: f32) -> Self {
        Self {
            action: Action::Shoot(direction),
            rationale: format!(
                "No safe path to unvisited cells, shooting arrow at {target} \
                 (wumpus confidence: {wumpus_confidence:.2})"
            ),
            rule: DecisionRule::Shoot,
            rule_label: format!("NoSafePath ∧ HasArrow → ShootArrow_{direction}"),
            arrow_outcome: None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.action, self.rule_label, self.rationale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_display() {
        assert_eq!(Action::Grab.to_string(), "GRAB");
        assert_eq!(Action::Move(Direction::Up).to_string(), "MOVE_UP");
        assert_eq!(Action::Shoot(Direction::Left).to_string(), "SHOOT_LEFT");
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&Action::Move(Direction::Down)).unwrap();
        assert_eq!(json, r#"{"kind":"move","direction":"down"}"#);
        let grab = serde_json::to_string(&Action::Grab).unwrap();
        assert_eq!(grab, r#"{"kind":"grab"}"#);
    }

    #[test]
    fn test_labels() {
        let d = Decision::grab(Position::new(2, 1));
        assert_eq!(d.rule_label, "Glitter(2,1) → Grab");

        let d = Decision::return_to_exit(Position::new(1, 1), Direction::Up);
        assert_eq!(d.rule_label, "GoldFound ∧ Position(1,1) ≠ (0,0) → MoveToExit");
        assert_eq!(d.action, Action::Move(Direction::Up));

        let d = Decision::shoot(Position::new(1, 0), Direction::Right, 1.0);
        assert_eq!(d.rule_label, "NoSafePath ∧ HasArrow → ShootArrow_RIGHT");
        assert!(d.rationale.contains("1.00"));
        assert_eq!(d.rule, DecisionRule::Shoot);
    }
}
