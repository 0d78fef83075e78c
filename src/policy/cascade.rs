//! Move-selection cascade: ordered tiers, first non-empty tier wins.

use crate::knowledge::{CellStatus, KnowledgeBase, PlayingGrid};
use crate::position::Position;
use crate::search::{Navigator, LOW_THREAT_THRESHOLD};

use super::decision::DecisionRule;

/// A cell chosen by the cascade, with the tier that chose it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveChoice {
    /// Adjacent cell to step onto.
    pub target: Position,
    /// Tier that selected it.
    pub rule: DecisionRule,
    /// Prose reason for the trace.
    pub reason: String,
}

impl MoveChoice {
    fn new(target: Position, rule: DecisionRule, reason: String) -> Self {
        Self {
            target,
            rule,
            reason,
        }
    }
}

/// Runs the cascade from `position`.
///
/// Adjacent candidates exclude deadly and looping cells. Tiers, in order:
/// safe unvisited cells by exploration score, bounded path to an unvisited
/// area, visited cells by visit count then distance to the unknown, low
/// threat unvisited cells, bounded backtrack search.
#[must_use]
pub fn choose_move(kb: &KnowledgeBase, nav: &Navigator<'_>, position: Position) -> Option<MoveChoice> {
    let candidates: Vec<Position> = kb
        .neighbors(position)
        .into_iter()
        .filter(|n| !nav.is_dangerous_loop(*n) && !nav.is_deadly(*n))
        .collect();
    if candidates.is_empty() {
        return None;
    }

    let grid = PlayingGrid::project(kb);
    let status = |p: Position| grid.get(p).unwrap_or(CellStatus::Unknown);

    // Ties keep the first candidate in direction order.
    let explore = candidates
        .iter()
        .copied()
        .filter(|n| status(*n) == CellStatus::Safe)
        .min_by(|a, b| {
            nav.exploration_score(*b)
                .cmp(&nav.exploration_score(*a))
                .then_with(|| nav.visits(*a).cmp(&nav.visits(*b)))
        });
    if let Some(target) = explore {
        return Some(MoveChoice::new(
            target,
            DecisionRule::ExploreSafe,
            format!("Exploring unvisited safe cell {target}"),
        ));
    }

    if let Some(target) = nav.path_to_unvisited_area(position) {
        return Some(MoveChoice::new(
            target,
            DecisionRule::PathToUnvisited,
            format!("Following path to unvisited area via {target}"),
        ));
    }

    let revisit = candidates
        .iter()
        .copied()
        .filter(|n| status(*n) == CellStatus::Visited)
        .min_by_key(|n| {
            (
                nav.visits(*n),
                nav.distance_to_unvisited(*n).unwrap_or(usize::MAX),
            )
        });
    if let Some(target) = revisit {
        return Some(MoveChoice::new(
            target,
            DecisionRule::RevisitVisited,
            format!("Backtracking to visited cell {target}"),
        ));
    }

    let low_threat = candidates
        .iter()
        .copied()
        .filter(|n| {
            !kb.is_visited(*n) && kb.confidence_map().both_below(*n, LOW_THREAT_THRESHOLD)
        })
        .min_by(|a, b| {
            nav.threat(*a)
                .total_cmp(&nav.threat(*b))
                .then_with(|| nav.visits(*a).cmp(&nav.visits(*b)))
        });
    if let Some(target) = low_threat {
        return Some(MoveChoice::new(
            target,
            DecisionRule::LowThreat,
            format!("Moving to low-threat cell {target}"),
        ));
    }

    nav.backtrack_search(position).map(|target| {
        MoveChoice::new(
            target,
            DecisionRule::Backtrack,
            format!("Backtracking to safer cell {target}"),
        )
    })
}
