//! Bounded breadth-first searches over the agent's knowledge.
//!
//! Every search carries an explicit depth cap measured in steps from the
//! start cell, so no search ever walks the whole grid. The reach and
//! backtrack searches stop expanding at the cap. The unvisited-area and exit
//! searches still test cells one step past the cap for their goal but expand
//! no further.

use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};

use crate::knowledge::{Hazard, KnowledgeBase};
use crate::policy::history::{MoveHistory, PositionCounts};
use crate::position::{Direction, Position};

/// Both confidences below this count as strictly safe.
pub const SAFETY_THRESHOLD: f32 = 0.1;
/// Both confidences below this count as low threat.
pub const LOW_THREAT_THRESHOLD: f32 = 0.2;
/// Any confidence above this makes a cell deadly.
pub const DEADLY_THRESHOLD: f32 = 0.8;

/// Depth cap of [`can_reach_unvisited_safely`].
pub const REACH_DEPTH: usize = 15;
/// Expansion cap of [`Navigator::path_to_unvisited_area`]; the goal may lie
/// one step further.
pub const UNVISITED_AREA_DEPTH: usize = 5;
/// Expansion cap of [`Navigator::path_to_exit`]; the origin may lie one
/// step further.
pub const EXIT_DEPTH: usize = 4;
/// Depth cap of [`Navigator::backtrack_search`].
pub const BACKTRACK_DEPTH: usize = 3;

/// Points per low-threat unvisited neighbor in [`Navigator::exploration_score`].
const EXPLORATION_POINTS: u32 = 3;

fn strictly_safe(kb: &KnowledgeBase, position: Position) -> bool {
    kb.confidence_map().both_below(position, SAFETY_THRESHOLD)
}

/// Returns true if some unvisited, safe-looking cell is reachable from
/// `start` within [`REACH_DEPTH`] steps through cells that are safe,
/// visited or strictly low-confidence.
#[must_use]
pub fn can_reach_unvisited_safely(kb: &KnowledgeBase, start: Position) -> bool {
    let traversable = |p: Position| kb.is_safe(p) || kb.is_visited(p) || strictly_safe(kb, p);

    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([(start, 0usize)]);
    while let Some((pos, depth)) = queue.pop_front() {
        if depth >= REACH_DEPTH {
            continue;
        }
        for next in kb.neighbors(pos) {
            if seen.contains(&next) {
                continue;
            }
            if !kb.is_visited(next) && (kb.is_safe(next) || strictly_safe(kb, next)) {
                return true;
            }
            if traversable(next) {
                seen.insert(next);
                queue.push_back((next, depth + 1));
            }
        }
    }
    false
}

/// Knowledge plus move memory, the inputs every movement search reads.
#[derive(Debug, Clone, Copy)]
pub struct Navigator<'a> {
    kb: &'a KnowledgeBase,
    history: &'a MoveHistory,
    counts: &'a PositionCounts,
}

impl<'a> Navigator<'a> {
    /// Creates a navigator over the given state.
    #[must_use]
    pub const fn new(kb: &'a KnowledgeBase, history: &'a MoveHistory, counts: &'a PositionCounts) -> Self {
        Self {
            kb,
            history,
            counts,
        }
    }

    /// Pit or wumpus confidence above 0.8.
    #[must_use]
    pub fn is_deadly(&self, position: Position) -> bool {
        Hazard::ALL
            .into_iter()
            .any(|hazard| self.kb.confidence(position, hazard) > DEADLY_THRESHOLD)
    }

    /// Returns true if moving to `position` would continue an oscillation.
    ///
    /// Any of: at least two of the last four entries, both the last and the
    /// third-to-last entry, or three lifetime visits.
    #[must_use]
    pub fn is_dangerous_loop(&self, position: Position) -> bool {
        if self.history.len() >= 4 && self.history.count_recent(position, 4) >= 2 {
            return true;
        }
        if self.history.len() >= 3
            && self.history.recent(0) == Some(position)
            && self.history.recent(2) == Some(position)
        {
            return true;
        }
        self.counts.get(position) >= 3
    }

    /// Lifetime visits to `position`.
    #[must_use]
    pub fn visits(&self, position: Position) -> u32 {
        self.counts.get(position)
    }

    /// Pit plus wumpus confidence.
    #[must_use]
    pub fn threat(&self, position: Position) -> f32 {
        self.kb.threat_score(position)
    }

    fn movable(&self, position: Position) -> bool {
        !self.is_dangerous_loop(position) && !self.is_deadly(position)
    }

    fn by_threat(&self, a: Position, b: Position) -> Ordering {
        self.threat(a).total_cmp(&self.threat(b))
    }

    fn by_threat_then_visits(&self, a: Position, b: Position) -> Ordering {
        self.by_threat(a, b)
            .then_with(|| self.visits(a).cmp(&self.visits(b)))
    }

    /// 3 points per in-grid neighbor that is unvisited and low threat.
    #[must_use]
    pub fn exploration_score(&self, position: Position) -> u32 {
        self.kb
            .neighbors(position)
            .into_iter()
            .filter(|n| {
                !self.kb.is_visited(*n)
                    && self.kb.confidence_map().both_below(*n, LOW_THREAT_THRESHOLD)
            })
            .map(|_| EXPLORATION_POINTS)
            .sum()
    }

    /// Unrestricted BFS distance to the nearest unvisited cell.
    ///
    /// Returns `None` when every cell has been visited.
    #[must_use]
    pub fn distance_to_unvisited(&self, start: Position) -> Option<usize> {
        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([(start, 0usize)]);
        while let Some((pos, dist)) = queue.pop_front() {
            if !self.kb.is_visited(pos) {
                return Some(dist);
            }
            for next in self.kb.neighbors(pos) {
                if seen.insert(next) {
                    queue.push_back((next, dist + 1));
                }
            }
        }
        None
    }

    /// First step toward the nearest unvisited cell at most
    /// [`UNVISITED_AREA_DEPTH`] + 1 steps away.
    ///
    /// Expansion prefers strictly safe cells and falls back to threat score
    /// below 0.2; candidates are explored by threat, then visit count.
    #[must_use]
    pub fn path_to_unvisited_area(&self, start: Position) -> Option<Position> {
        let mut seen = HashSet::from([start]);
        let mut queue: VecDeque<(Position, Option<Position>, usize)> =
            VecDeque::from([(start, None, 0)]);

        while let Some((pos, first, depth)) = queue.pop_front() {
            if pos != start && !self.kb.is_visited(pos) {
                return first.or(Some(pos));
            }
            if depth > UNVISITED_AREA_DEPTH {
                continue;
            }

            let open: Vec<Position> = self
                .kb
                .neighbors(pos)
                .into_iter()
                .filter(|n| !seen.contains(n) && self.movable(*n))
                .collect();
            let mut candidates: Vec<Position> = open
                .iter()
                .copied()
                .filter(|n| strictly_safe(self.kb, *n))
                .collect();
            if candidates.is_empty() {
                candidates = open
                    .into_iter()
                    .filter(|n| self.threat(*n) < LOW_THREAT_THRESHOLD)
                    .collect();
            }
            candidates.sort_by(|a, b| self.by_threat_then_visits(*a, *b));

            for next in candidates {
                seen.insert(next);
                queue.push_back((next, first.or(Some(next)), depth + 1));
            }
        }
        None
    }

    /// Direction of the first step back to the origin.
    ///
    /// Searches up to [`EXIT_DEPTH`] + 1 steps, preferring strictly safe cells and
    /// otherwise the least threatening unexplored ones. Without a route it
    /// falls back to the least threatening adjacent cell that is neither
    /// looping nor deadly, then the least threatening non-looping one, then
    /// the least threatening and least visited of all.
    #[must_use]
    pub fn path_to_exit(&self, start: Position) -> Option<Direction> {
        let mut seen = HashSet::from([start]);
        let mut queue: VecDeque<(Position, Option<Position>, usize)> =
            VecDeque::from([(start, None, 0)]);

        while let Some((pos, first, depth)) = queue.pop_front() {
            if pos == Position::ORIGIN {
                return first.and_then(|step| start.direction_to(step));
            }
            if depth > EXIT_DEPTH {
                continue;
            }

            let neighbors = self.kb.neighbors(pos);
            let mut candidates: Vec<Position> = neighbors
                .iter()
                .copied()
                .filter(|n| strictly_safe(self.kb, *n) && self.movable(*n))
                .collect();
            if candidates.is_empty() {
                candidates = neighbors
                    .into_iter()
                    .filter(|n| !seen.contains(n) && self.movable(*n))
                    .collect();
                candidates.sort_by(|a, b| self.by_threat(*a, *b));
            }

            for next in candidates {
                if seen.insert(next) {
                    queue.push_back((next, first.or(Some(next)), depth + 1));
                }
            }
        }

        let adjacent = self.kb.neighbors(start);
        let fallback = adjacent
            .iter()
            .copied()
            .filter(|n| self.movable(*n))
            .min_by(|a, b| self.by_threat(*a, *b))
            .or_else(|| {
                adjacent
                    .iter()
                    .copied()
                    .filter(|n| !self.is_dangerous_loop(*n))
                    .min_by(|a, b| self.by_threat(*a, *b))
            })
            .or_else(|| {
                adjacent
                    .iter()
                    .copied()
                    .min_by(|a, b| self.by_threat_then_visits(*a, *b))
            })?;
        start.direction_to(fallback)
    }

    /// First step toward a cell with a strictly safe, non-looping neighbor,
    /// within [`BACKTRACK_DEPTH`] steps.
    ///
    /// When such a neighbor is adjacent to `start`, the least visited one is
    /// returned directly.
    #[must_use]
    pub fn backtrack_search(&self, start: Position) -> Option<Position> {
        let mut seen = HashSet::from([start]);
        let mut queue: VecDeque<(Position, Option<Position>, usize)> =
            VecDeque::from([(start, None, 0)]);

        while let Some((pos, first, depth)) = queue.pop_front() {
            let neighbors = self.kb.neighbors(pos);
            let safe: Vec<Position> = neighbors
                .iter()
                .copied()
                .filter(|n| strictly_safe(self.kb, *n) && self.movable(*n))
                .collect();

            if !safe.is_empty() {
                return match first {
                    Some(step) => Some(step),
                    None => safe.into_iter().min_by_key(|n| self.visits(*n)),
                };
            }
            if depth >= BACKTRACK_DEPTH {
                continue;
            }

            for next in neighbors {
                if !seen.contains(&next) && self.movable(next) {
                    seen.insert(next);
                    queue.push_back((next, first.or(Some(next)), depth + 1));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact::Predicate;
    use crate::knowledge::ThreatLevel;

    fn corridor(size: usize, visited_to: usize) -> KnowledgeBase {
        let mut kb = KnowledgeBase::new(size);
        for x in 0..=visited_to {
            kb.assert_fact(Predicate::Visited.at(Position::new(x, 0)));
            kb.assert_fact(Predicate::Safe.at(Position::new(x, 0)));
        }
        for x in 0..size {
            kb.set_confidence(Position::new(x, 1), Hazard::Pit, ThreatLevel::Possible);
        }
        kb
    }

    #[test]
    fn test_can_reach_adjacent_safe_cell() {
        let mut kb = KnowledgeBase::new(3);
        kb.update(Position::ORIGIN, crate::knowledge::PerceptSet::empty());
        assert!(can_reach_unvisited_safely(&kb, Position::ORIGIN));
    }

    #[test]
    fn test_can_reach_depth_boundary() {
        // Unvisited cell exactly 15 steps down the corridor.
        let kb = corridor(17, 14);
        assert!(can_reach_unvisited_safely(&kb, Position::ORIGIN));

        // One step further is out of range.
        let kb = corridor(17, 15);
        assert!(!can_reach_unvisited_safely(&kb, Position::ORIGIN));
    }

    #[test]
    fn test_can_reach_blocked_by_suspicion() {
        let mut kb = KnowledgeBase::new(2);
        kb.set_confidence(Position::new(1, 0), Hazard::Wumpus, ThreatLevel::Possible);
        kb.set_confidence(Position::new(0, 1), Hazard::Pit, ThreatLevel::Possible);
        assert!(!can_reach_unvisited_safely(&kb, Position::ORIGIN));
    }

    #[test]
    fn test_loop_detection() {
        let kb = KnowledgeBase::new(3);
        let a = Position::new(0, 0);
        let b = Position::new(1, 0);
        let mut history = MoveHistory::new();
        let mut counts = PositionCounts::new();
        for p in [a, b, a] {
            history.push(p);
            counts.record(p);
        }
        let nav = Navigator::new(&kb, &history, &counts);
        // a is both the last and the third-to-last entry.
        assert!(nav.is_dangerous_loop(a));
        assert!(!nav.is_dangerous_loop(b));

        history.push(b);
        counts.record(b);
        let nav = Navigator::new(&kb, &history, &counts);
        assert!(nav.is_dangerous_loop(b));
    }

    #[test]
    fn test_lifetime_count_loop() {
        let kb = KnowledgeBase::new(3);
        let history = MoveHistory::new();
        let mut counts = PositionCounts::new();
        let p = Position::new(1, 1);
        for _ in 0..3 {
            counts.record(p);
        }
        let nav = Navigator::new(&kb, &history, &counts);
        assert!(nav.is_dangerous_loop(p));
    }

    #[test]
    fn test_deadly_threshold() {
        let mut kb = KnowledgeBase::new(3);
        let p = Position::new(1, 0);
        kb.set_confidence(p, Hazard::Pit, ThreatLevel::Possible);
        let history = MoveHistory::new();
        let counts = PositionCounts::new();
        assert!(!Navigator::new(&kb, &history, &counts).is_deadly(p));

        kb.set_confidence(p, Hazard::Wumpus, ThreatLevel::Certain);
        assert!(Navigator::new(&kb, &history, &counts).is_deadly(p));
    }

    #[test]
    fn test_exploration_score_and_distance() {
        let mut kb = KnowledgeBase::new(3);
        kb.update(Position::ORIGIN, crate::knowledge::PerceptSet::empty());
        let history = MoveHistory::new();
        let counts = PositionCounts::new();
        let nav = Navigator::new(&kb, &history, &counts);

        assert_eq!(nav.exploration_score(Position::new(1, 0)), 6);
        assert_eq!(nav.exploration_score(Position::new(1, 1)), 12);
        assert_eq!(nav.distance_to_unvisited(Position::ORIGIN), Some(1));
    }

    #[test]
    fn test_path_to_unvisited_area_walks_through_visited_cells() {
        let mut kb = KnowledgeBase::new(4);
        for x in 0..3 {
            kb.assert_fact(Predicate::Visited.at(Position::new(x, 0)));
        }
        for x in 0..4 {
            kb.set_confidence(Position::new(x, 1), Hazard::Pit, ThreatLevel::Certain);
        }
        let history = MoveHistory::new();
        let counts = PositionCounts::new();
        let nav = Navigator::new(&kb, &history, &counts);
        assert_eq!(
            nav.path_to_unvisited_area(Position::ORIGIN),
            Some(Position::new(1, 0))
        );
    }

    #[test]
    fn test_path_to_unvisited_area_finds_cell_one_past_the_cap() {
        let mut kb = KnowledgeBase::new(8);
        for x in 0..7 {
            kb.assert_fact(Predicate::Visited.at(Position::new(x, 0)));
        }
        for x in 0..8 {
            kb.set_confidence(Position::new(x, 1), Hazard::Pit, ThreatLevel::Certain);
        }
        let history = MoveHistory::new();
        let counts = PositionCounts::new();
        let nav = Navigator::new(&kb, &history, &counts);

        // (7,0) is six steps from (1,0).
        assert_eq!(
            nav.path_to_unvisited_area(Position::new(1, 0)),
            Some(Position::new(2, 0))
        );
        // Seven steps is out of range.
        assert_eq!(nav.path_to_unvisited_area(Position::ORIGIN), None);
    }

    #[test]
    fn test_path_to_exit_reaches_origin_five_steps_away() {
        let mut kb = KnowledgeBase::new(6);
        for x in 0..6 {
            kb.assert_fact(Predicate::Visited.at(Position::new(x, 0)));
            kb.assert_fact(Predicate::Safe.at(Position::new(x, 0)));
        }
        let history = MoveHistory::new();
        let counts = PositionCounts::new();
        let nav = Navigator::new(&kb, &history, &counts);
        assert_eq!(nav.path_to_exit(Position::new(5, 0)), Some(Direction::Left));
    }

    #[test]
    fn test_path_to_exit() {
        let mut kb = KnowledgeBase::new(3);
        for p in [Position::new(1, 0), Position::new(1, 1), Position::new(0, 1)] {
            kb.assert_fact(Predicate::Visited.at(p));
        }
        let history = MoveHistory::new();
        let counts = PositionCounts::new();
        let nav = Navigator::new(&kb, &history, &counts);
        assert_eq!(nav.path_to_exit(Position::new(1, 1)), Some(Direction::Up));
        assert_eq!(nav.path_to_exit(Position::new(0, 1)), Some(Direction::Up));
        assert_eq!(nav.path_to_exit(Position::ORIGIN), None);
    }

    #[test]
    fn test_path_to_exit_avoids_deadly_cells() {
        let mut kb = KnowledgeBase::new(3);
        kb.set_confidence(Position::new(1, 0), Hazard::Pit, ThreatLevel::Certain);
        let history = MoveHistory::new();
        let counts = PositionCounts::new();
        let nav = Navigator::new(&kb, &history, &counts);
        assert_eq!(nav.path_to_exit(Position::new(1, 1)), Some(Direction::Left));
    }

    #[test]
    fn test_backtrack_prefers_least_visited_neighbor() {
        let kb = KnowledgeBase::new(3);
        let history = MoveHistory::new();
        let mut counts = PositionCounts::new();
        counts.record(Position::new(1, 0));
        let nav = Navigator::new(&kb, &history, &counts);
        assert_eq!(
            nav.backtrack_search(Position::new(1, 1)),
            Some(Position::new(2, 1))
        );
    }
}
