//! Short-term move memory used for loop detection.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::position::Position;

/// Capacity of [`MoveHistory`].
pub const MOVE_HISTORY_CAPACITY: usize = 10;

/// The most recent positions, oldest first, with FIFO eviction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveHistory {
    entries: VecDeque<Position>,
}

impl MoveHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a position, evicting the oldest entry when full.
    pub fn push(&mut self, position: Position) {
        if self.entries.len() == MOVE_HISTORY_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(position);
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry `back` steps before the newest one (`0` = newest).
    #[must_use]
    pub fn recent(&self, back: usize) -> Option<Position> {
        let idx = self.entries.len().checked_sub(back + 1)?;
        self.entries.get(idx).copied()
    }

    /// Occurrences of `position` among the newest `window` entries.
    #[must_use]
    pub fn count_recent(&self, position: Position, window: usize) -> usize {
        self.entries
            .iter()
            .rev()
            .take(window)
            .filter(|p| **p == position)
            .count()
    }

    /// Iterates entries oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.entries.iter()
    }
}

/// Lifetime visit counter per position. Counts never decrease.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionCounts {
    counts: HashMap<Position, u32>,
}

impl PositionCounts {
    /// Creates an empty counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more visit to `position`.
    pub fn record(&mut self, position: Position) {
        *self.counts.entry(position).or_insert(0) += 1;
    }

    /// Visits recorded for `position`.
    #[must_use]
    pub fn get(&self, position: Position) -> u32 {
        self.counts.get(&position).copied().unwrap_or(0)
    }
}
