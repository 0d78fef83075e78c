//! Propositional facts about grid cells.
//!
//! A fact is a tagged proposition `Predicate(x,y)`. Facts are plain values
//! with structural equality and hashing, so the fact store is an ordinary set.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::position::Position;

/// The closed set of predicates the knowledge base reasons with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// The cell holds neither a pit nor a live wumpus.
    Safe,
    /// The agent has stood on the cell.
    Visited,
    /// A breeze was perceived on the cell.
    Breeze,
    /// No breeze was perceived on the cell.
    NoBreeze,
    /// A stench was perceived on the cell.
    Stench,
    /// No stench was perceived on the cell.
    NoStench,
    /// Glitter was perceived on the cell.
    Glitter,
    /// The gold lies on the cell.
    Gold,
    /// The cell cannot hold a pit.
    NoPit,
    /// The cell cannot hold a wumpus.
    NoWumpus,
    /// The cell is proven to hold a pit.
    DefinitePit,
    /// The cell is proven to hold a wumpus.
    DefiniteWumpus,
    /// The cell is suspected to hold a pit.
    PossiblePit,
    /// The cell is suspected to hold a wumpus.
    PossibleWumpus,
    /// A wumpus on the cell was killed by the arrow.
    WumpusKilled,
}

impl Predicate {
    /// Canonical name, as used in fact labels.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::Visited => "Visited",
            Self::Breeze => "Breeze",
            Self::NoBreeze => "NoBreeze",
            Self::Stench => "Stench",
            Self::NoStench => "NoStench",
            Self::Glitter => "Glitter",
            Self::Gold => "Gold",
            Self::NoPit => "NoPit",
            Self::NoWumpus => "NoWumpus",
            Self::DefinitePit => "DefinitePit",
            Self::DefiniteWumpus => "DefiniteWumpus",
            Self::PossiblePit => "PossiblePit",
            Self::PossibleWumpus => "PossibleWumpus",
            Self::WumpusKilled => "WumpusKilled",
        }
    }

    /// Builds the fact `self(position)`.
    #[must_use]
    pub const fn at(self, position: Position) -> Fact {
        Fact::new(self, position)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single proposition about one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fact {
    /// What is asserted.
    pub predicate: Predicate,
    /// Which cell it is asserted about.
    pub position: Position,
}

impl Fact {
    /// Creates a fact.
    #[must_use]
    pub const fn new(predicate: Predicate, position: Position) -> Self {
        Self {
            predicate,
            position,
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.predicate, self.position)
    }
}
