//! Inference rules for forward chaining.
//!
//! Rules are `premise → conclusion` where the premise is a small tree of
//! atoms combined with `And` / `Or`. The domain rule set is fixed when an
//! episode starts; nothing is added to it afterwards.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fact::{Fact, Predicate};
use crate::position::Position;

/// Left-hand side of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "terms", rename_all = "snake_case")]
pub enum Premise {
    /// Holds iff the fact is asserted.
    Atom(Fact),
    /// Holds iff every member holds.
    And(Vec<Premise>),
    /// Holds iff at least one member holds.
    Or(Vec<Premise>),
}

impl Premise {
    /// Creates an atomic premise.
    #[must_use]
    pub const fn atom(fact: Fact) -> Self {
        Self::Atom(fact)
    }

    /// Creates a conjunction.
    #[must_use]
    pub fn and(premises: impl IntoIterator<Item = Premise>) -> Self {
        Self::And(premises.into_iter().collect())
    }

    /// Creates a disjunction.
    #[must_use]
    pub fn or(premises: impl IntoIterator<Item = Premise>) -> Self {
        Self::Or(premises.into_iter().collect())
    }

    /// Evaluates the premise against the asserted facts.
    ///
    /// An empty `And` holds and an empty `Or` does not.
    #[must_use]
    pub fn is_satisfied(&self, facts: &HashSet<Fact>) -> bool {
        match self {
            Self::Atom(fact) => facts.contains(fact),
            Self::And(premises) => premises.iter().all(|p| p.is_satisfied(facts)),
            Self::Or(premises) => premises.iter().any(|p| p.is_satisfied(facts)),
        }
    }
}

impl fmt::Display for Premise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (op, premises) = match self {
            Self::Atom(fact) => return write!(f, "{fact}"),
            Self::And(premises) => (" ∧ ", premises),
            Self::Or(premises) => (" ∨ ", premises),
        };
        f.write_str("(")?;
        for (idx, premise) in premises.iter().enumerate() {
            if idx > 0 {
                f.write_str(op)?;
            }
            write!(f, "{premise}")?;
        }
        f.write_str(")")
    }
}

/// A single implication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Condition that must hold.
    pub premise: Premise,
    /// Fact asserted once the premise holds.
    pub conclusion: Fact,
}

impl Rule {
    /// Creates a rule.
    #[must_use]
    pub const fn new(premise: Premise, conclusion: Fact) -> Self {
        Self {
            premise,
            conclusion,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.premise, self.conclusion)
    }
}

/// Builds the wumpus world rule set for a `grid_size` grid.
///
/// For every cell `C` and each neighbor `N` of `C`:
/// - `NoBreeze(C) → NoPit(N)`
/// - `NoStench(C) → NoWumpus(N)`
/// - `NoPit(N) ∧ NoWumpus(N) → Safe(N)`
#[must_use]
pub fn wumpus_rules(grid_size: usize) -> Vec<Rule> {
    let mut rules = Vec::new();
    for cell in Position::all(grid_size) {
        for neighbor in cell.neighbors(grid_size) {
            rules.push(Rule::new(
                Premise::atom(Predicate::NoBreeze.at(cell)),
                Predicate::NoPit.at(neighbor),
            ));
        }
        for neighbor in cell.neighbors(grid_size) {
            rules.push(Rule::new(
                Premise::atom(Predicate::NoStench.at(cell)),
                Predicate::NoWumpus.at(neighbor),
            ));
        }
        for neighbor in cell.neighbors(grid_size) {
            rules.push(Rule::new(
                Premise::and([
                    Premise::atom(Predicate::NoPit.at(neighbor)),
                    Premise::atom(Predicate::NoWumpus.at(neighbor)),
                ]),
                Predicate::Safe.at(neighbor),
            ));
        }
    }
    rules
}
