//! Fact store and forward-chaining rule engine.

use std::collections::HashSet;

use crate::fact::Fact;
use crate::rule::Rule;

/// Monotonic set of asserted facts plus the rules that extend it.
///
/// Facts are only ever added. Forward chaining therefore always terminates:
/// the set of possible conclusions is finite and each pass either grows the
/// set or stops.
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    facts: HashSet<Fact>,
    rules: Vec<Rule>,
}

impl FactStore {
    /// Creates an empty store with the given rules.
    #[must_use]
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self {
            facts: HashSet::new(),
            rules,
        }
    }

    /// Asserts a fact. Returns true if it was not already known.
    pub fn assert(&mut self, fact: Fact) -> bool {
        self.facts.insert(fact)
    }

    /// Returns true if the fact has been asserted or derived.
    #[must_use]
    pub fn holds(&self, fact: &Fact) -> bool {
        self.facts.contains(fact)
    }

    /// Applies every rule in full passes until a pass derives nothing new.
    ///
    /// Returns the number of facts derived. Running it again on a stabilized
    /// store returns 0 and leaves the store untouched.
    pub fn forward_chain(&mut self) -> usize {
        let mut derived = 0;
        loop {
            let mut changed = false;
            for rule in &self.rules {
                if !self.facts.contains(&rule.conclusion) && rule.premise.is_satisfied(&self.facts) {
                    self.facts.insert(rule.conclusion);
                    derived += 1;
                    changed = true;
                }
            }
            if !changed {
                return derived;
            }
        }
    }

    /// Iterates all known facts in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter()
    }

    /// Number of known facts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns true if no fact is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fact::Predicate;
    use crate::position::Position;
    use crate::rule::{wumpus_rules, Premise};

    #[test]
    fn test_assert_is_idempotent() {
        let mut store = FactStore::default();
        let fact = Predicate::Safe.at(Position::ORIGIN);
        assert!(store.assert(fact));
        assert!(!store.assert(fact));
        assert_eq!(store.len(), 1);
        assert!(store.holds(&fact));
    }

    #[test]
    fn test_forward_chain_reaches_fixpoint_through_chained_rules() {
        let a = Predicate::Breeze.at(Position::new(0, 0));
        let b = Predicate::PossiblePit.at(Position::new(1, 0));
        let c = Predicate::PossiblePit.at(Position::new(2, 0));

        // Rules listed in reverse so the chain needs more than one pass.
        let mut store = FactStore::with_rules(vec![
            Rule::new(Premise::atom(b), c),
            Rule::new(Premise::atom(a), b),
        ]);
        store.assert(a);

        assert_eq!(store.forward_chain(), 2);
        assert!(store.holds(&b));
        assert!(store.holds(&c));
    }

    #[test]
    fn test_forward_chain_is_idempotent() {
        let mut store = FactStore::with_rules(wumpus_rules(3));
        store.assert(Predicate::NoBreeze.at(Position::ORIGIN));
        store.assert(Predicate::NoStench.at(Position::ORIGIN));

        let first = store.forward_chain();
        assert!(first > 0);
        let snapshot: HashSet<Fact> = store.iter().copied().collect();

        assert_eq!(store.forward_chain(), 0);
        let again: HashSet<Fact> = store.iter().copied().collect();
        assert_eq!(snapshot, again);
    }

    #[test]
    fn test_domain_rules_derive_safe_neighbors() {
        let mut store = FactStore::with_rules(wumpus_rules(3));
        store.assert(Predicate::NoBreeze.at(Position::ORIGIN));
        store.forward_chain();
        // No stench information yet, so nothing is Safe.
        assert!(store.holds(&Predicate::NoPit.at(Position::new(1, 0))));
        assert!(!store.holds(&Predicate::Safe.at(Position::new(1, 0))));

        store.assert(Predicate::NoStench.at(Position::ORIGIN));
        store.forward_chain();
        assert!(store.holds(&Predicate::Safe.at(Position::new(1, 0))));
        assert!(store.holds(&Predicate::Safe.at(Position::new(0, 1))));
        assert!(!store.holds(&Predicate::Safe.at(Position::new(1, 1))));
    }
}
