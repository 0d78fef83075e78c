//! # wumpus-agent - Knowledge-Based Decision Core for the Wumpus World
//!
//! A logical agent explores an N×N grid hiding pits, wumpuses and gold. At
//! each step it receives the percepts of its current cell, folds them into a
//! monotonic knowledge base, derives new facts by forward chaining, maintains
//! graded suspicion per cell and picks the next action through a fixed
//! priority cascade.
//!
//! ## Core Concepts
//!
//! - **Fact**: A ground predicate bound to a cell, e.g. `DefinitePit(2,0)`
//! - **Rule**: A premise tree over facts with a single derived conclusion
//! - **Confidence**: Per-cell hazard suspicion in {0.0, 0.5, 1.0}
//! - **Decision**: The chosen action with a human-readable rule label
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wumpus_agent::{Agent, Percept, PerceptSet, Position};
//!
//! let mut agent = Agent::new(4)?;
//! let decision = agent.ingest_percepts_and_decide(
//!     Position::ORIGIN,
//!     &PerceptSet::from_iter([Percept::Breeze]),
//!     4,
//! )?;
//! println!("{} ({})", decision.action, decision.rule_label);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod error;
pub mod fact;
pub mod position;
pub mod rule;

// Reasoning
pub mod knowledge;
pub mod policy;
pub mod search;

// Driving
pub mod agent;
pub mod episode;
pub mod world;

// Re-export primary types at crate root for convenience
pub use agent::Agent;
pub use error::{AgentError, AgentResult, ExecutionError, ValidationError};
pub use fact::{Fact, Predicate};
pub use position::{Direction, Position};
pub use rule::{Premise, Rule};

pub use knowledge::{
    ArrowOutcome, CellStatus, KnowledgeBase, Percept, PerceptClass, PerceptSet, PlayingGrid,
    SummaryEntry, ThreatLevel,
};
pub use policy::{Action, Decision, DecisionPolicy, DecisionRule};
pub use search::{can_reach_unvisited_safely, Navigator};

pub use episode::{
    Episode, EpisodeConfig, EpisodeEvent, EpisodeId, EpisodeOutcome, EpisodeRunner,
    EpisodeSnapshot, EpisodeStatus, RunnerConfig, StepRecord,
};
pub use world::{Environment, Tile, WumpusWorld};
