//! Episode driver: applies the agent's decisions to a world.
//!
//! An [`Episode`] owns the world, the agent and the bookkeeping the agent is
//! not allowed to see (alive flag, carried gold, visited cells). Each
//! [`Episode::step`] reads percepts, asks the agent for a decision, applies
//! it and checks the end conditions.

pub mod config;
pub mod runner;

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::error::{AgentResult, ExecutionError};
use crate::knowledge::{ArrowState, Percept, PerceptSet, PlayingGrid, SummaryEntry};
use crate::policy::{Action, Decision};
use crate::position::Position;
use crate::world::{Environment, Tile, WumpusWorld};

pub use config::{EpisodeConfig, RunnerConfig};
pub use runner::{EpisodeEvent, EpisodeRunner};

/// Unique identifier of an episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeId(uuid::Uuid);

impl EpisodeId {
    /// Creates a new random episode ID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for EpisodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether the episode is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeStatus {
    /// Still running.
    Playing,
    /// Ended in success.
    Won,
    /// Ended in failure.
    Lost,
}

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeOutcome {
    /// The gold was grabbed.
    GoldGrabbed,
    /// The gold was carried back to the origin.
    ReturnedWithGold,
    /// The agent walked into a pit.
    FellIntoPit,
    /// The agent walked into a live wumpus.
    EatenByWumpus,
    /// Every cell was visited without finding the gold.
    ExploredEverything,
    /// The configured step limit was reached.
    StepLimit,
    /// Stopped from outside before finishing.
    Stopped,
}

impl EpisodeOutcome {
    /// Status implied by the outcome.
    #[must_use]
    pub const fn status(self) -> EpisodeStatus {
        match self {
            Self::GoldGrabbed | Self::ReturnedWithGold => EpisodeStatus::Won,
            _ => EpisodeStatus::Lost,
        }
    }
}

/// What happened in one step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// 1-based step number.
    pub step: usize,
    /// Where the agent decided.
    pub position_before: Position,
    /// Where the agent ended the step.
    pub position_after: Position,
    /// Percepts the decision was based on.
    pub percepts: PerceptSet,
    /// The decision and its trace.
    pub decision: Decision,
    /// Status after the step.
    pub status: EpisodeStatus,
    /// When the decision was made.
    pub decided_at: DateTime<Utc>,
}

/// Full observable state of an episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeSnapshot {
    /// Episode identifier.
    pub id: EpisodeId,
    /// Side length of the grid.
    pub grid_size: usize,
    /// Ground truth rendering of the world.
    pub world: String,
    /// The agent's view of the grid.
    pub playing_grid: PlayingGrid,
    /// Current agent position.
    pub agent_position: Position,
    /// False once the agent has died.
    pub agent_alive: bool,
    /// True once the gold has been picked up.
    pub has_gold: bool,
    /// Current status.
    pub status: EpisodeStatus,
    /// Why the episode ended, once it has.
    pub outcome: Option<EpisodeOutcome>,
    /// Steps taken.
    pub steps: usize,
    /// Percepts the next step will ingest, including a pending Scream.
    pub percepts: PerceptSet,
    /// Arrow state as the agent knows it.
    pub arrow: ArrowState,
    /// Ordered facts and nonzero confidences.
    pub knowledge: Vec<SummaryEntry>,
    /// Content hash of `knowledge`.
    pub knowledge_digest: String,
    /// The most recent decision.
    pub last_decision: Option<Decision>,
    /// When the snapshot was taken.
    pub taken_at: DateTime<Utc>,
}

/// One agent exploring one world.
#[derive(Debug)]
pub struct Episode {
    id: EpisodeId,
    config: EpisodeConfig,
    world: WumpusWorld,
    agent: Agent,
    position: Position,
    alive: bool,
    has_gold: bool,
    visited: HashSet<Position>,
    outcome: Option<EpisodeOutcome>,
    steps: usize,
    pending_scream: bool,
    last_decision: Option<Decision>,
}

impl Episode {
    /// Starts an episode in `world`, or in a random world built from the
    /// config's grid size and seed.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the config is out of range.
    pub fn new(config: EpisodeConfig, world: Option<WumpusWorld>) -> AgentResult<Self> {
        config.validate()?;
        let world = match world {
            Some(world) => world,
            None => {
                let seed = config.seed.unwrap_or_else(rand::random);
                WumpusWorld::random(config.grid_size, seed)?
            }
        };
        let agent = Agent::new(world.grid_size())?;
        let id = EpisodeId::new();

        tracing::info!(
            episode = %id,
            grid_size = world.grid_size(),
            return_to_exit = config.return_to_exit,
            "episode reset"
        );

        Ok(Self {
            id,
            config,
            world,
            agent,
            position: Position::ORIGIN,
            alive: true,
            has_gold: false,
            visited: HashSet::from([Position::ORIGIN]),
            outcome: None,
            steps: 0,
            pending_scream: false,
            last_decision: None,
        })
    }

    /// Episode identifier.
    #[must_use]
    pub const fn id(&self) -> EpisodeId {
        self.id
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> EpisodeStatus {
        self.outcome.map_or(EpisodeStatus::Playing, EpisodeOutcome::status)
    }

    /// Returns true while the episode is running.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.outcome.is_none()
    }

    /// Why the episode ended, once it has.
    #[must_use]
    pub const fn outcome(&self) -> Option<EpisodeOutcome> {
        self.outcome
    }

    /// Current agent position.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Steps taken so far.
    #[must_use]
    pub const fn steps(&self) -> usize {
        self.steps
    }

    /// The agent.
    #[must_use]
    pub const fn agent(&self) -> &Agent {
        &self.agent
    }

    /// The world.
    #[must_use]
    pub const fn world(&self) -> &WumpusWorld {
        &self.world
    }

    /// Ends a running episode from outside.
    pub fn stop(&mut self) {
        if self.outcome.is_none() {
            self.finish(EpisodeOutcome::Stopped);
        }
    }

    /// Advances the episode by one decision.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError::EpisodeFinished`] once the episode is over.
    pub fn step(&mut self) -> AgentResult<StepRecord> {
        if self.outcome.is_some() {
            return Err(ExecutionError::EpisodeFinished {
                episode: self.id.to_string(),
            }
            .into());
        }

        let before = self.position;
        let mut percepts = self.world.percepts(before);
        if std::mem::take(&mut self.pending_scream) {
            percepts.insert(Percept::Scream);
        }

        let decision =
            self.agent
                .ingest_percepts_and_decide(before, &percepts, self.world.grid_size())?;
        self.steps += 1;
        self.apply(decision.action);

        if self.outcome.is_none() {
            self.check_end_conditions();
        }

        self.last_decision = Some(decision.clone());
        Ok(StepRecord {
            step: self.steps,
            position_before: before,
            position_after: self.position,
            percepts,
            decision,
            status: self.status(),
            decided_at: Utc::now(),
        })
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Grab => {
                if !self.has_gold && self.world.take_gold(self.position) {
                    self.has_gold = true;
                    if !self.config.return_to_exit {
                        self.finish(EpisodeOutcome::GoldGrabbed);
                    }
                }
            }
            Action::Shoot(direction) => {
                self.pending_scream = self.world.shoot_arrow(self.position, direction);
            }
            Action::Move(direction) => {
                let size = self.world.grid_size();
                self.position = self.position.step(direction, size).unwrap_or(self.position);
                self.visited.insert(self.position);

                match self.world.contents(self.position) {
                    Tile::Pit => self.die(EpisodeOutcome::FellIntoPit),
                    Tile::Wumpus => self.die(EpisodeOutcome::EatenByWumpus),
                    Tile::Empty | Tile::Gold => {}
                }
            }
        }
    }

    fn check_end_conditions(&mut self) {
        let size = self.world.grid_size();
        if self.has_gold && self.position == Position::ORIGIN {
            self.finish(EpisodeOutcome::ReturnedWithGold);
        } else if self.visited.len() == size * size {
            self.finish(EpisodeOutcome::ExploredEverything);
        } else if self.steps >= self.config.max_steps {
            self.finish(EpisodeOutcome::StepLimit);
        }
    }

    fn die(&mut self, outcome: EpisodeOutcome) {
        self.alive = false;
        tracing::warn!(
            episode = %self.id,
            position = %self.position,
            outcome = ?outcome,
            "agent died"
        );
        self.finish(outcome);
    }

    fn finish(&mut self, outcome: EpisodeOutcome) {
        self.outcome = Some(outcome);
        tracing::info!(
            episode = %self.id,
            steps = self.steps,
            outcome = ?outcome,
            status = ?outcome.status(),
            "episode finished"
        );
    }

    /// Runs until the episode ends and returns the final snapshot.
    ///
    /// # Errors
    ///
    /// Propagates step errors.
    pub fn run_to_completion(&mut self) -> AgentResult<EpisodeSnapshot> {
        while self.is_playing() {
            self.step()?;
        }
        Ok(self.snapshot())
    }

    /// Captures the full observable state.
    #[must_use]
    pub fn snapshot(&self) -> EpisodeSnapshot {
        let kb = self.agent.knowledge();
        let mut percepts = self.world.percepts(self.position);
        if self.pending_scream {
            percepts.insert(Percept::Scream);
        }
        EpisodeSnapshot {
            id: self.id,
            grid_size: self.world.grid_size(),
            world: self.world.render(),
            playing_grid: self.agent.display_grid(),
            agent_position: self.position,
            agent_alive: self.alive,
            has_gold: self.has_gold,
            status: self.status(),
            outcome: self.outcome,
            steps: self.steps,
            percepts,
            arrow: kb.arrow(),
            knowledge: self.agent.fact_summary(),
            knowledge_digest: kb.digest(),
            last_decision: self.last_decision.clone(),
            taken_at: Utc::now(),
        }
    }
}
