//! The agent facade: one knowledge base and one policy per episode.

use crate::error::{AgentResult, ValidationError};
use crate::knowledge::{KnowledgeBase, PerceptSet, PlayingGrid, SummaryEntry};
use crate::policy::{Decision, DecisionPolicy};
use crate::position::Position;
use crate::world::MIN_GRID_SIZE;

/// Decision core of a single agent.
///
/// Each call to [`Agent::ingest_percepts_and_decide`] is one atomic step:
/// either its inputs are rejected and nothing changes, or the percepts are
/// ingested and a decision is returned.
#[derive(Debug, Clone)]
pub struct Agent {
    grid_size: usize,
    kb: KnowledgeBase,
    policy: DecisionPolicy,
}

impl Agent {
    /// Creates an agent for a fresh `grid_size` episode.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::GridTooSmall`] for grids below 2x2.
    pub fn new(grid_size: usize) -> AgentResult<Self> {
        validate_grid_size(grid_size)?;
        Ok(Self {
            grid_size,
            kb: KnowledgeBase::new(grid_size),
            policy: DecisionPolicy::new(),
        })
    }

    /// Discards all knowledge and memory and starts over.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::GridTooSmall`] for grids below 2x2; the
    /// current episode is kept in that case.
    pub fn reset_episode(&mut self, grid_size: usize) -> AgentResult<()> {
        *self = Self::new(grid_size)?;
        Ok(())
    }

    /// Grid size of the current episode.
    #[must_use]
    pub const fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Ingests the percepts at `position` and decides the next action.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `grid_size` differs from the episode's
    /// or `position` is off the grid.
    pub fn ingest_percepts_and_decide(
        &mut self,
        position: Position,
        percepts: &PerceptSet,
        grid_size: usize,
    ) -> AgentResult<Decision> {
        if grid_size != self.grid_size {
            return Err(ValidationError::GridSizeMismatch {
                expected: self.grid_size,
                actual: grid_size,
            }
            .into());
        }
        if !position.in_bounds(self.grid_size) {
            return Err(ValidationError::InvalidPosition {
                position,
                grid_size: self.grid_size,
            }
            .into());
        }

        let class = self.kb.update(position, *percepts);
        let decision = self.policy.decide(&mut self.kb, position, *percepts);

        tracing::debug!(
            position = %position,
            percepts = %percepts,
            class = ?class,
            action = %decision.action,
            rule = %decision.rule_label,
            "decided"
        );
        Ok(decision)
    }

    /// Current display projection.
    #[must_use]
    pub fn display_grid(&self) -> PlayingGrid {
        self.kb.display_grid()
    }

    /// Ordered facts and nonzero confidences.
    #[must_use]
    pub fn fact_summary(&self) -> Vec<SummaryEntry> {
        self.kb.fact_summary()
    }

    /// Read access to the knowledge base.
    #[must_use]
    pub const fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Read access to the decision policy.
    #[must_use]
    pub const fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }
}

fn validate_grid_size(grid_size: usize) -> AgentResult<()> {
    if grid_size < MIN_GRID_SIZE {
        return Err(ValidationError::GridTooSmall {
            size: grid_size,
            min: MIN_GRID_SIZE,
        }
        .into());
    }
    Ok(())
}
