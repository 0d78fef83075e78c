//! Episode and runner configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AgentResult, ExecutionError, ValidationError};
use crate::world::MIN_GRID_SIZE;

/// Settings for one episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeConfig {
    /// Side length of a randomly generated world.
    pub grid_size: usize,
    /// Steps after which the episode is lost.
    pub max_steps: usize,
    /// Require carrying the gold back to the origin instead of winning on
    /// grab.
    pub return_to_exit: bool,
    /// Seed for random world generation; random when absent.
    pub seed: Option<u64>,
}

impl Default for EpisodeConfig {
    fn default() -> Self {
        Self {
            grid_size: 10,
            max_steps: 500,
            return_to_exit: false,
            seed: None,
        }
    }
}

impl EpisodeConfig {
    /// Loads a configuration from a JSON file. Missing keys keep defaults.
    ///
    /// # Errors
    ///
    /// Returns an execution error if the file cannot be read or parsed and
    /// a validation error if a value is out of range.
    pub fn from_json_file(path: impl AsRef<Path>) -> AgentResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ExecutionError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| ExecutionError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::GridTooSmall`] or
    /// [`ValidationError::InvalidField`].
    pub fn validate(&self) -> AgentResult<()> {
        if self.grid_size < MIN_GRID_SIZE {
            return Err(ValidationError::GridTooSmall {
                size: self.grid_size,
                min: MIN_GRID_SIZE,
            }
            .into());
        }
        if self.max_steps == 0 {
            return Err(ValidationError::InvalidField {
                field: "max_steps".to_string(),
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Settings for [`super::EpisodeRunner`].
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Pause between steps.
    pub step_delay: Duration,
    /// Max queued events before the worker blocks.
    pub event_capacity: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            step_delay: Duration::ZERO,
            event_capacity: 256,
        }
    }
}
