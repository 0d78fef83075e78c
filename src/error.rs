//! Error types for the wumpus agent.
//!
//! All errors are strongly typed using thiserror. The decision core itself
//! never fails once its inputs are validated; errors surface only at the
//! boundaries (agent facade, world loading, episode driver, runner).

use thiserror::Error;

use crate::position::Position;

/// Validation errors that occur during input validation.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Grid size {size} is too small (minimum {min})")]
    GridTooSmall {
        size: usize,
        min: usize,
    },

    #[error("Position {position} is outside a {grid_size}x{grid_size} grid")]
    InvalidPosition {
        position: Position,
        grid_size: usize,
    },

    #[error("Grid size mismatch: episode uses {expected}, caller passed {actual}")]
    GridSizeMismatch {
        expected: usize,
        actual: usize,
    },

    #[error("Malformed world at line {line}: {reason}")]
    MalformedWorld {
        line: usize,
        reason: String,
    },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidField {
        field: String,
        reason: String,
    },
}

/// Execution errors that occur while driving an episode.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Episode {episode} is already finished")]
    EpisodeFinished {
        episode: String,
    },

    #[error("Runner '{path}' disconnected")]
    Disconnected {
        path: String,
    },

    #[error("Operation timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },

    #[error("Failed to spawn worker '{name}': {message}")]
    SpawnFailed {
        name: String,
        message: String,
    },

    #[error("Failed to read '{path}': {message}")]
    Io {
        path: String,
        message: String,
    },

    #[error("Failed to parse '{path}': {message}")]
    Parse {
        path: String,
        message: String,
    },
}

/// Top-level error type for the crate.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl AgentError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an execution error.
    #[must_use]
    pub const fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }
}

/// Result type alias for crate operations.
pub type AgentResult<T> = Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::GridTooSmall { size: 1, min: 2 };
        assert_eq!(err.to_string(), "Grid size 1 is too small (minimum 2)");

        let err = ValidationError::InvalidPosition {
            position: Position::new(4, 0),
            grid_size: 4,
        };
        assert!(err.to_string().contains("(4,0)"));
    }

    #[test]
    fn test_agent_error_from_validation() {
        let err: AgentError = ValidationError::GridSizeMismatch {
            expected: 4,
            actual: 5,
        }
        .into();
        assert!(err.is_validation());
        assert!(!err.is_execution());
    }

    #[test]
    fn test_agent_error_from_execution() {
        let err: AgentError = ExecutionError::Timeout { duration_ms: 100 }.into();
        assert!(err.is_execution());
        assert!(err.to_string().contains("100ms"));
    }

    #[test]
    fn test_internal_error() {
        let err = AgentError::internal("boom");
        assert!(err.to_string().contains("boom"));
        assert!(!err.is_validation());
    }
}
