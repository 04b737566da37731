//! Unified error types surfaced by the runtime API.
//!
//! Wraps engine rejections, lobby rule violations and repository failures so
//! clients can bubble them up with consistent context.
use thiserror::Error;

use terra_core::{ErrorKind, ErrorSeverity, ExecuteError, GameError, GameId, PlayerId, RulesError};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("game {0} not found")]
    GameNotFound(GameId),

    #[error("player {player} is not seated in game {game}")]
    PlayerNotFound { game: GameId, player: PlayerId },

    #[error(transparent)]
    Execute(#[from] ExecuteError),

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl RuntimeError {
    /// Taxonomy kind a transport renders; `None` for infrastructure failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::GameNotFound(_) | Self::PlayerNotFound { .. } => Some(ErrorKind::NotFound),
            Self::Execute(error) => error.kind(),
            Self::Rules(error) => Some(error.kind()),
            Self::Repository(RepositoryError::CapacityReached { .. }) => {
                Some(ErrorKind::InvalidState)
            }
            Self::Repository(_) => None,
        }
    }

    /// The rule violation behind this failure, if there is one.
    pub fn rules_error(&self) -> Option<&RulesError> {
        match self {
            Self::Execute(error) => error.rules_error(),
            Self::Rules(error) => Some(error),
            _ => None,
        }
    }
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::GameNotFound(_) | Self::PlayerNotFound { .. } => ErrorSeverity::Validation,
            Self::Execute(error) => error.severity(),
            Self::Rules(error) => error.severity(),
            Self::Repository(RepositoryError::CapacityReached { .. }) => {
                ErrorSeverity::Recoverable
            }
            Self::Repository(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::GameNotFound(_) => "RUNTIME_GAME_NOT_FOUND",
            Self::PlayerNotFound { .. } => "RUNTIME_PLAYER_NOT_FOUND",
            Self::Execute(error) => error.error_code(),
            Self::Rules(error) => error.error_code(),
            Self::Repository(_) => "RUNTIME_REPOSITORY",
        }
    }
}
