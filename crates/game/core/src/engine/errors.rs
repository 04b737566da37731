//! Error types for the command execution pipeline.

use super::CommandKind;
use crate::error::{ErrorKind, ErrorSeverity, GameError, RulesError};
use crate::events::DispatchError;

/// Identifies which stage of the transition pipeline produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionPhase {
    PreValidate,
    Apply,
    PostValidate,
}

impl TransitionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPhase::PreValidate => "pre_validate",
            TransitionPhase::Apply => "apply",
            TransitionPhase::PostValidate => "post_validate",
        }
    }
}

/// Associates a transition phase with the underlying error.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionPhaseError<E> {
    pub phase: TransitionPhase,
    pub error: E,
}

impl<E> TransitionPhaseError<E> {
    pub fn new(phase: TransitionPhase, error: E) -> Self {
        Self { phase, error }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TransitionPhaseError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.phase.as_str(), self.error)
    }
}

impl<E: std::fmt::Display + std::fmt::Debug> std::error::Error for TransitionPhaseError<E> {}

/// Errors surfaced while executing a command through the game engine.
///
/// The engine restores the pre-command state before returning any of these.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecuteError {
    #[error("{command} command failed: {error}")]
    Transition {
        command: CommandKind,
        error: TransitionPhaseError<RulesError>,
    },

    #[error("{command} command failed during event dispatch: {error}")]
    Dispatch {
        command: CommandKind,
        error: DispatchError,
    },
}

impl ExecuteError {
    pub(crate) fn transition(command: CommandKind, phase: TransitionPhase, error: RulesError) -> Self {
        Self::Transition {
            command,
            error: TransitionPhaseError::new(phase, error),
        }
    }

    pub const fn command(&self) -> CommandKind {
        match self {
            Self::Transition { command, .. } | Self::Dispatch { command, .. } => *command,
        }
    }

    /// The rule violation behind this failure, if there is one.
    pub fn rules_error(&self) -> Option<&RulesError> {
        match self {
            Self::Transition { error, .. } => Some(&error.error),
            Self::Dispatch {
                error: DispatchError::Subscriber { error, .. },
                ..
            } => Some(error),
            Self::Dispatch { .. } => None,
        }
    }

    /// Taxonomy kind a client renders; `None` for internal dispatch failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        self.rules_error().map(RulesError::kind)
    }

    pub fn phase(&self) -> Option<TransitionPhase> {
        match self {
            Self::Transition { error, .. } => Some(error.phase),
            Self::Dispatch { .. } => None,
        }
    }
}

impl GameError for ExecuteError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Transition { error, .. } => match error.phase {
                TransitionPhase::PostValidate => ErrorSeverity::Internal,
                _ => error.error.severity(),
            },
            Self::Dispatch { error, .. } => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Transition { error, .. } => error.error.error_code(),
            Self::Dispatch { error, .. } => error.error_code(),
        }
    }
}
