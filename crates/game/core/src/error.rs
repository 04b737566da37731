//! Common error infrastructure for terra-core.
//!
//! Every rule violation detected by the engine is a [`RulesError`]. Variants
//! carry the quantities a client needs to render an actionable message, and
//! [`RulesError::kind`] folds them onto the stable [`ErrorKind`] taxonomy used
//! by transport layers.
//!
//! # Design Principles
//!
//! - **Detected before mutation**: validation completes before any state is
//!   touched, so an error never leaves a half-applied command behind
//! - **Severity Classification**: errors are categorized for recovery strategies
//! - **No internal retries**: retry policy belongs to the caller

use crate::card::RequirementKind;
use crate::state::{GamePhase, GameStatus, PlayerId};

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the same request may succeed later (e.g. not your turn yet)
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
/// - **Fatal**: unrecoverable errors indicating corrupted game state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    Recoverable,
    Validation,
    Internal,
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all terra-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Useful for error categorization, metrics, and testing.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Stable taxonomy every rule violation maps onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidState,
    NotYourTurn,
    InvalidChoice,
    RequirementNotMet,
    InsufficientResource,
    PaymentInsufficient,
    NoActionsRemaining,
}

/// The kind of entity a [`RulesError::NotFound`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Entity {
    Game,
    Player,
    Card,
    Corporation,
    CardAction,
    Hex,
}

/// Which side of a min/max requirement was violated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Bound {
    Min,
    Max,
}

/// Errors produced by rule validation and state transitions.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RulesError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: Entity, id: String },

    #[error("game is in phase {actual}, expected {expected}")]
    WrongPhase {
        expected: GamePhase,
        actual: GamePhase,
    },

    #[error("game status is {actual}, expected {expected}")]
    WrongStatus {
        expected: GameStatus,
        actual: GameStatus,
    },

    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    #[error("it is not {player}'s turn")]
    NotYourTurn {
        player: PlayerId,
        current: Option<PlayerId>,
    },

    #[error("invalid choice index {index:?}: {available} choices available")]
    InvalidChoice {
        index: Option<usize>,
        available: usize,
    },

    #[error("invalid target: {reason}")]
    InvalidTarget { reason: String },

    #[error("requirement {requirement} not met: {bound} {threshold}, current {current}")]
    RequirementNotMet {
        requirement: RequirementKind,
        bound: Bound,
        threshold: i32,
        current: i32,
    },

    #[error("insufficient {item}: need {needed}, have {available}")]
    InsufficientResource {
        item: String,
        needed: i32,
        available: i32,
    },

    #[error("payment insufficient: cost {cost}, payment provides {provided}")]
    PaymentInsufficient { cost: i32, provided: i32 },

    #[error("{currency} cannot be used to pay for this")]
    CurrencyNotAccepted { currency: String },

    #[error("invalid payment: {reason}")]
    InvalidPayment { reason: String },

    #[error("player {player} has no actions remaining")]
    NoActionsRemaining { player: PlayerId },
}

impl RulesError {
    pub fn not_found(entity: Entity, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    pub fn invalid_target(reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            reason: reason.into(),
        }
    }

    pub fn insufficient(item: impl ToString, needed: i32, available: i32) -> Self {
        Self::InsufficientResource {
            item: item.to_string(),
            needed,
            available,
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::WrongPhase { .. } | Self::WrongStatus { .. } | Self::InvalidState { .. } => {
                ErrorKind::InvalidState
            }
            Self::NotYourTurn { .. } => ErrorKind::NotYourTurn,
            Self::InvalidChoice { .. } | Self::InvalidTarget { .. } => ErrorKind::InvalidChoice,
            Self::RequirementNotMet { .. } => ErrorKind::RequirementNotMet,
            Self::InsufficientResource { .. } => ErrorKind::InsufficientResource,
            Self::PaymentInsufficient { .. }
            | Self::CurrencyNotAccepted { .. }
            | Self::InvalidPayment { .. } => ErrorKind::PaymentInsufficient,
            Self::NoActionsRemaining { .. } => ErrorKind::NoActionsRemaining,
        }
    }
}

impl GameError for RulesError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotYourTurn { .. } | Self::NoActionsRemaining { .. } => {
                ErrorSeverity::Recoverable
            }
            Self::WrongPhase { .. } | Self::WrongStatus { .. } => ErrorSeverity::Recoverable,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "RULES_NOT_FOUND",
            Self::WrongPhase { .. } => "RULES_WRONG_PHASE",
            Self::WrongStatus { .. } => "RULES_WRONG_STATUS",
            Self::InvalidState { .. } => "RULES_INVALID_STATE",
            Self::NotYourTurn { .. } => "RULES_NOT_YOUR_TURN",
            Self::InvalidChoice { .. } => "RULES_INVALID_CHOICE",
            Self::InvalidTarget { .. } => "RULES_INVALID_TARGET",
            Self::RequirementNotMet { .. } => "RULES_REQUIREMENT_NOT_MET",
            Self::InsufficientResource { .. } => "RULES_INSUFFICIENT_RESOURCE",
            Self::PaymentInsufficient { .. } => "RULES_PAYMENT_INSUFFICIENT",
            Self::CurrencyNotAccepted { .. } => "RULES_CURRENCY_NOT_ACCEPTED",
            Self::InvalidPayment { .. } => "RULES_INVALID_PAYMENT",
            Self::NoActionsRemaining { .. } => "RULES_NO_ACTIONS_REMAINING",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_errors_fold_into_payment_kind() {
        let err = RulesError::CurrencyNotAccepted {
            currency: "steel".into(),
        };
        assert_eq!(err.kind(), ErrorKind::PaymentInsufficient);
        assert_eq!(err.error_code(), "RULES_CURRENCY_NOT_ACCEPTED");
    }

    #[test]
    fn insufficient_resource_message_names_quantities() {
        let err = RulesError::insufficient("plants", 8, 3);
        assert_eq!(err.to_string(), "insufficient plants: need 8, have 3");
        assert_eq!(err.kind(), ErrorKind::InsufficientResource);
        assert_eq!(err.severity(), ErrorSeverity::Validation);
    }

    #[test]
    fn turn_errors_are_recoverable() {
        let err = RulesError::NotYourTurn {
            player: PlayerId::new("p2"),
            current: Some(PlayerId::new("p1")),
        };
        assert!(err.severity().is_recoverable());
        assert_eq!(err.kind().to_string(), "not_your_turn");
    }
}
