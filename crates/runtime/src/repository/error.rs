//! Error types raised by repository implementations.

use thiserror::Error;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("game repository lock was poisoned")]
    LockPoisoned,

    #[error("game {0} is already registered")]
    AlreadyExists(String),

    #[error("repository is full ({limit} games)")]
    CapacityReached { limit: usize },

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
