//! Repository contract for live game sessions.

use std::sync::Arc;

use terra_core::GameId;

use super::Result;
use crate::session::GameSession;

/// Registry of hosted games.
///
/// The repository only hands out shared sessions; each session guards its own
/// state, so holding the repository lock never blocks gameplay.
pub trait GameRepository: Send + Sync {
    /// Register a new session.
    ///
    /// Fails with [`RepositoryError::AlreadyExists`](super::RepositoryError)
    /// when the id is taken.
    fn insert(&self, session: Arc<GameSession>) -> Result<()>;

    /// Look up a session by game id.
    fn get(&self, id: &GameId) -> Result<Option<Arc<GameSession>>>;

    /// Drop a session, returning it if it was present.
    fn remove(&self, id: &GameId) -> Result<Option<Arc<GameSession>>>;

    /// Ids of every hosted game, sorted.
    fn list_ids(&self) -> Result<Vec<GameId>>;

    fn len(&self) -> Result<usize> {
        Ok(self.list_ids()?.len())
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
