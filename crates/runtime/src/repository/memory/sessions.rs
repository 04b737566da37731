//! In-memory GameRepository implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use terra_core::GameId;

use crate::repository::{GameRepository, RepositoryError, Result};
use crate::session::GameSession;

/// Hosts sessions in a map, optionally capped at a fixed number of games.
pub struct InMemoryGameRepository {
    sessions: RwLock<HashMap<GameId, Arc<GameSession>>>,
    limit: Option<usize>,
}

impl InMemoryGameRepository {
    /// Create a new empty repository without a game limit.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            limit: None,
        }
    }

    /// Create a repository that refuses games beyond `limit`.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            limit: Some(limit),
        }
    }
}

impl Default for InMemoryGameRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRepository for InMemoryGameRepository {
    fn insert(&self, session: Arc<GameSession>) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if sessions.contains_key(session.id()) {
            return Err(RepositoryError::AlreadyExists(session.id().to_string()));
        }
        if let Some(limit) = self.limit
            && sessions.len() >= limit
        {
            return Err(RepositoryError::CapacityReached { limit });
        }
        sessions.insert(session.id().clone(), session);
        Ok(())
    }

    fn get(&self, id: &GameId) -> Result<Option<Arc<GameSession>>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(sessions.get(id).cloned())
    }

    fn remove(&self, id: &GameId) -> Result<Option<Arc<GameSession>>> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(sessions.remove(id))
    }

    fn list_ids(&self) -> Result<Vec<GameId>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut ids: Vec<GameId> = sessions.keys().cloned().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn len(&self) -> Result<usize> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::oracle::{HexBoard, SharedDeck, StaticCatalog};
    use terra_core::{GameConfig, GameState};

    fn session(id: &str) -> Arc<GameSession> {
        Arc::new(GameSession::new(
            GameState::new(GameId::new(id), GameConfig::default()),
            Arc::new(StaticCatalog::default()),
            Arc::new(HexBoard::new(1)),
            Arc::new(SharedDeck::default()),
            EventBus::new(),
        ))
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let repo = InMemoryGameRepository::new();
        repo.insert(session("g1")).unwrap();

        let err = repo.insert(session("g1")).unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists(id) if id == "g1"));
        assert_eq!(repo.len().unwrap(), 1);
    }

    #[test]
    fn limit_caps_hosted_games() {
        let repo = InMemoryGameRepository::with_limit(1);
        repo.insert(session("g1")).unwrap();

        let err = repo.insert(session("g2")).unwrap_err();
        assert!(matches!(err, RepositoryError::CapacityReached { limit: 1 }));

        repo.remove(&GameId::new("g1")).unwrap();
        repo.insert(session("g2")).unwrap();
        assert_eq!(repo.list_ids().unwrap(), vec![GameId::new("g2")]);
    }
}
