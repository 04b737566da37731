//! Content digest of a game state.

use sha2::{Digest, Sha256};
use terra_core::GameState;

use crate::repository::RepositoryError;

/// Hex encoded SHA-256 of the bincode encoding of `state`.
///
/// Broadcast consumers compare roots to detect a diverged replay.
pub fn state_root(state: &GameState) -> Result<String, RepositoryError> {
    let bytes =
        bincode::serialize(state).map_err(|e| RepositoryError::Serialization(e.to_string()))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use terra_core::{GameConfig, GameId, PlayerId};

    #[test]
    fn root_tracks_state_content() {
        let mut state = GameState::new(GameId::new("g"), GameConfig::default());
        let empty = state_root(&state).unwrap();
        assert_eq!(empty.len(), 64);
        assert_eq!(empty, state_root(&state.clone()).unwrap());

        state.add_player(PlayerId::new("p1"), "Ada").unwrap();
        assert_ne!(empty, state_root(&state).unwrap());
    }
}
