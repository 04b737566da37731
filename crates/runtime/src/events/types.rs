//! Event payloads carried by the broadcast bus.

use serde::{Deserialize, Serialize};
use terra_core::{DomainEvent, EventKind, GameId, PlayerId, StateDiff};

/// Published once per successful command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameUpdate {
    pub game_id: GameId,
    /// The diff-log entry the command produced.
    pub diff: StateDiff,
    /// Every delivered domain event, in delivery order.
    pub events: Vec<DomainEvent>,
}

impl GameUpdate {
    pub fn sequence(&self) -> u64 {
        self.diff.sequence
    }
}

/// Flow-of-play changes, split out so lobby screens and schedulers can follow
/// a game without decoding full diffs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnNotice {
    pub game_id: GameId,
    pub sequence: u64,
    pub event: DomainEvent,
}

impl TurnNotice {
    /// Whether `event` belongs on the turn topic.
    pub fn is_turn_event(event: &DomainEvent) -> bool {
        matches!(
            event.kind(),
            EventKind::TurnChanged
                | EventKind::PlayerPassed
                | EventKind::GamePhaseChanged
                | EventKind::GameStatusChanged
                | EventKind::GenerationAdvanced
                | EventKind::GameEnded
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LobbyEvent {
    GameCreated {
        game_id: GameId,
    },
    PlayerJoined {
        game_id: GameId,
        player: PlayerId,
        name: String,
    },
    GameRemoved {
        game_id: GameId,
    },
}
