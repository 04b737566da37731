//! Authoritative game state representation.
//!
//! This module owns the data structures that describe a game: the players'
//! ledgers, turn bookkeeping, global parameters, standing effect
//! subscriptions and the final scores. Runtime layers clone or query this
//! state but mutate it exclusively through the engine.
mod awards;
pub mod diff;
mod global;
mod ids;
mod player;
mod resources;
mod selection;
mod tiles;
mod turn;

use std::collections::BTreeMap;

pub use awards::{
    Award, ClaimedMilestone, FinalScores, FundedAward, Milestone, PlayerScore, VpBreakdown,
};
pub use diff::{
    CalculatedOutput, Change, DiffLog, GameChanges, GameFields, PlayerChanges, PlayerFields,
    SourceKind, StateDiff, TriggeredEffect,
};
pub use global::{GlobalParameter, GlobalParameters};
pub use ids::{CardId, GameId, HexId, PlayerId};
pub use player::{CardAction, CardEffect, PlayedCard, PlayerState};
pub use resources::{ResourceChange, ResourceKind, ResourceSet};
pub use selection::{ProductionSelection, StartingSelection};
pub use tiles::{PlacementBonus, PlacementResult, TileKind, TileQueue, TileScope};
pub use turn::TurnState;

use crate::config::GameConfig;
use crate::error::{Entity, RulesError};
use crate::events::EventKind;

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Lobby,
    Active,
    Completed,
}

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum GamePhase {
    #[default]
    WaitingForGameStart,
    StartingCardSelection,
    CorporationSelection,
    Action,
    ProductionAndCardDraw,
    Complete,
}

/// Points at one registered [`CardEffect`] of one player.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectRef {
    pub player: PlayerId,
    pub card: CardId,
    pub behavior_index: usize,
}

/// Canonical snapshot of one game.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    pub id: GameId,
    pub config: GameConfig,
    pub status: GameStatus,
    pub phase: GamePhase,
    /// Starts at 1 and only grows.
    pub generation: u32,
    pub global: GlobalParameters,
    pub turn_order: Vec<PlayerId>,
    /// Always names a member of `turn_order` while the game is active.
    pub current_turn: Option<TurnState>,
    /// Players in join order.
    pub players: Vec<PlayerState>,
    /// Conditional effects keyed by the event kind they listen to.
    pub subscriptions: BTreeMap<EventKind, Vec<EffectRef>>,
    pub claimed_milestones: Vec<ClaimedMilestone>,
    pub funded_awards: Vec<FundedAward>,
    pub final_scores: Option<FinalScores>,
}

impl GameState {
    pub fn new(id: GameId, config: GameConfig) -> Self {
        Self {
            id,
            config,
            status: GameStatus::Lobby,
            phase: GamePhase::WaitingForGameStart,
            generation: 1,
            global: GlobalParameters::new(),
            turn_order: Vec::new(),
            current_turn: None,
            players: Vec::new(),
            subscriptions: BTreeMap::new(),
            claimed_milestones: Vec::new(),
            funded_awards: Vec::new(),
            final_scores: None,
        }
    }

    /// Seats a new player. Only allowed while the game is in the lobby.
    pub fn add_player(&mut self, id: PlayerId, name: impl Into<String>) -> Result<(), RulesError> {
        self.require_status(GameStatus::Lobby)?;
        if self.players.len() >= GameConfig::MAX_PLAYERS {
            return Err(RulesError::invalid_state("game is full"));
        }
        if self.player(&id).is_some() {
            return Err(RulesError::invalid_state(format!(
                "player {id} already joined"
            )));
        }
        let tr = self.config.starting_terraform_rating;
        self.players.push(PlayerState::new(id.clone(), name, tr));
        self.turn_order.push(id);
        Ok(())
    }

    pub fn player(&self, id: &PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut PlayerState> {
        self.players.iter_mut().find(|p| &p.id == id)
    }

    pub fn require_player(&self, id: &PlayerId) -> Result<&PlayerState, RulesError> {
        self.player(id)
            .ok_or_else(|| RulesError::not_found(Entity::Player, id))
    }

    pub fn require_player_mut(&mut self, id: &PlayerId) -> Result<&mut PlayerState, RulesError> {
        self.player_mut(id)
            .ok_or_else(|| RulesError::not_found(Entity::Player, id))
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_solo(&self) -> bool {
        self.players.len() == 1
    }

    pub fn require_status(&self, expected: GameStatus) -> Result<(), RulesError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(RulesError::WrongStatus {
                expected,
                actual: self.status,
            })
        }
    }

    pub fn require_phase(&self, expected: GamePhase) -> Result<(), RulesError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(RulesError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    pub fn current_player(&self) -> Option<&PlayerId> {
        self.current_turn.as_ref().map(|turn| &turn.player)
    }

    /// Players that have not passed this generation, in turn order.
    pub fn active_players(&self) -> Vec<PlayerId> {
        self.turn_order
            .iter()
            .filter(|id| self.player(id).is_some_and(|p| !p.passed))
            .cloned()
            .collect()
    }

    pub fn subscribe(&mut self, kind: EventKind, effect: EffectRef) {
        let entries = self.subscriptions.entry(kind).or_default();
        if !entries.contains(&effect) {
            entries.push(effect);
        }
    }

    pub fn subscribers(&self, kind: EventKind) -> &[EffectRef] {
        self.subscriptions
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn milestones_claimed_by(&self, player: &PlayerId) -> usize {
        self.claimed_milestones
            .iter()
            .filter(|m| &m.player == player)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lobby() -> GameState {
        GameState::new(GameId::new("g"), GameConfig::default())
    }

    #[test]
    fn add_player_seats_in_turn_order() {
        let mut state = lobby();
        state.add_player(PlayerId::new("a"), "A").unwrap();
        state.add_player(PlayerId::new("b"), "B").unwrap();
        assert_eq!(state.turn_order, vec![PlayerId::new("a"), PlayerId::new("b")]);
        assert_eq!(state.player(&PlayerId::new("b")).unwrap().terraform_rating, 20);
    }

    #[test]
    fn add_player_rejects_duplicates_and_full_tables() {
        let mut state = lobby();
        for i in 0..GameConfig::MAX_PLAYERS {
            state.add_player(PlayerId::new(format!("p{i}")), "P").unwrap();
        }
        assert!(matches!(
            state.add_player(PlayerId::new("extra"), "X"),
            Err(RulesError::InvalidState { .. })
        ));
        assert!(matches!(
            state.add_player(PlayerId::new("p0"), "again"),
            Err(RulesError::InvalidState { .. })
        ));
    }

    #[test]
    fn add_player_requires_lobby() {
        let mut state = lobby();
        state.status = GameStatus::Active;
        assert!(matches!(
            state.add_player(PlayerId::new("a"), "A"),
            Err(RulesError::WrongStatus { .. })
        ));
    }

    #[test]
    fn active_players_skip_passed() {
        let mut state = lobby();
        state.add_player(PlayerId::new("a"), "A").unwrap();
        state.add_player(PlayerId::new("b"), "B").unwrap();
        state.player_mut(&PlayerId::new("a")).unwrap().passed = true;
        assert_eq!(state.active_players(), vec![PlayerId::new("b")]);
    }

    #[test]
    fn subscribe_ignores_duplicates() {
        let mut state = lobby();
        let effect = EffectRef {
            player: PlayerId::new("a"),
            card: CardId::new("c"),
            behavior_index: 0,
        };
        state.subscribe(EventKind::TilePlaced, effect.clone());
        state.subscribe(EventKind::TilePlaced, effect);
        assert_eq!(state.subscribers(EventKind::TilePlaced).len(), 1);
        assert!(state.subscribers(EventKind::CardPlayed).is_empty());
    }
}
