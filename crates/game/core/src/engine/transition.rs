//! The three-stage transition contract and the guards shared by commands.

use strum::IntoEnumIterator;

use crate::behavior::ResolutionLog;
use crate::env::GameEnv;
use crate::error::RulesError;
use crate::events::DomainEvent;
use crate::state::{
    GamePhase, GameState, GameStatus, GlobalParameter, GlobalParameters, PlayerId, PlayerState,
};

/// Defines how a concrete command mutates game state.
pub trait Transition {
    /// Validates pre-conditions using the state **before** mutation.
    ///
    /// Every check that can reject the command belongs here so that a
    /// rejected command never reaches `apply`.
    fn pre_validate(&self, state: &GameState, env: GameEnv<'_>) -> Result<(), RulesError>;

    /// Applies the command. Implementations may assume `pre_validate` passed.
    fn apply(&self, ctx: &mut TransitionContext<'_>) -> Result<(), RulesError>;

    /// Validates post-conditions using the state **after** mutation and
    /// event dispatch.
    fn post_validate(&self, state: &GameState) -> Result<(), RulesError> {
        check_invariants(state)
    }
}

/// Mutable view handed to [`Transition::apply`].
pub struct TransitionContext<'a> {
    pub state: &'a mut GameState,
    pub env: GameEnv<'a>,
    /// Events and calculated outputs recorded while applying.
    pub log: ResolutionLog,
    /// Human readable summary stored in the diff log.
    pub description: String,
}

impl<'a> TransitionContext<'a> {
    pub fn new(state: &'a mut GameState, env: GameEnv<'a>) -> Self {
        Self {
            state,
            env,
            log: ResolutionLog::default(),
            description: String::new(),
        }
    }

    pub fn emit(&mut self, event: DomainEvent) {
        self.log.emit(event);
    }

    pub fn describe(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }
}

/// State invariants every command must leave intact.
///
/// - holdings and production are never negative
/// - the current turn names a member of the turn order
/// - global parameters stay within their tracks
pub fn check_invariants(state: &GameState) -> Result<(), RulesError> {
    for player in &state.players {
        if !player.resources.is_non_negative() {
            return Err(RulesError::invalid_state(format!(
                "player {} holds negative resources",
                player.id
            )));
        }
        if !player.production.is_non_negative() {
            return Err(RulesError::invalid_state(format!(
                "player {} has negative production",
                player.id
            )));
        }
    }

    if let Some(turn) = &state.current_turn {
        if !state.turn_order.contains(&turn.player) {
            return Err(RulesError::invalid_state(format!(
                "current turn player {} is not seated",
                turn.player
            )));
        }
    }

    for parameter in GlobalParameter::iter() {
        let value = state.global.get(parameter);
        if value < GlobalParameters::min(parameter) || value > GlobalParameters::max(parameter) {
            return Err(RulesError::invalid_state(format!(
                "{parameter} out of range: {value}"
            )));
        }
    }
    Ok(())
}

/// Fails with `NotYourTurn` unless `player` holds the current turn.
pub(crate) fn require_current_player(state: &GameState, player: &PlayerId) -> Result<(), RulesError> {
    let current = state.current_player();
    if current == Some(player) {
        Ok(())
    } else {
        Err(RulesError::NotYourTurn {
            player: player.clone(),
            current: current.cloned(),
        })
    }
}

/// Guard shared by every command that spends an action.
///
/// Checks, in order: game active, action phase, player seated, player's
/// turn, actions left, no tile placement waiting.
pub(crate) fn require_action_turn<'s>(
    state: &'s GameState,
    player: &PlayerId,
) -> Result<&'s PlayerState, RulesError> {
    state.require_status(GameStatus::Active)?;
    state.require_phase(GamePhase::Action)?;
    let seated = state.require_player(player)?;
    require_current_player(state, player)?;

    if !state.current_turn.as_ref().is_some_and(|turn| turn.has_actions()) {
        return Err(RulesError::NoActionsRemaining {
            player: player.clone(),
        });
    }
    if seated.has_pending_tiles() {
        return Err(RulesError::invalid_state(
            "pending tile placements must be resolved first",
        ));
    }
    Ok(seated)
}

/// Spends one action of the current turn; unlimited turns are untouched.
pub(crate) fn consume_action(state: &mut GameState) {
    if let Some(turn) = state.current_turn.as_mut() {
        turn.consume();
    }
}
