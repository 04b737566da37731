//! Turn order, passing and generation end.

use tracing::debug;

use super::production::run_production;
use super::scoring::run_final_scoring;
use super::transition::{Transition, TransitionContext, require_current_player};
use crate::config::GameConfig;
use crate::env::GameEnv;
use crate::error::RulesError;
use crate::events::DomainEvent;
use crate::state::{GamePhase, GameState, GameStatus, PlayerId, TurnState};

/// Ends the current player's turn.
///
/// This is a **pass** when the player has not acted yet (fresh allowance or
/// unlimited) or is the only player left in the generation; the player then
/// sits out until the next generation. Otherwise it is a **skip** and the
/// turn simply moves on.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndTurn {
    pub player: PlayerId,
}

impl EndTurn {
    pub fn new(player: PlayerId) -> Self {
        Self { player }
    }
}

impl Transition for EndTurn {
    fn pre_validate(&self, state: &GameState, env: GameEnv<'_>) -> Result<(), RulesError> {
        state.require_status(GameStatus::Active)?;
        state.require_phase(GamePhase::Action)?;
        let player = state.require_player(&self.player)?;
        require_current_player(state, &self.player)?;

        // A queued tile blocks the turn only while the board can still take it.
        if let Some(tile) = player.pending_tiles.as_ref().and_then(|queue| queue.front()) {
            if !env.board().available_hexes(tile, &self.player).is_empty() {
                return Err(RulesError::invalid_state(
                    "pending tile placements must be resolved first",
                ));
            }
        }
        Ok(())
    }

    fn apply(&self, ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
        let Some(turn) = ctx.state.current_turn.clone() else {
            return Err(RulesError::invalid_state("no turn in progress"));
        };
        let remaining_players = ctx.state.active_players().len();
        let is_pass = turn.actions_remaining == GameConfig::ACTIONS_PER_TURN
            || turn.is_unlimited()
            || remaining_players == 1;

        let player = ctx.state.require_player_mut(&self.player)?;
        if let Some(queue) = player.pending_tiles.take() {
            debug!(
                target: "terra::engine",
                player = %self.player,
                source = %queue.source,
                dropped = queue.pending.len(),
                "dropping unplaceable tiles"
            );
        }

        if is_pass {
            player.passed = true;
            ctx.emit(DomainEvent::PlayerPassed {
                player: self.player.clone(),
            });
            ctx.describe(format!("{} passed", self.player));
        } else {
            ctx.describe(format!("{} skipped", self.player));
        }

        advance_turn(ctx)
    }
}

/// Hands the turn to the next player who has not passed.
///
/// Ends the generation when nobody is left. The last remaining player of a
/// multi-player game gets unlimited actions; a player whose own turn comes
/// back keeps the actions they had.
pub(crate) fn advance_turn(ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
    let active = ctx.state.active_players();
    if active.is_empty() {
        return end_generation(ctx);
    }

    let current = ctx.state.current_turn.clone();
    let order = &ctx.state.turn_order;
    let start = current
        .as_ref()
        .and_then(|turn| order.iter().position(|id| *id == turn.player))
        .map_or(0, |index| index + 1);
    let next = (0..order.len())
        .map(|offset| &order[(start + offset) % order.len()])
        .find(|id| active.contains(id))
        .cloned()
        .ok_or_else(|| RulesError::invalid_state("no player left to take the turn"))?;

    let actions = match current {
        _ if active.len() == 1 => GameConfig::UNLIMITED_ACTIONS,
        Some(turn) if turn.player == next => turn.actions_remaining,
        _ => GameConfig::fresh_turn_actions(ctx.state.player_count()),
    };
    start_turn(ctx, next, actions)
}

/// Advances when the current player has spent every action and has no tile
/// waiting to be placed.
pub(crate) fn advance_if_exhausted(ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
    let Some(turn) = ctx.state.current_turn.as_ref() else {
        return Ok(());
    };
    if turn.has_actions() {
        return Ok(());
    }
    let pending = ctx
        .state
        .player(&turn.player)
        .is_some_and(|player| player.has_pending_tiles());
    if pending {
        return Ok(());
    }
    advance_turn(ctx)
}

pub(crate) fn start_turn(
    ctx: &mut TransitionContext<'_>,
    player: PlayerId,
    actions: i32,
) -> Result<(), RulesError> {
    ctx.state.require_player_mut(&player)?.reset_turn_counters();
    ctx.state.current_turn = Some(TurnState::new(player.clone(), actions));
    debug!(target: "terra::engine", player = %player, actions, "turn started");
    ctx.emit(DomainEvent::TurnChanged {
        player,
        actions_remaining: actions,
    });
    Ok(())
}

/// Gives the first player in turn order a fresh turn.
pub(crate) fn start_first_turn(ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
    let first = ctx
        .state
        .turn_order
        .first()
        .cloned()
        .ok_or_else(|| RulesError::invalid_state("no players seated"))?;
    let actions = GameConfig::fresh_turn_actions(ctx.state.player_count());
    start_turn(ctx, first, actions)
}

fn end_generation(ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
    debug!(
        target: "terra::engine",
        generation = ctx.state.generation,
        "all players passed"
    );
    if ctx.state.global.all_maxed() {
        run_final_scoring(ctx)
    } else {
        run_production(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Command;
    use crate::state::{GlobalParameters, ResourceKind, TileKind};
    use crate::testing::Fixture;

    fn end_turn(player: &str) -> Command {
        EndTurn::new(PlayerId::new(player)).into()
    }

    #[test]
    fn fresh_turn_end_is_a_pass() {
        let mut fixture = Fixture::action_phase(&["p1", "p2", "p3"], vec![]);
        fixture.execute(end_turn("p1")).unwrap();

        assert!(fixture.player("p1").passed);
        let turn = fixture.state.current_turn.as_ref().unwrap();
        assert_eq!(turn.player.as_str(), "p2");
        assert_eq!(turn.actions_remaining, 2);
    }

    #[test]
    fn partial_turn_end_is_a_skip() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.state.current_turn = Some(TurnState::new(PlayerId::new("p1"), 1));
        fixture.execute(end_turn("p1")).unwrap();

        assert!(!fixture.player("p1").passed);
        assert_eq!(fixture.state.current_player().unwrap().as_str(), "p2");
    }

    #[test]
    fn last_active_player_gets_unlimited_actions() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.execute(end_turn("p1")).unwrap();

        let turn = fixture.state.current_turn.as_ref().unwrap();
        assert_eq!(turn.player.as_str(), "p2");
        assert_eq!(turn.actions_remaining, GameConfig::UNLIMITED_ACTIONS);
        assert_eq!(fixture.state.generation, 1);
    }

    #[test]
    fn ending_a_turn_moves_no_resources() {
        let mut fixture = Fixture::action_phase(&["p1", "p2", "p3"], vec![]);
        fixture.player_mut("p1").resources.add(ResourceKind::Credits, 12);
        let before: Vec<_> = fixture.state.players.iter().map(|p| p.resources).collect();

        fixture.execute(end_turn("p1")).unwrap();

        let after: Vec<_> = fixture.state.players.iter().map(|p| p.resources).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn solo_pass_runs_production() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        fixture.player_mut("p1").production.add(ResourceKind::Credits, 3);

        fixture.execute(end_turn("p1")).unwrap();

        assert_eq!(fixture.state.generation, 2);
        assert_eq!(fixture.state.phase, GamePhase::Action);
        let player = fixture.player("p1");
        assert!(!player.passed);
        assert_eq!(player.resources.credits, 3 + 20);
        let turn = fixture.state.current_turn.as_ref().unwrap();
        assert_eq!(turn.actions_remaining, GameConfig::UNLIMITED_ACTIONS);
    }

    #[test]
    fn maxed_parameters_end_the_game_instead_of_production() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        fixture.state.global = GlobalParameters::maxed();

        let outcome = fixture.execute(end_turn("p1")).unwrap();

        assert_eq!(fixture.state.status, GameStatus::Completed);
        assert_eq!(fixture.state.generation, 1);
        assert!(outcome
            .events
            .iter()
            .any(|e| matches!(e, DomainEvent::GameEnded { .. })));
    }

    #[test]
    fn wrong_player_cannot_end_turn() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        let err = fixture.execute(end_turn("p2")).unwrap_err();
        assert!(matches!(
            err.rules_error(),
            Some(RulesError::NotYourTurn { .. })
        ));
    }

    #[test]
    fn placeable_pending_tile_blocks_end_turn() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.board.add_hex("a", vec![], 0);
        fixture.player_mut("p1").queue_tiles([TileKind::City], "test");

        let err = fixture.execute(end_turn("p1")).unwrap_err();
        assert!(matches!(err.rules_error(), Some(RulesError::InvalidState { .. })));
    }

    #[test]
    fn unplaceable_pending_tile_is_dropped() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.player_mut("p1").queue_tiles([TileKind::Ocean], "test");

        fixture.execute(end_turn("p1")).unwrap();
        assert!(!fixture.player("p1").has_pending_tiles());
    }
}
