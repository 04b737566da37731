//! End-game scoring.

use std::collections::BTreeMap;

use tracing::info;

use super::awards::award_points;
use super::transition::TransitionContext;
use crate::config::GameConfig;
use crate::env::BoardService;
use crate::error::RulesError;
use crate::events::DomainEvent;
use crate::state::{
    FinalScores, GamePhase, GameState, GameStatus, PlayerId, PlayerScore, VpBreakdown,
};
use crate::vp::recalculate_player_vp;

/// Scores every player and completes the game. Runs at most once.
pub(crate) fn run_final_scoring(ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
    if ctx.state.final_scores.is_some() {
        return Ok(());
    }
    let board = ctx.env.board();
    let order = ctx.state.turn_order.clone();
    for id in &order {
        if let Some((old, new)) = recalculate_player_vp(ctx.state, board, id) {
            ctx.emit(DomainEvent::VictoryPointsChanged {
                player: id.clone(),
                old,
                new,
            });
        }
    }

    let scores = compute_final_scores(ctx.state, board);
    let winners: Vec<PlayerId> = scores.winners().map(|s| s.player.clone()).collect();
    let is_tie = scores.is_tie;
    info!(
        target: "terra::engine",
        game_id = %ctx.state.id,
        generation = ctx.state.generation,
        winners = ?winners,
        is_tie,
        "game completed"
    );

    ctx.state.final_scores = Some(scores);
    let old_status = ctx.state.status;
    let old_phase = ctx.state.phase;
    ctx.state.status = GameStatus::Completed;
    ctx.state.phase = GamePhase::Complete;
    ctx.state.current_turn = None;

    ctx.emit(DomainEvent::GameStatusChanged {
        old: old_status,
        new: GameStatus::Completed,
    });
    ctx.emit(DomainEvent::GamePhaseChanged {
        old: old_phase,
        new: GamePhase::Complete,
    });
    ctx.emit(DomainEvent::GameEnded { winners, is_tie });
    ctx.describe("final scoring");
    Ok(())
}

/// Ranks players by total VP, then by credits held.
///
/// Players equal on both share a placement. Card VP is read from the cached
/// granter totals, so callers refresh them first.
pub fn compute_final_scores(state: &GameState, board: &dyn BoardService) -> FinalScores {
    let mut award_vp: BTreeMap<PlayerId, i32> = BTreeMap::new();
    for funded in &state.funded_awards {
        for (player, points) in award_points(funded.award, state, board) {
            *award_vp.entry(player).or_insert(0) += points;
        }
    }

    let mut scores: Vec<PlayerScore> = state
        .turn_order
        .iter()
        .filter_map(|id| state.player(id))
        .map(|player| {
            let breakdown = VpBreakdown {
                terraform_rating: player.terraform_rating,
                card_vp: player.vp_granters.total_computed_vp(),
                milestone_vp: state.milestones_claimed_by(&player.id) as i32
                    * GameConfig::MILESTONE_VP,
                award_vp: award_vp.get(&player.id).copied().unwrap_or(0),
                greenery_vp: board.greenery_vp(&player.id),
                city_vp: board.city_vp(&player.id),
            };
            PlayerScore {
                player: player.id.clone(),
                total_vp: breakdown.total(),
                breakdown,
                credits: player.resources.credits,
                placement: 0,
                is_winner: false,
            }
        })
        .collect();

    scores.sort_by(|a, b| (b.total_vp, b.credits).cmp(&(a.total_vp, a.credits)));

    let mut placement = 0;
    let mut previous: Option<(i32, i32)> = None;
    for (index, score) in scores.iter_mut().enumerate() {
        let key = (score.total_vp, score.credits);
        if previous != Some(key) {
            placement = index as u32 + 1;
            previous = Some(key);
        }
        score.placement = placement;
        score.is_winner = placement == 1;
    }

    let is_tie = matches!(
        scores.as_slice(),
        [first, second, ..] if first.total_vp == second.total_vp && first.credits == second.credits
    );
    FinalScores { scores, is_tie }
}
