//! Milestones and awards.

use super::transition::{Transition, TransitionContext, consume_action, require_action_turn};
use super::turns::advance_if_exhausted;
use crate::behavior::LedgerSnapshot;
use crate::card::Tag;
use crate::config::GameConfig;
use crate::env::{BoardService, GameEnv};
use crate::error::{Bound, RulesError};
use crate::events::DomainEvent;
use crate::modifier::measure;
use crate::state::{
    Award, ClaimedMilestone, FundedAward, GameState, Milestone, PlayerId, PlayerState,
    ResourceKind, TileKind,
};

/// Claims a milestone whose threshold the player has reached.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClaimMilestone {
    pub player: PlayerId,
    pub milestone: Milestone,
}

impl ClaimMilestone {
    pub fn new(player: PlayerId, milestone: Milestone) -> Self {
        Self { player, milestone }
    }
}

impl Transition for ClaimMilestone {
    fn pre_validate(&self, state: &GameState, env: GameEnv<'_>) -> Result<(), RulesError> {
        let player = require_action_turn(state, &self.player)?;
        if state
            .claimed_milestones
            .iter()
            .any(|claimed| claimed.milestone == self.milestone)
        {
            return Err(RulesError::invalid_state(format!(
                "milestone {} already claimed",
                self.milestone
            )));
        }
        if state.claimed_milestones.len() >= GameConfig::MAX_MILESTONES {
            return Err(RulesError::invalid_state("no milestones left to claim"));
        }
        if player.resources.credits < GameConfig::MILESTONE_COST {
            return Err(RulesError::insufficient(
                ResourceKind::Credits,
                GameConfig::MILESTONE_COST,
                player.resources.credits,
            ));
        }

        let requirement = self.milestone.requirement();
        let threshold = self.milestone.threshold() as i32;
        let current = measure(requirement, state, player, env.board());
        if current < threshold {
            return Err(RulesError::RequirementNotMet {
                requirement,
                bound: Bound::Min,
                threshold,
                current,
            });
        }
        Ok(())
    }

    fn apply(&self, ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
        let snapshot = LedgerSnapshot::capture(ctx.state);
        ctx.state
            .require_player_mut(&self.player)?
            .resources
            .add(ResourceKind::Credits, -GameConfig::MILESTONE_COST);
        ctx.state.claimed_milestones.push(ClaimedMilestone {
            milestone: self.milestone,
            player: self.player.clone(),
            generation: ctx.state.generation,
        });
        consume_action(ctx.state);

        snapshot.finish(ctx.state, &self.player, &mut ctx.log.events);
        ctx.emit(DomainEvent::MilestoneClaimed {
            player: self.player.clone(),
            milestone: self.milestone,
        });
        ctx.describe(format!("{} claimed {}", self.player, self.milestone));
        advance_if_exhausted(ctx)
    }
}

/// Funds an award; the price rises with each funded award.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FundAward {
    pub player: PlayerId,
    pub award: Award,
}

impl FundAward {
    pub fn new(player: PlayerId, award: Award) -> Self {
        Self { player, award }
    }
}

/// Price of the next award, or `None` once all are funded.
pub fn next_award_cost(state: &GameState) -> Option<i32> {
    GameConfig::AWARD_COSTS
        .get(state.funded_awards.len())
        .copied()
        .filter(|_| state.funded_awards.len() < GameConfig::MAX_AWARDS)
}

impl Transition for FundAward {
    fn pre_validate(&self, state: &GameState, _env: GameEnv<'_>) -> Result<(), RulesError> {
        let player = require_action_turn(state, &self.player)?;
        if state
            .funded_awards
            .iter()
            .any(|funded| funded.award == self.award)
        {
            return Err(RulesError::invalid_state(format!(
                "award {} already funded",
                self.award
            )));
        }
        let Some(cost) = next_award_cost(state) else {
            return Err(RulesError::invalid_state("no awards left to fund"));
        };
        if player.resources.credits < cost {
            return Err(RulesError::insufficient(
                ResourceKind::Credits,
                cost,
                player.resources.credits,
            ));
        }
        Ok(())
    }

    fn apply(&self, ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
        let cost = next_award_cost(ctx.state)
            .ok_or_else(|| RulesError::invalid_state("no awards left to fund"))?;
        let snapshot = LedgerSnapshot::capture(ctx.state);
        ctx.state
            .require_player_mut(&self.player)?
            .resources
            .add(ResourceKind::Credits, -cost);
        ctx.state.funded_awards.push(FundedAward {
            award: self.award,
            funder: self.player.clone(),
            generation: ctx.state.generation,
        });
        consume_action(ctx.state);

        snapshot.finish(ctx.state, &self.player, &mut ctx.log.events);
        ctx.emit(DomainEvent::AwardFunded {
            player: self.player.clone(),
            award: self.award,
        });
        ctx.describe(format!("{} funded {} for {cost}", self.player, self.award));
        advance_if_exhausted(ctx)
    }
}

/// The quantity an award ranks players by.
pub fn award_metric(award: Award, player: &PlayerState, board: &dyn BoardService) -> i32 {
    match award {
        Award::Landlord => {
            (board.tile_count(TileKind::City, Some(&player.id))
                + board.tile_count(TileKind::Greenery, Some(&player.id))) as i32
        }
        Award::Banker => player.production.credits,
        Award::Scientist => player.tag_count(Tag::Science) as i32,
        Award::Thermalist => player.resources.heat,
        Award::Miner => player.resources.steel + player.resources.titanium,
    }
}

/// Victory points `award` hands out at the end of the game.
///
/// Everyone tied for first gets the first-place points. Second place is only
/// paid when first place is not shared and more than two players compete.
pub fn award_points(
    award: Award,
    state: &GameState,
    board: &dyn BoardService,
) -> Vec<(PlayerId, i32)> {
    let metrics: Vec<(PlayerId, i32)> = state
        .players
        .iter()
        .map(|player| (player.id.clone(), award_metric(award, player, board)))
        .collect();
    let Some(best) = metrics.iter().map(|(_, metric)| *metric).max() else {
        return Vec::new();
    };

    let mut points: Vec<(PlayerId, i32)> = metrics
        .iter()
        .filter(|(_, metric)| *metric == best)
        .map(|(id, _)| (id.clone(), GameConfig::AWARD_FIRST_VP))
        .collect();

    if points.len() == 1 && metrics.len() > 2 {
        let second = metrics
            .iter()
            .map(|(_, metric)| *metric)
            .filter(|metric| *metric < best)
            .max();
        if let Some(second) = second {
            points.extend(
                metrics
                    .iter()
                    .filter(|(_, metric)| *metric == second)
                    .map(|(id, _)| (id.clone(), GameConfig::AWARD_SECOND_VP)),
            );
        }
    }
    points
}
