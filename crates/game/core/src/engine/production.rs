//! Generation rollover: production, card draw and the purchase of drawn cards.
//!
//! Production moves the game to `production_and_card_draw`. The action phase
//! only resumes once every player has confirmed which drawn cards they buy,
//! so nobody can act on a new generation before settling their draws.

use std::collections::BTreeSet;

use tracing::info;

use super::transition::{Transition, TransitionContext};
use super::turns::start_first_turn;
use crate::behavior::LedgerSnapshot;
use crate::config::GameConfig;
use crate::env::GameEnv;
use crate::error::{Entity, RulesError};
use crate::events::DomainEvent;
use crate::state::{
    CardId, GamePhase, GameState, GameStatus, PlayerId, ProductionSelection, ResourceKind,
    TurnState,
};

/// Runs the production step for every player and opens card confirmation.
pub(crate) fn run_production(ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
    let snapshot = LedgerSnapshot::capture(ctx.state);
    let draw = ctx.state.config.production_draw_count as usize;
    let order = ctx.state.turn_order.clone();

    for id in &order {
        let drawn = ctx.env.deck().draw_project_cards(draw);
        let player = ctx.state.require_player_mut(id)?;
        let before = player.resources;

        let converted = player.resources.energy;
        player.resources.heat += converted;
        player.resources.energy = 0;

        let income = player.production.credits + player.terraform_rating;
        player.resources.credits += income;
        for (kind, amount) in player.production.iter() {
            match kind {
                ResourceKind::Credits => {}
                ResourceKind::Energy => player.resources.energy = amount,
                other => {
                    player.resources.add(other, amount);
                }
            }
        }
        player.passed = false;

        player.production_selection = Some(ProductionSelection {
            selection_complete: drawn.is_empty(),
            available_cards: drawn,
            before,
            after: player.resources,
            energy_converted: converted,
            credits_income: income,
        });
    }

    if let Some(first) = order.first() {
        snapshot.finish(ctx.state, first, &mut ctx.log.events);
    }

    ctx.state.generation += 1;
    ctx.state.turn_order.rotate_left(1);
    let old_phase = ctx.state.phase;
    ctx.state.phase = GamePhase::ProductionAndCardDraw;
    if let Some(first) = ctx.state.turn_order.first().cloned() {
        let actions = GameConfig::fresh_turn_actions(ctx.state.player_count());
        ctx.state.current_turn = Some(TurnState::new(first, actions));
    }

    info!(
        target: "terra::engine",
        game_id = %ctx.state.id,
        generation = ctx.state.generation,
        "production step completed"
    );
    ctx.emit(DomainEvent::GenerationAdvanced {
        generation: ctx.state.generation,
    });
    ctx.emit(DomainEvent::GamePhaseChanged {
        old: old_phase,
        new: GamePhase::ProductionAndCardDraw,
    });

    if all_confirmed(ctx.state) {
        finish_production_phase(ctx)?;
    }
    Ok(())
}

fn all_confirmed(state: &GameState) -> bool {
    state.players.iter().all(|player| {
        player
            .production_selection
            .as_ref()
            .is_none_or(|selection| selection.selection_complete)
    })
}

/// Returns to the action phase with fresh counters.
fn finish_production_phase(ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
    for player in &mut ctx.state.players {
        player.reset_generation_counters();
        player.production_selection = None;
    }
    let old = ctx.state.phase;
    ctx.state.phase = GamePhase::Action;
    ctx.emit(DomainEvent::GamePhaseChanged {
        old,
        new: GamePhase::Action,
    });
    start_first_turn(ctx)
}

/// Buys a subset of the cards drawn during production.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfirmProductionCards {
    pub player: PlayerId,
    pub cards: Vec<CardId>,
}

impl ConfirmProductionCards {
    pub fn new(player: PlayerId, cards: Vec<CardId>) -> Self {
        Self { player, cards }
    }

    fn cost(&self, state: &GameState) -> i32 {
        self.cards.len() as i32 * state.config.card_buy_cost as i32
    }
}

impl Transition for ConfirmProductionCards {
    fn pre_validate(&self, state: &GameState, _env: GameEnv<'_>) -> Result<(), RulesError> {
        state.require_status(GameStatus::Active)?;
        state.require_phase(GamePhase::ProductionAndCardDraw)?;
        let player = state.require_player(&self.player)?;

        let Some(selection) = player.production_selection.as_ref() else {
            return Err(RulesError::invalid_state("no production cards to confirm"));
        };
        if selection.selection_complete {
            return Err(RulesError::invalid_state(
                "production cards already confirmed",
            ));
        }
        if let Some(card) = self
            .cards
            .iter()
            .find(|card| !selection.available_cards.contains(card))
        {
            return Err(RulesError::not_found(Entity::Card, card));
        }
        if self.cards.iter().collect::<BTreeSet<_>>().len() != self.cards.len() {
            return Err(RulesError::invalid_state("duplicate card selection"));
        }

        let cost = self.cost(state);
        if cost > player.resources.credits {
            return Err(RulesError::insufficient(
                ResourceKind::Credits,
                cost,
                player.resources.credits,
            ));
        }
        Ok(())
    }

    fn apply(&self, ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
        let cost = self.cost(ctx.state);
        let snapshot = LedgerSnapshot::capture(ctx.state);

        let player = ctx.state.require_player_mut(&self.player)?;
        player.resources.add(ResourceKind::Credits, -cost);
        player.hand.extend(self.cards.iter().cloned());
        if let Some(selection) = player.production_selection.as_mut() {
            selection.selection_complete = true;
        }

        snapshot.finish(ctx.state, &self.player, &mut ctx.log.events);
        if !self.cards.is_empty() {
            ctx.emit(DomainEvent::CardsAddedToHand {
                player: self.player.clone(),
                cards: self.cards.clone(),
            });
        }
        ctx.describe(format!(
            "{} bought {} production card(s)",
            self.player,
            self.cards.len()
        ));

        if all_confirmed(ctx.state) {
            finish_production_phase(ctx)?;
        }
        Ok(())
    }
}
