//! Standard projects and resource conversions.
//!
//! Paid projects go through the card payment path with credits-only rules.
//! Every project resolves its effect through the card output machinery.

use std::collections::BTreeSet;

use tracing::debug;

use super::play::settle_payment;
use super::transition::{Transition, TransitionContext, consume_action, require_action_turn};
use super::turns::advance_if_exhausted;
use crate::behavior::{
    BehaviorSource, LedgerSnapshot, ResolveOptions, apply_outputs, validate_outputs,
};
use crate::card::{Output, StandardProject};
use crate::config::GameConfig;
use crate::env::GameEnv;
use crate::error::{Entity, RulesError};
use crate::events::DomainEvent;
use crate::modifier::standard_project_discounts;
use crate::payment::{Payment, PaymentRules};
use crate::state::{
    CardId, GameState, GlobalParameter, PlayerId, PlayerState, ResourceKind, TileKind,
};

/// Printed credit price of a project bought with credits.
pub const fn standard_project_cost(project: StandardProject) -> Option<i32> {
    match project {
        StandardProject::PowerPlant => Some(GameConfig::POWER_PLANT_COST),
        StandardProject::Asteroid => Some(GameConfig::ASTEROID_COST),
        StandardProject::Aquifer => Some(GameConfig::AQUIFER_COST),
        StandardProject::Greenery => Some(GameConfig::GREENERY_COST),
        StandardProject::City => Some(GameConfig::CITY_COST),
        StandardProject::SellPatents
        | StandardProject::ConvertPlantsToGreenery
        | StandardProject::ConvertHeatToTemperature => None,
    }
}

/// Credit price after the player's project discounts, never below zero.
pub fn discounted_project_cost(player: &PlayerState, project: StandardProject) -> Option<i32> {
    let base = standard_project_cost(project)?;
    let discount = standard_project_discounts(player, project)
        .get(&ResourceKind::Credits)
        .copied()
        .unwrap_or(0);
    Some((base - discount).max(0))
}

/// Resource and amount a conversion consumes after discounts, never below one.
pub fn conversion_cost(
    player: &PlayerState,
    project: StandardProject,
) -> Option<(ResourceKind, i32)> {
    let (resource, base) = match project {
        StandardProject::ConvertPlantsToGreenery => {
            (ResourceKind::Plants, GameConfig::PLANTS_PER_GREENERY)
        }
        StandardProject::ConvertHeatToTemperature => {
            (ResourceKind::Heat, GameConfig::HEAT_PER_TEMPERATURE)
        }
        _ => return None,
    };
    let discount = standard_project_discounts(player, project)
        .get(&resource)
        .copied()
        .unwrap_or(0);
    Some((resource, (base - discount).max(1)))
}

fn project_outputs(project: StandardProject) -> Vec<Output> {
    let tile = |tile| Output::TilePlacement { tile, count: 1 };
    match project {
        StandardProject::PowerPlant => vec![Output::production(ResourceKind::Energy, 1)],
        StandardProject::Asteroid => vec![Output::GlobalParameter {
            parameter: GlobalParameter::Temperature,
            steps: 1,
        }],
        StandardProject::Aquifer => vec![tile(TileKind::Ocean)],
        StandardProject::Greenery | StandardProject::ConvertPlantsToGreenery => {
            vec![tile(TileKind::Greenery)]
        }
        StandardProject::City => vec![
            tile(TileKind::City),
            Output::production(ResourceKind::Credits, 1),
        ],
        StandardProject::ConvertHeatToTemperature => vec![Output::GlobalParameter {
            parameter: GlobalParameter::Temperature,
            steps: 1,
        }],
        StandardProject::SellPatents => Vec::new(),
    }
}

fn project_source(player: &PlayerId, project: StandardProject) -> BehaviorSource {
    BehaviorSource::new(player.clone(), CardId::new(project.as_ref()), project.as_ref())
}

/// Resolves the project's outputs and spends the action.
fn finish_project(
    ctx: &mut TransitionContext<'_>,
    player: &PlayerId,
    project: StandardProject,
) -> Result<(), RulesError> {
    let outputs = project_outputs(project);
    let refs: Vec<&Output> = outputs.iter().collect();
    apply_outputs(
        ctx.state,
        ctx.env,
        &project_source(player, project),
        &refs,
        &ResolveOptions::default(),
        &mut ctx.log,
    )?;
    consume_action(ctx.state);
    Ok(())
}

/// Sells cards from hand for credits.
///
/// Selling nothing is accepted and leaves the action unspent.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SellPatents {
    pub player: PlayerId,
    pub cards: Vec<CardId>,
}

impl SellPatents {
    pub fn new(player: PlayerId, cards: Vec<CardId>) -> Self {
        Self { player, cards }
    }
}

impl Transition for SellPatents {
    fn pre_validate(&self, state: &GameState, _env: GameEnv<'_>) -> Result<(), RulesError> {
        let player = require_action_turn(state, &self.player)?;
        let mut seen = BTreeSet::new();
        for card in &self.cards {
            if !seen.insert(card) {
                return Err(RulesError::invalid_target(format!("{card} listed twice")));
            }
            if !player.has_in_hand(card) {
                return Err(RulesError::not_found(Entity::Card, card));
            }
        }
        Ok(())
    }

    fn apply(&self, ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
        if self.cards.is_empty() {
            ctx.describe(format!("{} sold no patents", self.player));
            return Ok(());
        }

        let snapshot = LedgerSnapshot::capture(ctx.state);
        let player = ctx.state.require_player_mut(&self.player)?;
        for card in &self.cards {
            player.remove_from_hand(card);
        }
        let sold = self.cards.len() as i32;
        player
            .resources
            .add(ResourceKind::Credits, sold * GameConfig::PATENT_SALE_CREDITS);
        consume_action(ctx.state);

        snapshot.finish(ctx.state, &self.player, &mut ctx.log.events);
        ctx.emit(DomainEvent::StandardProjectUsed {
            player: self.player.clone(),
            project: StandardProject::SellPatents,
        });
        ctx.describe(format!("{} sold {sold} patent(s)", self.player));
        advance_if_exhausted(ctx)
    }
}

/// Buys one of the credit-priced standard projects.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BuyStandardProject {
    pub player: PlayerId,
    pub project: StandardProject,
    pub payment: Payment,
}

impl BuyStandardProject {
    pub fn new(player: PlayerId, project: StandardProject, payment: Payment) -> Self {
        Self {
            player,
            project,
            payment,
        }
    }

    fn cost(&self, player: &PlayerState) -> Result<i32, RulesError> {
        discounted_project_cost(player, self.project).ok_or_else(|| {
            RulesError::invalid_target(format!("{} is not bought with credits", self.project))
        })
    }
}

impl Transition for BuyStandardProject {
    fn pre_validate(&self, state: &GameState, env: GameEnv<'_>) -> Result<(), RulesError> {
        let player = require_action_turn(state, &self.player)?;
        let cost = self.cost(player)?;
        if self.project == StandardProject::Aquifer && state.global.is_maxed(GlobalParameter::Oceans)
        {
            return Err(RulesError::invalid_state("every ocean is already placed"));
        }

        let payment = settle_payment(player, cost, PaymentRules::credits_only(), &self.payment)?;
        let mut available = player.resources;
        for (kind, amount) in payment.as_resources().iter() {
            available.add(kind, -amount);
        }
        let outputs = project_outputs(self.project);
        let refs: Vec<&Output> = outputs.iter().collect();
        validate_outputs(
            state,
            env,
            &project_source(&self.player, self.project),
            &refs,
            &ResolveOptions::default(),
            available,
        )
    }

    fn apply(&self, ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
        let snapshot = LedgerSnapshot::capture(ctx.state);
        let player = ctx.state.require_player_mut(&self.player)?;
        let cost = self.cost(player)?;
        let payment = settle_payment(player, cost, PaymentRules::credits_only(), &self.payment)?;
        for (kind, amount) in payment.as_resources().iter() {
            player.resources.add(kind, -amount);
        }
        debug!(
            target: "terra::engine",
            player = %self.player,
            project = %self.project,
            cost,
            "standard project bought"
        );
        finish_project(ctx, &self.player, self.project)?;

        snapshot.finish(ctx.state, &self.player, &mut ctx.log.events);
        ctx.emit(DomainEvent::StandardProjectUsed {
            player: self.player.clone(),
            project: self.project,
        });
        ctx.describe(format!(
            "{} built {} for {} credit(s)",
            self.player, self.project, payment.credits
        ));
        advance_if_exhausted(ctx)
    }
}

fn require_conversion(
    state: &GameState,
    player: &PlayerId,
    project: StandardProject,
) -> Result<(ResourceKind, i32), RulesError> {
    let seated = require_action_turn(state, player)?;
    let (resource, cost) = conversion_cost(seated, project).ok_or_else(|| {
        RulesError::invalid_target(format!("{project} is not a resource conversion"))
    })?;
    let held = seated.resources.get(resource);
    if held < cost {
        return Err(RulesError::insufficient(resource, cost, held));
    }
    Ok((resource, cost))
}

fn apply_conversion(
    ctx: &mut TransitionContext<'_>,
    player: &PlayerId,
    project: StandardProject,
) -> Result<(), RulesError> {
    let snapshot = LedgerSnapshot::capture(ctx.state);
    let seated = ctx.state.require_player_mut(player)?;
    let (resource, cost) = conversion_cost(seated, project).ok_or_else(|| {
        RulesError::invalid_target(format!("{project} is not a resource conversion"))
    })?;
    seated.resources.add(resource, -cost);
    finish_project(ctx, player, project)?;

    snapshot.finish(ctx.state, player, &mut ctx.log.events);
    ctx.emit(DomainEvent::StandardProjectUsed {
        player: player.clone(),
        project,
    });
    ctx.describe(format!("{player} converted {cost} {resource}"));
    advance_if_exhausted(ctx)
}

/// Spends plants for a greenery tile; oxygen and TR follow on placement.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvertPlantsToGreenery {
    pub player: PlayerId,
}

impl ConvertPlantsToGreenery {
    pub fn new(player: PlayerId) -> Self {
        Self { player }
    }
}

impl Transition for ConvertPlantsToGreenery {
    fn pre_validate(&self, state: &GameState, _env: GameEnv<'_>) -> Result<(), RulesError> {
        require_conversion(state, &self.player, StandardProject::ConvertPlantsToGreenery)
            .map(|_| ())
    }

    fn apply(&self, ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
        apply_conversion(ctx, &self.player, StandardProject::ConvertPlantsToGreenery)
    }
}

/// Spends heat to raise the temperature one step.
///
/// Allowed at maximum temperature; the heat is spent without a TR gain.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConvertHeatToTemperature {
    pub player: PlayerId,
}

impl ConvertHeatToTemperature {
    pub fn new(player: PlayerId) -> Self {
        Self { player }
    }
}

impl Transition for ConvertHeatToTemperature {
    fn pre_validate(&self, state: &GameState, _env: GameEnv<'_>) -> Result<(), RulesError> {
        require_conversion(state, &self.player, StandardProject::ConvertHeatToTemperature)
            .map(|_| ())
    }

    fn apply(&self, ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
        apply_conversion(ctx, &self.player, StandardProject::ConvertHeatToTemperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardBehavior, Selector};
    use crate::engine::TransitionPhase;
    use crate::events::EventKind;
    use crate::state::{CardEffect, SourceKind};
    use crate::testing::Fixture;

    fn p1() -> PlayerId {
        PlayerId::new("p1")
    }

    fn with_discount(fixture: &mut Fixture, amount: i32, selector: Selector) {
        fixture.player_mut("p1").effects.push(CardEffect {
            card: CardId::new("fx"),
            card_name: "Effects".into(),
            behavior_index: 0,
            behavior: CardBehavior::auto(vec![Output::Discount { amount, selector }]),
        });
    }

    fn actions_left(fixture: &Fixture) -> i32 {
        fixture.state.current_turn.as_ref().unwrap().actions_remaining
    }

    fn buy(project: StandardProject, credits: i32) -> BuyStandardProject {
        BuyStandardProject::new(p1(), project, Payment::credits(credits))
    }

    #[test]
    fn power_plant_buys_energy_production() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.player_mut("p1").resources.credits = 20;

        let outcome = fixture
            .execute(buy(StandardProject::PowerPlant, 11).into())
            .unwrap();

        let player = fixture.player("p1");
        assert_eq!(player.resources.credits, 9);
        assert_eq!(player.production.energy, 1);
        assert_eq!(actions_left(&fixture), 1);
        assert_eq!(outcome.source_kind, SourceKind::StandardProject);
        assert_eq!(outcome.source, "power-plant");
        assert!(outcome.events.iter().any(|event| event.kind() == EventKind::StandardProjectUsed));
    }

    #[test]
    fn credit_discount_lowers_the_project_price() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.player_mut("p1").resources.credits = 30;
        with_discount(
            &mut fixture,
            3,
            Selector::standard_project(StandardProject::City, vec![]),
        );

        fixture.execute(buy(StandardProject::City, 25).into()).unwrap();

        let player = fixture.player("p1");
        assert_eq!(player.resources.credits, 8);
        assert_eq!(player.production.credits, 1);
        let queue = player.pending_tiles.as_ref().unwrap();
        assert_eq!(queue.front(), Some(TileKind::City));
        assert_eq!(queue.source, "city");
    }

    #[test]
    fn discount_for_another_project_does_not_apply() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.player_mut("p1").resources.credits = 30;
        with_discount(
            &mut fixture,
            3,
            Selector::standard_project(StandardProject::Greenery, vec![]),
        );

        let err = fixture
            .execute(buy(StandardProject::City, 22).into())
            .unwrap_err();
        assert_eq!(
            err.rules_error(),
            Some(&RulesError::PaymentInsufficient {
                cost: 25,
                provided: 22
            })
        );
    }

    #[test]
    fn short_payment_leaves_the_state_alone() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.player_mut("p1").resources.credits = 13;
        let before = fixture.state.clone();

        let err = fixture
            .execute(buy(StandardProject::Asteroid, 13).into())
            .unwrap_err();
        assert_eq!(err.phase(), Some(TransitionPhase::PreValidate));
        assert_eq!(fixture.state, before);
    }

    #[test]
    fn asteroid_raises_temperature_and_rating() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.player_mut("p1").resources.credits = 14;

        fixture
            .execute(buy(StandardProject::Asteroid, 14).into())
            .unwrap();

        assert_eq!(fixture.state.global.temperature, GameConfig::MIN_TEMPERATURE + 2);
        assert_eq!(fixture.player("p1").terraform_rating, 21);
    }

    #[test]
    fn aquifer_needs_an_open_ocean() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.player_mut("p1").resources.credits = 18;
        fixture.state.global.oceans = GameConfig::MAX_OCEANS;

        let err = fixture
            .execute(buy(StandardProject::Aquifer, 18).into())
            .unwrap_err();
        assert!(matches!(err.rules_error(), Some(RulesError::InvalidState { .. })));
    }

    #[test]
    fn conversions_are_not_bought_with_credits() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.player_mut("p1").resources.credits = 30;

        let err = fixture
            .execute(buy(StandardProject::ConvertHeatToTemperature, 8).into())
            .unwrap_err();
        assert!(matches!(err.rules_error(), Some(RulesError::InvalidTarget { .. })));
    }

    #[test]
    fn sold_patents_pay_one_credit_each() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        let player = fixture.player_mut("p1");
        player.hand = vec![CardId::new("a"), CardId::new("b"), CardId::new("c")];

        let outcome = fixture
            .execute(SellPatents::new(p1(), vec![CardId::new("a"), CardId::new("c")]).into())
            .unwrap();

        let player = fixture.player("p1");
        assert_eq!(player.resources.credits, 2);
        assert_eq!(player.hand, vec![CardId::new("b")]);
        assert_eq!(actions_left(&fixture), 1);
        assert_eq!(outcome.source_kind, SourceKind::StandardProject);
    }

    #[test]
    fn selling_nothing_keeps_the_action() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);

        fixture.execute(SellPatents::new(p1(), vec![]).into()).unwrap();
        assert_eq!(actions_left(&fixture), 2);
    }

    #[test]
    fn patents_must_be_distinct_cards_in_hand() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.player_mut("p1").hand = vec![CardId::new("a")];

        let twice = SellPatents::new(p1(), vec![CardId::new("a"), CardId::new("a")]);
        let err = fixture.execute(twice.into()).unwrap_err();
        assert!(matches!(err.rules_error(), Some(RulesError::InvalidTarget { .. })));

        let missing = SellPatents::new(p1(), vec![CardId::new("z")]);
        let err = fixture.execute(missing.into()).unwrap_err();
        assert!(matches!(err.rules_error(), Some(RulesError::NotFound { .. })));
    }

    #[test]
    fn plants_convert_into_a_queued_greenery() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.player_mut("p1").resources.add(ResourceKind::Plants, 9);

        let outcome = fixture
            .execute(ConvertPlantsToGreenery::new(p1()).into())
            .unwrap();

        let player = fixture.player("p1");
        assert_eq!(player.resources.plants, 1);
        let queue = player.pending_tiles.as_ref().unwrap();
        assert_eq!(queue.front(), Some(TileKind::Greenery));
        assert_eq!(queue.source, "convert-plants-to-greenery");
        assert_eq!(outcome.source_kind, SourceKind::ResourceConversion);
        assert_eq!(fixture.state.global.oxygen, GameConfig::MIN_OXYGEN);
    }

    #[test]
    fn plant_discount_stops_at_one_plant() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.player_mut("p1").resources.add(ResourceKind::Plants, 2);
        with_discount(
            &mut fixture,
            10,
            Selector::standard_project(
                StandardProject::ConvertPlantsToGreenery,
                vec![ResourceKind::Plants],
            ),
        );

        fixture
            .execute(ConvertPlantsToGreenery::new(p1()).into())
            .unwrap();
        assert_eq!(fixture.player("p1").resources.plants, 1);
    }

    #[test]
    fn heat_raises_temperature() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.player_mut("p1").resources.add(ResourceKind::Heat, 8);

        fixture
            .execute(ConvertHeatToTemperature::new(p1()).into())
            .unwrap();

        assert_eq!(fixture.player("p1").resources.heat, 0);
        assert_eq!(fixture.player("p1").terraform_rating, 21);
        assert_eq!(fixture.state.global.temperature, GameConfig::MIN_TEMPERATURE + 2);
    }

    #[test]
    fn short_heat_is_rejected() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.player_mut("p1").resources.add(ResourceKind::Heat, 7);

        let err = fixture
            .execute(ConvertHeatToTemperature::new(p1()).into())
            .unwrap_err();
        assert_eq!(
            err.rules_error(),
            Some(&RulesError::insufficient(ResourceKind::Heat, 8, 7))
        );
    }
}
