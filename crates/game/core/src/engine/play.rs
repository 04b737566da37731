//! Playing project cards and invoking card actions.

use tracing::debug;

use super::transition::{Transition, TransitionContext, consume_action, require_action_turn};
use super::turns::advance_if_exhausted;
use crate::behavior::{
    BehaviorSource, LedgerSnapshot, ResolveOptions, apply_outputs, pay_inputs,
    resolve_card_behaviors, validate_card_behaviors, validate_inputs, validate_outputs,
};
use crate::card::Card;
use crate::env::GameEnv;
use crate::error::{Entity, RulesError};
use crate::events::DomainEvent;
use crate::modifier::{effective_cost, validate_requirements};
use crate::payment::{Payment, PaymentRates, PaymentRules};
use crate::state::{CardId, GameState, PlayedCard, PlayerId, PlayerState};
use crate::vp::VpGranter;

/// Plays a card from hand, paying its discounted cost.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayCard {
    pub player: PlayerId,
    pub card: CardId,
    pub payment: Payment,
    pub options: ResolveOptions,
}

impl PlayCard {
    pub fn new(player: PlayerId, card: CardId, payment: Payment) -> Self {
        Self {
            player,
            card,
            payment,
            options: ResolveOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }
}

/// Trims the declared payment to `cost` and checks it against the player's
/// holdings.
pub(super) fn settle_payment(
    player: &PlayerState,
    cost: i32,
    rules: PaymentRules,
    declared: &Payment,
) -> Result<Payment, RulesError> {
    let rates = PaymentRates::for_player(player);

    let payment = declared.adjusted_to_effective_cost(cost, rules, &rates);
    payment.covers_cost(cost, rules, &rates)?;
    payment.can_afford(&player.resources)?;
    Ok(payment)
}

fn settle_card_payment(
    player: &PlayerState,
    card: &Card,
    declared: &Payment,
) -> Result<Payment, RulesError> {
    settle_payment(
        player,
        effective_cost(player, card),
        PaymentRules::for_card(card),
        declared,
    )
}

impl Transition for PlayCard {
    fn pre_validate(&self, state: &GameState, env: GameEnv<'_>) -> Result<(), RulesError> {
        let player = require_action_turn(state, &self.player)?;
        if !player.has_in_hand(&self.card) {
            return Err(RulesError::not_found(Entity::Card, &self.card));
        }
        let card = env.card(&self.card)?;
        if card.is_corporation() {
            return Err(RulesError::invalid_target(format!(
                "{} can only be selected as a corporation",
                card.name
            )));
        }
        validate_requirements(card, state, player, env.board())?;

        let payment = settle_card_payment(player, card, &self.payment)?;
        let mut available = player.resources;
        for (kind, amount) in payment.as_resources().iter() {
            available.add(kind, -amount);
        }
        validate_card_behaviors(state, env, &self.player, card, &self.options, available)
    }

    fn apply(&self, ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
        let card = ctx.env.card(&self.card)?;
        let snapshot = LedgerSnapshot::capture(ctx.state);

        let player = ctx.state.require_player_mut(&self.player)?;
        let payment = settle_card_payment(player, card, &self.payment)?;
        player.remove_from_hand(&self.card);
        player.played_cards.push(PlayedCard::from_card(card));
        if let Some(storage) = card.storage {
            player.storage.insert(card.id.clone(), storage.starting);
        }
        for (kind, amount) in payment.as_resources().iter() {
            player.resources.add(kind, -amount);
        }

        let source = BehaviorSource::new(self.player.clone(), card.id.clone(), card.name.clone());
        resolve_card_behaviors(ctx.state, ctx.env, &source, card, &self.options, &mut ctx.log)?;

        if let Some(granter) = VpGranter::from_card(card) {
            ctx.state.require_player_mut(&self.player)?.vp_granters.add(granter);
        }
        consume_action(ctx.state);

        snapshot.finish(ctx.state, &self.player, &mut ctx.log.events);
        ctx.emit(DomainEvent::CardPlayed {
            player: self.player.clone(),
            card: card.id.clone(),
            kind: card.kind,
            tags: card.tags.clone(),
        });
        ctx.describe(format!(
            "{} played {} for {} credit(s)",
            self.player,
            card.name,
            payment.credits
        ));
        advance_if_exhausted(ctx)
    }
}

/// Invokes a manual behavior registered by a played card.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UseCardAction {
    pub player: PlayerId,
    pub card: CardId,
    pub behavior_index: usize,
    pub options: ResolveOptions,
}

impl UseCardAction {
    pub fn new(player: PlayerId, card: CardId, behavior_index: usize) -> Self {
        Self {
            player,
            card,
            behavior_index,
            options: ResolveOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    fn action_id(&self) -> String {
        format!("{}#{}", self.card, self.behavior_index)
    }
}

impl Transition for UseCardAction {
    fn pre_validate(&self, state: &GameState, env: GameEnv<'_>) -> Result<(), RulesError> {
        let player = require_action_turn(state, &self.player)?;
        let action = player
            .find_action(&self.card, self.behavior_index)
            .ok_or_else(|| RulesError::not_found(Entity::CardAction, self.action_id()))?;

        let behavior = &action.behavior;
        let choice = behavior.choice(self.options.choice_index)?;
        let source = BehaviorSource::new(
            self.player.clone(),
            action.card.clone(),
            action.card_name.clone(),
        );
        let available = validate_inputs(
            state,
            &source,
            &behavior.effective_inputs(choice),
            player.resources,
        )?;
        validate_outputs(
            state,
            env,
            &source,
            &behavior.effective_outputs(choice),
            &self.options,
            available,
        )
    }

    fn apply(&self, ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
        let action = ctx
            .state
            .require_player(&self.player)?
            .find_action(&self.card, self.behavior_index)
            .cloned()
            .ok_or_else(|| RulesError::not_found(Entity::CardAction, self.action_id()))?;
        let behavior = &action.behavior;
        let choice = behavior.choice(self.options.choice_index)?;
        let source = BehaviorSource::new(
            self.player.clone(),
            action.card.clone(),
            action.card_name.clone(),
        );

        let snapshot = LedgerSnapshot::capture(ctx.state);
        pay_inputs(ctx.state, &source, &behavior.effective_inputs(choice))?;
        apply_outputs(
            ctx.state,
            ctx.env,
            &source,
            &behavior.effective_outputs(choice),
            &self.options,
            &mut ctx.log,
        )?;

        if let Some(used) = ctx
            .state
            .require_player_mut(&self.player)?
            .find_action_mut(&self.card, self.behavior_index)
        {
            used.times_used_this_turn += 1;
            used.times_used_this_generation += 1;
            debug!(
                target: "terra::engine",
                player = %self.player,
                card = %self.card,
                generation_uses = used.times_used_this_generation,
                "card action used"
            );
        }
        consume_action(ctx.state);

        snapshot.finish(ctx.state, &self.player, &mut ctx.log.events);
        ctx.emit(DomainEvent::CardActionUsed {
            player: self.player.clone(),
            card: self.card.clone(),
            behavior_index: self.behavior_index,
        });
        ctx.describe(format!("{} used {}", self.player, action.card_name));
        advance_if_exhausted(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{
        Card, CardBehavior, CardKind, Input, Output, Requirement, RequirementKind, Selector, Tag,
    };
    use crate::state::{CardEffect, GlobalParameter, ResourceKind};
    use crate::testing::Fixture;

    fn p1() -> PlayerId {
        PlayerId::new("p1")
    }

    fn fixture_with(card: Card) -> Fixture {
        let id = card.id.clone();
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![card]);
        fixture.player_mut("p1").hand.push(id);
        fixture
    }

    fn play(card: &str, payment: Payment) -> crate::engine::Command {
        PlayCard::new(p1(), CardId::new(card), payment).into()
    }

    #[test]
    fn playing_a_card_pays_and_applies_it() {
        let card = Card::new("mine", "Mine", CardKind::Automated, 12)
            .with_tags([Tag::Building])
            .with_behavior(CardBehavior::auto(vec![Output::production(
                ResourceKind::Steel,
                1,
            )]));
        let mut fixture = fixture_with(card);
        fixture.player_mut("p1").resources.credits = 40;

        let outcome = fixture.execute(play("mine", Payment::credits(12))).unwrap();

        let player = fixture.player("p1");
        assert_eq!(player.resources.credits, 28);
        assert_eq!(player.production.steel, 1);
        assert!(player.hand.is_empty());
        assert!(player.has_played(&CardId::new("mine")));
        assert_eq!(fixture.state.current_turn.as_ref().unwrap().actions_remaining, 1);
        assert!(outcome
            .events
            .iter()
            .any(|e| matches!(e, DomainEvent::CardPlayed { .. })));
    }

    #[test]
    fn overpayment_is_trimmed_to_the_cost() {
        let card = Card::new("cheap", "Cheap", CardKind::Event, 5);
        let mut fixture = fixture_with(card);
        fixture.player_mut("p1").resources.credits = 20;

        fixture.execute(play("cheap", Payment::credits(20))).unwrap();
        assert_eq!(fixture.player("p1").resources.credits, 15);
    }

    #[test]
    fn discounts_lower_what_must_be_paid() {
        let card = Card::new("satellite", "Satellite", CardKind::Automated, 10).with_tags([Tag::Space]);
        let mut fixture = fixture_with(card);
        let player = fixture.player_mut("p1");
        player.resources.credits = 30;
        player.effects.push(CardEffect {
            card: CardId::new("shuttles"),
            card_name: "Shuttles".into(),
            behavior_index: 0,
            behavior: CardBehavior::auto(vec![Output::Discount {
                amount: 4,
                selector: Selector::tags([Tag::Space]),
            }]),
        });

        let err = fixture.execute(play("satellite", Payment::credits(5))).unwrap_err();
        assert_eq!(
            err.rules_error(),
            Some(&RulesError::PaymentInsufficient {
                cost: 6,
                provided: 5
            })
        );

        fixture.execute(play("satellite", Payment::credits(6))).unwrap();
        assert_eq!(fixture.player("p1").resources.credits, 24);
    }

    #[test]
    fn steel_is_rejected_for_non_building_cards() {
        let card = Card::new("satellite", "Satellite", CardKind::Automated, 10).with_tags([Tag::Space]);
        let mut fixture = fixture_with(card);
        let player = fixture.player_mut("p1");
        player.resources.credits = 10;
        player.resources.steel = 5;

        let err = fixture
            .execute(play("satellite", Payment::credits(0).with_steel(5)))
            .unwrap_err();
        assert!(matches!(
            err.rules_error(),
            Some(RulesError::CurrencyNotAccepted { .. })
        ));
    }

    #[test]
    fn unmet_requirement_leaves_state_untouched() {
        let card = Card::new("trees", "Trees", CardKind::Automated, 8)
            .with_requirement(Requirement::min(RequirementKind::Temperature, -4));
        let mut fixture = fixture_with(card);
        fixture.player_mut("p1").resources.credits = 20;
        let before = fixture.state.clone();

        let err = fixture.execute(play("trees", Payment::credits(8))).unwrap_err();
        assert!(matches!(
            err.rules_error(),
            Some(RulesError::RequirementNotMet { .. })
        ));
        assert_eq!(fixture.state, before);
    }

    #[test]
    fn card_not_in_hand_is_rejected() {
        let card = Card::new("mine", "Mine", CardKind::Automated, 4);
        let mut fixture = Fixture::action_phase(&["p1"], vec![card]);
        let err = fixture.execute(play("mine", Payment::credits(4))).unwrap_err();
        assert!(matches!(err.rules_error(), Some(RulesError::NotFound { .. })));
    }

    #[test]
    fn second_action_ends_the_turn() {
        let a = Card::new("a", "A", CardKind::Event, 0);
        let b = Card::new("b", "B", CardKind::Event, 0);
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![a, b]);
        fixture.player_mut("p1").hand = vec![CardId::new("a"), CardId::new("b")];

        fixture.execute(play("a", Payment::default())).unwrap();
        fixture.execute(play("b", Payment::default())).unwrap();

        let turn = fixture.state.current_turn.as_ref().unwrap();
        assert_eq!(turn.player.as_str(), "p2");
        assert_eq!(turn.actions_remaining, 2);
    }

    #[test]
    fn card_action_pays_inputs_and_counts_uses() {
        let card = Card::new("pump", "Pump", CardKind::Active, 0).with_behavior(
            CardBehavior::manual(
                vec![Input::Resource {
                    kind: ResourceKind::Energy,
                    amount: 2,
                }],
                vec![Output::GlobalParameter {
                    parameter: GlobalParameter::Temperature,
                    steps: 1,
                }],
            ),
        );
        let mut fixture = fixture_with(card);
        fixture.execute(play("pump", Payment::default())).unwrap();
        fixture.player_mut("p1").resources.energy = 3;

        fixture
            .execute(UseCardAction::new(p1(), CardId::new("pump"), 0).into())
            .unwrap();

        let player = fixture.player("p1");
        assert_eq!(player.resources.energy, 1);
        assert_eq!(player.terraform_rating, 21);
        let action = player.find_action(&CardId::new("pump"), 0).unwrap();
        assert_eq!(action.times_used_this_generation, 1);
        assert_eq!(fixture.state.global.temperature, -28);
    }

    #[test]
    fn card_action_without_inputs_is_rejected() {
        let card = Card::new("pump", "Pump", CardKind::Active, 0).with_behavior(
            CardBehavior::manual(
                vec![Input::Resource {
                    kind: ResourceKind::Energy,
                    amount: 2,
                }],
                vec![Output::resource(ResourceKind::Heat, 4)],
            ),
        );
        let mut fixture = fixture_with(card);
        fixture.execute(play("pump", Payment::default())).unwrap();

        let err = fixture
            .execute(UseCardAction::new(p1(), CardId::new("pump"), 0).into())
            .unwrap_err();
        assert!(matches!(
            err.rules_error(),
            Some(RulesError::InsufficientResource { needed: 2, available: 0, .. })
        ));
    }

    #[test]
    fn unknown_card_action_is_not_found() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        let err = fixture
            .execute(UseCardAction::new(p1(), CardId::new("none"), 3).into())
            .unwrap_err();
        assert_eq!(
            err.rules_error(),
            Some(&RulesError::not_found(Entity::CardAction, "none#3"))
        );
    }

    #[test]
    fn rejected_play_draws_nothing_from_the_deck() {
        let card = Card::new("reactor", "Reactor", CardKind::Automated, 0)
            .with_behavior(CardBehavior::auto(vec![
                Output::CardDraw { count: 2 },
                Output::production(ResourceKind::Energy, -1),
            ]))
            .with_behavior(CardBehavior::auto(vec![Output::production(
                ResourceKind::Energy,
                -1,
            )]));
        let mut fixture = fixture_with(card).with_deck(&["d1", "d2", "d3"], &[]);
        fixture.player_mut("p1").production.energy = 1;
        let before = fixture.state.clone();

        let err = fixture.execute(play("reactor", Payment::default())).unwrap_err();

        assert_eq!(err.phase(), Some(crate::engine::TransitionPhase::PreValidate));
        assert_eq!(err.kind(), Some(crate::error::ErrorKind::InsufficientResource));
        assert_eq!(fixture.state, before);
        assert_eq!(
            fixture.deck.remaining_projects(),
            vec![CardId::new("d1"), CardId::new("d2"), CardId::new("d3")]
        );
    }
}
