//! Game start, starting-card selection and corporation selection.

use std::collections::BTreeSet;

use tracing::info;

use super::transition::{Transition, TransitionContext};
use super::turns::start_first_turn;
use crate::behavior::{
    BehaviorSource, LedgerSnapshot, ResolveOptions, resolve_card_behaviors,
    validate_card_behaviors,
};
use crate::config::GameConfig;
use crate::env::GameEnv;
use crate::error::{Entity, RulesError};
use crate::events::DomainEvent;
use crate::state::{
    CardId, GamePhase, GameState, GameStatus, PlayedCard, PlayerId, ResourceKind, ResourceSet,
    StartingSelection,
};
use crate::vp::VpGranter;

/// Moves a lobby to the starting-card selection and deals the offers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StartGame;

impl Transition for StartGame {
    fn pre_validate(&self, state: &GameState, _env: GameEnv<'_>) -> Result<(), RulesError> {
        state.require_status(GameStatus::Lobby)?;
        if state.player_count() < GameConfig::MIN_PLAYERS {
            return Err(RulesError::invalid_state("not enough players to start"));
        }
        Ok(())
    }

    fn apply(&self, ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
        let cards = ctx.state.config.starting_card_offer as usize;
        let corporations = ctx.state.config.corporation_offer as usize;
        let order = ctx.state.turn_order.clone();

        for id in &order {
            let offered_cards = ctx.env.deck().draw_project_cards(cards);
            let offered_corporations = ctx.env.deck().draw_corporations(corporations);
            ctx.state.require_player_mut(id)?.starting_selection =
                Some(StartingSelection::new(offered_cards, offered_corporations));
        }

        ctx.state.status = GameStatus::Active;
        let old_phase = ctx.state.phase;
        ctx.state.phase = GamePhase::StartingCardSelection;
        info!(
            target: "terra::engine",
            game_id = %ctx.state.id,
            players = order.len(),
            "game started"
        );
        ctx.emit(DomainEvent::GameStatusChanged {
            old: GameStatus::Lobby,
            new: GameStatus::Active,
        });
        ctx.emit(DomainEvent::GamePhaseChanged {
            old: old_phase,
            new: GamePhase::StartingCardSelection,
        });
        ctx.describe("game started");
        Ok(())
    }
}

/// Chooses which offered project cards a player keeps.
///
/// Kept cards are paid for when the corporation is selected.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectStartingCards {
    pub player: PlayerId,
    pub cards: Vec<CardId>,
}

impl SelectStartingCards {
    pub fn new(player: PlayerId, cards: Vec<CardId>) -> Self {
        Self { player, cards }
    }
}

impl Transition for SelectStartingCards {
    fn pre_validate(&self, state: &GameState, _env: GameEnv<'_>) -> Result<(), RulesError> {
        state.require_status(GameStatus::Active)?;
        state.require_phase(GamePhase::StartingCardSelection)?;
        let player = state.require_player(&self.player)?;
        let Some(selection) = player.starting_selection.as_ref() else {
            return Err(RulesError::invalid_state("no starting offer"));
        };
        if selection.cards_chosen() {
            return Err(RulesError::invalid_state("starting cards already chosen"));
        }
        if let Some(card) = self
            .cards
            .iter()
            .find(|card| !selection.offered_cards.contains(card))
        {
            return Err(RulesError::not_found(Entity::Card, card));
        }
        if self.cards.iter().collect::<BTreeSet<_>>().len() != self.cards.len() {
            return Err(RulesError::invalid_state("duplicate card selection"));
        }
        Ok(())
    }

    fn apply(&self, ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
        let player = ctx.state.require_player_mut(&self.player)?;
        if let Some(selection) = player.starting_selection.as_mut() {
            selection.kept_cards = Some(self.cards.clone());
        }
        ctx.describe(format!(
            "{} kept {} starting card(s)",
            self.player,
            self.cards.len()
        ));

        let everyone_chose = ctx.state.players.iter().all(|p| {
            p.starting_selection
                .as_ref()
                .is_some_and(StartingSelection::cards_chosen)
        });
        if everyone_chose {
            ctx.state.phase = GamePhase::CorporationSelection;
            ctx.emit(DomainEvent::GamePhaseChanged {
                old: GamePhase::StartingCardSelection,
                new: GamePhase::CorporationSelection,
            });
        }
        Ok(())
    }
}

/// Picks a corporation, resolves it and pays for the kept starting cards.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectCorporation {
    pub player: PlayerId,
    pub corporation: CardId,
    pub options: ResolveOptions,
}

impl SelectCorporation {
    pub fn new(player: PlayerId, corporation: CardId) -> Self {
        Self {
            player,
            corporation,
            options: ResolveOptions::default(),
        }
    }

    fn kept_cards<'s>(&self, state: &'s GameState) -> Result<&'s [CardId], RulesError> {
        state
            .require_player(&self.player)?
            .starting_selection
            .as_ref()
            .and_then(|selection| selection.kept_cards.as_deref())
            .ok_or_else(|| RulesError::invalid_state("starting cards not chosen"))
    }
}

impl Transition for SelectCorporation {
    fn pre_validate(&self, state: &GameState, env: GameEnv<'_>) -> Result<(), RulesError> {
        state.require_status(GameStatus::Active)?;
        state.require_phase(GamePhase::CorporationSelection)?;
        let player = state.require_player(&self.player)?;
        if player.corporation.is_some() {
            return Err(RulesError::invalid_state("corporation already selected"));
        }
        let kept = self.kept_cards(state)?;
        let offered = player
            .starting_selection
            .as_ref()
            .is_some_and(|selection| selection.offered_corporations.contains(&self.corporation));
        if !offered {
            return Err(RulesError::not_found(Entity::Corporation, &self.corporation));
        }
        let corporation = env.card(&self.corporation)?;
        if !corporation.is_corporation() {
            return Err(RulesError::invalid_target(format!(
                "{} is not a corporation",
                corporation.name
            )));
        }

        let mut available = player.resources;
        for (kind, amount) in corporation.starting_resources.iter() {
            available.add(kind, amount);
        }
        let cost = kept.len() as i32 * state.config.card_buy_cost as i32;
        if cost > available.credits {
            return Err(RulesError::insufficient(
                ResourceKind::Credits,
                cost,
                available.credits,
            ));
        }
        validate_card_behaviors(state, env, &self.player, corporation, &self.options, available)
    }

    fn apply(&self, ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
        let corporation = ctx.env.card(&self.corporation)?;
        let kept = self.kept_cards(ctx.state)?.to_vec();
        let cost = kept.len() as i32 * ctx.state.config.card_buy_cost as i32;
        let snapshot = LedgerSnapshot::capture(ctx.state);

        let player = ctx.state.require_player_mut(&self.player)?;
        add_all(&mut player.resources, &corporation.starting_resources);
        add_all(&mut player.production, &corporation.starting_production);
        player.corporation = Some(PlayedCard::from_card(corporation));
        if let Some(storage) = corporation.storage {
            player.storage.insert(corporation.id.clone(), storage.starting);
        }

        let source = BehaviorSource::new(
            self.player.clone(),
            corporation.id.clone(),
            corporation.name.clone(),
        );
        resolve_card_behaviors(
            ctx.state,
            ctx.env,
            &source,
            corporation,
            &self.options,
            &mut ctx.log,
        )?;

        let player = ctx.state.require_player_mut(&self.player)?;
        if let Some(granter) = VpGranter::from_card(corporation) {
            player.vp_granters.prepend(granter);
        }
        player.resources.add(ResourceKind::Credits, -cost);
        player.hand.extend(kept.iter().cloned());
        player.starting_selection = None;

        snapshot.finish(ctx.state, &self.player, &mut ctx.log.events);
        ctx.emit(DomainEvent::CorporationSelected {
            player: self.player.clone(),
            corporation: corporation.id.clone(),
        });
        if !kept.is_empty() {
            ctx.emit(DomainEvent::CardsAddedToHand {
                player: self.player.clone(),
                cards: kept,
            });
        }
        ctx.describe(format!("{} founded {}", self.player, corporation.name));

        if ctx.state.players.iter().all(|p| p.corporation.is_some()) {
            ctx.state.phase = GamePhase::Action;
            ctx.emit(DomainEvent::GamePhaseChanged {
                old: GamePhase::CorporationSelection,
                new: GamePhase::Action,
            });
            start_first_turn(ctx)?;
        }
        Ok(())
    }
}

fn add_all(target: &mut ResourceSet, delta: &ResourceSet) {
    for (kind, amount) in delta.iter() {
        target.add(kind, amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, CardBehavior, CardKind, Output};
    use crate::engine::Command;
    use crate::testing::Fixture;

    fn corporation() -> Card {
        Card::new("corp-a", "Credicor", CardKind::Corporation, 0)
            .with_starting_resources(ResourceSet::credits(30))
            .with_starting_production(ResourceSet::ZERO.with(ResourceKind::Steel, 1))
            .with_behavior(CardBehavior::auto(vec![Output::resource(
                ResourceKind::Plants,
                2,
            )]))
    }

    fn lobby() -> Fixture {
        let mut fixture = Fixture::lobby(&["p1", "p2"], vec![corporation()])
            .with_deck(&["c1", "c2", "c3", "c4"], &["corp-a", "corp-a"]);
        fixture.state.config.starting_card_offer = 2;
        fixture.state.config.corporation_offer = 1;
        fixture
    }

    fn start_and_choose(fixture: &mut Fixture, kept: &[&str]) {
        fixture.execute(StartGame.into()).unwrap();
        for player in ["p1", "p2"] {
            let offer = fixture
                .player(player)
                .starting_selection
                .clone()
                .unwrap()
                .offered_cards;
            let cards = offer
                .into_iter()
                .filter(|card| kept.contains(&card.as_str()))
                .collect();
            fixture
                .execute(SelectStartingCards::new(PlayerId::new(player), cards).into())
                .unwrap();
        }
    }

    fn select(player: &str) -> Command {
        SelectCorporation::new(PlayerId::new(player), CardId::new("corp-a")).into()
    }

    #[test]
    fn start_game_deals_offers() {
        let mut fixture = lobby();
        fixture.execute(StartGame.into()).unwrap();

        assert_eq!(fixture.state.status, GameStatus::Active);
        assert_eq!(fixture.state.phase, GamePhase::StartingCardSelection);
        let selection = fixture.player("p1").starting_selection.as_ref().unwrap();
        assert_eq!(selection.offered_cards, vec![CardId::new("c1"), CardId::new("c2")]);
        assert_eq!(selection.offered_corporations.len(), 1);
    }

    #[test]
    fn start_game_requires_lobby() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        let err = fixture.execute(StartGame.into()).unwrap_err();
        assert!(matches!(err.rules_error(), Some(RulesError::WrongStatus { .. })));
    }

    #[test]
    fn corporation_selection_follows_card_choice() {
        let mut fixture = lobby();
        start_and_choose(&mut fixture, &["c1", "c3"]);
        assert_eq!(fixture.state.phase, GamePhase::CorporationSelection);
    }

    #[test]
    fn selecting_corporation_applies_it_and_charges_for_cards() {
        let mut fixture = lobby();
        start_and_choose(&mut fixture, &["c1"]);

        fixture.execute(select("p1")).unwrap();

        let player = fixture.player("p1");
        assert_eq!(player.resources.credits, 30 - 3);
        assert_eq!(player.resources.plants, 2);
        assert_eq!(player.production.steel, 1);
        assert_eq!(player.hand, vec![CardId::new("c1")]);
        assert!(player.corporation.is_some());
        assert_eq!(fixture.state.phase, GamePhase::CorporationSelection);
    }

    #[test]
    fn last_corporation_opens_the_action_phase() {
        let mut fixture = lobby();
        start_and_choose(&mut fixture, &[]);
        fixture.execute(select("p1")).unwrap();
        fixture.execute(select("p2")).unwrap();

        assert_eq!(fixture.state.phase, GamePhase::Action);
        let turn = fixture.state.current_turn.as_ref().unwrap();
        assert_eq!(turn.player.as_str(), "p1");
        assert_eq!(turn.actions_remaining, 2);
    }

    #[test]
    fn corporation_outside_the_offer_is_rejected() {
        let mut fixture = lobby();
        start_and_choose(&mut fixture, &[]);
        let err = fixture
            .execute(SelectCorporation::new(PlayerId::new("p1"), CardId::new("corp-b")).into())
            .unwrap_err();
        assert!(matches!(err.rules_error(), Some(RulesError::NotFound { .. })));
    }
}
