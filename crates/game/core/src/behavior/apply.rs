use std::collections::BTreeMap;

use tracing::debug;

use super::{BehaviorSource, ResolutionLog, ResolveOptions};
use crate::card::{CardTarget, Input, Output, PerCondition, PlayerTarget, StorageKind};
use crate::env::GameEnv;
use crate::error::{Entity, RulesError};
use crate::events::DomainEvent;
use crate::state::{CalculatedOutput, CardId, GameState, PlayerId, PlayerState, ResourceSet};
use crate::vp::{FactProvider, PlayerFacts};

/// Applies a `per` scaler, if any, for the source player and card.
fn scaled(
    amount: i32,
    per: Option<&PerCondition>,
    state: &GameState,
    env: GameEnv<'_>,
    source: &BehaviorSource,
) -> i32 {
    match per {
        None => amount,
        Some(per) => {
            let facts = PlayerFacts::new(state, env.board(), &source.player);
            let observed = facts.observe(per.quantity, &source.card);
            amount * per.triggers(observed) as i32
        }
    }
}

fn storage_kind(env: GameEnv<'_>, card: &CardId) -> Option<StorageKind> {
    env.catalog()
        .card(card)
        .and_then(|card| card.storage)
        .map(|storage| storage.kind)
}

/// Checks that `inputs` can be paid out of `available`.
///
/// Returns what is left after paying.
///
/// # Errors
///
/// [`RulesError::InsufficientResource`] naming the first deficient resource.
pub fn validate_inputs(
    state: &GameState,
    source: &BehaviorSource,
    inputs: &[&Input],
    available: ResourceSet,
) -> Result<ResourceSet, RulesError> {
    let player = state.require_player(&source.player)?;
    let mut remaining = available;
    let mut storage = player.storage_of(&source.card);

    for input in inputs {
        match input {
            Input::Resource { kind, amount } => {
                let held = remaining.get(*kind);
                if held < *amount {
                    return Err(RulesError::insufficient(kind, *amount, held));
                }
                remaining.add(*kind, -amount);
            }
            Input::Storage { amount } => {
                if storage < *amount {
                    return Err(RulesError::insufficient(
                        format!("{} storage", source.card_name),
                        *amount as i32,
                        storage as i32,
                    ));
                }
                storage -= amount;
            }
        }
    }
    Ok(remaining)
}

/// Deducts inputs. Callers run [`validate_inputs`] first.
pub fn pay_inputs(
    state: &mut GameState,
    source: &BehaviorSource,
    inputs: &[&Input],
) -> Result<(), RulesError> {
    let player = state.require_player_mut(&source.player)?;
    for input in inputs {
        match input {
            Input::Resource { kind, amount } => {
                player.resources.add(*kind, -amount);
            }
            Input::Storage { amount } => {
                let slot = player.storage.entry(source.card.clone()).or_insert(0);
                *slot = slot.saturating_sub(*amount);
            }
        }
    }
    Ok(())
}

/// Checks that `outputs` keep the acting player's own ledger, production and
/// card storage non-negative, and that any chosen targets are legal.
///
/// `available` is the player's holdings after payment and inputs.
///
/// # Errors
///
/// - [`RulesError::InsufficientResource`] when a negative self output exceeds
///   what the player has
/// - [`RulesError::NotFound`] / [`RulesError::InvalidTarget`] for bad targets
pub fn validate_outputs(
    state: &GameState,
    env: GameEnv<'_>,
    source: &BehaviorSource,
    outputs: &[&Output],
    options: &ResolveOptions,
    available: ResourceSet,
) -> Result<(), RulesError> {
    let player = state.require_player(&source.player)?;
    let mut resources = available;
    let mut production = player.production;
    let mut storage: BTreeMap<CardId, i64> = BTreeMap::new();

    for output in outputs {
        match output {
            Output::Resource {
                kind,
                amount,
                target,
                per,
            } => {
                let amount = scaled(*amount, per.as_ref(), state, env, source);
                match target {
                    PlayerTarget::SelfPlayer => {
                        let before = resources.get(*kind);
                        if resources.add(*kind, amount) < 0 {
                            return Err(RulesError::insufficient(kind, -amount, before));
                        }
                    }
                    PlayerTarget::AnyPlayer | PlayerTarget::StealAnyPlayer => {
                        validate_target_player(state, source, options)?;
                    }
                }
            }
            Output::Production {
                kind,
                amount,
                target,
                per,
            } => {
                let amount = scaled(*amount, per.as_ref(), state, env, source);
                match target {
                    PlayerTarget::SelfPlayer => {
                        let before = production.get(*kind);
                        if production.add(*kind, amount) < 0 {
                            return Err(RulesError::insufficient(
                                format!("{kind} production"),
                                -amount,
                                before,
                            ));
                        }
                    }
                    PlayerTarget::AnyPlayer | PlayerTarget::StealAnyPlayer => {
                        validate_target_player(state, source, options)?;
                    }
                }
            }
            Output::CardStorage {
                kind,
                amount,
                target,
                per,
            } => {
                let amount = scaled(*amount, per.as_ref(), state, env, source);
                match target {
                    CardTarget::SelfCard => {
                        if storage_kind(env, &source.card) != Some(*kind) {
                            return Err(RulesError::invalid_target(format!(
                                "{} does not store {kind}",
                                source.card_name
                            )));
                        }
                        let slot = storage
                            .entry(source.card.clone())
                            .or_insert_with(|| i64::from(player.storage_of(&source.card)));
                        let before = *slot;
                        *slot += i64::from(amount);
                        if *slot < 0 {
                            return Err(RulesError::insufficient(
                                format!("{} storage", source.card_name),
                                -amount,
                                before as i32,
                            ));
                        }
                    }
                    CardTarget::AnyCard => {
                        if let Some(card) = &options.storage_target {
                            if !player.has_played(card) {
                                return Err(RulesError::invalid_target(format!(
                                    "{card} is not on the table of {}",
                                    source.player
                                )));
                            }
                            if storage_kind(env, card) != Some(*kind) {
                                return Err(RulesError::invalid_target(format!(
                                    "{card} does not store {kind}"
                                )));
                            }
                        }
                    }
                    CardTarget::StealFromAnyCard => {
                        validate_target_player(state, source, options)?;
                        if let (Some(victim), Some(card)) =
                            (&options.target_player, &options.source_card)
                        {
                            let victim = state.require_player(victim)?;
                            if !victim.has_played(card) || storage_kind(env, card) != Some(*kind)
                            {
                                return Err(RulesError::invalid_target(format!(
                                    "{card} holds no {kind} of {}",
                                    victim.id
                                )));
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_target_player(
    state: &GameState,
    source: &BehaviorSource,
    options: &ResolveOptions,
) -> Result<(), RulesError> {
    let Some(target) = &options.target_player else {
        return Ok(());
    };
    if target == &source.player {
        return Err(RulesError::invalid_target(
            "target player must be an opponent",
        ));
    }
    state
        .player(target)
        .map(|_| ())
        .ok_or_else(|| RulesError::not_found(Entity::Player, target))
}

/// Applies every non-persistent output for `source`.
///
/// Persistent outputs (discounts, substitutes, ...) are registered as
/// effects by the resolver and skipped here. Outputs that need a target the
/// caller did not supply are no-ops.
pub fn apply_outputs(
    state: &mut GameState,
    env: GameEnv<'_>,
    source: &BehaviorSource,
    outputs: &[&Output],
    options: &ResolveOptions,
    log: &mut ResolutionLog,
) -> Result<(), RulesError> {
    for output in outputs.iter().filter(|o| !o.is_persistent()) {
        apply_output(state, env, source, output, options, log)?;
    }
    Ok(())
}

fn apply_output(
    state: &mut GameState,
    env: GameEnv<'_>,
    source: &BehaviorSource,
    output: &Output,
    options: &ResolveOptions,
    log: &mut ResolutionLog,
) -> Result<(), RulesError> {
    let mut record = |amount: i32| {
        log.calculated.push(CalculatedOutput {
            card: source.card.clone(),
            kind: output.kind(),
            amount,
        });
    };

    match output {
        Output::Resource {
            kind,
            amount,
            target,
            per,
        } => {
            let amount = scaled(*amount, per.as_ref(), state, env, source);
            record(amount);
            adjust_player(state, source, options, *target, amount, kind, |p| {
                p.resources.get_mut(*kind)
            })?;
        }
        Output::Production {
            kind,
            amount,
            target,
            per,
        } => {
            let amount = scaled(*amount, per.as_ref(), state, env, source);
            record(amount);
            let item = format!("{kind} production");
            adjust_player(state, source, options, *target, amount, item, |p| {
                p.production.get_mut(*kind)
            })?;
        }
        Output::TerraformRating { amount } => {
            record(*amount);
            state.require_player_mut(&source.player)?.terraform_rating += amount;
        }
        Output::GlobalParameter { parameter, steps } => {
            let taken = state.global.raise(*parameter, *steps);
            record(taken as i32);
            state.require_player_mut(&source.player)?.terraform_rating += taken as i32;
        }
        Output::TilePlacement { tile, count } => {
            record(*count as i32);
            if *count == 0 {
                return Ok(());
            }
            let tiles = vec![*tile; *count as usize];
            state
                .require_player_mut(&source.player)?
                .queue_tiles(tiles.iter().copied(), &source.card_name);
            log.emit(DomainEvent::TilePlacementQueued {
                player: source.player.clone(),
                tiles,
                source: source.card_name.clone(),
            });
        }
        Output::CardStorage {
            kind,
            amount,
            target,
            per,
        } => {
            let amount = scaled(*amount, per.as_ref(), state, env, source);
            record(amount);
            apply_storage(state, env, source, options, *kind, *target, amount)?;
        }
        Output::CardDraw { count } => {
            let cards = env.deck().draw_project_cards(*count as usize);
            record(cards.len() as i32);
            if cards.is_empty() {
                return Ok(());
            }
            state
                .require_player_mut(&source.player)?
                .hand
                .extend(cards.iter().cloned());
            log.emit(DomainEvent::CardsAddedToHand {
                player: source.player.clone(),
                cards,
            });
        }
        Output::Discount { .. }
        | Output::PaymentSubstitute { .. }
        | Output::ValueModifier { .. }
        | Output::RequirementLenience { .. }
        | Output::OceanAdjacencyBonus { .. } => {}
    }
    Ok(())
}

/// Moves `amount` of one ledger slot according to `target`.
///
/// `item` names the slot in insufficiency errors.
fn adjust_player(
    state: &mut GameState,
    source: &BehaviorSource,
    options: &ResolveOptions,
    target: PlayerTarget,
    amount: i32,
    item: impl ToString,
    slot: impl Fn(&mut PlayerState) -> &mut i32,
) -> Result<(), RulesError> {
    match target {
        PlayerTarget::SelfPlayer => {
            let player = state.require_player_mut(&source.player)?;
            let value = slot(player);
            if *value + amount < 0 {
                return Err(RulesError::insufficient(item, -amount, *value));
            }
            *value += amount;
        }
        PlayerTarget::AnyPlayer => {
            let Some(victim) = target_of(source, options) else {
                return Ok(());
            };
            let value = slot(state.require_player_mut(victim)?);
            *value = (*value + amount).max(0);
        }
        PlayerTarget::StealAnyPlayer => {
            let Some(victim) = target_of(source, options) else {
                return Ok(());
            };
            let value = slot(state.require_player_mut(victim)?);
            let taken = amount.abs().min(*value);
            *value -= taken;
            *slot(state.require_player_mut(&source.player)?) += taken;
        }
    }
    Ok(())
}

fn target_of<'o>(source: &BehaviorSource, options: &'o ResolveOptions) -> Option<&'o PlayerId> {
    let target = options.target_player.as_ref();
    if target.is_none() {
        debug!(
            target: "terra::behavior",
            player = %source.player,
            card = %source.card,
            "no target player chosen, skipping output"
        );
    }
    target
}

fn apply_storage(
    state: &mut GameState,
    env: GameEnv<'_>,
    source: &BehaviorSource,
    options: &ResolveOptions,
    kind: StorageKind,
    target: CardTarget,
    amount: i32,
) -> Result<(), RulesError> {
    match target {
        CardTarget::SelfCard => {
            let player = state.require_player_mut(&source.player)?;
            let slot = player.storage.entry(source.card.clone()).or_insert(0);
            let next = i64::from(*slot) + i64::from(amount);
            if next < 0 {
                return Err(RulesError::insufficient(
                    format!("{} storage", source.card_name),
                    -amount,
                    *slot as i32,
                ));
            }
            *slot = next as u32;
        }
        CardTarget::AnyCard => {
            let Some(card) = &options.storage_target else {
                debug!(
                    target: "terra::behavior",
                    player = %source.player,
                    card = %source.card,
                    "no storage target chosen, skipping output"
                );
                return Ok(());
            };
            if storage_kind(env, card) != Some(kind) {
                return Err(RulesError::invalid_target(format!(
                    "{card} does not store {kind}"
                )));
            }
            let player = state.require_player_mut(&source.player)?;
            let slot = player.storage.entry(card.clone()).or_insert(0);
            *slot = (i64::from(*slot) + i64::from(amount)).max(0) as u32;
        }
        CardTarget::StealFromAnyCard => {
            let (Some(victim), Some(card)) = (&options.target_player, &options.source_card)
            else {
                return Ok(());
            };
            let victim = state.require_player_mut(victim)?;
            let slot = victim.storage.entry(card.clone()).or_insert(0);
            let taken = amount.unsigned_abs().min(*slot);
            *slot -= taken;

            let destination = options
                .storage_target
                .clone()
                .unwrap_or_else(|| source.card.clone());
            let player = state.require_player_mut(&source.player)?;
            *player.storage.entry(destination).or_insert(0) += taken;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, CardKind, Quantity, Tag};
    use crate::state::{PlayedCard, ResourceKind, TileKind};
    use crate::testing::Fixture;

    fn source(player: &str, card: &str) -> BehaviorSource {
        BehaviorSource::new(PlayerId::new(player), CardId::new(card), card)
    }

    #[test]
    fn per_scaled_resource_output_counts_tags() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        let player = fixture.player_mut("p1");
        for id in ["j1", "j2", "j3", "j4"] {
            player.played_cards.push(PlayedCard {
                id: CardId::new(id),
                name: id.into(),
                kind: CardKind::Automated,
                tags: vec![Tag::Jovian],
            });
        }
        let output = Output::Resource {
            kind: ResourceKind::Credits,
            amount: 2,
            target: PlayerTarget::SelfPlayer,
            per: Some(PerCondition::new(Quantity::Tag(Tag::Jovian), 2)),
        };

        let mut log = ResolutionLog::default();
        let (state, env) = fixture.split();
        apply_outputs(state, env, &source("p1", "c"), &[&output], &ResolveOptions::default(), &mut log)
            .unwrap();

        assert_eq!(fixture.player("p1").resources.credits, 4);
        assert_eq!(log.calculated[0].amount, 4);
    }

    #[test]
    fn steal_is_clamped_to_victim_holdings() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.player_mut("p2").resources.plants = 2;
        let output = Output::Resource {
            kind: ResourceKind::Plants,
            amount: -5,
            target: PlayerTarget::StealAnyPlayer,
            per: None,
        };
        let options = ResolveOptions {
            target_player: Some(PlayerId::new("p2")),
            ..ResolveOptions::default()
        };

        let mut log = ResolutionLog::default();
        let (state, env) = fixture.split();
        apply_outputs(state, env, &source("p1", "c"), &[&output], &options, &mut log).unwrap();

        assert_eq!(fixture.player("p2").resources.plants, 0);
        assert_eq!(fixture.player("p1").resources.plants, 2);
    }

    #[test]
    fn any_player_output_without_target_is_a_no_op() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.player_mut("p2").production.heat = 1;
        let output = Output::Production {
            kind: ResourceKind::Heat,
            amount: -2,
            target: PlayerTarget::AnyPlayer,
            per: None,
        };

        let before = fixture.state.clone();
        let mut log = ResolutionLog::default();
        let (state, env) = fixture.split();
        apply_outputs(state, env, &source("p1", "c"), &[&output], &ResolveOptions::default(), &mut log)
            .unwrap();
        assert_eq!(before.players, fixture.state.players);
    }

    #[test]
    fn any_player_production_loss_clamps_at_zero() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.player_mut("p2").production.heat = 1;
        let output = Output::Production {
            kind: ResourceKind::Heat,
            amount: -2,
            target: PlayerTarget::AnyPlayer,
            per: None,
        };
        let options = ResolveOptions {
            target_player: Some(PlayerId::new("p2")),
            ..ResolveOptions::default()
        };

        let mut log = ResolutionLog::default();
        let (state, env) = fixture.split();
        apply_outputs(state, env, &source("p1", "c"), &[&output], &options, &mut log).unwrap();
        assert_eq!(fixture.player("p2").production.heat, 0);
    }

    #[test]
    fn negative_self_outputs_fail_validation() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        fixture.player_mut("p1").production.energy = 1;
        let output = Output::production(ResourceKind::Energy, -2);

        let err = validate_outputs(
            &fixture.state,
            fixture.env(),
            &source("p1", "c"),
            &[&output],
            &ResolveOptions::default(),
            fixture.player("p1").resources,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RulesError::InsufficientResource { needed: 2, available: 1, .. }
        ));
    }

    #[test]
    fn self_shortfall_in_apply_names_the_slot() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        fixture.player_mut("p1").resources.plants = 1;
        let plants = Output::resource(ResourceKind::Plants, -3);
        let energy = Output::production(ResourceKind::Energy, -1);

        let mut log = ResolutionLog::default();
        let (state, env) = fixture.split();
        let err = apply_outputs(state, env, &source("p1", "c"), &[&plants], &ResolveOptions::default(), &mut log)
            .unwrap_err();
        assert_eq!(err.to_string(), "insufficient plants: need 3, have 1");

        let (state, env) = fixture.split();
        let err = apply_outputs(state, env, &source("p1", "c"), &[&energy], &ResolveOptions::default(), &mut log)
            .unwrap_err();
        assert!(matches!(
            err,
            RulesError::InsufficientResource { ref item, needed: 1, available: 0 } if item == "energy production"
        ));
    }

    #[test]
    fn global_raise_grants_one_tr_per_step_taken() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        fixture.state.global.oxygen = 13;
        let output = Output::GlobalParameter {
            parameter: crate::state::GlobalParameter::Oxygen,
            steps: 2,
        };

        let mut log = ResolutionLog::default();
        let (state, env) = fixture.split();
        apply_outputs(state, env, &source("p1", "c"), &[&output], &ResolveOptions::default(), &mut log)
            .unwrap();
        assert_eq!(fixture.state.global.oxygen, 14);
        assert_eq!(fixture.player("p1").terraform_rating, 21);
    }

    #[test]
    fn tile_outputs_queue_placements_named_after_the_card() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        let output = Output::TilePlacement {
            tile: TileKind::Ocean,
            count: 2,
        };

        let mut log = ResolutionLog::default();
        let (state, env) = fixture.split();
        let src = BehaviorSource::new(PlayerId::new("p1"), CardId::new("aq"), "Aquifer");
        apply_outputs(state, env, &src, &[&output], &ResolveOptions::default(), &mut log).unwrap();

        let queue = fixture.player("p1").pending_tiles.clone().unwrap();
        assert_eq!(queue.source, "Aquifer");
        assert_eq!(queue.pending.len(), 2);
        assert!(matches!(log.events[0], DomainEvent::TilePlacementQueued { .. }));
    }

    #[test]
    fn any_card_storage_requires_matching_kind() {
        let pets = Card::new("pets", "Pets", CardKind::Active, 10)
            .with_storage(StorageKind::Animals, 0);
        let mut fixture = Fixture::action_phase(&["p1"], vec![pets.clone()]);
        fixture
            .player_mut("p1")
            .played_cards
            .push(PlayedCard::from_card(&pets));
        let output = Output::CardStorage {
            kind: StorageKind::Microbes,
            amount: 1,
            target: CardTarget::AnyCard,
            per: None,
        };
        let options = ResolveOptions {
            storage_target: Some(CardId::new("pets")),
            ..ResolveOptions::default()
        };

        let err = validate_outputs(
            &fixture.state,
            fixture.env(),
            &source("p1", "c"),
            &[&output],
            &options,
            fixture.player("p1").resources,
        )
        .unwrap_err();
        assert!(matches!(err, RulesError::InvalidTarget { .. }));
    }

    #[test]
    fn storage_inputs_are_checked_against_the_card() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        fixture
            .player_mut("p1")
            .storage
            .insert(CardId::new("tardigrades"), 1);
        let input = Input::Storage { amount: 2 };

        let err = validate_inputs(
            &fixture.state,
            &source("p1", "tardigrades"),
            &[&input],
            ResourceSet::ZERO,
        )
        .unwrap_err();
        assert!(matches!(err, RulesError::InsufficientResource { needed: 2, available: 1, .. }));
    }
}
