use tracing::debug;

use super::{
    BehaviorSource, ResolutionLog, apply_outputs, pay_inputs, validate_inputs, validate_outputs,
};
use crate::card::{Card, CardBehavior, Output, Trigger};
use crate::env::{DeckService, GameEnv};
use crate::error::RulesError;
use crate::events::DomainEvent;
use crate::state::{
    CardAction, CardEffect, CardId, EffectRef, GameState, PlayedCard, PlayerId, ResourceSet,
};

/// Player decisions supplied alongside a card play or card action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolveOptions {
    /// Selected alternative for behaviors with choices.
    pub choice_index: Option<usize>,
    /// The acting player's card that receives any-card storage.
    pub storage_target: Option<CardId>,
    /// Opponent affected by any-player and steal outputs.
    pub target_player: Option<PlayerId>,
    /// Opponent's card resources are stolen from.
    pub source_card: Option<CardId>,
}

impl ResolveOptions {
    pub fn choice(index: usize) -> Self {
        Self {
            choice_index: Some(index),
            ..Self::default()
        }
    }
}

/// Validates every `auto` behavior of `card` without touching `state` or the
/// deck.
///
/// Behaviors are checked in catalog order against a scratch copy that already
/// carries the effects of the earlier ones, so a card whose behaviors only
/// overdraw production or storage together is rejected here rather than
/// halfway through apply. `available` is the player's holdings after the
/// card's cost is paid.
pub fn validate_card_behaviors(
    state: &GameState,
    env: GameEnv<'_>,
    player: &PlayerId,
    card: &Card,
    options: &ResolveOptions,
    available: ResourceSet,
) -> Result<(), RulesError> {
    let mut scratch = state.clone();
    let holder = scratch.require_player_mut(player)?;
    holder.resources = available;
    if card.is_corporation() {
        for (kind, amount) in card.starting_production.iter() {
            holder.production.add(kind, amount);
        }
        holder.corporation = Some(PlayedCard::from_card(card));
    } else {
        holder.played_cards.push(PlayedCard::from_card(card));
    }
    if let Some(storage) = card.storage {
        holder.storage.insert(card.id.clone(), storage.starting);
    }

    let dry_run = GameEnv::new(env.catalog(), env.board(), &NoDraw);
    let source = BehaviorSource::new(player.clone(), card.id.clone(), card.name.clone());
    let mut log = ResolutionLog::default();
    for behavior in card.behaviors.iter().filter(|b| b.is_auto()) {
        let choice = behavior.choice(options.choice_index)?;
        let inputs = behavior.effective_inputs(choice);
        let outputs = behavior.effective_outputs(choice);

        let holdings = scratch.require_player(player)?.resources;
        let remaining = validate_inputs(&scratch, &source, &inputs, holdings)?;
        validate_outputs(&scratch, dry_run, &source, &outputs, options, remaining)?;

        pay_inputs(&mut scratch, &source, &inputs)?;
        apply_outputs(&mut scratch, dry_run, &source, &outputs, options, &mut log)?;
    }
    Ok(())
}

/// Deck stand-in for validation runs: drawing yields nothing.
struct NoDraw;

impl DeckService for NoDraw {
    fn draw_project_cards(&self, _count: usize) -> Vec<CardId> {
        Vec::new()
    }

    fn draw_corporations(&self, _count: usize) -> Vec<CardId> {
        Vec::new()
    }
}

/// Resolves every behavior of `card` for `source.player`, in catalog order.
///
/// Behaviors without triggers are inert. A behavior may be both `auto` and
/// carry persistent outputs, in which case it applies its immediate outputs
/// and is also registered as a standing effect.
pub fn resolve_card_behaviors(
    state: &mut GameState,
    env: GameEnv<'_>,
    source: &BehaviorSource,
    card: &Card,
    options: &ResolveOptions,
    log: &mut ResolutionLog,
) -> Result<(), RulesError> {
    for (index, behavior) in card.behaviors.iter().enumerate() {
        if behavior.triggers.is_empty() {
            continue;
        }
        if behavior.is_auto() {
            resolve_auto(state, env, source, index, behavior, options, log)?;
        }
        if behavior.is_manual() {
            register_action(state, source, index, behavior)?;
        }
        if behavior.is_conditional() {
            register_conditional(state, source, index, behavior, log)?;
        }
    }
    Ok(())
}

fn resolve_auto(
    state: &mut GameState,
    env: GameEnv<'_>,
    source: &BehaviorSource,
    index: usize,
    behavior: &CardBehavior,
    options: &ResolveOptions,
    log: &mut ResolutionLog,
) -> Result<(), RulesError> {
    let choice = behavior.choice(options.choice_index)?;
    pay_inputs(state, source, &behavior.effective_inputs(choice))?;

    let outputs = behavior.effective_outputs(choice);
    apply_outputs(state, env, source, &outputs, options, log)?;

    let persistent: Vec<Output> = outputs
        .into_iter()
        .filter(|output| output.is_persistent())
        .cloned()
        .collect();
    if persistent.is_empty() {
        return Ok(());
    }

    debug!(
        target: "terra::behavior",
        player = %source.player,
        card = %source.card,
        behavior = index,
        outputs = persistent.len(),
        "registering standing effect"
    );
    state.require_player_mut(&source.player)?.effects.push(CardEffect {
        card: source.card.clone(),
        card_name: source.card_name.clone(),
        behavior_index: index,
        behavior: CardBehavior {
            triggers: vec![Trigger::Auto],
            outputs: persistent,
            ..CardBehavior::default()
        },
    });
    log.emit(DomainEvent::PlayerEffectsChanged {
        player: source.player.clone(),
    });
    Ok(())
}

fn register_action(
    state: &mut GameState,
    source: &BehaviorSource,
    index: usize,
    behavior: &CardBehavior,
) -> Result<(), RulesError> {
    let player = state.require_player_mut(&source.player)?;
    if player.find_action(&source.card, index).is_some() {
        return Ok(());
    }
    player.actions.push(CardAction {
        card: source.card.clone(),
        card_name: source.card_name.clone(),
        behavior_index: index,
        behavior: behavior.clone(),
        times_used_this_turn: 0,
        times_used_this_generation: 0,
    });
    Ok(())
}

fn register_conditional(
    state: &mut GameState,
    source: &BehaviorSource,
    index: usize,
    behavior: &CardBehavior,
    log: &mut ResolutionLog,
) -> Result<(), RulesError> {
    let player = state.require_player_mut(&source.player)?;
    if player.find_effect(&source.card, index).is_none() {
        player.effects.push(CardEffect {
            card: source.card.clone(),
            card_name: source.card_name.clone(),
            behavior_index: index,
            behavior: behavior.clone(),
        });
    }

    for condition in behavior.conditions() {
        state.subscribe(
            condition.event.event_kind(),
            EffectRef {
                player: source.player.clone(),
                card: source.card.clone(),
                behavior_index: index,
            },
        );
    }
    log.emit(DomainEvent::PlayerEffectsChanged {
        player: source.player.clone(),
    });
    Ok(())
}
