use tracing::{debug, trace};

use super::{
    BehaviorSource, LedgerSnapshot, ResolutionLog, ResolveOptions, apply_outputs, pay_inputs,
    validate_inputs, validate_outputs,
};
use crate::card::{ConditionTarget, TriggerCondition, TriggerEvent};
use crate::env::GameEnv;
use crate::error::RulesError;
use crate::events::{DomainEvent, EventKind};
use crate::state::{EffectRef, GameState, PlacementBonus, PlayerId, TileKind};

impl TriggerEvent {
    /// Domain event kind a condition on this trigger subscribes to.
    pub const fn event_kind(&self) -> EventKind {
        match self {
            Self::OceanPlaced | Self::CityPlaced | Self::GreeneryPlaced | Self::TilePlaced => {
                EventKind::TilePlaced
            }
            Self::TemperatureRaised => EventKind::TemperatureChanged,
            Self::OxygenRaised => EventKind::OxygenChanged,
            Self::TerraformRatingRaised => EventKind::TerraformRatingChanged,
            Self::CardPlayed | Self::TagPlayed => EventKind::CardPlayed,
            Self::ProductionIncreased => EventKind::ProductionChanged,
            Self::PlacementBonusGained => EventKind::PlacementBonusGained,
        }
    }
}

/// Whether `event` satisfies `condition` for an effect owned by `owner`.
pub fn condition_matches(condition: &TriggerCondition, owner: &PlayerId, event: &DomainEvent) -> bool {
    if condition.event.event_kind() != event.kind() {
        return false;
    }
    if condition.target == ConditionTarget::SelfPlayer && event.player() != Some(owner) {
        return false;
    }

    match (condition.event, event) {
        (TriggerEvent::OceanPlaced, DomainEvent::TilePlaced { tile, .. }) => *tile == TileKind::Ocean,
        (TriggerEvent::CityPlaced, DomainEvent::TilePlaced { tile, .. }) => *tile == TileKind::City,
        (TriggerEvent::GreeneryPlaced, DomainEvent::TilePlaced { tile, .. }) => {
            *tile == TileKind::Greenery
        }
        (TriggerEvent::TilePlaced, DomainEvent::TilePlaced { .. }) => true,
        (TriggerEvent::TemperatureRaised, DomainEvent::TemperatureChanged { old, new, .. })
        | (TriggerEvent::OxygenRaised, DomainEvent::OxygenChanged { old, new, .. })
        | (
            TriggerEvent::TerraformRatingRaised,
            DomainEvent::TerraformRatingChanged { old, new, .. },
        ) => new > old,
        (TriggerEvent::CardPlayed | TriggerEvent::TagPlayed, DomainEvent::CardPlayed { tags, .. }) => {
            condition.affected_tags.is_empty()
                || condition.affected_tags.iter().any(|tag| tags.contains(tag))
        }
        (TriggerEvent::ProductionIncreased, DomainEvent::ProductionChanged { changes, .. }) => {
            changes.iter().any(|change| {
                change.delta > 0
                    && (condition.affected_resources.is_empty()
                        || condition.affected_resources.contains(&change.kind))
            })
        }
        (TriggerEvent::PlacementBonusGained, DomainEvent::PlacementBonusGained { bonus, .. }) => {
            match bonus {
                PlacementBonus::Resource { kind, .. } => {
                    condition.affected_resources.is_empty()
                        || condition.affected_resources.contains(kind)
                }
                PlacementBonus::CardDraw { .. } => condition.affected_resources.is_empty(),
            }
        }
        _ => false,
    }
}

/// Resolves one subscribed effect against `event`.
///
/// Returns `Ok(false)` when the effect is gone or none of its conditions
/// match. Only the behavior's base inputs and outputs are used; conditional
/// behaviors never offer choices.
pub fn trigger_passive_effect(
    state: &mut GameState,
    env: GameEnv<'_>,
    effect: &EffectRef,
    event: &DomainEvent,
    log: &mut ResolutionLog,
) -> Result<bool, RulesError> {
    let owner = state.require_player(&effect.player)?;
    let Some(registered) = owner.find_effect(&effect.card, effect.behavior_index) else {
        debug!(
            target: "terra::behavior",
            player = %effect.player,
            card = %effect.card,
            "subscribed effect no longer registered"
        );
        return Ok(false);
    };
    if !registered
        .behavior
        .conditions()
        .any(|condition| condition_matches(condition, &effect.player, event))
    {
        return Ok(false);
    }

    let behavior = registered.behavior.clone();
    let source = BehaviorSource::new(
        effect.player.clone(),
        effect.card.clone(),
        registered.card_name.clone(),
    );
    let options = ResolveOptions::default();
    let inputs = behavior.effective_inputs(None);
    let outputs = behavior.effective_outputs(None);

    let available = validate_inputs(state, &source, &inputs, owner.resources)?;
    validate_outputs(state, env, &source, &outputs, &options, available)?;

    trace!(
        target: "terra::behavior",
        player = %source.player,
        card = %source.card,
        event = %event.kind(),
        "passive effect triggered"
    );

    let snapshot = LedgerSnapshot::capture(state);
    pay_inputs(state, &source, &inputs)?;
    apply_outputs(state, env, &source, &outputs, &options, log)?;
    snapshot.finish(state, &source.player, &mut log.events);
    Ok(true)
}
