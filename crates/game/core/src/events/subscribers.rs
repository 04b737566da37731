//! Built-in subscribers registered by [`super::EventBus::with_defaults`].

use tracing::{debug, warn};

use super::{DispatchContext, DomainEvent, EventKind, EventSubscriber, SubscriberCriticality};
use crate::behavior::{ResolutionLog, trigger_passive_effect};
use crate::error::RulesError;
use crate::vp::recalculate_player_vp;

/// Re-evaluates conditional card effects subscribed to the event's kind.
///
/// A failing effect is skipped; the remaining subscribed effects still run.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassiveEffectSubscriber;

impl EventSubscriber for PassiveEffectSubscriber {
    fn name(&self) -> &'static str {
        "passive_effects"
    }

    fn is_interested(&self, kind: EventKind) -> bool {
        matches!(
            kind,
            EventKind::TilePlaced
                | EventKind::TemperatureChanged
                | EventKind::OxygenChanged
                | EventKind::TerraformRatingChanged
                | EventKind::CardPlayed
                | EventKind::ProductionChanged
                | EventKind::PlacementBonusGained
        )
    }

    fn handle(&self, event: &DomainEvent, ctx: &mut DispatchContext<'_>) -> Result<(), RulesError> {
        let effects = ctx.state.subscribers(event.kind()).to_vec();
        for effect in &effects {
            let mut log = ResolutionLog::default();
            match trigger_passive_effect(ctx.state, ctx.env, effect, event, &mut log) {
                Ok(true) => {
                    ctx.emitted.append(&mut log.events);
                    ctx.emit(DomainEvent::PassiveEffectTriggered {
                        player: effect.player.clone(),
                        card: effect.card.clone(),
                        behavior_index: effect.behavior_index,
                        outputs: log.calculated,
                    });
                }
                Ok(false) => {}
                Err(error) => {
                    warn!(
                        target: "terra::events",
                        player = %effect.player,
                        card = %effect.card,
                        behavior = effect.behavior_index,
                        error = %error,
                        "passive effect skipped"
                    );
                }
            }
        }
        Ok(())
    }
}

/// Keeps every player's cached VP total current.
#[derive(Debug, Default, Clone, Copy)]
pub struct VpRecalculationSubscriber;

impl EventSubscriber for VpRecalculationSubscriber {
    fn name(&self) -> &'static str {
        "vp_recalculation"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn criticality(&self) -> SubscriberCriticality {
        SubscriberCriticality::Critical
    }

    fn is_interested(&self, kind: EventKind) -> bool {
        matches!(
            kind,
            EventKind::CardPlayed
                | EventKind::ResourceStorageChanged
                | EventKind::TilePlaced
                | EventKind::CorporationSelected
        )
    }

    fn handle(&self, _event: &DomainEvent, ctx: &mut DispatchContext<'_>) -> Result<(), RulesError> {
        let players: Vec<_> = ctx.state.players.iter().map(|p| p.id.clone()).collect();
        for player in players {
            if let Some((old, new)) = recalculate_player_vp(ctx.state, ctx.env.board(), &player) {
                debug!(target: "terra::events", player = %player, old, new, "victory points changed");
                ctx.emit(DomainEvent::VictoryPointsChanged { player, old, new });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{
        Card, CardBehavior, CardKind, Output, PerCondition, Quantity, Tag, TriggerCondition,
        TriggerEvent,
    };
    use crate::events::EventBus;
    use crate::state::{CardEffect, CardId, EffectRef, PlayerId, ResourceKind};
    use crate::testing::Fixture;
    use crate::vp::{VpCondition, VpGranter};

    fn science_played(player: &str) -> DomainEvent {
        DomainEvent::CardPlayed {
            player: PlayerId::new(player),
            card: CardId::new("lab"),
            kind: CardKind::Automated,
            tags: vec![Tag::Science],
        }
    }

    #[test]
    fn passive_effects_fire_for_subscribed_kinds() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        fixture.player_mut("p1").effects.push(CardEffect {
            card: CardId::new("olympus"),
            card_name: "Olympus".into(),
            behavior_index: 0,
            behavior: CardBehavior::conditional(
                TriggerCondition::new(TriggerEvent::TagPlayed).with_tags([Tag::Science]),
                vec![Output::resource(ResourceKind::Credits, 1)],
            ),
        });
        fixture.state.subscribe(
            EventKind::CardPlayed,
            EffectRef {
                player: PlayerId::new("p1"),
                card: CardId::new("olympus"),
                behavior_index: 0,
            },
        );

        let bus = EventBus::default();
        let (state, env) = fixture.split();
        let delivered = bus.dispatch(state, env, vec![science_played("p1")]).unwrap();

        assert_eq!(fixture.player("p1").resources.credits, 1);
        assert!(delivered
            .iter()
            .any(|e| e.kind() == EventKind::ResourcesChanged));
        assert!(delivered.iter().any(|e| matches!(
            e,
            DomainEvent::PassiveEffectTriggered { card, outputs, .. }
                if card == &CardId::new("olympus") && outputs.len() == 1
        )));
    }

    #[test]
    fn vp_totals_follow_played_cards() {
        let card = Card::new("jovian-vp", "Io Mining", CardKind::Automated, 10)
            .with_tags([Tag::Jovian])
            .with_vp(VpCondition::per(1, PerCondition::new(Quantity::Tag(Tag::Jovian), 1)));
        let mut fixture = Fixture::action_phase(&["p1"], vec![card.clone()]);
        {
            let player = fixture.player_mut("p1");
            player.played_cards.push(crate::state::PlayedCard::from_card(&card));
            player.vp_granters.add(VpGranter::from_card(&card).unwrap());
        }

        let bus = EventBus::default();
        let (state, env) = fixture.split();
        let delivered = bus.dispatch(state, env, vec![science_played("p1")]).unwrap();

        assert_eq!(fixture.player("p1").vp_granters.total_computed_vp(), 1);
        assert!(delivered.contains(&DomainEvent::VictoryPointsChanged {
            player: PlayerId::new("p1"),
            old: 0,
            new: 1,
        }));
    }

    #[test]
    fn unchanged_totals_emit_nothing() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        let bus = EventBus::default();
        let (state, env) = fixture.split();
        let delivered = bus.dispatch(state, env, vec![science_played("p1")]).unwrap();
        assert_eq!(delivered, vec![science_played("p1")]);
    }
}
