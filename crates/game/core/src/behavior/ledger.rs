use std::collections::{BTreeMap, BTreeSet};

use crate::events::DomainEvent;
use crate::state::{CardId, GameState, GlobalParameters, PlayerId, ResourceSet};

#[derive(Clone, Debug)]
struct PlayerLedger {
    id: PlayerId,
    resources: ResourceSet,
    production: ResourceSet,
    terraform_rating: i32,
    storage: BTreeMap<CardId, u32>,
}

/// Ledger values captured before a resolution step.
///
/// [`LedgerSnapshot::finish`] compares them with the current state and emits
/// at most one event of each kind per player, so subscribers never observe a
/// partially applied step.
#[derive(Clone, Debug)]
pub struct LedgerSnapshot {
    players: Vec<PlayerLedger>,
    global: GlobalParameters,
}

impl LedgerSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            players: state
                .players
                .iter()
                .map(|p| PlayerLedger {
                    id: p.id.clone(),
                    resources: p.resources,
                    production: p.production,
                    terraform_rating: p.terraform_rating,
                    storage: p.storage.clone(),
                })
                .collect(),
            global: state.global,
        }
    }

    /// Emits batched change events. Global parameter changes are attributed
    /// to `actor`.
    pub fn finish(&self, state: &GameState, actor: &PlayerId, events: &mut Vec<DomainEvent>) {
        for before in &self.players {
            let Some(after) = state.player(&before.id) else {
                continue;
            };

            let changes = after.resources.changes_since(&before.resources);
            if !changes.is_empty() {
                events.push(DomainEvent::ResourcesChanged {
                    player: after.id.clone(),
                    changes,
                });
            }
            let changes = after.production.changes_since(&before.production);
            if !changes.is_empty() {
                events.push(DomainEvent::ProductionChanged {
                    player: after.id.clone(),
                    changes,
                });
            }
            if after.terraform_rating != before.terraform_rating {
                events.push(DomainEvent::TerraformRatingChanged {
                    player: after.id.clone(),
                    old: before.terraform_rating,
                    new: after.terraform_rating,
                });
            }

            let cards: BTreeSet<&CardId> =
                before.storage.keys().chain(after.storage.keys()).collect();
            for card in cards {
                let old = before.storage.get(card).copied().unwrap_or(0);
                let new = after.storage_of(card);
                if old != new {
                    events.push(DomainEvent::ResourceStorageChanged {
                        player: after.id.clone(),
                        card: card.clone(),
                        old,
                        new,
                    });
                }
            }
        }

        let global = [
            (self.global.temperature, state.global.temperature),
            (self.global.oxygen, state.global.oxygen),
            (self.global.oceans, state.global.oceans),
        ];
        for (index, (old, new)) in global.into_iter().enumerate() {
            if old == new {
                continue;
            }
            let player = actor.clone();
            events.push(match index {
                0 => DomainEvent::TemperatureChanged { player, old, new },
                1 => DomainEvent::OxygenChanged { player, old, new },
                _ => DomainEvent::OceansChanged { player, old, new },
            });
        }
    }
}
