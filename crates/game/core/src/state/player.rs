use std::collections::BTreeMap;

use super::{
    CardId, PlayerId, ProductionSelection, ResourceSet, StartingSelection, TileKind, TileQueue,
};
use crate::card::{Card, CardBehavior, CardKind, Output, Tag};
use crate::vp::VpGranters;

/// A card on the table, with the catalog data needed for tag counting cached.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayedCard {
    pub id: CardId,
    pub name: String,
    pub kind: CardKind,
    pub tags: Vec<Tag>,
}

impl PlayedCard {
    pub fn from_card(card: &Card) -> Self {
        Self {
            id: card.id.clone(),
            name: card.name.clone(),
            kind: card.kind,
            tags: card.tags.clone(),
        }
    }

    /// Number of `tag` occurrences that count while the card is on the table.
    pub fn counted(&self, tag: Tag) -> u32 {
        if self.kind == CardKind::Event && tag != Tag::Event {
            return 0;
        }
        self.tags.iter().filter(|t| **t == tag).count() as u32
    }
}

/// A passive or conditional behavior currently in force.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardEffect {
    pub card: CardId,
    pub card_name: String,
    pub behavior_index: usize,
    pub behavior: CardBehavior,
}

/// A manual behavior the player may invoke.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CardAction {
    pub card: CardId,
    pub card_name: String,
    pub behavior_index: usize,
    pub behavior: CardBehavior,
    pub times_used_this_turn: u32,
    pub times_used_this_generation: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub resources: ResourceSet,
    /// Never negative.
    pub production: ResourceSet,
    pub terraform_rating: i32,
    pub hand: Vec<CardId>,
    pub played_cards: Vec<PlayedCard>,
    pub corporation: Option<PlayedCard>,
    /// Resources stored on cards, keyed by card.
    pub storage: BTreeMap<CardId, u32>,
    pub effects: Vec<CardEffect>,
    pub actions: Vec<CardAction>,
    pub vp_granters: VpGranters,
    pub passed: bool,
    pub connected: bool,
    pub starting_selection: Option<StartingSelection>,
    pub production_selection: Option<ProductionSelection>,
    pub pending_tiles: Option<TileQueue>,
}

impl PlayerState {
    pub fn new(id: PlayerId, name: impl Into<String>, terraform_rating: i32) -> Self {
        Self {
            id,
            name: name.into(),
            resources: ResourceSet::ZERO,
            production: ResourceSet::ZERO,
            terraform_rating,
            hand: Vec::new(),
            played_cards: Vec::new(),
            corporation: None,
            storage: BTreeMap::new(),
            effects: Vec::new(),
            actions: Vec::new(),
            vp_granters: VpGranters::new(),
            passed: false,
            connected: true,
            starting_selection: None,
            production_selection: None,
            pending_tiles: None,
        }
    }

    pub fn has_in_hand(&self, card: &CardId) -> bool {
        self.hand.contains(card)
    }

    /// Removes one copy of `card` from the hand, returning whether it was there.
    pub fn remove_from_hand(&mut self, card: &CardId) -> bool {
        match self.hand.iter().position(|c| c == card) {
            Some(index) => {
                self.hand.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn has_played(&self, card: &CardId) -> bool {
        self.played_cards.iter().any(|c| &c.id == card)
            || self.corporation.as_ref().is_some_and(|c| &c.id == card)
    }

    /// Tag count across played cards and the corporation.
    pub fn tag_count(&self, tag: Tag) -> u32 {
        self.played_cards
            .iter()
            .chain(self.corporation.iter())
            .map(|card| card.counted(tag))
            .sum()
    }

    pub fn storage_of(&self, card: &CardId) -> u32 {
        self.storage.get(card).copied().unwrap_or(0)
    }

    pub fn find_action(&self, card: &CardId, behavior_index: usize) -> Option<&CardAction> {
        self.actions
            .iter()
            .find(|a| &a.card == card && a.behavior_index == behavior_index)
    }

    pub fn find_action_mut(
        &mut self,
        card: &CardId,
        behavior_index: usize,
    ) -> Option<&mut CardAction> {
        self.actions
            .iter_mut()
            .find(|a| &a.card == card && a.behavior_index == behavior_index)
    }

    pub fn find_effect(&self, card: &CardId, behavior_index: usize) -> Option<&CardEffect> {
        self.effects
            .iter()
            .find(|e| &e.card == card && e.behavior_index == behavior_index)
    }

    /// Outputs of every standing (non-conditional) effect, in registration order.
    pub fn effect_outputs(&self) -> impl Iterator<Item = &Output> {
        self.effects
            .iter()
            .filter(|effect| !effect.behavior.is_conditional())
            .flat_map(|effect| effect.behavior.outputs.iter())
    }

    pub fn has_pending_tiles(&self) -> bool {
        self.pending_tiles.as_ref().is_some_and(|q| !q.is_empty())
    }

    /// Appends tiles to the pending queue; the first request names the source.
    pub fn queue_tiles(&mut self, tiles: impl IntoIterator<Item = TileKind>, source: &str) {
        let queue = self
            .pending_tiles
            .get_or_insert_with(|| TileQueue::new(source));
        if queue.is_empty() {
            queue.source = source.to_owned();
        }
        queue.pending.extend(tiles);
    }

    /// Takes the next pending tile, dropping the queue once it is drained.
    pub fn pop_pending_tile(&mut self) -> Option<TileKind> {
        let queue = self.pending_tiles.as_mut()?;
        let tile = queue.pending.pop_front();
        if queue.is_empty() {
            self.pending_tiles = None;
        }
        tile
    }

    pub fn reset_turn_counters(&mut self) {
        for action in &mut self.actions {
            action.times_used_this_turn = 0;
        }
    }

    pub fn reset_generation_counters(&mut self) {
        for action in &mut self.actions {
            action.times_used_this_turn = 0;
            action.times_used_this_generation = 0;
        }
    }
}
