//! Read models returned by service queries.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use terra_core::{CardId, PlayerId, PlayerState, ResourceSet};

/// One player's holdings as a client renders them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerLedger {
    pub player: PlayerId,
    pub name: String,
    pub resources: ResourceSet,
    pub production: ResourceSet,
    pub terraform_rating: i32,
    /// Sum of the player's VP granters as last recalculated.
    pub card_vp: i32,
    pub hand_size: usize,
    pub played_cards: Vec<CardId>,
    pub corporation: Option<CardId>,
    pub storage: BTreeMap<CardId, u32>,
    pub passed: bool,
}

impl From<&PlayerState> for PlayerLedger {
    fn from(player: &PlayerState) -> Self {
        Self {
            player: player.id.clone(),
            name: player.name.clone(),
            resources: player.resources,
            production: player.production,
            terraform_rating: player.terraform_rating,
            card_vp: player.vp_granters.total_computed_vp(),
            hand_size: player.hand.len(),
            played_cards: player.played_cards.iter().map(|c| c.id.clone()).collect(),
            corporation: player.corporation.as_ref().map(|c| c.id.clone()),
            storage: player.storage.clone(),
            passed: player.passed,
        }
    }
}
