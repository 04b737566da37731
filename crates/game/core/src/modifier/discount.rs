use std::collections::BTreeMap;

use crate::card::{Card, Output, StandardProject};
use crate::config::GameConfig;
use crate::state::{PlayerState, ResourceKind};

/// Total discount the player's effects grant on `card`.
pub fn card_discount(player: &PlayerState, card: &Card) -> i32 {
    player
        .effect_outputs()
        .map(|output| match output {
            Output::Discount { amount, selector } if selector.matches_card(card) => *amount,
            _ => 0,
        })
        .sum()
}

/// Printed cost minus discounts, never below zero.
pub fn effective_cost(player: &PlayerState, card: &Card) -> i32 {
    (card.cost - card_discount(player, card)).max(0)
}

/// Discounts on a standard project, keyed by the resource they reduce.
pub fn standard_project_discounts(
    player: &PlayerState,
    project: StandardProject,
) -> BTreeMap<ResourceKind, i32> {
    let mut discounts = BTreeMap::new();
    for output in player.effect_outputs() {
        if let Output::Discount { amount, selector } = output {
            if !selector.matches_project(project) {
                continue;
            }
            for resource in selector.discounted_resources() {
                *discounts.entry(resource).or_insert(0) += amount;
            }
        }
    }
    discounts
}

/// Credits per adjacent ocean when this player places a tile.
pub fn ocean_adjacency_bonus(player: &PlayerState) -> i32 {
    let extra: i32 = player
        .effect_outputs()
        .map(|output| match output {
            Output::OceanAdjacencyBonus { amount } => *amount,
            _ => 0,
        })
        .sum();
    GameConfig::OCEAN_ADJACENCY_CREDITS as i32 + extra
}
