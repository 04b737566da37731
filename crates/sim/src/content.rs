//! Built-in card set the simulator deals from.
//!
//! Small on purpose: three corporations and a couple dozen projects that
//! cover every behavior shape the engine knows (immediate outputs, tile
//! placements, repeatable actions, triggered effects, discounts and VP).

use terra_core::card::{PerCondition, Quantity, StorageKind};
use terra_core::{
    Card, CardBehavior, CardKind, GlobalParameter, Input, Output, Requirement, RequirementKind,
    ResourceKind, ResourceSet, Selector, Tag, TileKind, TriggerCondition, TriggerEvent,
    VpCondition,
};
use terra_runtime::StaticCatalog;

pub fn catalog() -> StaticCatalog {
    StaticCatalog::new(corporations().into_iter().chain(projects()))
}

fn corporations() -> Vec<Card> {
    vec![
        Card::new("tharsis-holdings", "Tharsis Holdings", CardKind::Corporation, 0)
            .with_tags([Tag::Building])
            .with_starting_resources(ResourceSet::credits(42))
            .with_starting_production(ResourceSet::ZERO.with(ResourceKind::Credits, 1)),
        Card::new("ecoline-farms", "Ecoline Farms", CardKind::Corporation, 0)
            .with_tags([Tag::Plant])
            .with_starting_resources(ResourceSet::credits(36).with(ResourceKind::Plants, 3))
            .with_starting_production(ResourceSet::ZERO.with(ResourceKind::Plants, 2)),
        Card::new("mining-guild", "Mining Guild", CardKind::Corporation, 0)
            .with_tags([Tag::Building, Tag::Building])
            .with_starting_resources(ResourceSet::credits(40).with(ResourceKind::Steel, 5))
            .with_starting_production(ResourceSet::ZERO.with(ResourceKind::Steel, 1)),
    ]
}

fn raise(parameter: GlobalParameter, steps: u32) -> Output {
    Output::GlobalParameter { parameter, steps }
}

fn tile(tile: TileKind, count: u32) -> Output {
    Output::TilePlacement { tile, count }
}

fn pay(kind: ResourceKind, amount: i32) -> Input {
    Input::Resource { kind, amount }
}

fn projects() -> Vec<Card> {
    vec![
        // ===== production =====
        Card::new("power-plant", "Power Plant", CardKind::Automated, 4)
            .with_tags([Tag::Power, Tag::Building])
            .with_behavior(CardBehavior::auto(vec![Output::production(
                ResourceKind::Energy,
                1,
            )])),
        Card::new("heater-array", "Heater Array", CardKind::Automated, 8)
            .with_tags([Tag::Building])
            .with_behavior(CardBehavior::auto(vec![Output::production(
                ResourceKind::Heat,
                2,
            )])),
        Card::new("mine-shaft", "Mine Shaft", CardKind::Automated, 6)
            .with_tags([Tag::Building])
            .with_behavior(CardBehavior::auto(vec![Output::production(
                ResourceKind::Steel,
                1,
            )])),
        Card::new("fuel-factory", "Fuel Factory", CardKind::Automated, 7)
            .with_tags([Tag::Building])
            .with_behavior(CardBehavior::auto(vec![Output::production(
                ResourceKind::Titanium,
                1,
            )])),
        Card::new("wind-farm", "Wind Farm", CardKind::Automated, 6)
            .with_tags([Tag::Power])
            .with_requirement(Requirement::min(RequirementKind::Oxygen, 2))
            .with_behavior(CardBehavior::auto(vec![
                Output::production(ResourceKind::Energy, 1),
                Output::production(ResourceKind::Credits, 1),
            ])),
        Card::new("trade-office", "Trade Office", CardKind::Automated, 10)
            .with_tags([Tag::Earth])
            .with_behavior(CardBehavior::auto(vec![Output::production(
                ResourceKind::Credits,
                3,
            )])),
        Card::new("soil-lab", "Soil Lab", CardKind::Automated, 11)
            .with_tags([Tag::Science, Tag::Plant])
            .with_behavior(CardBehavior::auto(vec![Output::production(
                ResourceKind::Plants,
                1,
            )]))
            .with_vp(VpCondition::per(1, PerCondition::new(Quantity::Tag(Tag::Plant), 2))),
        Card::new("research-lab", "Research Lab", CardKind::Automated, 9)
            .with_tags([Tag::Science, Tag::Building])
            .with_behavior(CardBehavior::auto(vec![Output::CardDraw { count: 2 }]))
            .with_vp(VpCondition::fixed(1)),
        // ===== tiles =====
        Card::new("tree-plantation", "Tree Plantation", CardKind::Automated, 15)
            .with_tags([Tag::Plant])
            .with_behavior(CardBehavior::auto(vec![
                tile(TileKind::Greenery, 1),
                Output::production(ResourceKind::Plants, 1),
            ]))
            .with_vp(VpCondition::fixed(1)),
        Card::new("city-block", "City Block", CardKind::Automated, 18)
            .with_tags([Tag::City, Tag::Building])
            .with_behavior(CardBehavior::auto(vec![
                tile(TileKind::City, 1),
                Output::production(ResourceKind::Credits, 2),
            ])),
        Card::new("lake-project", "Lake Project", CardKind::Event, 18)
            .with_tags([Tag::Event])
            .with_requirement(Requirement::min(RequirementKind::Temperature, -12))
            .with_behavior(CardBehavior::auto(vec![tile(TileKind::Ocean, 2)])),
        Card::new("ice-import", "Ice Import", CardKind::Event, 20)
            .with_tags([Tag::Space, Tag::Event])
            .with_behavior(CardBehavior::auto(vec![
                tile(TileKind::Ocean, 1),
                Output::resource(ResourceKind::Plants, 2),
            ])),
        // ===== global parameters =====
        Card::new("asteroid", "Asteroid", CardKind::Event, 14)
            .with_tags([Tag::Space, Tag::Event])
            .with_behavior(CardBehavior::auto(vec![
                raise(GlobalParameter::Temperature, 1),
                Output::resource(ResourceKind::Titanium, 2),
            ])),
        Card::new("comet", "Comet", CardKind::Event, 21)
            .with_tags([Tag::Space, Tag::Event])
            .with_behavior(CardBehavior::auto(vec![
                raise(GlobalParameter::Temperature, 1),
                tile(TileKind::Ocean, 1),
            ])),
        Card::new("big-asteroid", "Big Asteroid", CardKind::Event, 27)
            .with_tags([Tag::Space, Tag::Event])
            .with_behavior(CardBehavior::auto(vec![
                raise(GlobalParameter::Temperature, 2),
                Output::resource(ResourceKind::Titanium, 4),
            ])),
        Card::new("nitrogen-shipment", "Nitrogen Shipment", CardKind::Event, 16)
            .with_tags([Tag::Space, Tag::Event])
            .with_behavior(CardBehavior::auto(vec![
                raise(GlobalParameter::Oxygen, 1),
                Output::TerraformRating { amount: 1 },
                Output::resource(ResourceKind::Plants, 4),
            ])),
        // ===== repeatable actions =====
        Card::new("mirror-array", "Mirror Array", CardKind::Active, 13)
            .with_tags([Tag::Space])
            .with_behavior(CardBehavior::manual(
                vec![pay(ResourceKind::Credits, 7)],
                vec![raise(GlobalParameter::Temperature, 1)],
            )),
        Card::new("heat-exchanger", "Heat Exchanger", CardKind::Active, 9)
            .with_tags([Tag::Building])
            .with_behavior(CardBehavior::manual(
                vec![pay(ResourceKind::Heat, 8)],
                vec![raise(GlobalParameter::Temperature, 1)],
            )),
        Card::new("water-pump", "Water Pump", CardKind::Active, 12)
            .with_tags([Tag::Building])
            .with_behavior(CardBehavior::manual(
                vec![pay(ResourceKind::Credits, 12)],
                vec![tile(TileKind::Ocean, 1)],
            )),
        Card::new("algae-vats", "Algae Vats", CardKind::Active, 10)
            .with_tags([Tag::Plant])
            .with_behavior(CardBehavior::manual(
                vec![pay(ResourceKind::Plants, 8)],
                vec![tile(TileKind::Greenery, 1)],
            )),
        Card::new("oxygen-plant", "Oxygen Plant", CardKind::Active, 15)
            .with_tags([Tag::Power, Tag::Building])
            .with_behavior(CardBehavior::manual(
                vec![pay(ResourceKind::Credits, 10)],
                vec![raise(GlobalParameter::Oxygen, 1)],
            )),
        Card::new("predators", "Predators", CardKind::Active, 14)
            .with_tags([Tag::Animal])
            .with_storage(StorageKind::Animals, 0)
            .with_behavior(CardBehavior::manual(
                vec![],
                vec![Output::storage(StorageKind::Animals, 1)],
            ))
            .with_vp(VpCondition::per(1, PerCondition::new(Quantity::SelfStorage, 1))),
        // ===== effects =====
        Card::new("greenhouse-domes", "Greenhouse Domes", CardKind::Active, 11)
            .with_tags([Tag::Plant, Tag::Building])
            .with_behavior(CardBehavior::conditional(
                TriggerCondition::new(TriggerEvent::GreeneryPlaced),
                vec![Output::resource(ResourceKind::Plants, 2)],
            )),
        Card::new("space-elevator", "Space Elevator", CardKind::Active, 20)
            .with_tags([Tag::Space, Tag::Building])
            .with_behavior(CardBehavior::auto(vec![Output::Discount {
                amount: 2,
                selector: Selector::tags([Tag::Space]),
            }]))
            .with_vp(VpCondition::fixed(2)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn ids_are_unique() {
        let cards: Vec<Card> = corporations().into_iter().chain(projects()).collect();
        let ids: BTreeSet<_> = cards.iter().map(|card| card.id.clone()).collect();
        assert_eq!(ids.len(), cards.len());
    }

    #[test]
    fn every_player_can_be_offered_a_corporation() {
        let catalog = catalog();
        assert!(catalog.corporation_ids().len() >= 3);
        assert!(catalog.project_ids().len() >= 20);
    }
}
