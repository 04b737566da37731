//! Card definitions as supplied by the catalog.
//!
//! The engine never loads card data itself; it receives fully built [`Card`]
//! values through [`crate::env::CardCatalog`]. Everything a card does is data:
//! requirements gate the play, behaviors describe the effects, and VP
//! conditions feed the player's granters.

mod behavior;
mod requirement;
mod selector;

pub use behavior::{
    CardBehavior, CardTarget, Choice, ConditionTarget, Input, Output, OutputKind, PerCondition,
    PlayerTarget, Quantity, Trigger, TriggerCondition, TriggerEvent,
};
pub use requirement::{Requirement, RequirementKind};
pub use selector::{Selector, StandardProject};

use crate::state::{CardId, ResourceSet};
use crate::vp::VpCondition;

/// Category label printed on a card.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Tag {
    Space,
    Earth,
    Science,
    Power,
    Building,
    Microbe,
    Animal,
    Plant,
    Event,
    City,
    Venus,
    Jovian,
    Wildlife,
    Wild,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum CardKind {
    Automated,
    Active,
    Event,
    Corporation,
    Prelude,
}

/// Resource kinds that live on a card rather than in the player's ledger.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum StorageKind {
    Animals,
    Microbes,
    Floaters,
    Science,
    Asteroids,
}

/// Declares that a card can hold resources of one kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceStorage {
    pub kind: StorageKind,
    /// Amount placed on the card when it is played.
    pub starting: u32,
}

/// Immutable card definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub kind: CardKind,
    /// Printed cost in credits before discounts.
    pub cost: i32,
    pub tags: Vec<Tag>,
    pub requirements: Vec<Requirement>,
    /// Behaviors in catalog order; resolution never re-sorts them.
    pub behaviors: Vec<CardBehavior>,
    pub storage: Option<ResourceStorage>,
    pub vp: Vec<VpCondition>,
    /// Corporation only: resources granted on selection.
    pub starting_resources: ResourceSet,
    /// Corporation only: production granted on selection.
    pub starting_production: ResourceSet,
}

impl Card {
    pub fn new(id: impl Into<CardId>, name: impl Into<String>, kind: CardKind, cost: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            cost,
            tags: Vec::new(),
            requirements: Vec::new(),
            behaviors: Vec::new(),
            storage: None,
            vp: Vec::new(),
            starting_resources: ResourceSet::ZERO,
            starting_production: ResourceSet::ZERO,
        }
    }

    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    #[must_use]
    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    #[must_use]
    pub fn with_behavior(mut self, behavior: CardBehavior) -> Self {
        self.behaviors.push(behavior);
        self
    }

    #[must_use]
    pub fn with_storage(mut self, kind: StorageKind, starting: u32) -> Self {
        self.storage = Some(ResourceStorage { kind, starting });
        self
    }

    #[must_use]
    pub fn with_vp(mut self, condition: VpCondition) -> Self {
        self.vp.push(condition);
        self
    }

    #[must_use]
    pub fn with_starting_resources(mut self, resources: ResourceSet) -> Self {
        self.starting_resources = resources;
        self
    }

    #[must_use]
    pub fn with_starting_production(mut self, production: ResourceSet) -> Self {
        self.starting_production = production;
        self
    }

    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    /// Steel only pays for building cards.
    pub fn allows_steel(&self) -> bool {
        self.has_tag(Tag::Building)
    }

    /// Titanium only pays for space cards.
    pub fn allows_titanium(&self) -> bool {
        self.has_tag(Tag::Space)
    }

    pub fn is_corporation(&self) -> bool {
        self.kind == CardKind::Corporation
    }
}
