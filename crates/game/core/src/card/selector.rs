use super::{Card, CardKind, Tag};
use crate::state::ResourceKind;

/// Fixed-cost actions available to every player regardless of hand.
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
pub enum StandardProject {
    SellPatents,
    PowerPlant,
    Asteroid,
    Aquifer,
    Greenery,
    City,
    ConvertPlantsToGreenery,
    ConvertHeatToTemperature,
}

/// Describes what a discount applies to.
///
/// A card matches when it carries any of `tags` or is any of `card_kinds`.
/// A selector with no card criteria and no standard projects applies to every
/// card. A selector naming only standard projects never applies to cards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Selector {
    pub tags: Vec<Tag>,
    pub card_kinds: Vec<CardKind>,
    pub standard_projects: Vec<StandardProject>,
    /// Resources a standard-project discount reduces; credits when empty.
    pub resources: Vec<ResourceKind>,
}

impl Selector {
    /// Selector that applies to every card.
    pub fn any_card() -> Self {
        Self::default()
    }

    pub fn tags(tags: impl IntoIterator<Item = Tag>) -> Self {
        Self {
            tags: tags.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn card_kinds(kinds: impl IntoIterator<Item = CardKind>) -> Self {
        Self {
            card_kinds: kinds.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn standard_project(project: StandardProject, resources: Vec<ResourceKind>) -> Self {
        Self {
            standard_projects: vec![project],
            resources,
            ..Self::default()
        }
    }

    pub fn has_card_criteria(&self) -> bool {
        !self.tags.is_empty() || !self.card_kinds.is_empty()
    }

    pub fn matches_card(&self, card: &Card) -> bool {
        if self.has_card_criteria() {
            let tag_match = self.tags.iter().any(|tag| card.has_tag(*tag));
            let kind_match = self.card_kinds.contains(&card.kind);
            return tag_match || kind_match;
        }
        self.standard_projects.is_empty()
    }

    pub fn matches_project(&self, project: StandardProject) -> bool {
        self.standard_projects.contains(&project)
    }

    /// Resources reduced when this selector discounts a standard project.
    pub fn discounted_resources(&self) -> Vec<ResourceKind> {
        if self.resources.is_empty() {
            vec![ResourceKind::Credits]
        } else {
            self.resources.clone()
        }
    }
}
