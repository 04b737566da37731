use core::fmt;

use super::Tag;
use crate::state::ResourceKind;

/// What a requirement measures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum RequirementKind {
    Temperature,
    Oxygen,
    Oceans,
    TerraformRating,
    /// Tag count across the player's played cards and corporation.
    Tags(Tag),
    Resource(ResourceKind),
    Production(ResourceKind),
    /// Cities owned by the player.
    Cities,
    /// Greeneries owned by the player.
    Greeneries,
    CardsInHand,
}

impl RequirementKind {
    /// Global requirements are the ones lenience effects can relax.
    pub const fn is_global(&self) -> bool {
        matches!(self, Self::Temperature | Self::Oxygen | Self::Oceans)
    }
}

impl fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => f.write_str("temperature"),
            Self::Oxygen => f.write_str("oxygen"),
            Self::Oceans => f.write_str("oceans"),
            Self::TerraformRating => f.write_str("terraform-rating"),
            Self::Tags(tag) => write!(f, "{tag}-tags"),
            Self::Resource(kind) => write!(f, "{kind}"),
            Self::Production(kind) => write!(f, "{kind}-production"),
            Self::Cities => f.write_str("cities"),
            Self::Greeneries => f.write_str("greeneries"),
            Self::CardsInHand => f.write_str("cards-in-hand"),
        }
    }
}

/// A min/max bound a card places on one measurement before it can be played.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Requirement {
    pub kind: RequirementKind,
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl Requirement {
    pub const fn min(kind: RequirementKind, min: i32) -> Self {
        Self {
            kind,
            min: Some(min),
            max: None,
        }
    }

    pub const fn max(kind: RequirementKind, max: i32) -> Self {
        Self {
            kind,
            min: None,
            max: Some(max),
        }
    }

    pub const fn between(kind: RequirementKind, min: i32, max: i32) -> Self {
        Self {
            kind,
            min: Some(min),
            max: Some(max),
        }
    }
}
