use super::PlayerId;
use crate::card::{RequirementKind, Tag};

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
pub enum Milestone {
    Terraformer,
    Mayor,
    Gardener,
    Builder,
    Planner,
}

impl Milestone {
    /// Threshold the milestone's metric must reach before it can be claimed.
    pub const fn threshold(&self) -> u32 {
        match self {
            Self::Terraformer => 35,
            Self::Mayor => 3,
            Self::Gardener => 3,
            Self::Builder => 8,
            Self::Planner => 16,
        }
    }

    /// The measurement compared against [`Milestone::threshold`].
    pub const fn requirement(&self) -> RequirementKind {
        match self {
            Self::Terraformer => RequirementKind::TerraformRating,
            Self::Mayor => RequirementKind::Cities,
            Self::Gardener => RequirementKind::Greeneries,
            Self::Builder => RequirementKind::Tags(Tag::Building),
            Self::Planner => RequirementKind::CardsInHand,
        }
    }
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
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Award {
    Landlord,
    Banker,
    Scientist,
    Thermalist,
    Miner,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClaimedMilestone {
    pub milestone: Milestone,
    pub player: PlayerId,
    pub generation: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FundedAward {
    pub award: Award,
    pub funder: PlayerId,
    pub generation: u32,
}

/// Where a player's final victory points came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VpBreakdown {
    pub terraform_rating: i32,
    pub card_vp: i32,
    pub milestone_vp: i32,
    pub award_vp: i32,
    pub greenery_vp: i32,
    pub city_vp: i32,
}

impl VpBreakdown {
    pub const fn total(&self) -> i32 {
        self.terraform_rating
            + self.card_vp
            + self.milestone_vp
            + self.award_vp
            + self.greenery_vp
            + self.city_vp
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerScore {
    pub player: PlayerId,
    pub breakdown: VpBreakdown,
    pub total_vp: i32,
    /// Credits held at the end, used as tiebreaker.
    pub credits: i32,
    /// 1-based rank after sorting.
    pub placement: u32,
    pub is_winner: bool,
}

/// Frozen result of end-game scoring.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FinalScores {
    /// Sorted best first.
    pub scores: Vec<PlayerScore>,
    /// Top two players share both total VP and credits.
    pub is_tie: bool,
}

impl FinalScores {
    pub fn winners(&self) -> impl Iterator<Item = &PlayerScore> {
        self.scores.iter().filter(|s| s.is_winner)
    }
}
