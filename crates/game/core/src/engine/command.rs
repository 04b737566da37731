//! Commands accepted by [`super::GameEngine::execute`].
//!
//! Each command is a plain struct implementing [`Transition`]; [`Command`]
//! wraps them so the runtime can queue, log and serialize commands uniformly.

use super::awards::{ClaimMilestone, FundAward};
use super::lifecycle::{SelectCorporation, SelectStartingCards, StartGame};
use super::play::{PlayCard, UseCardAction};
use super::production::ConfirmProductionCards;
use super::projects::{
    BuyStandardProject, ConvertHeatToTemperature, ConvertPlantsToGreenery, SellPatents,
};
use super::tiles::{AppendTilePlacement, PlaceTile};
use super::transition::Transition;
use super::turns::EndTurn;
use crate::card::StandardProject;
use crate::state::{PlayerId, SourceKind};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Command {
    StartGame(StartGame),
    SelectStartingCards(SelectStartingCards),
    SelectCorporation(SelectCorporation),
    PlayCard(PlayCard),
    UseCardAction(UseCardAction),
    SellPatents(SellPatents),
    BuyStandardProject(BuyStandardProject),
    ConvertPlantsToGreenery(ConvertPlantsToGreenery),
    ConvertHeatToTemperature(ConvertHeatToTemperature),
    EndTurn(EndTurn),
    AppendTilePlacement(AppendTilePlacement),
    PlaceTile(PlaceTile),
    ConfirmProductionCards(ConfirmProductionCards),
    ClaimMilestone(ClaimMilestone),
    FundAward(FundAward),
}

/// Discriminant of [`Command`], used in errors and logs.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum CommandKind {
    StartGame,
    SelectStartingCards,
    SelectCorporation,
    PlayCard,
    UseCardAction,
    SellPatents,
    BuyStandardProject,
    ConvertPlantsToGreenery,
    ConvertHeatToTemperature,
    EndTurn,
    AppendTilePlacement,
    PlaceTile,
    ConfirmProductionCards,
    ClaimMilestone,
    FundAward,
}

impl Command {
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::StartGame(_) => CommandKind::StartGame,
            Self::SelectStartingCards(_) => CommandKind::SelectStartingCards,
            Self::SelectCorporation(_) => CommandKind::SelectCorporation,
            Self::PlayCard(_) => CommandKind::PlayCard,
            Self::UseCardAction(_) => CommandKind::UseCardAction,
            Self::SellPatents(_) => CommandKind::SellPatents,
            Self::BuyStandardProject(_) => CommandKind::BuyStandardProject,
            Self::ConvertPlantsToGreenery(_) => CommandKind::ConvertPlantsToGreenery,
            Self::ConvertHeatToTemperature(_) => CommandKind::ConvertHeatToTemperature,
            Self::EndTurn(_) => CommandKind::EndTurn,
            Self::AppendTilePlacement(_) => CommandKind::AppendTilePlacement,
            Self::PlaceTile(_) => CommandKind::PlaceTile,
            Self::ConfirmProductionCards(_) => CommandKind::ConfirmProductionCards,
            Self::ClaimMilestone(_) => CommandKind::ClaimMilestone,
            Self::FundAward(_) => CommandKind::FundAward,
        }
    }

    pub(crate) fn transition(&self) -> &dyn Transition {
        match self {
            Self::StartGame(t) => t,
            Self::SelectStartingCards(t) => t,
            Self::SelectCorporation(t) => t,
            Self::PlayCard(t) => t,
            Self::UseCardAction(t) => t,
            Self::SellPatents(t) => t,
            Self::BuyStandardProject(t) => t,
            Self::ConvertPlantsToGreenery(t) => t,
            Self::ConvertHeatToTemperature(t) => t,
            Self::EndTurn(t) => t,
            Self::AppendTilePlacement(t) => t,
            Self::PlaceTile(t) => t,
            Self::ConfirmProductionCards(t) => t,
            Self::ClaimMilestone(t) => t,
            Self::FundAward(t) => t,
        }
    }

    /// The player issuing the command; `None` for game-level commands.
    pub fn actor(&self) -> Option<&PlayerId> {
        match self {
            Self::StartGame(_) => None,
            Self::SelectStartingCards(c) => Some(&c.player),
            Self::SelectCorporation(c) => Some(&c.player),
            Self::PlayCard(c) => Some(&c.player),
            Self::UseCardAction(c) => Some(&c.player),
            Self::SellPatents(c) => Some(&c.player),
            Self::BuyStandardProject(c) => Some(&c.player),
            Self::ConvertPlantsToGreenery(c) => Some(&c.player),
            Self::ConvertHeatToTemperature(c) => Some(&c.player),
            Self::EndTurn(c) => Some(&c.player),
            Self::AppendTilePlacement(c) => Some(&c.player),
            Self::PlaceTile(c) => Some(&c.player),
            Self::ConfirmProductionCards(c) => Some(&c.player),
            Self::ClaimMilestone(c) => Some(&c.player),
            Self::FundAward(c) => Some(&c.player),
        }
    }

    pub const fn source_kind(&self) -> SourceKind {
        match self {
            Self::PlayCard(_) => SourceKind::CardPlay,
            Self::UseCardAction(_) => SourceKind::CardAction,
            Self::SelectCorporation(_) => SourceKind::Corporation,
            Self::SellPatents(_) | Self::BuyStandardProject(_) => SourceKind::StandardProject,
            Self::ConvertPlantsToGreenery(_) | Self::ConvertHeatToTemperature(_) => {
                SourceKind::ResourceConversion
            }
            Self::AppendTilePlacement(_) | Self::PlaceTile(_) => SourceKind::TilePlacement,
            Self::ClaimMilestone(_) => SourceKind::Milestone,
            Self::FundAward(_) => SourceKind::Award,
            Self::StartGame(_)
            | Self::SelectStartingCards(_)
            | Self::EndTurn(_)
            | Self::ConfirmProductionCards(_) => SourceKind::GameEvent,
        }
    }

    /// Identifier of what caused the change: a card, project, milestone,
    /// award or the command itself.
    pub fn source(&self) -> String {
        match self {
            Self::PlayCard(c) => c.card.to_string(),
            Self::UseCardAction(c) => c.card.to_string(),
            Self::SelectCorporation(c) => c.corporation.to_string(),
            Self::SellPatents(_) => StandardProject::SellPatents.to_string(),
            Self::BuyStandardProject(c) => c.project.to_string(),
            Self::ConvertPlantsToGreenery(_) => {
                StandardProject::ConvertPlantsToGreenery.to_string()
            }
            Self::ConvertHeatToTemperature(_) => {
                StandardProject::ConvertHeatToTemperature.to_string()
            }
            Self::AppendTilePlacement(c) => c.source.clone(),
            Self::ClaimMilestone(c) => c.milestone.to_string(),
            Self::FundAward(c) => c.award.to_string(),
            other => other.kind().to_string(),
        }
    }

    pub fn choice_index(&self) -> Option<usize> {
        match self {
            Self::PlayCard(c) => c.options.choice_index,
            Self::UseCardAction(c) => c.options.choice_index,
            Self::SelectCorporation(c) => c.options.choice_index,
            _ => None,
        }
    }
}

macro_rules! impl_from_command {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl From<$variant> for Command {
                fn from(command: $variant) -> Self {
                    Self::$variant(command)
                }
            }
        )+
    };
}

impl_from_command!(
    StartGame,
    SelectStartingCards,
    SelectCorporation,
    PlayCard,
    UseCardAction,
    SellPatents,
    BuyStandardProject,
    ConvertPlantsToGreenery,
    ConvertHeatToTemperature,
    EndTurn,
    AppendTilePlacement,
    PlaceTile,
    ConfirmProductionCards,
    ClaimMilestone,
    FundAward,
);
