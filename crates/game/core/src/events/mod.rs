//! Domain events and the synchronous in-process bus that delivers them.
//!
//! Transitions record what happened as [`DomainEvent`]s. The [`EventBus`]
//! hands each event to interested subscribers inside the same mutation
//! window, so VP totals and passive effects are up to date before the command
//! returns. Runtime layers receive the full list of delivered events from the
//! engine and forward them to external listeners.
mod bus;
mod subscribers;

pub use bus::{DispatchContext, DispatchError, EventBus, EventSubscriber, SubscriberCriticality};
pub use subscribers::{PassiveEffectSubscriber, VpRecalculationSubscriber};

use crate::card::{CardKind, StandardProject, Tag};
use crate::state::{
    Award, CalculatedOutput, CardId, GamePhase, GameStatus, HexId, Milestone, PlacementBonus,
    PlayerId, ResourceChange, TileKind,
};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DomainEvent {
    /// All ledger deltas of one player from one resolution step.
    ResourcesChanged {
        player: PlayerId,
        changes: Vec<ResourceChange>,
    },
    ProductionChanged {
        player: PlayerId,
        changes: Vec<ResourceChange>,
    },
    TerraformRatingChanged {
        player: PlayerId,
        old: i32,
        new: i32,
    },
    TemperatureChanged {
        player: PlayerId,
        old: i32,
        new: i32,
    },
    OxygenChanged {
        player: PlayerId,
        old: i32,
        new: i32,
    },
    OceansChanged {
        player: PlayerId,
        old: i32,
        new: i32,
    },
    CardPlayed {
        player: PlayerId,
        card: CardId,
        kind: CardKind,
        tags: Vec<Tag>,
    },
    CardActionUsed {
        player: PlayerId,
        card: CardId,
        behavior_index: usize,
    },
    /// A standard project or resource conversion was paid for.
    StandardProjectUsed {
        player: PlayerId,
        project: StandardProject,
    },
    CardsAddedToHand {
        player: PlayerId,
        cards: Vec<CardId>,
    },
    CorporationSelected {
        player: PlayerId,
        corporation: CardId,
    },
    PlayerEffectsChanged {
        player: PlayerId,
    },
    /// A standing effect of `player` fired in response to another event.
    PassiveEffectTriggered {
        player: PlayerId,
        card: CardId,
        behavior_index: usize,
        outputs: Vec<CalculatedOutput>,
    },
    ResourceStorageChanged {
        player: PlayerId,
        card: CardId,
        old: u32,
        new: u32,
    },
    TilePlacementQueued {
        player: PlayerId,
        tiles: Vec<TileKind>,
        source: String,
    },
    TilePlaced {
        player: PlayerId,
        tile: TileKind,
        hex: HexId,
    },
    PlacementBonusGained {
        player: PlayerId,
        hex: HexId,
        bonus: PlacementBonus,
    },
    VictoryPointsChanged {
        player: PlayerId,
        old: i32,
        new: i32,
    },
    MilestoneClaimed {
        player: PlayerId,
        milestone: Milestone,
    },
    AwardFunded {
        player: PlayerId,
        award: Award,
    },
    GameStatusChanged {
        old: GameStatus,
        new: GameStatus,
    },
    GamePhaseChanged {
        old: GamePhase,
        new: GamePhase,
    },
    GenerationAdvanced {
        generation: u32,
    },
    TurnChanged {
        player: PlayerId,
        actions_remaining: i32,
    },
    PlayerPassed {
        player: PlayerId,
    },
    GameEnded {
        winners: Vec<PlayerId>,
        is_tie: bool,
    },
}

/// Discriminant of [`DomainEvent`]; the unit subscriptions are keyed by.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
    ResourcesChanged,
    ProductionChanged,
    TerraformRatingChanged,
    TemperatureChanged,
    OxygenChanged,
    OceansChanged,
    CardPlayed,
    CardActionUsed,
    StandardProjectUsed,
    CardsAddedToHand,
    CorporationSelected,
    PlayerEffectsChanged,
    PassiveEffectTriggered,
    ResourceStorageChanged,
    TilePlacementQueued,
    TilePlaced,
    PlacementBonusGained,
    VictoryPointsChanged,
    MilestoneClaimed,
    AwardFunded,
    GameStatusChanged,
    GamePhaseChanged,
    GenerationAdvanced,
    TurnChanged,
    PlayerPassed,
    GameEnded,
}

impl DomainEvent {
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ResourcesChanged { .. } => EventKind::ResourcesChanged,
            Self::ProductionChanged { .. } => EventKind::ProductionChanged,
            Self::TerraformRatingChanged { .. } => EventKind::TerraformRatingChanged,
            Self::TemperatureChanged { .. } => EventKind::TemperatureChanged,
            Self::OxygenChanged { .. } => EventKind::OxygenChanged,
            Self::OceansChanged { .. } => EventKind::OceansChanged,
            Self::CardPlayed { .. } => EventKind::CardPlayed,
            Self::CardActionUsed { .. } => EventKind::CardActionUsed,
            Self::StandardProjectUsed { .. } => EventKind::StandardProjectUsed,
            Self::CardsAddedToHand { .. } => EventKind::CardsAddedToHand,
            Self::CorporationSelected { .. } => EventKind::CorporationSelected,
            Self::PlayerEffectsChanged { .. } => EventKind::PlayerEffectsChanged,
            Self::PassiveEffectTriggered { .. } => EventKind::PassiveEffectTriggered,
            Self::ResourceStorageChanged { .. } => EventKind::ResourceStorageChanged,
            Self::TilePlacementQueued { .. } => EventKind::TilePlacementQueued,
            Self::TilePlaced { .. } => EventKind::TilePlaced,
            Self::PlacementBonusGained { .. } => EventKind::PlacementBonusGained,
            Self::VictoryPointsChanged { .. } => EventKind::VictoryPointsChanged,
            Self::MilestoneClaimed { .. } => EventKind::MilestoneClaimed,
            Self::AwardFunded { .. } => EventKind::AwardFunded,
            Self::GameStatusChanged { .. } => EventKind::GameStatusChanged,
            Self::GamePhaseChanged { .. } => EventKind::GamePhaseChanged,
            Self::GenerationAdvanced { .. } => EventKind::GenerationAdvanced,
            Self::TurnChanged { .. } => EventKind::TurnChanged,
            Self::PlayerPassed { .. } => EventKind::PlayerPassed,
            Self::GameEnded { .. } => EventKind::GameEnded,
        }
    }

    /// The player the event is about, if any.
    pub fn player(&self) -> Option<&PlayerId> {
        match self {
            Self::ResourcesChanged { player, .. }
            | Self::ProductionChanged { player, .. }
            | Self::TerraformRatingChanged { player, .. }
            | Self::TemperatureChanged { player, .. }
            | Self::OxygenChanged { player, .. }
            | Self::OceansChanged { player, .. }
            | Self::CardPlayed { player, .. }
            | Self::CardActionUsed { player, .. }
            | Self::StandardProjectUsed { player, .. }
            | Self::CardsAddedToHand { player, .. }
            | Self::CorporationSelected { player, .. }
            | Self::PlayerEffectsChanged { player }
            | Self::PassiveEffectTriggered { player, .. }
            | Self::ResourceStorageChanged { player, .. }
            | Self::TilePlacementQueued { player, .. }
            | Self::TilePlaced { player, .. }
            | Self::PlacementBonusGained { player, .. }
            | Self::VictoryPointsChanged { player, .. }
            | Self::MilestoneClaimed { player, .. }
            | Self::AwardFunded { player, .. }
            | Self::TurnChanged { player, .. }
            | Self::PlayerPassed { player } => Some(player),
            Self::GameStatusChanged { .. }
            | Self::GamePhaseChanged { .. }
            | Self::GenerationAdvanced { .. }
            | Self::GameEnded { .. } => None,
        }
    }
}
