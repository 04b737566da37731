//! Deterministic rules engine for a terraforming board game.
//!
//! `terra-core` owns the canonical game state and every legal transition on
//! it: playing cards, resolving card behaviors, turn and generation flow,
//! production, milestones, awards and final scoring. It has no I/O and no
//! clock; collaborators (card catalog, board, deck) are injected through
//! [`env::GameEnv`]. All state mutation flows through
//! [`engine::GameEngine`], which also dispatches domain events to the
//! in-process [`events::EventBus`].
pub mod behavior;
pub mod card;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod events;
pub mod modifier;
pub mod payment;
pub mod state;
pub mod vp;

#[cfg(test)]
pub(crate) mod testing;

pub use behavior::{BehaviorSource, ResolutionLog, ResolveOptions};
pub use card::{
    Card, CardBehavior, CardKind, Input, Output, Requirement, RequirementKind, Selector,
    StandardProject, Tag, Trigger, TriggerCondition, TriggerEvent,
};
pub use config::GameConfig;
pub use engine::{
    AppendTilePlacement, BuyStandardProject, ClaimMilestone, Command, CommandKind,
    ConfirmProductionCards, ConvertHeatToTemperature, ConvertPlantsToGreenery, EndTurn,
    ExecuteError, ExecutionOutcome, FundAward, GameEngine, PlaceTile, PlayCard, SelectCorporation,
    SelectStartingCards, SellPatents, StartGame, TransitionPhase, TransitionPhaseError,
    UseCardAction,
};
pub use env::{BoardService, CardCatalog, DeckService, GameEnv};
pub use error::{Entity, ErrorKind, ErrorSeverity, GameError, RulesError};
pub use events::{DomainEvent, EventBus, EventKind, EventSubscriber, SubscriberCriticality};
pub use payment::{Payment, PaymentRates, PaymentRules};
pub use state::{
    Award, CardId, DiffLog, FinalScores, GameId, GamePhase, GameState, GameStatus,
    GlobalParameter, HexId, Milestone, PlacementBonus, PlayerId, PlayerState, ResourceKind,
    ResourceSet, SourceKind, StateDiff, TileKind,
};
pub use vp::{VpCondition, VpGranter};
