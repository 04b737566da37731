//! Command execution pipeline.
//!
//! The [`GameEngine`] is the authoritative reducer for [`GameState`]. Every
//! command runs pre_validate → apply → event dispatch → post_validate; a
//! failure at any stage restores the state captured before the command, so
//! callers never observe a partially applied command. Turn scheduling,
//! production and final scoring are not separate entry points: they run
//! inside the command that triggers them.

mod awards;
mod command;
mod errors;
mod lifecycle;
mod play;
mod production;
mod projects;
mod scoring;
mod tiles;
mod transition;
mod turns;

pub use awards::{ClaimMilestone, FundAward, award_metric, award_points, next_award_cost};
pub use command::{Command, CommandKind};
pub use errors::{ExecuteError, TransitionPhase, TransitionPhaseError};
pub use lifecycle::{SelectCorporation, SelectStartingCards, StartGame};
pub use play::{PlayCard, UseCardAction};
pub use production::ConfirmProductionCards;
pub use projects::{
    BuyStandardProject, ConvertHeatToTemperature, ConvertPlantsToGreenery, SellPatents,
    conversion_cost, discounted_project_cost, standard_project_cost,
};
pub use scoring::compute_final_scores;
pub use tiles::{AppendTilePlacement, PlaceTile};
pub use transition::{Transition, TransitionContext, check_invariants};
pub use turns::EndTurn;

use tracing::{debug, warn};

use crate::env::GameEnv;
use crate::events::{DomainEvent, EventBus};
use crate::state::{
    CalculatedOutput, GameChanges, GameState, PlayerId, SourceKind, StateDiff, TriggeredEffect,
};

/// Everything a successful command produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Delivered events, including follow-ups raised by subscribers.
    pub events: Vec<DomainEvent>,
    /// Structured before/after delta.
    pub changes: GameChanges,
    pub calculated_outputs: Vec<CalculatedOutput>,
    /// Standing effects that fired during dispatch.
    pub triggered_effects: Vec<TriggeredEffect>,
    pub source: String,
    pub source_kind: SourceKind,
    pub actor: Option<PlayerId>,
    pub description: String,
    pub choice_index: Option<usize>,
}

impl ExecutionOutcome {
    /// Builds the diff-log entry; the log assigns the sequence number.
    pub fn to_diff(&self, timestamp_ms: i64, state_root: Option<String>) -> StateDiff {
        StateDiff {
            sequence: 0,
            timestamp_ms,
            state_root,
            source: self.source.clone(),
            source_kind: self.source_kind,
            actor: self.actor.clone(),
            description: self.description.clone(),
            choice_index: self.choice_index,
            calculated_outputs: self.calculated_outputs.clone(),
            triggered_effects: self.triggered_effects.clone(),
            changes: self.changes.clone(),
        }
    }
}

/// Runs commands against one game's state.
pub struct GameEngine<'a> {
    state: &'a mut GameState,
    bus: &'a EventBus,
}

impl<'a> GameEngine<'a> {
    pub fn new(state: &'a mut GameState, bus: &'a EventBus) -> Self {
        Self { state, bus }
    }

    /// Executes `command`, rolling back on any failure.
    pub fn execute(
        &mut self,
        env: GameEnv<'_>,
        command: &Command,
    ) -> Result<ExecutionOutcome, ExecuteError> {
        let kind = command.kind();
        let before = self.state.clone();

        match self.run(env, command) {
            Ok((events, calculated_outputs, description)) => {
                let changes = GameChanges::from_states(&before, self.state);
                debug!(
                    target: "terra::engine",
                    game_id = %self.state.id,
                    command = %kind,
                    events = events.len(),
                    "command executed"
                );
                let triggered_effects = triggered_effects(&events);
                Ok(ExecutionOutcome {
                    events,
                    changes,
                    calculated_outputs,
                    triggered_effects,
                    source: command.source(),
                    source_kind: command.source_kind(),
                    actor: command.actor().cloned(),
                    description: if description.is_empty() {
                        kind.to_string()
                    } else {
                        description
                    },
                    choice_index: command.choice_index(),
                })
            }
            Err(error) => {
                *self.state = before;
                warn!(
                    target: "terra::engine",
                    game_id = %self.state.id,
                    command = %kind,
                    phase = ?error.phase(),
                    %error,
                    "command rejected"
                );
                Err(error)
            }
        }
    }

    fn run(
        &mut self,
        env: GameEnv<'_>,
        command: &Command,
    ) -> Result<(Vec<DomainEvent>, Vec<CalculatedOutput>, String), ExecuteError> {
        let kind = command.kind();
        let transition = command.transition();

        transition
            .pre_validate(self.state, env)
            .map_err(|e| ExecuteError::transition(kind, TransitionPhase::PreValidate, e))?;

        let mut ctx = TransitionContext::new(&mut *self.state, env);
        transition
            .apply(&mut ctx)
            .map_err(|e| ExecuteError::transition(kind, TransitionPhase::Apply, e))?;
        let TransitionContext {
            log, description, ..
        } = ctx;

        let events = self
            .bus
            .dispatch(self.state, env, log.events)
            .map_err(|error| ExecuteError::Dispatch {
                command: kind,
                error,
            })?;

        transition
            .post_validate(self.state)
            .map_err(|e| ExecuteError::transition(kind, TransitionPhase::PostValidate, e))?;

        Ok((events, log.calculated, description))
    }
}

fn triggered_effects(events: &[DomainEvent]) -> Vec<TriggeredEffect> {
    events
        .iter()
        .filter_map(|event| match event {
            DomainEvent::PassiveEffectTriggered {
                player,
                card,
                behavior_index,
                outputs,
            } => Some(TriggeredEffect::new(
                player.clone(),
                card.clone(),
                *behavior_index,
                outputs.clone(),
            )),
            _ => None,
        })
        .collect()
}
