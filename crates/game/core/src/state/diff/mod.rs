//! Append-only log of structured state deltas.
//!
//! Every successful command produces one [`StateDiff`]: what caused it, the
//! scaled outputs it computed, and a [`GameChanges`] delta built by comparing
//! the state before and after. Transport layers replay the log to build
//! per-player views.
mod changes;
mod fields;

pub use changes::{Change, GameChanges, PlayerChanges};
pub use fields::{GameFields, PlayerFields};

use crate::card::OutputKind;
use crate::state::{CardId, PlayerId};

/// What kind of activity produced a diff.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case")]
pub enum SourceKind {
    CardPlay,
    CardAction,
    Corporation,
    TilePlacement,
    Milestone,
    Award,
    StandardProject,
    /// Plants to greenery, heat to temperature.
    ResourceConversion,
    /// A standing effect reacting to another command.
    PassiveEffect,
    /// Lifecycle, turn and production steps.
    GameEvent,
    /// Game creation and players joining.
    Initial,
}

/// An output after `per` scaling, as it was actually applied.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalculatedOutput {
    pub card: CardId,
    pub kind: OutputKind,
    pub amount: i32,
}

/// A standing effect that fired while a command was being dispatched.
///
/// Its outputs are kept apart from the command's own so the log can tell
/// what the player did from what their cards did in response.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriggeredEffect {
    /// Always [`SourceKind::PassiveEffect`].
    pub source_kind: SourceKind,
    pub player: PlayerId,
    pub card: CardId,
    pub behavior_index: usize,
    pub calculated_outputs: Vec<CalculatedOutput>,
}

impl TriggeredEffect {
    pub fn new(
        player: PlayerId,
        card: CardId,
        behavior_index: usize,
        calculated_outputs: Vec<CalculatedOutput>,
    ) -> Self {
        Self {
            source_kind: SourceKind::PassiveEffect,
            player,
            card,
            behavior_index,
            calculated_outputs,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateDiff {
    /// Assigned by [`DiffLog::append`], starting at 1.
    pub sequence: u64,
    /// Milliseconds since the Unix epoch; zero when the caller has no clock.
    pub timestamp_ms: i64,
    /// Hex digest of the state after the command, when the caller computes one.
    pub state_root: Option<String>,
    pub source: String,
    pub source_kind: SourceKind,
    pub actor: Option<PlayerId>,
    pub description: String,
    pub choice_index: Option<usize>,
    pub calculated_outputs: Vec<CalculatedOutput>,
    /// Standing effects that fired in response, in firing order.
    pub triggered_effects: Vec<TriggeredEffect>,
    pub changes: GameChanges,
}

/// Ordered diffs of one game.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DiffLog {
    entries: Vec<StateDiff>,
}

impl DiffLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps the next sequence number on `diff` and stores it.
    pub fn append(&mut self, mut diff: StateDiff) -> u64 {
        diff.sequence = self.latest_sequence() + 1;
        let sequence = diff.sequence;
        self.entries.push(diff);
        sequence
    }

    /// Entries with a sequence number strictly greater than `sequence`.
    pub fn since(&self, sequence: u64) -> &[StateDiff] {
        let start = self.entries.partition_point(|d| d.sequence <= sequence);
        &self.entries[start..]
    }

    pub fn latest_sequence(&self) -> u64 {
        self.entries.last().map_or(0, |d| d.sequence)
    }

    pub fn entries(&self) -> &[StateDiff] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
