use std::collections::VecDeque;

use super::ResourceKind;

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
pub enum TileKind {
    Ocean,
    Greenery,
    City,
}

/// Whose tiles a count covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[strum(serialize_all = "kebab-case")]
pub enum TileScope {
    /// Every tile on the board.
    Board,
    /// Only tiles owned by the player being evaluated.
    Own,
}

/// Tiles a player still has to place, consumed front to back.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileQueue {
    /// Description of what queued the first pending tile.
    pub source: String,
    pub pending: VecDeque<TileKind>,
}

impl TileQueue {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            pending: VecDeque::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn front(&self) -> Option<TileKind> {
        self.pending.front().copied()
    }
}

/// Bonus printed on a board hex, awarded to whoever covers it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum PlacementBonus {
    Resource { kind: ResourceKind, amount: i32 },
    CardDraw { count: u32 },
}

/// What the board reports back after a tile has been placed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacementResult {
    pub bonuses: Vec<PlacementBonus>,
    /// Ocean tiles adjacent to the placed hex.
    pub adjacent_oceans: u32,
}
