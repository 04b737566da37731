use super::{CardId, ResourceSet};

/// Cards and corporations offered to a player when the game starts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StartingSelection {
    pub offered_cards: Vec<CardId>,
    pub offered_corporations: Vec<CardId>,
    /// Cards the player decided to keep; `None` until they choose.
    pub kept_cards: Option<Vec<CardId>>,
}

impl StartingSelection {
    pub fn new(offered_cards: Vec<CardId>, offered_corporations: Vec<CardId>) -> Self {
        Self {
            offered_cards,
            offered_corporations,
            kept_cards: None,
        }
    }

    pub fn cards_chosen(&self) -> bool {
        self.kept_cards.is_some()
    }
}

/// Outcome of one player's production step plus the cards drawn for purchase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProductionSelection {
    pub available_cards: Vec<CardId>,
    pub selection_complete: bool,
    pub before: ResourceSet,
    pub after: ResourceSet,
    pub energy_converted: i32,
    pub credits_income: i32,
}
