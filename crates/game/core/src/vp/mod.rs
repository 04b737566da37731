//! Victory-point granters.
//!
//! Each played card or corporation with VP conditions contributes one
//! [`VpGranter`] to its owner's [`VpGranters`]. Computed values are cached and
//! only refreshed by [`VpGranters::recalculate_all`]; nothing recalculates
//! implicitly. The engine calls it from the VP subscriber on the event bus.

mod facts;

pub use facts::{FactProvider, PlayerFacts};

use crate::card::{Card, PerCondition};
use crate::env::BoardService;
use crate::state::{CardId, GameState, PlayerId};

/// How a condition turns facts into points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum VpRule {
    Fixed,
    Per(PerCondition),
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VpCondition {
    pub amount: i32,
    pub rule: VpRule,
    /// Upper bound on how many times a `per` rule may trigger.
    pub max_trigger: Option<u32>,
    pub computed_value: i32,
}

impl VpCondition {
    pub const fn fixed(amount: i32) -> Self {
        Self {
            amount,
            rule: VpRule::Fixed,
            max_trigger: None,
            computed_value: 0,
        }
    }

    pub const fn per(amount: i32, per: PerCondition) -> Self {
        Self {
            amount,
            rule: VpRule::Per(per),
            max_trigger: None,
            computed_value: 0,
        }
    }

    #[must_use]
    pub const fn with_max_trigger(mut self, max: u32) -> Self {
        self.max_trigger = Some(max);
        self
    }

    fn evaluate(&self, card: &CardId, facts: &dyn FactProvider) -> i32 {
        match self.rule {
            VpRule::Fixed => self.amount,
            VpRule::Per(per) => {
                let observed = facts.observe(per.quantity, card);
                let mut triggers = per.triggers(observed);
                if let Some(max) = self.max_trigger {
                    triggers = triggers.min(max);
                }
                self.amount * triggers as i32
            }
        }
    }
}

/// VP rules contributed by one card.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VpGranter {
    pub card: CardId,
    pub card_name: String,
    pub conditions: Vec<VpCondition>,
    pub computed_value: i32,
}

impl VpGranter {
    /// Builds a granter from a card's VP conditions, `None` for cards without VP.
    pub fn from_card(card: &Card) -> Option<Self> {
        if card.vp.is_empty() {
            return None;
        }
        Some(Self {
            card: card.id.clone(),
            card_name: card.name.clone(),
            conditions: card.vp.clone(),
            computed_value: 0,
        })
    }
}

/// Ordered granters of one player.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VpGranters {
    granters: Vec<VpGranter>,
}

impl VpGranters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, granter: VpGranter) {
        self.granters.push(granter);
    }

    /// Inserts ahead of every other granter; used for corporations.
    pub fn prepend(&mut self, granter: VpGranter) {
        self.granters.insert(0, granter);
    }

    pub fn granters(&self) -> &[VpGranter] {
        &self.granters
    }

    pub fn len(&self) -> usize {
        self.granters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.granters.is_empty()
    }

    /// Re-evaluates every condition of every granter against `facts`.
    ///
    /// Idempotent: unchanged facts produce identical values.
    pub fn recalculate_all(&mut self, facts: &dyn FactProvider) {
        for granter in &mut self.granters {
            let mut total = 0;
            for condition in &mut granter.conditions {
                condition.computed_value = condition.evaluate(&granter.card, facts);
                total += condition.computed_value;
            }
            granter.computed_value = total;
        }
    }

    pub fn total_computed_vp(&self) -> i32 {
        self.granters.iter().map(|g| g.computed_value).sum()
    }
}

/// Refreshes one player's granters against live state.
///
/// Returns the old and new totals when the total changed, `None` when it did
/// not or the player is unknown.
pub fn recalculate_player_vp(
    state: &mut GameState,
    board: &dyn BoardService,
    player: &PlayerId,
) -> Option<(i32, i32)> {
    let mut granters = std::mem::take(&mut state.player_mut(player)?.vp_granters);
    let old = granters.total_computed_vp();
    granters.recalculate_all(&PlayerFacts::new(state, board, player));
    let new = granters.total_computed_vp();
    if let Some(owner) = state.player_mut(player) {
        owner.vp_granters = granters;
    }
    (old != new).then_some((old, new))
}
