use super::fields::{GameFields, PlayerFields};
use crate::state::{
    CardId, GamePhase, GameState, GameStatus, GlobalParameters, PlayerId, PlayerState,
    ResourceSet, TurnState,
};

/// An old/new pair for a field that changed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Change<T> {
    pub old: T,
    pub new: T,
}

impl<T: PartialEq + Clone> Change<T> {
    /// `None` when both sides are equal.
    pub fn between(old: &T, new: &T) -> Option<Self> {
        (old != new).then(|| Self {
            old: old.clone(),
            new: new.clone(),
        })
    }
}

/// What changed for one player.
///
/// `fields` summarises every changed field; values are carried for the
/// ledger-like fields clients render directly.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerChanges {
    pub player: PlayerId,
    pub fields: PlayerFields,
    pub resources: Option<Change<ResourceSet>>,
    pub production: Option<Change<ResourceSet>>,
    pub terraform_rating: Option<Change<i32>>,
    pub victory_points: Option<Change<i32>>,
    pub cards_added: Vec<CardId>,
    pub cards_removed: Vec<CardId>,
    pub cards_played: Vec<CardId>,
}

impl PlayerChanges {
    /// Compares two snapshots of the same player; `None` when nothing changed.
    pub(super) fn from_states(before: &PlayerState, after: &PlayerState) -> Option<Self> {
        debug_assert_eq!(before.id, after.id, "cannot compare different players");

        let mut fields = PlayerFields::empty();
        let mut flag = |changed: bool, field: PlayerFields| {
            if changed {
                fields |= field;
            }
        };

        flag(before.resources != after.resources, PlayerFields::RESOURCES);
        flag(before.production != after.production, PlayerFields::PRODUCTION);
        flag(
            before.terraform_rating != after.terraform_rating,
            PlayerFields::TERRAFORM_RATING,
        );
        flag(before.hand != after.hand, PlayerFields::HAND);
        flag(before.played_cards != after.played_cards, PlayerFields::PLAYED_CARDS);
        flag(before.corporation != after.corporation, PlayerFields::CORPORATION);
        flag(before.storage != after.storage, PlayerFields::STORAGE);
        flag(before.effects != after.effects, PlayerFields::EFFECTS);
        flag(before.actions != after.actions, PlayerFields::ACTIONS);
        flag(before.vp_granters != after.vp_granters, PlayerFields::VICTORY_POINTS);
        flag(before.passed != after.passed, PlayerFields::PASSED);
        flag(
            before.starting_selection != after.starting_selection
                || before.production_selection != after.production_selection,
            PlayerFields::SELECTION,
        );
        flag(before.pending_tiles != after.pending_tiles, PlayerFields::PENDING_TILES);
        flag(before.connected != after.connected, PlayerFields::CONNECTION);

        if fields.is_empty() {
            return None;
        }

        let played_before: Vec<CardId> = before.played_cards.iter().map(|c| c.id.clone()).collect();
        let cards_played = after
            .played_cards
            .iter()
            .map(|c| c.id.clone())
            .filter(|id| !played_before.contains(id))
            .collect();

        Some(Self {
            player: after.id.clone(),
            fields,
            resources: Change::between(&before.resources, &after.resources),
            production: Change::between(&before.production, &after.production),
            terraform_rating: Change::between(&before.terraform_rating, &after.terraform_rating),
            victory_points: Change::between(
                &before.vp_granters.total_computed_vp(),
                &after.vp_granters.total_computed_vp(),
            ),
            cards_added: multiset_difference(&after.hand, &before.hand),
            cards_removed: multiset_difference(&before.hand, &after.hand),
            cards_played,
        })
    }
}

/// Structured delta of one command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameChanges {
    pub fields: GameFields,
    pub status: Option<Change<GameStatus>>,
    pub phase: Option<Change<GamePhase>>,
    pub generation: Option<Change<u32>>,
    pub global: Option<Change<GlobalParameters>>,
    pub turn: Option<Change<Option<TurnState>>>,
    pub players: Vec<PlayerChanges>,
}

impl GameChanges {
    /// Compares two snapshots of the same game.
    pub fn from_states(before: &GameState, after: &GameState) -> Self {
        let mut fields = GameFields::empty();
        if before.status != after.status {
            fields |= GameFields::STATUS;
        }
        if before.phase != after.phase {
            fields |= GameFields::PHASE;
        }
        if before.generation != after.generation {
            fields |= GameFields::GENERATION;
        }
        if before.global != after.global {
            fields |= GameFields::GLOBALS;
        }
        if before.current_turn != after.current_turn {
            fields |= GameFields::TURN;
        }
        if before.turn_order != after.turn_order {
            fields |= GameFields::TURN_ORDER;
        }
        if before.claimed_milestones != after.claimed_milestones {
            fields |= GameFields::MILESTONES;
        }
        if before.funded_awards != after.funded_awards {
            fields |= GameFields::AWARDS;
        }

        // Players are only ever appended, so pairing by id covers every case.
        let players = after
            .players
            .iter()
            .filter_map(|player| match before.player(&player.id) {
                Some(prev) => PlayerChanges::from_states(prev, player),
                None => PlayerChanges::from_states(
                    &PlayerState::new(player.id.clone(), player.name.clone(), 0),
                    player,
                ),
            })
            .collect();

        Self {
            fields,
            status: Change::between(&before.status, &after.status),
            phase: Change::between(&before.phase, &after.phase),
            generation: Change::between(&before.generation, &after.generation),
            global: Change::between(&before.global, &after.global),
            turn: Change::between(&before.current_turn, &after.current_turn),
            players,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.players.is_empty()
    }

    pub fn player(&self, id: &PlayerId) -> Option<&PlayerChanges> {
        self.players.iter().find(|p| &p.player == id)
    }
}

/// Elements of `a` left after removing one match per element of `b`.
fn multiset_difference(a: &[CardId], b: &[CardId]) -> Vec<CardId> {
    let mut remaining: Vec<&CardId> = b.iter().collect();
    a.iter()
        .filter(|card| match remaining.iter().position(|r| r == card) {
            Some(index) => {
                remaining.swap_remove(index);
                false
            }
            None => true,
        })
        .cloned()
        .collect()
}
