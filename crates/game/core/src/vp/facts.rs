use crate::card::{Quantity, Tag};
use crate::env::BoardService;
use crate::state::{CardId, GameState, PlayerId, TileKind, TileScope};

/// Pull-based view of the ambient facts VP conditions and `per` scalers
/// observe, scoped to one player.
pub trait FactProvider {
    fn tag_count(&self, tag: Tag) -> u32;

    fn card_storage(&self, card: &CardId) -> u32;

    fn tile_count(&self, tile: TileKind, scope: TileScope) -> u32;

    /// Resolves a [`Quantity`]; `card` is the card owning the condition.
    fn observe(&self, quantity: Quantity, card: &CardId) -> u32 {
        match quantity {
            Quantity::Tag(tag) => self.tag_count(tag),
            Quantity::SelfStorage => self.card_storage(card),
            Quantity::Tiles { tile, scope } => self.tile_count(tile, scope),
        }
    }
}

/// [`FactProvider`] backed by live game state and the board collaborator.
pub struct PlayerFacts<'a> {
    state: &'a GameState,
    board: &'a dyn BoardService,
    player: &'a PlayerId,
}

impl<'a> PlayerFacts<'a> {
    pub fn new(state: &'a GameState, board: &'a dyn BoardService, player: &'a PlayerId) -> Self {
        Self {
            state,
            board,
            player,
        }
    }
}

impl FactProvider for PlayerFacts<'_> {
    fn tag_count(&self, tag: Tag) -> u32 {
        self.state
            .player(self.player)
            .map_or(0, |player| player.tag_count(tag))
    }

    fn card_storage(&self, card: &CardId) -> u32 {
        self.state
            .player(self.player)
            .map_or(0, |player| player.storage_of(card))
    }

    fn tile_count(&self, tile: TileKind, scope: TileScope) -> u32 {
        match scope {
            TileScope::Board => self.board.tile_count(tile, None),
            TileScope::Own => self.board.tile_count(tile, Some(self.player)),
        }
    }
}
