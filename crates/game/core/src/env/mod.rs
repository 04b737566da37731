//! Collaborator traits the engine consumes.
//!
//! The card catalog, the board and the deck live outside the rules engine.
//! [`GameEnv`] bundles them so transitions can reach everything they need
//! without coupling to concrete implementations.

use crate::card::Card;
use crate::error::{Entity, RulesError};
use crate::state::{CardId, HexId, PlacementResult, PlayerId, TileKind};

/// Read-only lookup of card definitions.
pub trait CardCatalog: Send + Sync {
    fn card(&self, id: &CardId) -> Option<&Card>;
}

/// Board geometry and tile bookkeeping.
///
/// Adjacency and placement legality are the board's concern; the engine only
/// asks where a tile may go and what placing it awards.
pub trait BoardService: Send + Sync {
    fn available_hexes(&self, tile: TileKind, player: &PlayerId) -> Vec<HexId>;

    /// Places a tile and reports the bonuses it awards.
    ///
    /// # Errors
    ///
    /// [`RulesError::InvalidTarget`] when the hex cannot take the tile.
    fn place_tile(
        &self,
        tile: TileKind,
        hex: &HexId,
        player: &PlayerId,
    ) -> Result<PlacementResult, RulesError>;

    /// Tiles of `tile` kind on the board, optionally only those owned by `owner`.
    fn tile_count(&self, tile: TileKind, owner: Option<&PlayerId>) -> u32;

    /// One point per greenery owned.
    fn greenery_vp(&self, player: &PlayerId) -> i32 {
        self.tile_count(TileKind::Greenery, Some(player)) as i32
    }

    /// One point per greenery adjacent to each owned city.
    fn city_vp(&self, player: &PlayerId) -> i32;
}

/// Shared draw piles. Drawing never fails: an exhausted pile yields fewer cards.
pub trait DeckService: Send + Sync {
    fn draw_project_cards(&self, count: usize) -> Vec<CardId>;

    fn draw_corporations(&self, count: usize) -> Vec<CardId>;
}

/// Aggregates the collaborators required by the engine.
#[derive(Clone, Copy)]
pub struct GameEnv<'a> {
    catalog: &'a dyn CardCatalog,
    board: &'a dyn BoardService,
    deck: &'a dyn DeckService,
}

impl<'a> GameEnv<'a> {
    pub fn new(
        catalog: &'a dyn CardCatalog,
        board: &'a dyn BoardService,
        deck: &'a dyn DeckService,
    ) -> Self {
        Self {
            catalog,
            board,
            deck,
        }
    }

    pub fn catalog(&self) -> &'a dyn CardCatalog {
        self.catalog
    }

    pub fn board(&self) -> &'a dyn BoardService {
        self.board
    }

    pub fn deck(&self) -> &'a dyn DeckService {
        self.deck
    }

    /// Looks up a card definition.
    ///
    /// # Errors
    ///
    /// [`RulesError::NotFound`] when the catalog does not know the card.
    pub fn card(&self, id: &CardId) -> Result<&'a Card, RulesError> {
        self.catalog
            .card(id)
            .ok_or_else(|| RulesError::not_found(Entity::Card, id))
    }
}

impl core::fmt::Debug for GameEnv<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GameEnv").finish_non_exhaustive()
    }
}
