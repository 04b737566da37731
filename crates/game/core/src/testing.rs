//! In-memory collaborators and a game fixture for unit tests.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;

use crate::card::Card;
use crate::config::GameConfig;
use crate::engine::{Command, ExecuteError, ExecutionOutcome, GameEngine};
use crate::env::{BoardService, CardCatalog, DeckService, GameEnv};
use crate::error::RulesError;
use crate::events::EventBus;
use crate::state::{
    CardId, GameId, GamePhase, GameState, GameStatus, HexId, PlacementBonus, PlacementResult,
    PlayerId, PlayerState, TileKind, TurnState,
};

#[derive(Default)]
pub(crate) struct TestCatalog {
    cards: BTreeMap<CardId, Card>,
}

impl TestCatalog {
    pub(crate) fn new(cards: Vec<Card>) -> Self {
        Self {
            cards: cards.into_iter().map(|card| (card.id.clone(), card)).collect(),
        }
    }
}

impl CardCatalog for TestCatalog {
    fn card(&self, id: &CardId) -> Option<&Card> {
        self.cards.get(id)
    }
}

#[derive(Clone, Debug)]
struct HexSpec {
    bonuses: Vec<PlacementBonus>,
    adjacent_oceans: u32,
}

#[derive(Default)]
struct BoardInner {
    open: BTreeMap<HexId, HexSpec>,
    placed: Vec<(TileKind, PlayerId)>,
}

/// Board without geometry: every open hex accepts every tile.
#[derive(Default)]
pub(crate) struct TestBoard {
    inner: Mutex<BoardInner>,
}

impl TestBoard {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_hex(&self, hex: &str, bonuses: Vec<PlacementBonus>, adjacent_oceans: u32) {
        self.inner.lock().unwrap().open.insert(
            HexId::new(hex),
            HexSpec {
                bonuses,
                adjacent_oceans,
            },
        );
    }

    pub(crate) fn add_tile(&self, tile: TileKind, owner: &str) {
        self.inner
            .lock()
            .unwrap()
            .placed
            .push((tile, PlayerId::new(owner)));
    }
}

impl BoardService for TestBoard {
    fn available_hexes(&self, _tile: TileKind, _player: &PlayerId) -> Vec<HexId> {
        self.inner.lock().unwrap().open.keys().cloned().collect()
    }

    fn place_tile(
        &self,
        tile: TileKind,
        hex: &HexId,
        player: &PlayerId,
    ) -> Result<PlacementResult, RulesError> {
        let mut inner = self.inner.lock().unwrap();
        let slot = inner
            .open
            .remove(hex)
            .ok_or_else(|| RulesError::invalid_target(format!("hex {hex} is taken")))?;
        inner.placed.push((tile, player.clone()));
        Ok(PlacementResult {
            bonuses: slot.bonuses,
            adjacent_oceans: slot.adjacent_oceans,
        })
    }

    fn tile_count(&self, tile: TileKind, owner: Option<&PlayerId>) -> u32 {
        self.inner
            .lock()
            .unwrap()
            .placed
            .iter()
            .filter(|(kind, placed_by)| *kind == tile && owner.is_none_or(|o| o == placed_by))
            .count() as u32
    }

    fn city_vp(&self, _player: &PlayerId) -> i32 {
        0
    }
}

#[derive(Default)]
pub(crate) struct TestDeck {
    projects: Mutex<VecDeque<CardId>>,
    corporations: Mutex<VecDeque<CardId>>,
}

impl TestDeck {
    pub(crate) fn new(projects: &[&str], corporations: &[&str]) -> Self {
        Self {
            projects: Mutex::new(projects.iter().map(|id| CardId::new(*id)).collect()),
            corporations: Mutex::new(corporations.iter().map(|id| CardId::new(*id)).collect()),
        }
    }

    pub(crate) fn remaining_projects(&self) -> Vec<CardId> {
        self.projects.lock().unwrap().iter().cloned().collect()
    }
}

fn draw(pile: &Mutex<VecDeque<CardId>>, count: usize) -> Vec<CardId> {
    let mut pile = pile.lock().unwrap();
    let count = count.min(pile.len());
    pile.drain(..count).collect()
}

impl DeckService for TestDeck {
    fn draw_project_cards(&self, count: usize) -> Vec<CardId> {
        draw(&self.projects, count)
    }

    fn draw_corporations(&self, count: usize) -> Vec<CardId> {
        draw(&self.corporations, count)
    }
}

/// A game plus its collaborators.
pub(crate) struct Fixture {
    pub state: GameState,
    pub catalog: TestCatalog,
    pub board: TestBoard,
    pub deck: TestDeck,
    pub bus: EventBus,
}

impl Fixture {
    /// A lobby with `players` seated and `cards` in the catalog.
    pub(crate) fn lobby(players: &[&str], cards: Vec<Card>) -> Self {
        let mut state = GameState::new(GameId::new("test"), GameConfig::default());
        for id in players {
            state.add_player(PlayerId::new(*id), *id).unwrap();
        }
        Self {
            state,
            catalog: TestCatalog::new(cards),
            board: TestBoard::new(),
            deck: TestDeck::default(),
            bus: EventBus::default(),
        }
    }

    /// An active game in the action phase; the first player holds a fresh turn.
    pub(crate) fn action_phase(players: &[&str], cards: Vec<Card>) -> Self {
        let mut fixture = Self::lobby(players, cards);
        let state = &mut fixture.state;
        state.status = GameStatus::Active;
        state.phase = GamePhase::Action;
        if let Some(first) = state.turn_order.first().cloned() {
            let actions = GameConfig::fresh_turn_actions(state.player_count());
            state.current_turn = Some(TurnState::new(first, actions));
        }
        fixture
    }

    pub(crate) fn with_deck(mut self, projects: &[&str], corporations: &[&str]) -> Self {
        self.deck = TestDeck::new(projects, corporations);
        self
    }

    pub(crate) fn env(&self) -> GameEnv<'_> {
        GameEnv::new(&self.catalog, &self.board, &self.deck)
    }

    /// Mutable state alongside an environment borrowing the collaborators.
    pub(crate) fn split(&mut self) -> (&mut GameState, GameEnv<'_>) {
        (
            &mut self.state,
            GameEnv::new(&self.catalog, &self.board, &self.deck),
        )
    }

    pub(crate) fn execute(&mut self, command: Command) -> Result<ExecutionOutcome, ExecuteError> {
        let env = GameEnv::new(&self.catalog, &self.board, &self.deck);
        GameEngine::new(&mut self.state, &self.bus).execute(env, &command)
    }

    pub(crate) fn player(&self, id: &str) -> &PlayerState {
        self.state.player(&PlayerId::new(id)).unwrap()
    }

    pub(crate) fn player_mut(&mut self, id: &str) -> &mut PlayerState {
        self.state.player_mut(&PlayerId::new(id)).unwrap()
    }
}
