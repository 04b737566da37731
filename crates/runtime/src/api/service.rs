//! Cloneable façade over every hosted game.
//!
//! [`GameService`] resolves game ids to sessions, turns each call into an
//! engine [`Command`] and hands back a [`CommandReceipt`]. Clones share the
//! same repository and broadcast bus.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tracing::{debug, info};

use terra_core::{
    AppendTilePlacement, Award, BuyStandardProject, CardId, ClaimMilestone, Command,
    ConfirmProductionCards, ConvertHeatToTemperature, ConvertPlantsToGreenery, EndTurn,
    FinalScores, FundAward, GameConfig, GameId, GameState, HexId, Milestone, Payment, PlaceTile,
    PlayCard, PlayerId, ResolveOptions, SelectCorporation, SelectStartingCards, SellPatents,
    StandardProject, StartGame, StateDiff, TileKind, UseCardAction,
};

use super::errors::{Result, RuntimeError};
use super::ledger::PlayerLedger;
use crate::config::RuntimeConfig;
use crate::events::{Event, EventBus, LobbyEvent, Topic};
use crate::oracle::{HexBoard, SharedDeck, StaticCatalog};
use crate::repository::{GameRepository, InMemoryGameRepository};
use crate::session::{CommandReceipt, GameSession};

/// Client-facing handle to every hosted game
#[derive(Clone)]
pub struct GameService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    config: RuntimeConfig,
    catalog: Arc<StaticCatalog>,
    repository: Arc<dyn GameRepository>,
    events: EventBus,
    next_game: AtomicU64,
}

impl GameService {
    /// A service backed by an in-memory repository capped at `max_games`.
    pub fn new(config: RuntimeConfig, catalog: StaticCatalog) -> Self {
        let repository = Arc::new(InMemoryGameRepository::with_limit(config.max_games));
        Self::with_repository(config, catalog, repository)
    }

    pub fn with_repository(
        config: RuntimeConfig,
        catalog: StaticCatalog,
        repository: Arc<dyn GameRepository>,
    ) -> Self {
        let events = EventBus::with_capacity(config.event_buffer_size);
        Self {
            inner: Arc::new(ServiceInner {
                config,
                catalog: Arc::new(catalog),
                repository,
                events,
                next_game: AtomicU64::new(1),
            }),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    pub fn catalog(&self) -> &StaticCatalog {
        &self.inner.catalog
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.inner.events
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::GameState` - One update per recorded diff
    /// - `Topic::Turn` - Turn, phase and generation changes
    /// - `Topic::Lobby` - Games created or removed, players joining
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe(topic)
    }

    // ===== lobby =====

    /// Opens a new game in the lobby with its own board and deck.
    pub async fn create_game(&self, config: GameConfig) -> Result<GameId> {
        let number = self.inner.next_game.fetch_add(1, Ordering::Relaxed);
        let id = GameId::new(format!("game-{number}"));

        let catalog = &self.inner.catalog;
        let deck = match self.inner.config.deck_seed {
            Some(seed) => SharedDeck::shuffled(
                catalog.project_ids(),
                catalog.corporation_ids(),
                seed.wrapping_add(number),
            ),
            None => SharedDeck::new(catalog.project_ids(), catalog.corporation_ids()),
        };
        let session = Arc::new(
            GameSession::new(
                GameState::new(id.clone(), config),
                catalog.clone(),
                Arc::new(HexBoard::standard()),
                Arc::new(deck),
                self.inner.events.clone(),
            )
            .with_state_roots(self.inner.config.compute_state_roots),
        );

        self.inner.repository.insert(session.clone())?;
        session.record_creation().await?;
        self.inner.events.publish(Event::Lobby(LobbyEvent::GameCreated {
            game_id: id.clone(),
        }));
        info!(target: "runtime::service", game_id = %id, "game created");
        Ok(id)
    }

    /// Creates a game with the service's default rules.
    pub async fn create_default_game(&self) -> Result<GameId> {
        self.create_game(self.inner.config.game.clone()).await
    }

    pub async fn join_game(&self, game: &GameId, name: &str) -> Result<PlayerId> {
        let player = self.session(game)?.join(name).await?;
        self.inner.events.publish(Event::Lobby(LobbyEvent::PlayerJoined {
            game_id: game.clone(),
            player: player.clone(),
            name: name.to_owned(),
        }));
        Ok(player)
    }

    /// Stops hosting a game. In-flight commands on it still complete.
    pub fn remove_game(&self, game: &GameId) -> Result<()> {
        self.inner
            .repository
            .remove(game)?
            .ok_or_else(|| RuntimeError::GameNotFound(game.clone()))?;
        self.inner.events.publish(Event::Lobby(LobbyEvent::GameRemoved {
            game_id: game.clone(),
        }));
        info!(target: "runtime::service", game_id = %game, "game removed");
        Ok(())
    }

    pub fn list_games(&self) -> Result<Vec<GameId>> {
        Ok(self.inner.repository.list_ids()?)
    }

    // ===== lifecycle =====

    pub async fn start_game(&self, game: &GameId) -> Result<CommandReceipt> {
        self.run(game, StartGame.into()).await
    }

    pub async fn select_starting_cards(
        &self,
        game: &GameId,
        player: &PlayerId,
        cards: Vec<CardId>,
    ) -> Result<CommandReceipt> {
        self.run(game, SelectStartingCards::new(player.clone(), cards).into())
            .await
    }

    pub async fn select_corporation(
        &self,
        game: &GameId,
        player: &PlayerId,
        corporation: CardId,
        choice_index: Option<usize>,
    ) -> Result<CommandReceipt> {
        let mut command = SelectCorporation::new(player.clone(), corporation);
        command.options.choice_index = choice_index;
        self.run(game, command.into()).await
    }

    // ===== turn actions =====

    /// Plays a card from hand.
    pub async fn resolve_card_play(
        &self,
        game: &GameId,
        player: &PlayerId,
        card: CardId,
        payment: Payment,
        choice_index: Option<usize>,
        storage_target: Option<CardId>,
    ) -> Result<CommandReceipt> {
        let options = ResolveOptions {
            choice_index,
            storage_target,
            ..ResolveOptions::default()
        };
        self.resolve_card_play_with(game, player, card, payment, options)
            .await
    }

    /// Plays a card with every resolution option spelled out, including the
    /// opponent targeted by any-player outputs.
    pub async fn resolve_card_play_with(
        &self,
        game: &GameId,
        player: &PlayerId,
        card: CardId,
        payment: Payment,
        options: ResolveOptions,
    ) -> Result<CommandReceipt> {
        let command = PlayCard::new(player.clone(), card, payment).with_options(options);
        self.run(game, command.into()).await
    }

    pub async fn invoke_card_action(
        &self,
        game: &GameId,
        player: &PlayerId,
        card: CardId,
        behavior_index: usize,
        choice_index: Option<usize>,
    ) -> Result<CommandReceipt> {
        let options = ResolveOptions {
            choice_index,
            ..ResolveOptions::default()
        };
        self.invoke_card_action_with(game, player, card, behavior_index, options)
            .await
    }

    pub async fn invoke_card_action_with(
        &self,
        game: &GameId,
        player: &PlayerId,
        card: CardId,
        behavior_index: usize,
        options: ResolveOptions,
    ) -> Result<CommandReceipt> {
        let command =
            UseCardAction::new(player.clone(), card, behavior_index).with_options(options);
        self.run(game, command.into()).await
    }

    /// Passes or skips, depending on how much of the turn was used.
    pub async fn end_turn(&self, game: &GameId, player: &PlayerId) -> Result<CommandReceipt> {
        self.run(game, EndTurn::new(player.clone()).into()).await
    }

    pub async fn append_tile_placement_request(
        &self,
        game: &GameId,
        player: &PlayerId,
        tiles: Vec<TileKind>,
        source: impl Into<String>,
    ) -> Result<CommandReceipt> {
        let command = AppendTilePlacement::new(player.clone(), tiles, source);
        self.run(game, command.into()).await
    }

    pub async fn place_tile(
        &self,
        game: &GameId,
        player: &PlayerId,
        hex: impl Into<HexId>,
    ) -> Result<CommandReceipt> {
        self.run(game, PlaceTile::new(player.clone(), hex).into())
            .await
    }

    pub async fn confirm_production_cards(
        &self,
        game: &GameId,
        player: &PlayerId,
        cards: Vec<CardId>,
    ) -> Result<CommandReceipt> {
        self.run(game, ConfirmProductionCards::new(player.clone(), cards).into())
            .await
    }

    pub async fn claim_milestone(
        &self,
        game: &GameId,
        player: &PlayerId,
        milestone: Milestone,
    ) -> Result<CommandReceipt> {
        self.run(game, ClaimMilestone::new(player.clone(), milestone).into())
            .await
    }

    pub async fn fund_award(
        &self,
        game: &GameId,
        player: &PlayerId,
        award: Award,
    ) -> Result<CommandReceipt> {
        self.run(game, FundAward::new(player.clone(), award).into())
            .await
    }

    pub async fn sell_patents(
        &self,
        game: &GameId,
        player: &PlayerId,
        cards: Vec<CardId>,
    ) -> Result<CommandReceipt> {
        self.run(game, SellPatents::new(player.clone(), cards).into())
            .await
    }

    pub async fn build_standard_project(
        &self,
        game: &GameId,
        player: &PlayerId,
        project: StandardProject,
        payment: Payment,
    ) -> Result<CommandReceipt> {
        self.run(
            game,
            BuyStandardProject::new(player.clone(), project, payment).into(),
        )
        .await
    }

    pub async fn convert_plants_to_greenery(
        &self,
        game: &GameId,
        player: &PlayerId,
    ) -> Result<CommandReceipt> {
        self.run(game, ConvertPlantsToGreenery::new(player.clone()).into())
            .await
    }

    pub async fn convert_heat_to_temperature(
        &self,
        game: &GameId,
        player: &PlayerId,
    ) -> Result<CommandReceipt> {
        self.run(game, ConvertHeatToTemperature::new(player.clone()).into())
            .await
    }

    /// Executes an already built command.
    pub async fn execute(&self, game: &GameId, command: Command) -> Result<CommandReceipt> {
        self.run(game, command).await
    }

    // ===== queries =====

    pub async fn snapshot(&self, game: &GameId) -> Result<GameState> {
        Ok(self.session(game)?.snapshot().await)
    }

    pub async fn player_ledger(&self, game: &GameId, player: &PlayerId) -> Result<PlayerLedger> {
        self.session(game)?
            .read(|state| state.player(player).map(PlayerLedger::from))
            .await
            .ok_or_else(|| RuntimeError::PlayerNotFound {
                game: game.clone(),
                player: player.clone(),
            })
    }

    /// Card VP from the player's granters as of the last recalculation.
    pub async fn vp_total(&self, game: &GameId, player: &PlayerId) -> Result<i32> {
        Ok(self.player_ledger(game, player).await?.card_vp)
    }

    pub async fn diffs_since(&self, game: &GameId, sequence: u64) -> Result<Vec<StateDiff>> {
        Ok(self.session(game)?.diffs_since(sequence).await)
    }

    pub async fn final_scores(&self, game: &GameId) -> Result<Option<FinalScores>> {
        Ok(self
            .session(game)?
            .read(|state| state.final_scores.clone())
            .await)
    }

    /// Hexes where `player` could place `tile` right now.
    pub fn available_hexes(
        &self,
        game: &GameId,
        player: &PlayerId,
        tile: TileKind,
    ) -> Result<Vec<HexId>> {
        Ok(self.session(game)?.board().available_hexes(tile, player))
    }

    fn session(&self, game: &GameId) -> Result<Arc<GameSession>> {
        self.inner
            .repository
            .get(game)?
            .ok_or_else(|| RuntimeError::GameNotFound(game.clone()))
    }

    async fn run(&self, game: &GameId, command: Command) -> Result<CommandReceipt> {
        let session = self.session(game)?;
        let kind = command.kind();
        let receipt = session.execute(command).await?;
        debug!(
            target: "runtime::service",
            game_id = %game,
            command = %kind,
            sequence = receipt.sequence,
            "command applied"
        );
        Ok(receipt)
    }
}
