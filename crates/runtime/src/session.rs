//! One hosted game.
//!
//! A [`GameSession`] owns the authoritative [`GameState`], its append-only
//! [`DiffLog`] and the collaborators the engine needs. A single async
//! reader/writer lock guards state and log together: commands hold the write
//! lock through validation, mutation, in-window event dispatch and diff
//! recording, so readers never observe a resource change without the
//! recalculations it triggers.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use terra_core::state::GameChanges;
use terra_core::{
    BoardService, CardCatalog, Command, DeckService, DiffLog, DomainEvent, EventBus as RulesBus,
    GameEngine, GameEnv, GameId, GameState, PlayerId, SourceKind, StateDiff,
};

use crate::api::Result;
use crate::events::{Event, EventBus, GameUpdate, TurnNotice};
use crate::state_root::state_root;

/// What a successful command left behind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandReceipt {
    /// Sequence number of the diff the command appended.
    pub sequence: u64,
    pub description: String,
    pub events: Vec<DomainEvent>,
    pub state_root: Option<String>,
}

struct SessionState {
    game: GameState,
    diffs: DiffLog,
}

pub struct GameSession {
    id: GameId,
    inner: RwLock<SessionState>,
    catalog: Arc<dyn CardCatalog>,
    board: Arc<dyn BoardService>,
    deck: Arc<dyn DeckService>,
    rules: RulesBus,
    broadcast: EventBus,
    compute_state_roots: bool,
}

impl GameSession {
    /// Wraps a fresh game. The rules bus gets the default subscribers and the
    /// game's cascade limit.
    pub fn new(
        game: GameState,
        catalog: Arc<dyn CardCatalog>,
        board: Arc<dyn BoardService>,
        deck: Arc<dyn DeckService>,
        broadcast: EventBus,
    ) -> Self {
        let rules = RulesBus::with_defaults(game.config.max_event_cascade);
        Self {
            id: game.id.clone(),
            inner: RwLock::new(SessionState {
                game,
                diffs: DiffLog::new(),
            }),
            catalog,
            board,
            deck,
            rules,
            broadcast,
            compute_state_roots: true,
        }
    }

    /// Replaces the in-window rules bus, e.g. to add custom subscribers.
    pub fn with_rules_bus(mut self, rules: RulesBus) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_state_roots(mut self, enabled: bool) -> Self {
        self.compute_state_roots = enabled;
        self
    }

    pub fn id(&self) -> &GameId {
        &self.id
    }

    pub fn board(&self) -> &dyn BoardService {
        self.board.as_ref()
    }

    /// Runs `command` under the write lock and records its diff.
    ///
    /// A rejected command leaves state and log untouched.
    pub async fn execute(&self, command: Command) -> Result<CommandReceipt> {
        let mut guard = self.inner.write().await;
        let SessionState { game, diffs } = &mut *guard;

        let env = GameEnv::new(
            self.catalog.as_ref(),
            self.board.as_ref(),
            self.deck.as_ref(),
        );
        let before = self.compute_state_roots.then(|| game.clone());
        let outcome = GameEngine::new(game, &self.rules).execute(env, &command)?;

        let root = self.root_of(game);
        let root = restore_on_error(game, before, root)?;
        let mut diff = outcome.to_diff(Utc::now().timestamp_millis(), root.clone());
        diff.sequence = diffs.append(diff.clone());

        debug!(
            target: "runtime::session",
            game_id = %self.id,
            command = %command.kind(),
            sequence = diff.sequence,
            "diff recorded"
        );
        self.publish(diff.clone(), outcome.events.clone());

        Ok(CommandReceipt {
            sequence: diff.sequence,
            description: diff.description,
            events: outcome.events,
            state_root: root,
        })
    }

    /// Seats a player while the game is still in the lobby.
    ///
    /// Ids are assigned in join order (`p1`, `p2`, ...) under the write lock,
    /// so concurrent joins never collide.
    pub async fn join(&self, name: &str) -> Result<PlayerId> {
        let mut guard = self.inner.write().await;
        let SessionState { game, diffs } = &mut *guard;

        let player = PlayerId::new(format!("p{}", game.player_count() + 1));
        let before = game.clone();
        game.add_player(player.clone(), name)?;
        let changes = GameChanges::from_states(&before, game);
        let recorded = self.record_system_diff(
            game,
            diffs,
            SourceKind::Initial,
            Some(player.clone()),
            format!("{name} joined as {player}"),
            changes,
        );
        let sequence = restore_on_error(game, Some(before), recorded)?;
        info!(
            target: "runtime::session",
            game_id = %self.id,
            player_id = %player,
            players = game.player_count(),
            sequence,
            "player joined"
        );
        Ok(player)
    }

    /// Records the creation entry; called once by the service.
    pub(crate) async fn record_creation(&self) -> Result<u64> {
        let mut guard = self.inner.write().await;
        let SessionState { game, diffs } = &mut *guard;
        self.record_system_diff(
            game,
            diffs,
            SourceKind::Initial,
            None,
            "game created".to_owned(),
            GameChanges::default(),
        )
    }

    fn record_system_diff(
        &self,
        game: &GameState,
        diffs: &mut DiffLog,
        source_kind: SourceKind,
        actor: Option<PlayerId>,
        description: String,
        changes: GameChanges,
    ) -> Result<u64> {
        let diff = StateDiff {
            sequence: 0,
            timestamp_ms: Utc::now().timestamp_millis(),
            state_root: self.root_of(game)?,
            source: source_kind.to_string(),
            source_kind,
            actor,
            description,
            choice_index: None,
            calculated_outputs: Vec::new(),
            triggered_effects: Vec::new(),
            changes,
        };
        let sequence = diffs.append(diff.clone());
        self.publish(StateDiff { sequence, ..diff }, Vec::new());
        Ok(sequence)
    }

    fn root_of(&self, game: &GameState) -> Result<Option<String>> {
        if !self.compute_state_roots {
            return Ok(None);
        }
        Ok(Some(state_root(game)?))
    }

    fn publish(&self, diff: StateDiff, events: Vec<DomainEvent>) {
        let sequence = diff.sequence;
        for event in events.iter().filter(|e| TurnNotice::is_turn_event(e)) {
            self.broadcast.publish(Event::Turn(TurnNotice {
                game_id: self.id.clone(),
                sequence,
                event: event.clone(),
            }));
        }
        self.broadcast.publish(Event::GameState(GameUpdate {
            game_id: self.id.clone(),
            diff,
            events,
        }));
    }

    /// Clone of the current state.
    pub async fn snapshot(&self) -> GameState {
        self.inner.read().await.game.clone()
    }

    /// Runs `f` against the current state under the read lock.
    pub async fn read<R>(&self, f: impl FnOnce(&GameState) -> R) -> R {
        f(&self.inner.read().await.game)
    }

    /// Diff entries with a sequence number greater than `sequence`.
    pub async fn diffs_since(&self, sequence: u64) -> Vec<StateDiff> {
        self.inner.read().await.diffs.since(sequence).to_vec()
    }

    pub async fn latest_sequence(&self) -> u64 {
        self.inner.read().await.diffs.latest_sequence()
    }

    /// Checks the recorded root of the latest diff against the live state.
    pub async fn verify_latest_root(&self) -> Result<bool> {
        let guard = self.inner.read().await;
        let Some(recorded) = guard
            .diffs
            .entries()
            .last()
            .and_then(|d| d.state_root.clone())
        else {
            return Ok(true);
        };
        let current = state_root(&guard.game)?;
        if current != recorded {
            warn!(target: "runtime::session", game_id = %self.id, "state root mismatch");
        }
        Ok(current == recorded)
    }
}

/// Puts `before` back into `game` when `result` is an error.
///
/// Covers failures after the engine has committed, such as computing the
/// state root, so the caller never sees a mutated state without a diff.
fn restore_on_error<T>(
    game: &mut GameState,
    before: Option<GameState>,
    result: Result<T>,
) -> Result<T> {
    if result.is_err()
        && let Some(before) = before
    {
        warn!(target: "runtime::session", game_id = %game.id, "restoring state after a failed commit");
        *game = before;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{HexBoard, SharedDeck, StaticCatalog};
    use crate::{RepositoryError, RuntimeError, Topic};
    use terra_core::{EndTurn, GameConfig, StartGame};

    fn session(bus: &EventBus) -> GameSession {
        GameSession::new(
            GameState::new(GameId::new("g1"), GameConfig::default()),
            Arc::new(StaticCatalog::default()),
            Arc::new(HexBoard::new(2)),
            Arc::new(SharedDeck::default()),
            bus.clone(),
        )
    }

    #[tokio::test]
    async fn joins_are_logged_with_roots() {
        let bus = EventBus::new();
        let mut updates = bus.subscribe(Topic::GameState);
        let session = session(&bus);

        assert_eq!(session.record_creation().await.unwrap(), 1);
        assert_eq!(session.join("Ada").await.unwrap(), PlayerId::new("p1"));
        assert_eq!(session.latest_sequence().await, 2);

        let diffs = session.diffs_since(0).await;
        assert_eq!(diffs.len(), 2);
        assert_eq!(diffs[1].source_kind, SourceKind::Initial);
        assert!(diffs[1].changes.player(&PlayerId::new("p1")).is_some());
        assert!(session.verify_latest_root().await.unwrap());

        let Event::GameState(first) = updates.recv().await.unwrap() else {
            panic!("expected a game state update");
        };
        assert_eq!(first.sequence(), 1);
    }

    #[tokio::test]
    async fn rejected_commands_leave_no_trace() {
        let bus = EventBus::new();
        let session = session(&bus);
        session.join("Ada").await.unwrap();
        let before = session.snapshot().await;

        let err = session
            .execute(EndTurn::new(PlayerId::new("p1")).into())
            .await
            .unwrap_err();

        assert!(matches!(err, RuntimeError::Execute(_)));
        assert_eq!(session.snapshot().await, before);
        assert_eq!(session.latest_sequence().await, 1);
    }

    #[tokio::test]
    async fn commands_publish_turn_notices() {
        let bus = EventBus::new();
        let mut turns = bus.subscribe(Topic::Turn);
        let session = session(&bus);
        session.join("Ada").await.unwrap();

        let receipt = session.execute(StartGame.into()).await.unwrap();
        assert_eq!(receipt.sequence, 2);
        assert!(receipt.state_root.is_some());

        let Event::Turn(notice) = turns.recv().await.unwrap() else {
            panic!("expected a turn notice");
        };
        assert_eq!(notice.sequence, 2);
    }

    #[test]
    fn failed_commit_restores_the_previous_state() {
        let before = GameState::new(GameId::new("g1"), GameConfig::default());
        let mut game = before.clone();
        game.generation = 7;

        let failed: Result<Option<String>> =
            Err(RepositoryError::Serialization("no encoder".into()).into());
        assert!(restore_on_error(&mut game, Some(before.clone()), failed).is_err());
        assert_eq!(game, before);

        game.generation = 7;
        let root = restore_on_error(&mut game, Some(before), Ok(Some("ab".to_owned()))).unwrap();
        assert_eq!(root.as_deref(), Some("ab"));
        assert_eq!(game.generation, 7);
    }
}
