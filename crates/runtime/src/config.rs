//! Runtime configuration and environment loading.

use std::env;

use terra_core::GameConfig;

/// Runtime configuration shared by every session a service creates.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Rules tunables applied to new games unless the caller overrides them.
    pub game: GameConfig,
    /// Capacity of each broadcast topic.
    pub event_buffer_size: usize,
    /// Upper bound on concurrently hosted games.
    pub max_games: usize,
    /// Seed for shuffling each game's draw piles; `None` keeps catalog order.
    pub deck_seed: Option<u64>,
    /// Attach a state root to every diff entry.
    pub compute_state_roots: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            event_buffer_size: 256,
            max_games: 64,
            deck_seed: None,
            compute_state_roots: true,
        }
    }
}

impl RuntimeConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `TERRA_EVENT_BUFFER` - Broadcast capacity per topic (default: 256)
    /// - `TERRA_MAX_GAMES` - Concurrent game limit (default: 64)
    /// - `TERRA_DECK_SEED` - Shuffle seed (default: unshuffled)
    /// - `TERRA_STATE_ROOTS` - Hash state after each command (default: true)
    /// - `TERRA_PRODUCTION_DRAW` - Cards drawn per player in production (default: 4)
    /// - `TERRA_CARD_BUY_COST` - Price of a kept card (default: 3)
    /// - `TERRA_STARTING_CARDS` - Project cards offered at start (default: 10)
    /// - `TERRA_CORPORATION_OFFER` - Corporations offered at start (default: 2)
    /// - `TERRA_STARTING_TR` - Starting terraform rating (default: 20)
    /// - `TERRA_MAX_CASCADE` - Follow-up event rounds per command (default: 32)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(capacity) = read_env::<usize>("TERRA_EVENT_BUFFER") {
            config.event_buffer_size = capacity.max(1);
        }
        if let Some(max) = read_env::<usize>("TERRA_MAX_GAMES") {
            config.max_games = max.max(1);
        }
        if let Some(seed) = read_env::<u64>("TERRA_DECK_SEED") {
            config.deck_seed = Some(seed);
        }
        if let Some(enabled) = read_env_bool("TERRA_STATE_ROOTS") {
            config.compute_state_roots = enabled;
        }

        let game = &mut config.game;
        if let Some(count) = read_env::<u32>("TERRA_PRODUCTION_DRAW") {
            game.production_draw_count = count;
        }
        if let Some(cost) = read_env::<u32>("TERRA_CARD_BUY_COST") {
            game.card_buy_cost = cost;
        }
        if let Some(count) = read_env::<u32>("TERRA_STARTING_CARDS") {
            game.starting_card_offer = count;
        }
        if let Some(count) = read_env::<u32>("TERRA_CORPORATION_OFFER") {
            game.corporation_offer = count.max(1);
        }
        if let Some(rating) = read_env::<i32>("TERRA_STARTING_TR") {
            game.starting_terraform_rating = rating;
        }
        if let Some(depth) = read_env::<usize>("TERRA_MAX_CASCADE") {
            game.max_event_cascade = depth.max(1);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
