//! Simulator configuration.
use std::env;

use terra_core::GameConfig;
use terra_runtime::RuntimeConfig;

use crate::driver::Limits;

/// Settings for one simulator run.
#[derive(Clone, Debug)]
pub struct SimConfig {
    pub runtime: RuntimeConfig,
    /// Rules for the simulated game.
    pub rules: GameConfig,
    /// Seated agents; capped by the corporations in the built-in set.
    pub players: usize,
    pub limits: Limits,
    /// Names the log directory; generated from the clock when unset.
    pub session_id: Option<String>,
    /// Also write logs to a file under the platform cache directory.
    pub file_logging: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            runtime: RuntimeConfig::default(),
            rules: GameConfig {
                starting_card_offer: 5,
                corporation_offer: 1,
                production_draw_count: 2,
                ..GameConfig::default()
            },
            players: 2,
            limits: Limits {
                max_generations: 40,
                max_commands: 20_000,
            },
            session_id: None,
            file_logging: true,
        }
    }
}

impl SimConfig {
    pub const MAX_PLAYERS: usize = 3;

    /// Construct configuration from environment variables.
    ///
    /// Runtime settings come from [`RuntimeConfig::from_env`]. On top of that:
    /// - `SIM_PLAYERS` - Number of agents (default: 2, at most 3)
    /// - `SIM_MAX_GENERATIONS` - Stop after this generation (default: 40)
    /// - `SIM_MAX_COMMANDS` - Stop after this many accepted commands (default: 20000)
    /// - `SIM_STARTING_CARDS` - Project cards offered at start (default: 5)
    /// - `SIM_PRODUCTION_DRAW` - Cards drawn per production (default: 2)
    /// - `SIM_SESSION_ID` - Log directory name (default: timestamp)
    /// - `SIM_FILE_LOG` - Write a log file (default: true)
    pub fn from_env() -> Self {
        let mut config = Self {
            runtime: RuntimeConfig::from_env(),
            ..Self::default()
        };

        if let Some(players) = read_env::<usize>("SIM_PLAYERS") {
            config.players = players.clamp(1, Self::MAX_PLAYERS);
        }
        if let Some(max) = read_env::<u32>("SIM_MAX_GENERATIONS") {
            config.limits.max_generations = max.max(1);
        }
        if let Some(max) = read_env::<u64>("SIM_MAX_COMMANDS") {
            config.limits.max_commands = max.max(1);
        }
        if let Some(offer) = read_env::<u32>("SIM_STARTING_CARDS") {
            config.rules.starting_card_offer = offer;
        }
        if let Some(draw) = read_env::<u32>("SIM_PRODUCTION_DRAW") {
            config.rules.production_draw_count = draw;
        }
        if let Ok(session) = env::var("SIM_SESSION_ID")
            && !session.trim().is_empty()
        {
            config.session_id = Some(session);
        }
        if let Some(enabled) = read_env::<bool>("SIM_FILE_LOG") {
            config.file_logging = enabled;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fit_the_builtin_card_set() {
        let config = SimConfig::default();
        let catalog = crate::content::catalog();

        let offered = config.rules.corporation_offer as usize * SimConfig::MAX_PLAYERS;
        assert!(offered <= catalog.corporation_ids().len());
        assert!(config.players <= SimConfig::MAX_PLAYERS);
    }
}
