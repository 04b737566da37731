//! Headless simulator.
//!
//! Boots a [`GameService`] with the built-in card set, seats greedy agents
//! and plays one game to the end. The final report goes to stdout as JSON;
//! logs go to stderr and, unless disabled, to a per-session file.
//!
//! ```bash
//! SIM_PLAYERS=3 RUST_LOG=sim=debug cargo run -p terra-sim
//! ```

mod agent;
mod config;
mod content;
mod driver;
mod logging;

use std::sync::Arc;

use anyhow::Result;
use terra_runtime::GameService;

use agent::{Agent, GreedyAgent};
use config::SimConfig;
use driver::Driver;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = SimConfig::from_env();
    let _guard = logging::setup_logging(config.session_id.as_deref(), config.file_logging)?;

    tracing::info!(
        players = config.players,
        max_generations = config.limits.max_generations,
        deck_seed = ?config.runtime.deck_seed,
        "starting simulation"
    );

    let service = GameService::new(config.runtime.clone(), content::catalog());
    let agents: Vec<Arc<dyn Agent>> = (1..=config.players)
        .map(|n| Arc::new(GreedyAgent::new(format!("greedy-{n}"))) as Arc<dyn Agent>)
        .collect();

    let report = Driver::new(service, config.limits)
        .play(config.rules.clone(), agents)
        .await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
