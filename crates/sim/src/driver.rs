//! Plays one game from lobby to final scoring.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Result, bail};
use serde::Serialize;
use tracing::{debug, info, warn};

use terra_core::{
    FinalScores, GameConfig, GameId, GamePhase, GameState, GameStatus, PlayerId, PlayerState,
};
use terra_runtime::{GameService, PlayerLedger};

use crate::agent::{Agent, TableView};

/// Outcome of a simulated game, printed as JSON.
#[derive(Debug, Serialize)]
pub struct SimReport {
    pub game_id: GameId,
    pub completed: bool,
    pub generation: u32,
    pub commands: u64,
    pub rejected: u64,
    pub players: Vec<PlayerLedger>,
    pub scores: Option<FinalScores>,
}

/// Bounds that stop a game that would otherwise never end.
#[derive(Clone, Copy, Debug)]
pub struct Limits {
    pub max_generations: u32,
    pub max_commands: u64,
}

pub struct Driver {
    service: GameService,
    limits: Limits,
}

impl Driver {
    pub fn new(service: GameService, limits: Limits) -> Self {
        Self { service, limits }
    }

    /// Seats one player per agent and plays until the game completes or a
    /// limit is hit.
    pub async fn play(&self, rules: GameConfig, agents: Vec<Arc<dyn Agent>>) -> Result<SimReport> {
        let game = self.service.create_game(rules).await?;
        let mut seats: BTreeMap<PlayerId, Arc<dyn Agent>> = BTreeMap::new();
        for agent in agents {
            let player = self.service.join_game(&game, agent.name()).await?;
            seats.insert(player, agent);
        }
        self.service.start_game(&game).await?;
        info!(target: "sim::driver", game_id = %game, players = seats.len(), "game started");

        let mut commands = 1;
        let mut rejected = 0;
        loop {
            let state = self.service.snapshot(&game).await?;
            if state.status == GameStatus::Completed {
                break;
            }
            if state.generation > self.limits.max_generations {
                warn!(
                    target: "sim::driver",
                    game_id = %game,
                    generation = state.generation,
                    "generation limit reached"
                );
                break;
            }
            if commands >= self.limits.max_commands {
                warn!(target: "sim::driver", game_id = %game, commands, "command limit reached");
                break;
            }

            let Some(player) = next_to_act(&state) else {
                bail!("no player can act in phase {}", state.phase);
            };
            let Some(agent) = seats.get(&player) else {
                bail!("player {player} has no agent");
            };

            let view = TableView {
                game: &game,
                player: &player,
                state: &state,
                catalog: self.service.catalog(),
                service: &self.service,
            };
            let mut accepted = false;
            for command in agent.propose(&view).await {
                let kind = command.kind();
                match self.service.execute(&game, command).await {
                    Ok(receipt) => {
                        debug!(
                            target: "sim::driver",
                            player_id = %player,
                            command = %kind,
                            sequence = receipt.sequence,
                            "{}",
                            receipt.description
                        );
                        commands += 1;
                        accepted = true;
                        break;
                    }
                    Err(err) => {
                        rejected += 1;
                        debug!(
                            target: "sim::driver",
                            player_id = %player,
                            command = %kind,
                            error = %err,
                            "proposal rejected"
                        );
                    }
                }
            }
            if !accepted {
                bail!("agent {} for {player} is stuck in {}", agent.name(), state.phase);
            }
        }

        self.report(game, commands, rejected).await
    }

    async fn report(&self, game: GameId, commands: u64, rejected: u64) -> Result<SimReport> {
        let state = self.service.snapshot(&game).await?;
        let mut players = Vec::with_capacity(state.players.len());
        for player in &state.turn_order {
            players.push(self.service.player_ledger(&game, player).await?);
        }
        let completed = state.status == GameStatus::Completed;
        info!(
            target: "sim::driver",
            game_id = %game,
            completed,
            generation = state.generation,
            commands,
            rejected,
            "simulation finished"
        );
        Ok(SimReport {
            game_id: game,
            completed,
            generation: state.generation,
            commands,
            rejected,
            players,
            scores: state.final_scores,
        })
    }
}

/// The player whose decision the game is waiting on.
fn next_to_act(state: &GameState) -> Option<PlayerId> {
    match state.phase {
        GamePhase::StartingCardSelection => first_waiting(state, |p| {
            p.starting_selection
                .as_ref()
                .is_some_and(|selection| !selection.cards_chosen())
        }),
        GamePhase::CorporationSelection => first_waiting(state, |p| p.corporation.is_none()),
        GamePhase::ProductionAndCardDraw => first_waiting(state, |p| {
            p.production_selection
                .as_ref()
                .is_some_and(|selection| !selection.selection_complete)
        }),
        GamePhase::Action => state.current_turn.as_ref().map(|turn| turn.player.clone()),
        GamePhase::WaitingForGameStart | GamePhase::Complete => None,
    }
}

fn first_waiting(state: &GameState, pending: impl Fn(&PlayerState) -> bool) -> Option<PlayerId> {
    state
        .players
        .iter()
        .find(|player| pending(player))
        .map(|player| player.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::GreedyAgent;
    use crate::content;
    use terra_runtime::RuntimeConfig;

    fn rules() -> GameConfig {
        GameConfig {
            starting_card_offer: 5,
            corporation_offer: 1,
            production_draw_count: 2,
            ..GameConfig::default()
        }
    }

    #[tokio::test]
    async fn greedy_table_plays_within_limits() {
        let service = GameService::new(RuntimeConfig::default(), content::catalog());
        let limits = Limits {
            max_generations: 6,
            max_commands: 2_000,
        };
        let agents: Vec<Arc<dyn Agent>> = vec![
            Arc::new(GreedyAgent::new("Ada")),
            Arc::new(GreedyAgent::new("Bo")),
        ];

        let report = Driver::new(service.clone(), limits)
            .play(rules(), agents)
            .await
            .unwrap();

        assert_eq!(report.players.len(), 2);
        assert!(report.commands > 4);
        assert!(report.completed || report.generation > 1);
        assert_eq!(report.completed, report.scores.is_some());

        let diffs = service.diffs_since(&report.game_id, 0).await.unwrap();
        // Joins and the creation entry are logged besides the commands.
        assert_eq!(diffs.len() as u64, report.commands + 3);
    }

    #[test]
    fn lobby_waits_on_nobody() {
        let state = GameState::new(GameId::new("g"), GameConfig::default());
        assert_eq!(next_to_act(&state), None);
    }
}
