//! Tile placement queue and board placement.

use super::transition::{Transition, TransitionContext, require_current_player};
use super::turns::advance_if_exhausted;
use crate::behavior::LedgerSnapshot;
use crate::env::GameEnv;
use crate::error::RulesError;
use crate::events::DomainEvent;
use crate::modifier::ocean_adjacency_bonus;
use crate::state::{
    GamePhase, GameState, GameStatus, GlobalParameter, HexId, PlacementBonus, PlayerId,
    ResourceKind, TileKind,
};

/// Queues tiles for a player outside card resolution, e.g. standard projects.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AppendTilePlacement {
    pub player: PlayerId,
    pub tiles: Vec<TileKind>,
    pub source: String,
}

impl AppendTilePlacement {
    pub fn new(player: PlayerId, tiles: Vec<TileKind>, source: impl Into<String>) -> Self {
        Self {
            player,
            tiles,
            source: source.into(),
        }
    }
}

impl Transition for AppendTilePlacement {
    fn pre_validate(&self, state: &GameState, _env: GameEnv<'_>) -> Result<(), RulesError> {
        state.require_status(GameStatus::Active)?;
        state.require_player(&self.player)?;
        if self.tiles.is_empty() {
            return Err(RulesError::invalid_state("no tiles to queue"));
        }
        Ok(())
    }

    fn apply(&self, ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
        ctx.state
            .require_player_mut(&self.player)?
            .queue_tiles(self.tiles.iter().copied(), &self.source);
        ctx.emit(DomainEvent::TilePlacementQueued {
            player: self.player.clone(),
            tiles: self.tiles.clone(),
            source: self.source.clone(),
        });
        ctx.describe(format!(
            "{} queued {} tile(s) from {}",
            self.player,
            self.tiles.len(),
            self.source
        ));
        Ok(())
    }
}

/// Places the player's next pending tile on `hex`.
///
/// Does not spend an action: the action was paid by whatever queued the tile.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaceTile {
    pub player: PlayerId,
    pub hex: HexId,
}

impl PlaceTile {
    pub fn new(player: PlayerId, hex: impl Into<HexId>) -> Self {
        Self {
            player,
            hex: hex.into(),
        }
    }
}

impl Transition for PlaceTile {
    fn pre_validate(&self, state: &GameState, env: GameEnv<'_>) -> Result<(), RulesError> {
        state.require_status(GameStatus::Active)?;
        state.require_phase(GamePhase::Action)?;
        let player = state.require_player(&self.player)?;
        require_current_player(state, &self.player)?;

        let Some(tile) = player.pending_tiles.as_ref().and_then(|queue| queue.front()) else {
            return Err(RulesError::invalid_state("no tile placement pending"));
        };
        if !env
            .board()
            .available_hexes(tile, &self.player)
            .contains(&self.hex)
        {
            return Err(RulesError::invalid_target(format!(
                "{tile} cannot be placed on {}",
                self.hex
            )));
        }
        Ok(())
    }

    fn apply(&self, ctx: &mut TransitionContext<'_>) -> Result<(), RulesError> {
        let snapshot = LedgerSnapshot::capture(ctx.state);
        let tile = ctx
            .state
            .require_player_mut(&self.player)?
            .pop_pending_tile()
            .ok_or_else(|| RulesError::invalid_state("no tile placement pending"))?;
        let placed = ctx.env.board().place_tile(tile, &self.hex, &self.player)?;

        for bonus in &placed.bonuses {
            match *bonus {
                PlacementBonus::Resource { kind, amount } => {
                    ctx.state
                        .require_player_mut(&self.player)?
                        .resources
                        .add(kind, amount);
                }
                PlacementBonus::CardDraw { count } => {
                    let cards = ctx.env.deck().draw_project_cards(count as usize);
                    if !cards.is_empty() {
                        ctx.state
                            .require_player_mut(&self.player)?
                            .hand
                            .extend(cards.iter().cloned());
                        ctx.emit(DomainEvent::CardsAddedToHand {
                            player: self.player.clone(),
                            cards,
                        });
                    }
                }
            }
            ctx.emit(DomainEvent::PlacementBonusGained {
                player: self.player.clone(),
                hex: self.hex.clone(),
                bonus: *bonus,
            });
        }

        let player = ctx.state.require_player_mut(&self.player)?;
        if placed.adjacent_oceans > 0 {
            let bonus = placed.adjacent_oceans as i32 * ocean_adjacency_bonus(player);
            player.resources.add(ResourceKind::Credits, bonus);
        }

        let parameter = match tile {
            TileKind::Greenery => Some(GlobalParameter::Oxygen),
            TileKind::Ocean => Some(GlobalParameter::Oceans),
            TileKind::City => None,
        };
        if let Some(parameter) = parameter {
            let taken = ctx.state.global.raise(parameter, 1);
            ctx.state.require_player_mut(&self.player)?.terraform_rating += taken as i32;
        }

        snapshot.finish(ctx.state, &self.player, &mut ctx.log.events);
        ctx.emit(DomainEvent::TilePlaced {
            player: self.player.clone(),
            tile,
            hex: self.hex.clone(),
        });
        ctx.describe(format!("{} placed {tile} on {}", self.player, self.hex));
        advance_if_exhausted(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::state::TurnState;
    use crate::testing::Fixture;

    fn p1() -> PlayerId {
        PlayerId::new("p1")
    }

    #[test]
    fn append_queues_behind_existing_tiles() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        fixture
            .execute(AppendTilePlacement::new(p1(), vec![TileKind::City], "City").into())
            .unwrap();
        fixture
            .execute(AppendTilePlacement::new(p1(), vec![TileKind::Ocean], "Aquifer").into())
            .unwrap();

        let queue = fixture.player("p1").pending_tiles.clone().unwrap();
        assert_eq!(queue.source, "City");
        assert_eq!(queue.pending, [TileKind::City, TileKind::Ocean]);
    }

    #[test]
    fn empty_append_is_rejected() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        let err = fixture
            .execute(AppendTilePlacement::new(p1(), vec![], "nothing").into())
            .unwrap_err();
        assert!(matches!(err.rules_error(), Some(RulesError::InvalidState { .. })));
    }

    #[test]
    fn ocean_raises_the_track_and_rating() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        fixture.board.add_hex("h1", vec![], 0);
        fixture.player_mut("p1").queue_tiles([TileKind::Ocean], "test");

        let outcome = fixture.execute(PlaceTile::new(p1(), "h1").into()).unwrap();

        assert_eq!(fixture.state.global.oceans, 1);
        assert_eq!(fixture.player("p1").terraform_rating, 21);
        assert!(!fixture.player("p1").has_pending_tiles());
        assert!(outcome
            .events
            .iter()
            .any(|e| matches!(e, DomainEvent::OceansChanged { old: 0, new: 1, .. })));
    }

    #[test]
    fn bonuses_and_adjacent_oceans_pay_out() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]).with_deck(&["d1"], &[]);
        fixture.board.add_hex(
            "h1",
            vec![
                PlacementBonus::Resource {
                    kind: ResourceKind::Steel,
                    amount: 2,
                },
                PlacementBonus::CardDraw { count: 1 },
            ],
            2,
        );
        fixture.player_mut("p1").queue_tiles([TileKind::City], "test");

        fixture.execute(PlaceTile::new(p1(), "h1").into()).unwrap();

        let player = fixture.player("p1");
        assert_eq!(player.resources.steel, 2);
        assert_eq!(
            player.resources.credits,
            2 * GameConfig::OCEAN_ADJACENCY_CREDITS as i32
        );
        assert_eq!(player.hand.len(), 1);
        assert_eq!(player.terraform_rating, 20);
    }

    #[test]
    fn greenery_at_max_oxygen_gives_no_rating() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        fixture.state.global.oxygen = GameConfig::MAX_OXYGEN;
        fixture.board.add_hex("h1", vec![], 0);
        fixture.player_mut("p1").queue_tiles([TileKind::Greenery], "test");

        fixture.execute(PlaceTile::new(p1(), "h1").into()).unwrap();
        assert_eq!(fixture.player("p1").terraform_rating, 20);
    }

    #[test]
    fn unavailable_hex_is_rejected() {
        let mut fixture = Fixture::action_phase(&["p1"], vec![]);
        fixture.board.add_hex("h1", vec![], 0);
        fixture.player_mut("p1").queue_tiles([TileKind::City], "test");

        let err = fixture
            .execute(PlaceTile::new(p1(), "elsewhere").into())
            .unwrap_err();
        assert!(matches!(err.rules_error(), Some(RulesError::InvalidTarget { .. })));
    }

    #[test]
    fn last_tile_of_a_spent_turn_passes_it_on() {
        let mut fixture = Fixture::action_phase(&["p1", "p2"], vec![]);
        fixture.state.current_turn = Some(TurnState::new(p1(), 0));
        fixture.board.add_hex("h1", vec![], 0);
        fixture.player_mut("p1").queue_tiles([TileKind::City], "test");

        fixture.execute(PlaceTile::new(p1(), "h1").into()).unwrap();
        assert_eq!(fixture.state.current_player().unwrap().as_str(), "p2");
    }
}
