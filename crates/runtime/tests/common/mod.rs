#![allow(dead_code)]

use terra_core::{
    Card, CardBehavior, CardKind, GameConfig, GameId, GlobalParameter, Output, PlayerId,
    ResourceKind, ResourceSet, TileKind,
};
use terra_runtime::{GameService, RuntimeConfig, StaticCatalog};

/// Two corporations and six projects, in deal order.
pub fn catalog() -> StaticCatalog {
    StaticCatalog::new([
        Card::new("corp-a", "Helion", CardKind::Corporation, 0)
            .with_starting_resources(ResourceSet::credits(40)),
        Card::new("corp-b", "Ecoline", CardKind::Corporation, 0)
            .with_starting_resources(ResourceSet::credits(40)),
        Card::new("mine", "Mine", CardKind::Automated, 5).with_behavior(CardBehavior::auto(
            vec![Output::production(ResourceKind::Steel, 1)],
        )),
        Card::new("greenhouse", "Greenhouse", CardKind::Automated, 3).with_behavior(
            CardBehavior::auto(vec![Output::TilePlacement {
                tile: TileKind::Greenery,
                count: 1,
            }]),
        ),
        Card::new("terraform", "Planetary Overhaul", CardKind::Event, 10).with_behavior(
            CardBehavior::auto(vec![
                Output::GlobalParameter {
                    parameter: GlobalParameter::Temperature,
                    steps: 20,
                },
                Output::GlobalParameter {
                    parameter: GlobalParameter::Oxygen,
                    steps: 20,
                },
                Output::GlobalParameter {
                    parameter: GlobalParameter::Oceans,
                    steps: 20,
                },
            ]),
        ),
        Card::new("c4", "Filler IV", CardKind::Automated, 1),
        Card::new("c5", "Filler V", CardKind::Automated, 1),
        Card::new("c6", "Filler VI", CardKind::Automated, 1),
    ])
}

pub fn small_rules() -> GameConfig {
    GameConfig {
        starting_card_offer: 2,
        corporation_offer: 1,
        production_draw_count: 1,
        ..GameConfig::default()
    }
}

pub fn service() -> GameService {
    GameService::new(RuntimeConfig::default(), catalog())
}

pub fn p(id: &str) -> PlayerId {
    PlayerId::new(id)
}

/// Seats `names`, starts the game and walks every player through card and
/// corporation selection. Each player keeps the offered cards named in `keep`.
pub async fn game_in_action_phase(
    service: &GameService,
    rules: GameConfig,
    names: &[&str],
    keep: &[&str],
) -> GameId {
    let game = service.create_game(rules).await.unwrap();
    let mut players = Vec::new();
    for name in names {
        players.push(service.join_game(&game, name).await.unwrap());
    }
    service.start_game(&game).await.unwrap();

    let state = service.snapshot(&game).await.unwrap();
    for player in &players {
        let selection = state
            .player(player)
            .unwrap()
            .starting_selection
            .clone()
            .unwrap();
        let kept = selection
            .offered_cards
            .into_iter()
            .filter(|card| keep.contains(&card.as_str()))
            .collect();
        service
            .select_starting_cards(&game, player, kept)
            .await
            .unwrap();
    }
    for player in &players {
        let offer = state.player(player).unwrap().starting_selection.as_ref();
        let corporation = offer.unwrap().offered_corporations[0].clone();
        service
            .select_corporation(&game, player, corporation, None)
            .await
            .unwrap();
    }
    game
}
