//! End-to-end games driven through the service façade.

mod common;

use common::{game_in_action_phase, p, service, small_rules};
use terra_core::{
    CardId, ErrorKind, GameConfig, GamePhase, GameStatus, HexId, Milestone, Payment, SourceKind,
    StandardProject, TileKind,
};

#[tokio::test]
async fn generation_rolls_over_into_production() {
    let service = service();
    let game = game_in_action_phase(&service, small_rules(), &["Ada", "Bo"], &["mine"]).await;

    let ada = service.player_ledger(&game, &p("p1")).await.unwrap();
    assert_eq!(ada.resources.credits, 37);
    assert_eq!(ada.corporation, Some(CardId::new("corp-a")));
    assert_eq!(ada.hand_size, 1);

    service
        .resolve_card_play(&game, &p("p1"), CardId::new("mine"), Payment::credits(5), None, None)
        .await
        .unwrap();
    let ada = service.player_ledger(&game, &p("p1")).await.unwrap();
    assert_eq!(ada.resources.credits, 32);
    assert_eq!(ada.production.steel, 1);
    assert_eq!(ada.played_cards, vec![CardId::new("mine")]);

    // One action used: ending the turn is a skip.
    service.end_turn(&game, &p("p1")).await.unwrap();
    let state = service.snapshot(&game).await.unwrap();
    assert!(!state.player(&p("p1")).unwrap().passed);
    assert_eq!(state.current_turn.as_ref().unwrap().player, p("p2"));

    // Untouched turn: a pass, and the last active player plays on alone.
    service.end_turn(&game, &p("p2")).await.unwrap();
    let state = service.snapshot(&game).await.unwrap();
    let turn = state.current_turn.as_ref().unwrap();
    assert_eq!(turn.player, p("p1"));
    assert!(turn.is_unlimited());

    service.end_turn(&game, &p("p1")).await.unwrap();
    let state = service.snapshot(&game).await.unwrap();
    assert_eq!(state.phase, GamePhase::ProductionAndCardDraw);
    assert_eq!(state.generation, 2);

    let ada = state.player(&p("p1")).unwrap();
    assert_eq!(ada.resources.credits, 52);
    assert_eq!(ada.resources.steel, 1);
    let drawn = &ada.production_selection.as_ref().unwrap().available_cards;
    assert_eq!(drawn, &vec![CardId::new("c5")]);

    service
        .confirm_production_cards(&game, &p("p1"), vec![CardId::new("c5")])
        .await
        .unwrap();
    assert_eq!(
        service.snapshot(&game).await.unwrap().phase,
        GamePhase::ProductionAndCardDraw
    );
    service
        .confirm_production_cards(&game, &p("p2"), vec![])
        .await
        .unwrap();

    let state = service.snapshot(&game).await.unwrap();
    assert_eq!(state.phase, GamePhase::Action);
    assert_eq!(state.current_turn.as_ref().unwrap().player, p("p2"));
    assert_eq!(state.player(&p("p1")).unwrap().resources.credits, 49);
}

#[tokio::test]
async fn queued_tiles_block_the_turn_until_placed() {
    let service = service();
    let rules = GameConfig {
        starting_card_offer: 3,
        ..small_rules()
    };
    let game = game_in_action_phase(&service, rules, &["Ada"], &["greenhouse"]).await;

    service
        .resolve_card_play(
            &game,
            &p("p1"),
            CardId::new("greenhouse"),
            Payment::credits(3),
            None,
            None,
        )
        .await
        .unwrap();

    let err = service.end_turn(&game, &p("p1")).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidState));

    let hexes = service
        .available_hexes(&game, &p("p1"), TileKind::Greenery)
        .unwrap();
    assert!(hexes.contains(&HexId::new("0,0")));

    service.place_tile(&game, &p("p1"), "0,0").await.unwrap();
    let ada = service.player_ledger(&game, &p("p1")).await.unwrap();
    assert_eq!(ada.resources.plants, 2);
    assert_eq!(ada.terraform_rating, 21);

    // Oceans only go on reserved hexes.
    service
        .append_tile_placement_request(&game, &p("p1"), vec![TileKind::Ocean], "test")
        .await
        .unwrap();
    let err = service.place_tile(&game, &p("p1"), "1,1").await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidChoice));
    service.place_tile(&game, &p("p1"), "2,0").await.unwrap();

    service.end_turn(&game, &p("p1")).await.unwrap();
}

#[tokio::test]
async fn maxed_globals_end_the_game_at_generation_end() {
    let service = service();
    let rules = GameConfig {
        starting_card_offer: 3,
        ..small_rules()
    };
    let game = game_in_action_phase(&service, rules, &["Ada"], &["terraform"]).await;

    service
        .resolve_card_play(
            &game,
            &p("p1"),
            CardId::new("terraform"),
            Payment::credits(10),
            None,
            None,
        )
        .await
        .unwrap();
    assert_eq!(
        service.player_ledger(&game, &p("p1")).await.unwrap().terraform_rating,
        62
    );
    assert!(service.final_scores(&game).await.unwrap().is_none());

    service.end_turn(&game, &p("p1")).await.unwrap();

    let state = service.snapshot(&game).await.unwrap();
    assert_eq!(state.status, GameStatus::Completed);
    assert_eq!(state.phase, GamePhase::Complete);
    let scores = service.final_scores(&game).await.unwrap().unwrap();
    assert_eq!(scores.scores.len(), 1);
    assert_eq!(scores.scores[0].placement, 1);
    assert!(scores.scores[0].is_winner);

    let err = service.end_turn(&game, &p("p1")).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InvalidState));
}

#[tokio::test]
async fn rejected_commands_do_not_touch_the_log() {
    let service = service();
    let game = game_in_action_phase(&service, small_rules(), &["Ada", "Bo"], &[]).await;
    let before = service.snapshot(&game).await.unwrap();
    let logged = service.diffs_since(&game, 0).await.unwrap().len();

    let err = service.end_turn(&game, &p("p2")).await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NotYourTurn));

    let err = service
        .claim_milestone(&game, &p("p1"), Milestone::Terraformer)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::RequirementNotMet));
    assert!(err.rules_error().is_some());

    assert_eq!(service.snapshot(&game).await.unwrap(), before);
    assert_eq!(service.diffs_since(&game, 0).await.unwrap().len(), logged);
}

#[tokio::test]
async fn diff_log_replays_the_whole_game() {
    let service = service();
    let game = game_in_action_phase(&service, small_rules(), &["Ada", "Bo"], &[]).await;

    let diffs = service.diffs_since(&game, 0).await.unwrap();
    // created, two joins, start, two card picks, two corporations
    assert_eq!(diffs.len(), 8);
    assert!(
        diffs
            .windows(2)
            .all(|pair| pair[1].sequence == pair[0].sequence + 1)
    );
    assert!(diffs.iter().all(|diff| diff.state_root.is_some()));

    let tail = service.diffs_since(&game, 6).await.unwrap();
    assert_eq!(tail.len(), 2);
    assert_eq!(tail[0].sequence, 7);
}

#[tokio::test]
async fn standard_projects_are_logged_as_such() {
    let service = service();
    let game = game_in_action_phase(&service, small_rules(), &["Ada", "Bo"], &[]).await;
    let credits = service
        .player_ledger(&game, &p("p1"))
        .await
        .unwrap()
        .resources
        .credits;

    service
        .build_standard_project(
            &game,
            &p("p1"),
            StandardProject::PowerPlant,
            Payment::credits(GameConfig::POWER_PLANT_COST),
        )
        .await
        .unwrap();
    let ada = service.player_ledger(&game, &p("p1")).await.unwrap();
    assert_eq!(ada.resources.credits, credits - GameConfig::POWER_PLANT_COST);
    assert_eq!(ada.production.energy, 1);

    let err = service
        .build_standard_project(&game, &p("p1"), StandardProject::Aquifer, Payment::credits(5))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::PaymentInsufficient));

    let err = service
        .convert_heat_to_temperature(&game, &p("p1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::InsufficientResource));

    let diffs = service.diffs_since(&game, 0).await.unwrap();
    let last = diffs.last().unwrap();
    assert_eq!(last.source_kind, SourceKind::StandardProject);
    assert_eq!(last.source, "power-plant");
}
