//! Broadcast topics as seen by an external subscriber.

mod common;

use common::{game_in_action_phase, p, service, small_rules};
use terra_core::{DomainEvent, GamePhase, GameStatus};
use terra_runtime::{Event, LobbyEvent, Topic};

#[tokio::test]
async fn lobby_topic_follows_game_lifecycle() {
    let service = service();
    let mut lobby = service.subscribe(Topic::Lobby);

    let game = service.create_default_game().await.unwrap();
    let player = service.join_game(&game, "Ada").await.unwrap();
    service.remove_game(&game).unwrap();

    match lobby.recv().await.unwrap() {
        Event::Lobby(LobbyEvent::GameCreated { game_id }) => assert_eq!(game_id, game),
        other => panic!("unexpected event: {other:?}"),
    }
    match lobby.recv().await.unwrap() {
        Event::Lobby(LobbyEvent::PlayerJoined {
            game_id,
            player: joined,
            name,
        }) => {
            assert_eq!(game_id, game);
            assert_eq!(joined, player);
            assert_eq!(name, "Ada");
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(matches!(
        lobby.recv().await.unwrap(),
        Event::Lobby(LobbyEvent::GameRemoved { .. })
    ));
}

#[tokio::test]
async fn state_topic_carries_one_update_per_diff() {
    let service = service();
    let mut updates = service.subscribe(Topic::GameState);

    let game = service.create_default_game().await.unwrap();
    service.join_game(&game, "Ada").await.unwrap();
    service.start_game(&game).await.unwrap();

    for expected in 1..=3 {
        let Event::GameState(update) = updates.recv().await.unwrap() else {
            panic!("only game state updates belong on this topic");
        };
        assert_eq!(update.game_id, game);
        assert_eq!(update.sequence(), expected);
    }
    assert!(updates.try_recv().is_err());
}

#[tokio::test]
async fn turn_topic_reports_status_and_phase_changes() {
    let service = service();
    let mut turns = service.subscribe(Topic::Turn);

    let game = service.create_default_game().await.unwrap();
    service.join_game(&game, "Ada").await.unwrap();
    let receipt = service.start_game(&game).await.unwrap();

    let Event::Turn(first) = turns.recv().await.unwrap() else {
        panic!("expected a turn notice");
    };
    assert_eq!(first.sequence, receipt.sequence);
    assert_eq!(
        first.event,
        DomainEvent::GameStatusChanged {
            old: GameStatus::Lobby,
            new: GameStatus::Active,
        }
    );

    let Event::Turn(second) = turns.recv().await.unwrap() else {
        panic!("expected a turn notice");
    };
    assert!(matches!(
        second.event,
        DomainEvent::GamePhaseChanged {
            new: GamePhase::StartingCardSelection,
            ..
        }
    ));
}

#[tokio::test]
async fn turn_changes_name_the_next_player() {
    let service = service();
    let game = game_in_action_phase(&service, small_rules(), &["Ada", "Bo"], &[]).await;
    let mut turns = service.subscribe(Topic::Turn);

    service.end_turn(&game, &p("p1")).await.unwrap();

    let mut saw_pass = false;
    let mut next = None;
    while let Ok(Event::Turn(notice)) = turns.try_recv() {
        match notice.event {
            DomainEvent::PlayerPassed { player } => saw_pass = player == p("p1"),
            DomainEvent::TurnChanged { player, .. } => next = Some(player),
            _ => {}
        }
    }
    assert!(saw_pass);
    assert_eq!(next, Some(p("p2")));
}
