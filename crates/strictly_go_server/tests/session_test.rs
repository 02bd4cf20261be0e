//! Tests for the session registry.

use std::sync::Arc;
use strictly_go::{Color, FinishReason, GamePhase, Outcome, PlayerColor};
use strictly_go_server::{
    NullSink, PlayerType, ServerConfig, SessionError, SessionManager,
};

fn seated(manager: &SessionManager, id: &str) {
    manager.create_session(id.to_string()).unwrap();
    manager
        .register_player(id, format!("{id}-a"), "Ann".into(), PlayerType::Human)
        .unwrap();
    manager
        .register_player(id, format!("{id}-b"), "Bob".into(), PlayerType::Bot)
        .unwrap();
}

#[test]
fn test_capacity_from_config() {
    let config = ServerConfig::from_toml("max_sessions = 2").unwrap();
    let manager = SessionManager::new(config, Arc::new(NullSink));
    manager.create_session("one".into()).unwrap();
    manager.create_session("two".into()).unwrap();
    assert_eq!(
        manager.create_session("three".into()).unwrap_err(),
        SessionError::CapacityReached(2)
    );

    manager.remove_session("one").unwrap();
    assert!(manager.create_session("three".into()).is_ok());
    assert_eq!(manager.list_sessions(), vec!["three".to_string(), "two".to_string()]);
}

#[test]
fn test_first_player_from_config() {
    let config = ServerConfig::from_toml("first_player = \"white\"").unwrap();
    let manager = SessionManager::new(config, Arc::new(NullSink));
    seated(&manager, "s");
    let game = manager.get_session("s").unwrap();
    assert_eq!(game.current_player(), Color::White);
}

#[test]
fn test_unknown_session() {
    let manager = SessionManager::default();
    assert!(manager.get_session("nope").is_none());
    assert_eq!(
        manager.register_player("nope", "a".into(), "Ann".into(), PlayerType::Human),
        Err(SessionError::NotFound("nope".into()))
    );
}

#[test]
fn test_disconnect_abandons_game() {
    let manager = SessionManager::default();
    seated(&manager, "s");
    let game = manager.get_session("s").unwrap();
    game.make_move(3, 3, PlayerColor::Black).unwrap();

    let summary = manager.disconnect("s", "s-a").unwrap();
    assert_eq!(*summary.outcome(), Outcome::Winner(Color::White));
    assert_eq!(*summary.reason(), FinishReason::Abandonment);
    assert_eq!(game.game_state(), GamePhase::Finished);
    assert_eq!(game.history().len(), 1);

    assert!(matches!(
        manager.disconnect("s", "s-b"),
        Err(SessionError::Game(_))
    ));
    assert_eq!(
        manager.disconnect("s", "ghost"),
        Err(SessionError::UnknownPlayer("ghost".into()))
    );
}

#[test]
fn test_disconnect_before_start() {
    let manager = SessionManager::default();
    let game = manager.create_session("s".into()).unwrap();
    manager
        .register_player("s", "a".into(), "Ann".into(), PlayerType::Human)
        .unwrap();
    let summary = manager.disconnect("s", "a").unwrap();
    assert_eq!(summary.outcome().winner(), Some(Color::White));
    assert_eq!(game.game_state(), GamePhase::Finished);
}

#[test]
fn test_sessions_play_independently_in_parallel() {
    let manager = SessionManager::default();
    let ids: Vec<String> = (0..8).map(|i| format!("game-{i}")).collect();
    for id in &ids {
        seated(&manager, id);
    }

    std::thread::scope(|scope| {
        for id in &ids {
            let game = manager.get_session(id).unwrap();
            scope.spawn(move || {
                for x in 0..10 {
                    game.make_move(x, 0, PlayerColor::Black).unwrap();
                    game.make_move(x, 18, PlayerColor::White).unwrap();
                }
            });
        }
    });

    for id in &ids {
        let view = manager.get_session(id).unwrap().view();
        assert_eq!(*view.move_number(), 20);
        assert_eq!(view.board().count(Color::Black), 10);
    }
}
