//! Tests for move list files and replay.

use strictly_go::{Color, GamePhase, Intersection, Move, MoveError, PlayerColor, Point};
use strictly_go_server::{GameManager, MoveList, ServerConfig};

fn point(x: u8, y: u8) -> Point {
    Point { x, y }
}

#[test]
fn test_saved_history_replays_to_same_view() {
    let game = GameManager::default();
    game.start_game().unwrap();
    for (x, y, color) in [
        (1, 0, PlayerColor::Black),
        (1, 1, PlayerColor::White),
        (0, 1, PlayerColor::Black),
        (5, 5, PlayerColor::White),
        (2, 1, PlayerColor::Black),
        (6, 6, PlayerColor::White),
        (1, 2, PlayerColor::Black),
    ] {
        game.make_move(x, y, color).unwrap();
    }
    game.pass_move(PlayerColor::White).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("game.json");
    MoveList::from_game(&game).save(&path).unwrap();

    let copy = GameManager::default();
    let list = MoveList::load(&path).unwrap();
    assert_eq!(list.moves.len(), 8);
    let view = list.replay_into(&copy).unwrap();

    assert_eq!(view, game.view());
    assert_eq!(view.captures().by(Color::Black), 1);
    assert_eq!(copy.history(), game.history());
}

#[test]
fn test_replay_rejects_illegal_list_and_keeps_state() {
    let game = GameManager::default();
    game.start_game().unwrap();
    game.make_move(9, 9, PlayerColor::Black).unwrap();
    let before = game.view();

    let moves = vec![
        Move::play(Color::Black, point(3, 3)),
        Move::play(Color::White, point(3, 3)),
    ];
    let err = game.replay(&moves).unwrap_err();
    assert_eq!(err.index, 1);
    assert_eq!(err.error, MoveError::FieldOccupied(point(3, 3)));
    assert_eq!(game.view(), before);
}

#[test]
fn test_replay_wrong_turn_order() {
    let game = GameManager::default();
    let moves = vec![Move::pass(Color::White)];
    let err = game.replay(&moves).unwrap_err();
    assert_eq!(err.error, MoveError::NotYourTurn(Color::Black));
    assert_eq!(game.game_state(), GamePhase::NotInitialized);
}

#[test]
fn test_replay_of_finished_game_restarts_it() {
    let game = GameManager::default();
    game.start_game().unwrap();
    game.give_up_game(PlayerColor::Black).unwrap();

    let view = game
        .replay(&[Move::play(Color::Black, point(0, 0))])
        .unwrap();
    assert_eq!(*view.phase(), GamePhase::Running);
    assert_eq!(view.board().at(point(0, 0)), Some(Intersection::Black));
    assert_eq!(*view.summary(), None);
}

#[test]
fn test_two_passes_in_list_reach_negotiations() {
    let game = GameManager::default();
    let view = game
        .replay(&[Move::pass(Color::Black), Move::pass(Color::White)])
        .unwrap();
    assert_eq!(*view.phase(), GamePhase::Negotiations);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = MoveList::load(dir.path().join("absent.json")).unwrap_err();
    assert!(err.message.starts_with("I/O error"));
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("strictly_go.toml");
    std::fs::write(&path, "max_sessions = 4\nfirst_player = \"white\"\n").unwrap();

    let config = ServerConfig::from_file(&path).unwrap();
    assert_eq!(*config.max_sessions(), 4);
    assert_eq!(*config.first_player(), Color::White);
    assert_eq!(ServerConfig::load(None).unwrap(), ServerConfig::default());
    assert!(ServerConfig::from_file(dir.path().join("absent.toml")).is_err());
}
