//! Tests for placement, capture, suicide and ko on the full board.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use strictly_go::{
    Board, BoardInvariants, Color, InvariantSet, MoveError, PlayerColor, Point,
};

fn point(x: u8, y: u8) -> Point {
    Point { x, y }
}

#[test]
fn test_corner_edge_interior_liberties() {
    let mut board = Board::new();
    board.place_stone(0, 0, PlayerColor::Black).unwrap();
    board.place_stone(18, 7, PlayerColor::White).unwrap();
    board.place_stone(7, 7, PlayerColor::Black).unwrap();

    assert_eq!(board.stone_liberties(0, 0).unwrap().len(), 2);
    assert_eq!(board.stone_liberties(18, 7).unwrap().len(), 3);
    assert_eq!(board.stone_liberties(7, 7).unwrap().len(), 4);
}

#[test]
fn test_one_move_captures_two_chains() {
    let mut board = Board::new();
    for (x, y, color) in [
        (0, 0, PlayerColor::White),
        (2, 0, PlayerColor::White),
        (0, 1, PlayerColor::Black),
        (2, 1, PlayerColor::Black),
        (3, 0, PlayerColor::Black),
    ] {
        board.place_stone(x, y, color).unwrap();
    }

    let placement = board.place_stone(1, 0, PlayerColor::Black).unwrap();
    let mut captured = placement.captured().clone();
    captured.sort();
    assert_eq!(captured, vec![point(0, 0), point(2, 0)]);
    assert_eq!(placement.ko(), &None);
    assert_eq!(board.stone_count(Color::White), 0);
}

#[test]
fn test_large_chain_capture_frees_every_field() {
    let mut board = Board::new();
    // White wall along the top edge, black closing it off from below.
    for x in 0..5 {
        board.place_stone(x, 0, PlayerColor::White).unwrap();
    }
    for x in 0..5 {
        board.place_stone(x, 1, PlayerColor::Black).unwrap();
    }
    assert_eq!(board.chain_at(point(0, 0)).unwrap().len(), 5);

    let placement = board.place_stone(5, 0, PlayerColor::Black).unwrap();
    assert_eq!(placement.captured().len(), 5);
    for x in 0..5 {
        assert!(board.is_empty(x, 0));
    }
    // The black row and the capturing stone stay separate chains.
    assert_eq!(board.live_chain_count(), 2);
    assert!(BoardInvariants::check_all(&board).is_ok());
}

#[test]
fn test_rejected_moves_leave_board_untouched() {
    let mut board = Board::new();
    for (x, y, color) in [
        (1, 0, PlayerColor::Black),
        (0, 1, PlayerColor::Black),
        (5, 5, PlayerColor::White),
    ] {
        board.place_stone(x, y, color).unwrap();
    }
    let before = board.snapshot();

    assert!(matches!(
        board.place_stone(0, 0, PlayerColor::White),
        Err(MoveError::Suicide(_))
    ));
    assert!(matches!(
        board.place_stone(5, 5, PlayerColor::Black),
        Err(MoveError::FieldOccupied(_))
    ));
    assert!(matches!(
        board.place_stone(-1, 5, PlayerColor::Black),
        Err(MoveError::OutOfBounds { x: -1, y: 5 })
    ));
    assert_eq!(board.snapshot(), before);
    assert!(BoardInvariants::check_all(&board).is_ok());
}

#[test]
fn test_ko_fight_alternates() {
    let mut board = Board::new();
    for (x, y, color) in [
        (1, 0, PlayerColor::White),
        (0, 1, PlayerColor::White),
        (2, 1, PlayerColor::White),
        (1, 1, PlayerColor::Black),
        (0, 2, PlayerColor::Black),
        (2, 2, PlayerColor::Black),
        (1, 3, PlayerColor::Black),
    ] {
        board.place_stone(x, y, color).unwrap();
    }

    board.place_stone(1, 2, PlayerColor::White).unwrap();
    assert_eq!(
        board.place_stone(1, 1, PlayerColor::Black),
        Err(MoveError::KoRecapture(point(1, 1)))
    );

    // Ko threats elsewhere, then black retakes and white is now blocked.
    board.place_stone(15, 15, PlayerColor::Black).unwrap();
    board.place_stone(15, 16, PlayerColor::White).unwrap();
    let retake = board.place_stone(1, 1, PlayerColor::Black).unwrap();
    assert_eq!(retake.captured(), &vec![point(1, 2)]);
    assert_eq!(retake.ko(), &Some(point(1, 1)));
    assert_eq!(
        board.place_stone(1, 2, PlayerColor::White),
        Err(MoveError::KoRecapture(point(1, 2)))
    );
}

#[test]
fn test_invariants_hold_over_long_sequence() {
    let mut board = Board::new();
    let mut rng = StdRng::seed_from_u64(42);
    let mut color = PlayerColor::Black;
    for _ in 0..600 {
        let x = rng.gen_range(0..9);
        let y = rng.gen_range(0..9);
        if board.place_stone(x, y, color).is_ok() {
            color = color.other();
        }
        assert!(BoardInvariants::check_all(&board).is_ok());
    }
}
