//! First-class action types for Go.
//!
//! Moves are domain events, not side effects. They record a player's
//! accepted intent and can be serialized into a linear move list for replay.

use crate::phases::PhaseError;
use crate::types::{Color, Point};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// What a move did on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MoveKind {
    /// A stone placed at `(x, y)`.
    Play {
        /// Column.
        x: u8,
        /// Row.
        y: u8,
    },
    /// The player passed.
    Pass,
}

/// An accepted move: a color and what it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// The player making the move.
    pub color: Color,
    /// Placement or pass.
    #[serde(flatten)]
    pub kind: MoveKind,
}

impl Move {
    /// Creates a stone placement.
    #[instrument]
    pub fn play(color: Color, point: Point) -> Self {
        Self {
            color,
            kind: MoveKind::Play {
                x: point.x,
                y: point.y,
            },
        }
    }

    /// Creates a pass.
    #[instrument]
    pub fn pass(color: Color) -> Self {
        Self {
            color,
            kind: MoveKind::Pass,
        }
    }

    /// Returns the placed point, if this move is a placement.
    pub fn point(&self) -> Option<Point> {
        match self.kind {
            MoveKind::Play { x, y } => Some(Point { x, y }),
            MoveKind::Pass => None,
        }
    }

    /// Returns true for passes.
    pub fn is_pass(&self) -> bool {
        matches!(self.kind, MoveKind::Pass)
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.point() {
            Some(point) => write!(f, "{} -> {}", self.color, point),
            None => write!(f, "{} passes", self.color),
        }
    }
}

/// Why an operation on a game was rejected.
///
/// Every variant is local to the request that produced it: the board and
/// the game context are left exactly as they were before the request.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The field already holds a stone.
    #[display("Field {} is already occupied", _0)]
    FieldOccupied(Point),

    /// The coordinates are off the board.
    #[display("({}, {}) is outside the board", x, y)]
    OutOfBounds {
        /// Requested column.
        x: i32,
        /// Requested row.
        y: i32,
    },

    /// The placed chain would have no liberties and captures nothing.
    #[display("Playing at {} would be suicide", _0)]
    Suicide(Point),

    /// The move would immediately retake a ko.
    #[display("Playing at {} would retake the ko immediately", _0)]
    KoRecapture(Point),

    /// It is the other player's turn.
    #[display("It's not your turn, waiting for {}", _0)]
    NotYourTurn(Color),

    /// Moves are only accepted while the game is running.
    #[display("The game is not running")]
    GameNotRunning,

    /// Territory and agreement requests need the negotiation phase.
    #[display("Negotiations are not active")]
    NegotiationsNotActive,

    /// A stone or request was tagged with the `Both` sentinel.
    #[display("A stone must be black or white")]
    IllegalStoneColor,

    /// A player tried to accept the proposal they made.
    #[display("Cannot accept your own proposal")]
    OwnProposal,

    /// Nobody has proposed to finish negotiations.
    #[display("There is no proposal to accept")]
    NoPendingProposal,

    /// The phase machine refused the transition.
    #[display("{}", _0)]
    IllegalTransition(PhaseError),
}

impl std::error::Error for MoveError {}

impl From<PhaseError> for MoveError {
    fn from(err: PhaseError) -> Self {
        MoveError::IllegalTransition(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_json_shape() {
        let mov = Move::play(Color::Black, Point { x: 3, y: 4 });
        let json = serde_json::to_value(mov).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"color": "black", "kind": "play", "x": 3, "y": 4})
        );

        let pass: Move =
            serde_json::from_str(r#"{"color": "white", "kind": "pass"}"#).unwrap();
        assert_eq!(pass, Move::pass(Color::White));
        assert!(pass.is_pass());
        assert_eq!(pass.point(), None);
    }

    #[test]
    fn test_error_messages() {
        let err = MoveError::FieldOccupied(Point { x: 1, y: 2 });
        assert_eq!(err.to_string(), "Field (1, 2) is already occupied");
        assert_eq!(
            MoveError::OutOfBounds { x: -1, y: 20 }.to_string(),
            "(-1, 20) is outside the board"
        );
    }
}
