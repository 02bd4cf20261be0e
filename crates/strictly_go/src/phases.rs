//! Game phase machine.
//!
//! A session is always in exactly one [`GamePhase`]. The only way to leave
//! a phase is [`GamePhase::transition`], which validates the pair
//! `(phase, event)` exhaustively.

use crate::types::Color;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Phase of a game session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GamePhase {
    /// Waiting for both players.
    #[default]
    NotInitialized,
    /// Stones are being played.
    Running,
    /// Both players passed; territory is being agreed on.
    Negotiations,
    /// The game is over.
    Finished,
}

/// Something that moves a session between phases.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum PhaseEvent {
    /// Both seats are filled.
    Start,
    /// The second consecutive pass.
    TwoPasses,
    /// A player gave up.
    Resign,
    /// A player broke off negotiations to keep playing.
    Resume,
    /// Both players accepted the same territory proposal.
    Agreement,
    /// A player disconnected.
    Abandon,
}

/// A transition the phase machine does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
#[display("Cannot apply {} while {}", event, from)]
pub struct PhaseError {
    /// Phase the session was in.
    pub from: GamePhase,
    /// Rejected event.
    pub event: PhaseEvent,
}

impl std::error::Error for PhaseError {}

impl GamePhase {
    /// Returns the phase reached by applying `event`, or an error if the
    /// pair is not a legal transition.
    #[instrument]
    pub fn transition(self, event: PhaseEvent) -> Result<GamePhase, PhaseError> {
        use GamePhase::*;
        use PhaseEvent::*;

        let next = match (self, event) {
            (NotInitialized, Start) => Running,
            (Running, TwoPasses) => Negotiations,
            (Running | Negotiations, Resign) => Finished,
            (Negotiations, Resume) => Running,
            (Negotiations, Agreement) => Finished,
            (NotInitialized | Running | Negotiations, Abandon) => Finished,
            (from, event) => return Err(PhaseError { from, event }),
        };
        debug!(from = %self, %event, to = %next, "Phase transition");
        Ok(next)
    }

    /// Returns true once the game can no longer change.
    pub fn is_over(self) -> bool {
        self == GamePhase::Finished
    }
}

/// Outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Player won the game.
    Winner(Color),
    /// Equal scores.
    Draw,
}

impl Outcome {
    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Color> {
        match self {
            Outcome::Winner(color) => Some(*color),
            Outcome::Draw => None,
        }
    }

    /// Returns true if the game was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }

    /// Compares two scores; strictly more points wins.
    pub fn from_scores(black: u32, white: u32) -> Self {
        match black.cmp(&white) {
            std::cmp::Ordering::Greater => Outcome::Winner(Color::Black),
            std::cmp::Ordering::Less => Outcome::Winner(Color::White),
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Winner(color) => write!(f, "{} wins", color),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}

/// How a game reached [`GamePhase::Finished`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
pub enum FinishReason {
    /// Both players accepted the territory proposal.
    Agreement,
    /// A player gave up.
    Resignation,
    /// A player disconnected.
    Abandonment,
}

/// Final result reported when a game finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameSummary {
    /// Winner or draw.
    outcome: Outcome,
    /// Black territory plus stones captured by black.
    black_points: u32,
    /// White territory plus stones captured by white.
    white_points: u32,
    /// Why the game ended.
    reason: FinishReason,
}

impl GameSummary {
    /// Summary of a game scored by agreement.
    pub fn scored(black_points: u32, white_points: u32) -> Self {
        Self {
            outcome: Outcome::from_scores(black_points, white_points),
            black_points,
            white_points,
            reason: FinishReason::Agreement,
        }
    }

    /// Summary of a game forfeited by `loser`. No points are reported.
    pub fn forfeit(loser: Color, reason: FinishReason) -> Self {
        Self {
            outcome: Outcome::Winner(loser.opponent()),
            black_points: 0,
            white_points: 0,
            reason,
        }
    }

    /// Returns true if the game ended because a player gave up.
    pub fn by_resignation(&self) -> bool {
        self.reason == FinishReason::Resignation
    }
}
