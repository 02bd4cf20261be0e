//! Move lists on disk.

use crate::manager::{GameManager, RejectedMove, SessionView};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use strictly_go::Move;
use tracing::{debug, info, instrument};

/// A linear list of accepted moves, stored as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveList {
    /// Moves in the order they were played.
    pub moves: Vec<Move>,
}

impl MoveList {
    /// Wraps a move list.
    pub fn new(moves: Vec<Move>) -> Self {
        Self { moves }
    }

    /// Captures the history of a running game.
    pub fn from_game(game: &GameManager) -> Self {
        Self::new(game.history())
    }

    /// Reads a move list from a JSON file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let list: Self = serde_json::from_str(&content)?;
        info!(moves = list.moves.len(), "Move list loaded");
        Ok(list)
    }

    /// Writes the move list as pretty JSON.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display(), moves = self.moves.len()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        debug!("Move list saved");
        Ok(())
    }

    /// Re-applies the moves to `game`, replacing its state.
    pub fn replay_into(&self, game: &GameManager) -> Result<SessionView, ReplayError> {
        Ok(game.replay(&self.moves)?)
    }
}

/// Replay error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Replay error: {} at {}:{}", message, file, line)]
pub struct ReplayError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ReplayError {
    /// Creates a new replay error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for ReplayError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for ReplayError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Invalid move list: {}", err))
    }
}

impl From<RejectedMove> for ReplayError {
    #[track_caller]
    fn from(err: RejectedMove) -> Self {
        Self::new(err.to_string())
    }
}
