//! Stones placed on the board.

use crate::action::MoveError;
use crate::types::{Color, PlayerColor, Point};
use serde::{Deserialize, Serialize};

/// Index of a chain in the board's chain arena.
pub type ChainId = usize;

/// One placed piece.
///
/// The stone knows which chain it belongs to by id; the chain arena lives
/// in the [`Board`](crate::Board). Liberties are computed by the board on
/// demand, see [`Board::stone_liberties`](crate::Board::stone_liberties).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stone {
    point: Point,
    color: Color,
    chain: ChainId,
}

impl Stone {
    /// Creates a stone. Fails with [`MoveError::IllegalStoneColor`] for the
    /// `Both` sentinel.
    pub fn new(point: Point, color: PlayerColor, chain: ChainId) -> Result<Self, MoveError> {
        Ok(Self {
            point,
            color: Color::try_from(color)?,
            chain,
        })
    }

    /// Position of the stone.
    pub fn point(&self) -> Point {
        self.point
    }

    /// Stone color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Chain this stone belongs to.
    pub fn chain(&self) -> ChainId {
        self.chain
    }

    pub(crate) fn set_chain(&mut self, chain: ChainId) {
        self.chain = chain;
    }
}
