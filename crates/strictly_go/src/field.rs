//! A single intersection of the board.

use crate::stone::Stone;
use crate::types::Point;

/// One grid cell. Holds at most one stone.
///
/// Fields are created once when the board is built; only the board changes
/// their occupancy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    point: Point,
    neighbors: Vec<Point>,
    stone: Option<Stone>,
}

impl Field {
    pub(crate) fn new(point: Point) -> Self {
        Self {
            point,
            neighbors: point.neighbors().collect(),
            stone: None,
        }
    }

    /// Coordinates of this field.
    pub fn point(&self) -> Point {
        self.point
    }

    /// Orthogonal neighbors on the board.
    pub fn neighbors(&self) -> &[Point] {
        &self.neighbors
    }

    /// The stone on this field, if any.
    pub fn stone(&self) -> Option<&Stone> {
        self.stone.as_ref()
    }

    /// Returns true if no stone is on this field.
    pub fn is_empty(&self) -> bool {
        self.stone.is_none()
    }

    pub(crate) fn stone_mut(&mut self) -> Option<&mut Stone> {
        self.stone.as_mut()
    }

    pub(crate) fn put(&mut self, stone: Stone) {
        self.stone = Some(stone);
    }

    pub(crate) fn take(&mut self) -> Option<Stone> {
        self.stone.take()
    }
}
