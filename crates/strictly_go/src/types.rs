//! Core domain types for Go.

use crate::action::MoveError;
use serde::{Deserialize, Serialize};

/// Number of lines on each side of the board.
pub const BOARD_SIZE: usize = 19;

/// Number of intersections on the board.
pub const FIELD_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// Color of a stone, and of the player who places it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Color {
    /// Black moves first.
    Black,
    /// White.
    White,
}

impl Color {
    /// Returns the opponent color.
    pub fn opponent(self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

/// Color tag carried by requests and notifications.
///
/// `Both` addresses both players at once. It is never a valid stone color.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlayerColor {
    /// Black player.
    Black,
    /// White player.
    White,
    /// Both players.
    Both,
}

impl PlayerColor {
    /// Returns the opposite tag. `Both` maps to itself.
    pub fn other(self) -> Self {
        match self {
            PlayerColor::Black => PlayerColor::White,
            PlayerColor::White => PlayerColor::Black,
            PlayerColor::Both => PlayerColor::Both,
        }
    }

    /// Returns true if a message tagged with `self` reaches `color`.
    pub fn includes(self, color: Color) -> bool {
        self == PlayerColor::Both || self == PlayerColor::from(color)
    }
}

impl From<Color> for PlayerColor {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => PlayerColor::Black,
            Color::White => PlayerColor::White,
        }
    }
}

impl TryFrom<PlayerColor> for Color {
    type Error = MoveError;

    fn try_from(color: PlayerColor) -> Result<Self, Self::Error> {
        match color {
            PlayerColor::Black => Ok(Color::Black),
            PlayerColor::White => Ok(Color::White),
            PlayerColor::Both => Err(MoveError::IllegalStoneColor),
        }
    }
}

/// An intersection on the board. `(0, 0)` is the top-left corner.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Point {
    /// Column, growing to the right.
    pub x: u8,
    /// Row, growing downwards.
    pub y: u8,
}

impl Point {
    /// Creates a point from raw coordinates, or `None` when off the board.
    pub fn checked(x: i32, y: i32) -> Option<Self> {
        let size = BOARD_SIZE as i32;
        if (0..size).contains(&x) && (0..size).contains(&y) {
            Some(Self {
                x: x as u8,
                y: y as u8,
            })
        } else {
            None
        }
    }

    /// Returns true if both coordinates lie on the board. Points built by
    /// hand bypass [`Point::checked`], so queries taking a `Point` test this.
    pub fn on_board(self) -> bool {
        (self.x as usize) < BOARD_SIZE && (self.y as usize) < BOARD_SIZE
    }

    /// Linear index into a row-major board array.
    pub fn index(self) -> usize {
        self.y as usize * BOARD_SIZE + self.x as usize
    }

    /// Inverse of [`Point::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        if index < FIELD_COUNT {
            Some(Self {
                x: (index % BOARD_SIZE) as u8,
                y: (index / BOARD_SIZE) as u8,
            })
        } else {
            None
        }
    }

    /// Orthogonal neighbors that lie on the board (2 to 4 of them).
    pub fn neighbors(self) -> impl Iterator<Item = Point> {
        let (x, y) = (self.x as i32, self.y as i32);
        [(0, -1), (1, 0), (0, 1), (-1, 0)]
            .into_iter()
            .filter_map(move |(dx, dy)| Point::checked(x + dx, y + dy))
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Content of one intersection in a board snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intersection {
    /// No stone.
    #[default]
    Empty,
    /// A black stone.
    Black,
    /// A white stone.
    White,
}

impl From<Color> for Intersection {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => Intersection::Black,
            Color::White => Intersection::White,
        }
    }
}

impl Intersection {
    /// Returns the stone color, if any.
    pub fn color(self) -> Option<Color> {
        match self {
            Intersection::Empty => None,
            Intersection::Black => Some(Color::Black),
            Intersection::White => Some(Color::White),
        }
    }

    /// Character used by text renderings.
    pub fn symbol(self) -> char {
        match self {
            Intersection::Empty => '.',
            Intersection::Black => 'X',
            Intersection::White => 'O',
        }
    }
}
