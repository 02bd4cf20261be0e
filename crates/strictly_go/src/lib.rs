//! Strictly Go - rules engine for two-player Go on a 19×19 board
//!
//! # Architecture
//!
//! - **Board**: fields, stones and the chain arena; placement, capture,
//!   suicide and ko
//! - **Context**: turn, passes, captures and negotiated territory
//! - **Phases**: the exhaustive game phase machine and final results
//! - **Invariants**: composable checks over the board and the context
//!
//! # Example
//!
//! ```
//! use strictly_go::{Board, MoveError, PlayerColor};
//!
//! let mut board = Board::new();
//! board.place_stone(3, 3, PlayerColor::Black)?;
//! assert!(board.stone(3, 3).is_some());
//! # Ok::<(), MoveError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod action;
mod board;
mod chain;
mod context;
mod field;
mod invariants;
mod phases;
mod stone;
mod types;

// Crate-level exports - Board
pub use board::{Board, BoardSnapshot, Placement};
pub use chain::StoneChain;
pub use field::Field;
pub use stone::{ChainId, Stone};

// Crate-level exports - Moves and errors
pub use action::{Move, MoveError, MoveKind};

// Crate-level exports - Game flow
pub use context::{Captures, GameContext, Territory};
pub use phases::{FinishReason, GamePhase, GameSummary, Outcome, PhaseError, PhaseEvent};

// Crate-level exports - Invariants
pub use invariants::{
    BoardInvariants, ChainMembershipInvariant, ContextInvariants, Invariant, InvariantSet,
    InvariantViolation, NoCapturableChainInvariant, PassCounterInvariant,
    TerritoryDisjointInvariant, UniformChainColorInvariant,
};

// Crate-level exports - Primitives
pub use types::{BOARD_SIZE, Color, FIELD_COUNT, Intersection, PlayerColor, Point};
