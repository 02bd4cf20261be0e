//! Strictly Go server library - sessions for two-player Go
//!
//! # Architecture
//!
//! - **Manager**: one game per session; every operation is a single
//!   critical section and reads go through a published view
//! - **Events**: notifications addressed to one or both players, delivered
//!   to an [`EventSink`] outside the lock
//! - **Session**: many concurrent games, player seats and disconnects
//! - **Replay**: JSON move lists re-applied through the live rules
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use strictly_go::{Color, GamePhase, PlayerColor};
//! use strictly_go_server::{GameManager, NullSink};
//!
//! let game = GameManager::new(Color::Black, Arc::new(NullSink));
//! game.start_game()?;
//! game.make_move(3, 3, PlayerColor::Black)?;
//! assert_eq!(game.current_player(), Color::White);
//! assert_eq!(game.game_state(), GamePhase::Running);
//! # Ok::<(), strictly_go::MoveError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod events;
mod manager;
mod replay;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Notifications
pub use events::{
    ChannelSink, EventSink, FanoutSink, GameEvent, Notification, NullSink, TerritoryChange,
    TracingSink,
};

// Crate-level exports - Game manager
pub use manager::{GameManager, RejectedMove, SessionView};

// Crate-level exports - Replay
pub use replay::{MoveList, ReplayError};

// Crate-level exports - Session management
pub use session::{GameSession, Player, PlayerId, PlayerType, SessionError, SessionId, SessionManager};
