//! Notifications sent to players.
//!
//! The game manager never talks to a transport directly. It hands every
//! notification to an [`EventSink`] together with its recipient, after the
//! session lock has been released.

use derive_getters::Getters;
use derive_new::new;
use strictly_go::{
    BoardSnapshot, Captures, Color, GamePhase, GameSummary, MoveError, PlayerColor, Point,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Whether a territory point was claimed or released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum TerritoryChange {
    /// The point was claimed.
    #[strum(serialize = "+")]
    Added,
    /// The claim was retracted.
    #[strum(serialize = "-")]
    Removed,
}

/// Something a player should learn about.
#[derive(Debug, Clone, PartialEq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum GameEvent {
    /// The board after an accepted move.
    BoardChanged(BoardSnapshot),
    /// New game phase.
    StateChanged(GamePhase),
    /// Color to move.
    TurnChanged(Color),
    /// Capture totals per color.
    CapturesChanged(Captures),
    /// A territory claim changed.
    TerritoryChanged {
        /// Claiming color.
        color: Color,
        /// Claimed point.
        point: Point,
        /// Claim or retraction.
        change: TerritoryChange,
    },
    /// Negotiations were broken off and every claim dropped.
    TerritoriesCleared,
    /// The opponent proposed to finish with the current claims.
    NegotiationProposed {
        /// Color that made the proposal.
        proposer: Color,
    },
    /// Final result.
    GameFinished(GameSummary),
    /// A request from the recipient was rejected.
    Error(MoveError),
}

impl GameEvent {
    /// Short name of the event kind, used in logs.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

/// Receiver of notifications.
///
/// Notifications arrive in the order their operations were committed, from
/// one thread at a time. That thread is whichever caller found the queue
/// idle, so a slow sink delays delivery for the whole session. A sink may
/// call back into the game; the resulting notifications follow the ones
/// already queued.
pub trait EventSink: Send + Sync {
    /// Delivers `event` to `recipient` (`Both` addresses both players).
    fn notify(&self, recipient: PlayerColor, event: &GameEvent);
}

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn notify(&self, _recipient: PlayerColor, _event: &GameEvent) {}
}

/// Logs every notification through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn notify(&self, recipient: PlayerColor, event: &GameEvent) {
        match event {
            GameEvent::Error(err) => warn!(%recipient, error = %err, "Request rejected"),
            GameEvent::GameFinished(summary) => info!(
                %recipient,
                outcome = %summary.outcome(),
                black = summary.black_points(),
                white = summary.white_points(),
                reason = %summary.reason(),
                "Game finished"
            ),
            other => debug!(%recipient, kind = other.kind(), "Notification"),
        }
    }
}

/// A notification with its recipient.
#[derive(Debug, Clone, PartialEq, Getters, new)]
pub struct Notification {
    /// Who should receive it.
    recipient: PlayerColor,
    /// What happened.
    event: GameEvent,
}

/// Forwards notifications into an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    /// Creates the sink and the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl EventSink for ChannelSink {
    fn notify(&self, recipient: PlayerColor, event: &GameEvent) {
        if self
            .sender
            .send(Notification::new(recipient, event.clone()))
            .is_err()
        {
            debug!(kind = event.kind(), "Notification receiver dropped");
        }
    }
}

/// Fans every notification out to several sinks in order.
#[derive(Default, new)]
pub struct FanoutSink {
    sinks: Vec<std::sync::Arc<dyn EventSink>>,
}

impl std::fmt::Debug for FanoutSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutSink")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl EventSink for FanoutSink {
    fn notify(&self, recipient: PlayerColor, event: &GameEvent) {
        for sink in &self.sinks {
            sink.notify(recipient, event);
        }
    }
}
