//! Game manager: the per-session façade over board and context.
//!
//! Every mutating operation is one critical section over the board, the
//! context and the move history: validate, mutate, publish the committed
//! [`SessionView`], release. Notifications collected during the section are
//! queued before the lock is dropped and delivered after it, in commit order.
//! Read-only queries go through the published view and never take the
//! session lock.

use crate::events::{EventSink, GameEvent, NullSink, TerritoryChange};
use derive_getters::Getters;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use strictly_go::{
    Board, BoardSnapshot, Captures, Color, ContextInvariants, GameContext, GamePhase, GameSummary,
    InvariantSet, Move, MoveError, MoveKind, PhaseEvent, Placement, PlayerColor, Point, Territory,
};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Committed state of a session as seen by readers.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize)]
pub struct SessionView {
    /// Board grid.
    board: BoardSnapshot,
    /// Current phase.
    phase: GamePhase,
    /// Color to move.
    current: Color,
    /// Stones captured per color.
    captures: Captures,
    /// Negotiated territory.
    territory: Territory,
    /// Restricted ko stone, if any.
    ko: Option<Point>,
    /// Accepted plays and passes so far.
    move_number: u32,
    /// Pending proposal to finish negotiations.
    proposal: Option<Color>,
    /// Result, once finished.
    summary: Option<GameSummary>,
}

impl SessionView {
    fn capture(core: &SessionCore) -> Self {
        let context = &core.context;
        Self {
            board: core.board.snapshot(),
            phase: *context.phase(),
            current: *context.current(),
            captures: *context.captures(),
            territory: context.territory().clone(),
            ko: core.board.ko(),
            move_number: *context.move_number(),
            proposal: *context.proposal(),
            summary: *context.summary(),
        }
    }
}

/// A replayed move list that the rules rejected.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("Replay rejected at move {}: {}", index, error)]
pub struct RejectedMove {
    /// Position in the list.
    pub index: usize,
    /// The offending move, if the list got that far.
    pub mov: Option<Move>,
    /// Why it was rejected.
    pub error: MoveError,
}

impl std::error::Error for RejectedMove {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Notifications gathered inside a critical section.
#[derive(Debug, Default)]
struct Outbox(Vec<(PlayerColor, GameEvent)>);

impl Outbox {
    fn send(&mut self, recipient: PlayerColor, event: GameEvent) {
        self.0.push((recipient, event));
    }

    fn broadcast(&mut self, event: GameEvent) {
        self.send(PlayerColor::Both, event);
    }
}

/// Committed notifications waiting for delivery, oldest first.
#[derive(Debug, Default)]
struct DeliveryQueue {
    pending: VecDeque<Outbox>,
    /// Set while some thread is delivering.
    draining: bool,
}

/// Releases the drain role if a sink panics mid-delivery.
struct DrainGuard<'a>(&'a Mutex<DeliveryQueue>);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .draining = false;
        }
    }
}

/// Mutable session state guarded by the manager's lock.
#[derive(Debug, Clone)]
struct SessionCore {
    board: Board,
    context: GameContext,
    history: Vec<Move>,
}

impl SessionCore {
    fn new(first: Color) -> Self {
        Self {
            board: Board::new(),
            context: GameContext::new(first),
            history: Vec::new(),
        }
    }

    fn play(&mut self, color: Color, x: i32, y: i32, out: &mut Outbox) -> Result<Placement, MoveError> {
        self.context.ensure_turn(color)?;
        let placement = self.board.place_stone(x, y, color.into())?;

        let captured = placement.captured().len() as u32;
        self.context.add_captures(color, captured);
        self.context.record_play();
        self.history.push(Move::play(color, *placement.point()));

        out.broadcast(GameEvent::BoardChanged(self.board.snapshot()));
        out.broadcast(GameEvent::CapturesChanged(*self.context.captures()));
        out.broadcast(GameEvent::TurnChanged(*self.context.current()));
        Ok(placement)
    }

    fn pass(&mut self, color: Color, out: &mut Outbox) -> Result<GamePhase, MoveError> {
        self.context.ensure_turn(color)?;
        self.board.clear_ko();
        let passes = self.context.record_pass();
        self.history.push(Move::pass(color));

        if passes >= 2 {
            self.context.begin_negotiations()?;
            out.broadcast(GameEvent::StateChanged(GamePhase::Negotiations));
        } else {
            out.broadcast(GameEvent::TurnChanged(*self.context.current()));
        }
        Ok(*self.context.phase())
    }

    fn apply(&mut self, mov: &Move, out: &mut Outbox) -> Result<(), MoveError> {
        match mov.kind {
            MoveKind::Play { x, y } => self
                .play(mov.color, i32::from(x), i32::from(y), out)
                .map(|_| ()),
            MoveKind::Pass => self.pass(mov.color, out).map(|_| ()),
        }
    }

    /// Builds a running game from `moves`, validating each one.
    fn replayed(first: Color, moves: &[Move]) -> Result<Self, RejectedMove> {
        let mut core = Self::new(first);
        let mut scratch = Outbox::default();
        core.context
            .transition(PhaseEvent::Start)
            .map_err(|err| RejectedMove {
                index: 0,
                mov: None,
                error: err.into(),
            })?;
        for (index, mov) in moves.iter().enumerate() {
            core.apply(mov, &mut scratch).map_err(|error| {
                warn!(index, %mov, %error, "Replay rejected");
                RejectedMove {
                    index,
                    mov: Some(*mov),
                    error,
                }
            })?;
        }
        Ok(core)
    }

    fn finish(&self, summary: GameSummary, out: &mut Outbox) {
        out.broadcast(GameEvent::StateChanged(GamePhase::Finished));
        out.broadcast(GameEvent::GameFinished(summary));
    }
}

/// Manages a single game between two players.
///
/// Shared between player threads by `Arc`. Rejected requests leave the
/// session untouched and are reported only to the requester.
pub struct GameManager {
    core: Mutex<SessionCore>,
    view: watch::Sender<SessionView>,
    delivery: Mutex<DeliveryQueue>,
    sink: Arc<dyn EventSink>,
    first_player: Color,
}

impl std::fmt::Debug for GameManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameManager")
            .field("view", &*self.view.borrow())
            .field("first_player", &self.first_player)
            .finish_non_exhaustive()
    }
}

impl GameManager {
    /// Creates a manager for a game that has not started, `first_player`
    /// to move once it does.
    #[instrument(skip(sink))]
    pub fn new(first_player: Color, sink: Arc<dyn EventSink>) -> Self {
        let core = SessionCore::new(first_player);
        let (view, _) = watch::channel(SessionView::capture(&core));
        Self {
            core: Mutex::new(core),
            view,
            delivery: Mutex::new(DeliveryQueue::default()),
            sink,
            first_player,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `op` as one critical section. Publishes the view on success,
    /// reports the error to `requester` on failure, and queues the
    /// collected notifications before the lock is released.
    fn execute<T>(
        &self,
        requester: PlayerColor,
        op: impl FnOnce(&mut SessionCore, &mut Outbox) -> Result<T, MoveError>,
    ) -> Result<T, MoveError> {
        let mut outbox = Outbox::default();
        let (result, drain) = {
            let mut core = self.lock();
            let result = op(&mut core, &mut outbox);
            match &result {
                Ok(_) => {
                    self.view.send_replace(SessionView::capture(&core));
                    debug_assert!(ContextInvariants::check_all(&core.context).is_ok());
                }
                Err(err) => {
                    warn!(%requester, error = %err, "Request rejected");
                    outbox = Outbox::default();
                    outbox.send(requester, GameEvent::Error(err.clone()));
                }
            }
            (result, self.enqueue(outbox))
        };

        if drain {
            self.drain();
        }
        result
    }

    fn delivery(&self) -> MutexGuard<'_, DeliveryQueue> {
        self.delivery.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues `outbox` behind every earlier commit. Called with the session
    /// lock held, so queue order is commit order. Returns true if the caller
    /// took the drain role.
    fn enqueue(&self, outbox: Outbox) -> bool {
        let mut delivery = self.delivery();
        delivery.pending.push_back(outbox);
        !std::mem::replace(&mut delivery.draining, true)
    }

    /// Delivers queued notifications until the queue is empty.
    ///
    /// Only one thread drains at a time. Commits made meanwhile, including
    /// ones made by the sink itself, are picked up by the same loop.
    fn drain(&self) {
        let _guard = DrainGuard(&self.delivery);
        loop {
            let outbox = {
                let mut delivery = self.delivery();
                match delivery.pending.pop_front() {
                    Some(outbox) => outbox,
                    None => {
                        delivery.draining = false;
                        return;
                    }
                }
            };
            for (recipient, event) in outbox.0 {
                self.sink.notify(recipient, &event);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    //  Game start and stop
    // ─────────────────────────────────────────────────────────────

    /// Starts the game once both seats are filled.
    #[instrument(skip(self))]
    pub fn start_game(&self) -> Result<(), MoveError> {
        self.execute(PlayerColor::Both, |core, out| {
            core.context.transition(PhaseEvent::Start)?;
            info!(first = %core.context.current(), "Game started");
            out.broadcast(GameEvent::StateChanged(GamePhase::Running));
            out.broadcast(GameEvent::BoardChanged(core.board.snapshot()));
            out.broadcast(GameEvent::TurnChanged(*core.context.current()));
            Ok(())
        })
    }

    /// `color` gives up; the opponent wins regardless of whose turn it is.
    #[instrument(skip(self))]
    pub fn give_up_game(&self, color: PlayerColor) -> Result<GameSummary, MoveError> {
        self.execute(color, |core, out| {
            let loser = Color::try_from(color)?;
            let summary = core.context.resign(loser)?;
            info!(%loser, "Player resigned");
            core.finish(summary, out);
            Ok(summary)
        })
    }

    /// `color` left the session; the opponent wins by abandonment.
    #[instrument(skip(self))]
    pub fn abandon(&self, color: PlayerColor) -> Result<GameSummary, MoveError> {
        self.execute(color, |core, out| {
            let loser = Color::try_from(color)?;
            let summary = core.context.abandon(loser)?;
            info!(%loser, "Player abandoned the game");
            core.finish(summary, out);
            Ok(summary)
        })
    }

    // ─────────────────────────────────────────────────────────────
    //  Moves
    // ─────────────────────────────────────────────────────────────

    /// Places a stone for `color` at `(x, y)`.
    ///
    /// # Errors
    ///
    /// [`MoveError::GameNotRunning`], [`MoveError::NotYourTurn`] or any
    /// placement error from the board.
    #[instrument(skip(self))]
    pub fn make_move(&self, x: i32, y: i32, color: PlayerColor) -> Result<Placement, MoveError> {
        self.execute(color, |core, out| {
            let color = Color::try_from(color)?;
            let placement = core.play(color, x, y, out)?;
            info!(
                point = %placement.point(),
                %color,
                captured = placement.captured().len(),
                "Move accepted"
            );
            Ok(placement)
        })
    }

    /// Passes for `color`. The second pass in a row starts negotiations.
    /// Returns the phase after the pass.
    #[instrument(skip(self))]
    pub fn pass_move(&self, color: PlayerColor) -> Result<GamePhase, MoveError> {
        self.execute(color, |core, out| {
            let color = Color::try_from(color)?;
            let phase = core.pass(color, out)?;
            info!(%color, %phase, "Pass accepted");
            Ok(phase)
        })
    }

    // ─────────────────────────────────────────────────────────────
    //  Negotiations
    // ─────────────────────────────────────────────────────────────

    /// Claims `(x, y)` as territory of `color`. Returns false if the
    /// opponent already holds it or the claim existed.
    #[instrument(skip(self))]
    pub fn add_territory(&self, color: PlayerColor, x: i32, y: i32) -> Result<bool, MoveError> {
        self.execute(color, |core, out| {
            let (color, point) = Self::territory_request(core, color, x, y)?;
            let added = core.context.add_territory(color, point);
            if added {
                Self::territory_changed(core, color, point, TerritoryChange::Added, out);
            }
            Ok(added)
        })
    }

    /// Retracts the claim of `color` on `(x, y)`. Returns false if there
    /// was none.
    #[instrument(skip(self))]
    pub fn remove_territory(&self, color: PlayerColor, x: i32, y: i32) -> Result<bool, MoveError> {
        self.execute(color, |core, out| {
            let (color, point) = Self::territory_request(core, color, x, y)?;
            let removed = core.context.remove_territory(color, point);
            if removed {
                Self::territory_changed(core, color, point, TerritoryChange::Removed, out);
            }
            Ok(removed)
        })
    }

    fn territory_request(
        core: &SessionCore,
        color: PlayerColor,
        x: i32,
        y: i32,
    ) -> Result<(Color, Point), MoveError> {
        let color = Color::try_from(color)?;
        core.context.ensure_negotiating()?;
        let point = Point::checked(x, y).ok_or(MoveError::OutOfBounds { x, y })?;
        Ok((color, point))
    }

    fn territory_changed(
        core: &mut SessionCore,
        color: Color,
        point: Point,
        change: TerritoryChange,
        out: &mut Outbox,
    ) {
        if let Some(proposer) = core.context.withdraw_proposal() {
            debug!(%proposer, "Territory changed, proposal withdrawn");
        }
        out.broadcast(GameEvent::TerritoryChanged {
            color,
            point,
            change,
        });
    }

    /// `color` proposes to finish with the current claims; the opponent is
    /// asked to accept.
    #[instrument(skip(self))]
    pub fn propose_finish_negotiation(&self, color: PlayerColor) -> Result<(), MoveError> {
        self.execute(color, |core, out| {
            let proposer = Color::try_from(color)?;
            core.context.ensure_negotiating()?;
            core.context.propose(proposer);
            info!(%proposer, "Finish proposed");
            out.send(
                proposer.opponent().into(),
                GameEvent::NegotiationProposed { proposer },
            );
            Ok(())
        })
    }

    /// `color` accepts the opponent's proposal and the game is scored.
    ///
    /// # Errors
    ///
    /// [`MoveError::NegotiationsNotActive`], [`MoveError::NoPendingProposal`]
    /// or [`MoveError::OwnProposal`].
    #[instrument(skip(self))]
    pub fn accept_finish_negotiation(&self, color: PlayerColor) -> Result<GameSummary, MoveError> {
        self.execute(color, |core, out| {
            let color = Color::try_from(color)?;
            core.context.ensure_negotiating()?;
            let summary = core.context.accept(color)?;
            info!(
                outcome = %summary.outcome(),
                black = summary.black_points(),
                white = summary.white_points(),
                "Game scored by agreement"
            );
            core.finish(summary, out);
            Ok(summary)
        })
    }

    /// `color` breaks off negotiations; claims are dropped and the opponent
    /// moves next.
    #[instrument(skip(self))]
    pub fn resume_game(&self, color: PlayerColor) -> Result<(), MoveError> {
        self.execute(color, |core, out| {
            let resumer = Color::try_from(color)?;
            core.context.ensure_negotiating()?;
            core.context.resume(resumer)?;
            info!(%resumer, "Game resumed");
            out.broadcast(GameEvent::StateChanged(GamePhase::Running));
            out.broadcast(GameEvent::TerritoriesCleared);
            out.broadcast(GameEvent::BoardChanged(core.board.snapshot()));
            out.broadcast(GameEvent::TurnChanged(*core.context.current()));
            Ok(())
        })
    }

    // ─────────────────────────────────────────────────────────────
    //  History and replay
    // ─────────────────────────────────────────────────────────────

    /// Accepted moves in order.
    pub fn history(&self) -> Vec<Move> {
        self.lock().history.clone()
    }

    /// Resets the session and re-applies `moves` to a fresh running game.
    ///
    /// The moves go through the same validation as live ones. If any is
    /// rejected the session is left exactly as it was.
    #[instrument(skip(self, moves), fields(count = moves.len()))]
    pub fn replay(&self, moves: &[Move]) -> Result<SessionView, RejectedMove> {
        let (view, drain) = {
            let mut core = self.lock();
            *core = SessionCore::replayed(self.first_player, moves)?;
            let view = SessionView::capture(&core);
            self.view.send_replace(view.clone());

            let mut outbox = Outbox::default();
            outbox.broadcast(GameEvent::StateChanged(view.phase));
            outbox.broadcast(GameEvent::BoardChanged(view.board.clone()));
            outbox.broadcast(GameEvent::CapturesChanged(view.captures));
            outbox.broadcast(GameEvent::TurnChanged(view.current));
            (view, self.enqueue(outbox))
        };

        info!(moves = moves.len(), phase = %view.phase, "Replay applied");
        if drain {
            self.drain();
        }
        Ok(view)
    }

    // ─────────────────────────────────────────────────────────────
    //  Lock-free reads
    // ─────────────────────────────────────────────────────────────

    /// Last committed board.
    pub fn board_snapshot(&self) -> BoardSnapshot {
        self.view.borrow().board.clone()
    }

    /// Last committed phase.
    pub fn game_state(&self) -> GamePhase {
        self.view.borrow().phase
    }

    /// Color to move.
    pub fn current_player(&self) -> Color {
        self.view.borrow().current
    }

    /// Full committed view.
    pub fn view(&self) -> SessionView {
        self.view.borrow().clone()
    }

    /// Receiver that observes every committed view.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view.subscribe()
    }
}

impl Default for GameManager {
    fn default() -> Self {
        Self::new(Color::Black, Arc::new(NullSink))
    }
}
