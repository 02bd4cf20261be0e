//! Per-game bookkeeping: turn, passes, captures, territory and phase.

use crate::action::MoveError;
use crate::phases::{FinishReason, GamePhase, GameSummary, PhaseError, PhaseEvent};
use crate::types::{Color, Point};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum::IntoEnumIterator;
use tracing::{debug, instrument};

/// Stones captured by each color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Getters, Serialize, Deserialize)]
pub struct Captures {
    /// White stones taken by black.
    black: u32,
    /// Black stones taken by white.
    white: u32,
}

impl Captures {
    /// Stones captured by `color`.
    pub fn by(&self, color: Color) -> u32 {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }

    fn add(&mut self, color: Color, count: u32) {
        match color {
            Color::Black => self.black += count,
            Color::White => self.white += count,
        }
    }
}

/// Points claimed by each color during negotiations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Getters, Serialize, Deserialize)]
pub struct Territory {
    /// Black claims.
    black: BTreeSet<Point>,
    /// White claims.
    white: BTreeSet<Point>,
}

impl Territory {
    /// Claims of `color`.
    pub fn of(&self, color: Color) -> &BTreeSet<Point> {
        match color {
            Color::Black => &self.black,
            Color::White => &self.white,
        }
    }

    fn of_mut(&mut self, color: Color) -> &mut BTreeSet<Point> {
        match color {
            Color::Black => &mut self.black,
            Color::White => &mut self.white,
        }
    }

    /// Color claiming `point`, if any.
    pub fn owner(&self, point: Point) -> Option<Color> {
        Color::iter().find(|&color| self.of(color).contains(&point))
    }

    /// Returns true if nobody claims anything.
    pub fn is_empty(&self) -> bool {
        Color::iter().all(|color| self.of(color).is_empty())
    }
}

/// Everything about a game that is not on the board.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GameContext {
    /// Current phase.
    phase: GamePhase,
    /// Color to move.
    current: Color,
    /// Passes in a row, reset by any stone.
    consecutive_passes: u8,
    /// Stones captured per color.
    captures: Captures,
    /// Negotiated territory.
    territory: Territory,
    /// Accepted plays and passes so far.
    move_number: u32,
    /// Color that proposed to finish negotiations.
    proposal: Option<Color>,
    /// Result, once finished.
    summary: Option<GameSummary>,
}

impl GameContext {
    /// Creates a context for a game not started yet, `first` to move.
    pub fn new(first: Color) -> Self {
        Self {
            phase: GamePhase::NotInitialized,
            current: first,
            consecutive_passes: 0,
            captures: Captures::default(),
            territory: Territory::default(),
            move_number: 0,
            proposal: None,
            summary: None,
        }
    }

    /// Applies a phase event.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError`] if the event is not legal in the current phase.
    pub fn transition(&mut self, event: PhaseEvent) -> Result<GamePhase, PhaseError> {
        self.phase = self.phase.transition(event)?;
        Ok(self.phase)
    }

    /// Fails unless the game is running and `color` is to move.
    pub fn ensure_turn(&self, color: Color) -> Result<(), MoveError> {
        if self.phase != GamePhase::Running {
            return Err(MoveError::GameNotRunning);
        }
        if self.current != color {
            return Err(MoveError::NotYourTurn(self.current));
        }
        Ok(())
    }

    /// Fails unless the game is in negotiations.
    pub fn ensure_negotiating(&self) -> Result<(), MoveError> {
        if self.phase == GamePhase::Negotiations {
            Ok(())
        } else {
            Err(MoveError::NegotiationsNotActive)
        }
    }

    /// Hands the turn to the opponent and counts the move.
    pub fn next_player(&mut self) {
        self.current = self.current.opponent();
        self.move_number += 1;
    }

    /// Records an accepted stone: resets passes and advances the turn.
    pub fn record_play(&mut self) {
        self.consecutive_passes = 0;
        self.next_player();
    }

    /// Records a pass and returns the number of passes in a row.
    pub fn record_pass(&mut self) -> u8 {
        self.consecutive_passes += 1;
        self.next_player();
        self.consecutive_passes
    }

    /// Resets the pass counter.
    pub fn reset_passes(&mut self) {
        self.consecutive_passes = 0;
    }

    /// Credits `color` with `count` captured stones.
    pub fn add_captures(&mut self, color: Color, count: u32) {
        self.captures.add(color, count);
    }

    /// Claims `point` for `color` unless the opponent already holds it.
    /// Returns true if the claim was newly recorded.
    #[instrument(skip(self))]
    pub fn add_territory(&mut self, color: Color, point: Point) -> bool {
        if self.territory.owner(point) == Some(color.opponent()) {
            debug!("Point already claimed by opponent");
            return false;
        }
        self.territory.of_mut(color).insert(point)
    }

    /// Retracts a claim. Returns true if it existed.
    pub fn remove_territory(&mut self, color: Color, point: Point) -> bool {
        self.territory.of_mut(color).remove(&point)
    }

    /// Drops every claim of both colors.
    pub fn clear_territories(&mut self) {
        self.territory = Territory::default();
    }

    /// Territory plus stones captured by `color`.
    pub fn points(&self, color: Color) -> u32 {
        self.territory.of(color).len() as u32 + self.captures.by(color)
    }

    /// Records `color` as the proposer, replacing any earlier proposal.
    pub fn propose(&mut self, color: Color) {
        self.proposal = Some(color);
    }

    /// Withdraws the pending proposal. Returns the former proposer.
    pub fn withdraw_proposal(&mut self) -> Option<Color> {
        self.proposal.take()
    }

    /// Second consecutive pass: enter negotiations with a fresh counter.
    pub fn begin_negotiations(&mut self) -> Result<(), PhaseError> {
        self.transition(PhaseEvent::TwoPasses)?;
        self.reset_passes();
        self.proposal = None;
        Ok(())
    }

    /// Leaves negotiations; the opponent of `resumer` moves next.
    pub fn resume(&mut self, resumer: Color) -> Result<(), PhaseError> {
        self.transition(PhaseEvent::Resume)?;
        self.current = resumer.opponent();
        self.clear_territories();
        self.proposal = None;
        self.reset_passes();
        Ok(())
    }

    /// Accepts the pending proposal and scores the game.
    ///
    /// # Errors
    ///
    /// [`MoveError::NoPendingProposal`] if nobody proposed,
    /// [`MoveError::OwnProposal`] if `color` is the proposer.
    pub fn accept(&mut self, color: Color) -> Result<GameSummary, MoveError> {
        match self.proposal {
            None => return Err(MoveError::NoPendingProposal),
            Some(proposer) if proposer == color => return Err(MoveError::OwnProposal),
            Some(_) => {}
        }
        self.transition(PhaseEvent::Agreement)?;
        let summary = GameSummary::scored(self.points(Color::Black), self.points(Color::White));
        self.proposal = None;
        self.summary = Some(summary);
        Ok(summary)
    }

    /// `loser` gives up; the opponent wins with no points reported.
    pub fn resign(&mut self, loser: Color) -> Result<GameSummary, PhaseError> {
        self.forfeit(loser, PhaseEvent::Resign, FinishReason::Resignation)
    }

    /// `loser` left the game; the opponent wins with no points reported.
    pub fn abandon(&mut self, loser: Color) -> Result<GameSummary, PhaseError> {
        self.forfeit(loser, PhaseEvent::Abandon, FinishReason::Abandonment)
    }

    fn forfeit(
        &mut self,
        loser: Color,
        event: PhaseEvent,
        reason: FinishReason,
    ) -> Result<GameSummary, PhaseError> {
        self.transition(event)?;
        let summary = GameSummary::forfeit(loser, reason);
        self.proposal = None;
        self.summary = Some(summary);
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phases::Outcome;

    fn running() -> GameContext {
        let mut context = GameContext::new(Color::Black);
        context.transition(PhaseEvent::Start).unwrap();
        context
    }

    fn point(x: u8, y: u8) -> Point {
        Point { x, y }
    }

    #[test]
    fn test_turn_checks() {
        let context = GameContext::new(Color::Black);
        assert_eq!(context.ensure_turn(Color::Black), Err(MoveError::GameNotRunning));

        let context = running();
        assert!(context.ensure_turn(Color::Black).is_ok());
        assert_eq!(
            context.ensure_turn(Color::White),
            Err(MoveError::NotYourTurn(Color::Black))
        );
    }

    #[test]
    fn test_pass_counter() {
        let mut context = running();
        assert_eq!(context.record_pass(), 1);
        assert_eq!(*context.current(), Color::White);
        context.record_play();
        assert_eq!(*context.consecutive_passes(), 0);
        assert_eq!(context.record_pass(), 1);
        assert_eq!(context.record_pass(), 2);
        context.begin_negotiations().unwrap();
        assert_eq!(*context.phase(), GamePhase::Negotiations);
        assert_eq!(*context.consecutive_passes(), 0);
        assert_eq!(*context.move_number(), 4);
    }

    #[test]
    fn test_territory_claims_are_exclusive() {
        let mut context = running();
        assert!(context.add_territory(Color::White, point(2, 2)));
        assert!(!context.add_territory(Color::Black, point(2, 2)));
        assert!(!context.add_territory(Color::White, point(2, 2)));
        assert!(context.remove_territory(Color::White, point(2, 2)));
        assert!(context.add_territory(Color::Black, point(2, 2)));
        assert_eq!(context.points(Color::Black), 1);
        assert_eq!(context.territory().owner(point(2, 2)), Some(Color::Black));
        assert_eq!(context.territory().owner(point(3, 3)), None);
    }

    #[test]
    fn test_points_include_captures() {
        let mut context = running();
        context.add_captures(Color::Black, 3);
        context.add_territory(Color::Black, point(0, 0));
        context.add_captures(Color::White, 1);
        assert_eq!(context.points(Color::Black), 4);
        assert_eq!(context.points(Color::White), 1);
    }

    #[test]
    fn test_accept_rules() {
        let mut context = running();
        context.record_pass();
        context.record_pass();
        context.begin_negotiations().unwrap();

        assert_eq!(context.accept(Color::White), Err(MoveError::NoPendingProposal));
        context.propose(Color::Black);
        assert_eq!(context.accept(Color::Black), Err(MoveError::OwnProposal));

        context.add_territory(Color::White, point(5, 5));
        let summary = context.accept(Color::White).unwrap();
        assert_eq!(*summary.outcome(), Outcome::Winner(Color::White));
        assert_eq!(*summary.reason(), FinishReason::Agreement);
        assert_eq!(*context.phase(), GamePhase::Finished);
        assert_eq!(context.summary(), &Some(summary));
    }

    #[test]
    fn test_resume_gives_turn_to_opponent() {
        let mut context = running();
        context.record_pass();
        context.record_pass();
        context.begin_negotiations().unwrap();
        context.add_territory(Color::Black, point(1, 1));
        context.propose(Color::Black);

        context.resume(Color::Black).unwrap();
        assert_eq!(*context.phase(), GamePhase::Running);
        assert_eq!(*context.current(), Color::White);
        assert!(context.territory().is_empty());
        assert_eq!(*context.proposal(), None);
    }

    #[test]
    fn test_forfeit() {
        let mut context = running();
        let summary = context.abandon(Color::White).unwrap();
        assert_eq!(summary.outcome().winner(), Some(Color::Black));
        assert_eq!(*summary.reason(), FinishReason::Abandonment);
        assert!(context.resign(Color::Black).is_err());
    }
}
