//! First-class invariants for the board and game context.
//!
//! Invariants are logical properties that must hold after every committed
//! operation. The board checks its set in debug builds after each placement;
//! tests check them directly.

use crate::board::Board;
use crate::context::GameContext;
use crate::field::Field;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("Invariant violated: {}", description)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implementations are provided for tuples.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

fn violation<S, I: Invariant<S>>(state: &S) -> Option<InvariantViolation> {
    (!I::holds(state)).then(|| InvariantViolation::new(I::description()))
}

fn collect(violations: Vec<Option<InvariantViolation>>) -> Result<(), Vec<InvariantViolation>> {
    let violations: Vec<_> = violations.into_iter().flatten().collect();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        collect(vec![violation::<S, I1>(state), violation::<S, I2>(state)])
    }
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        collect(vec![
            violation::<S, I1>(state),
            violation::<S, I2>(state),
            violation::<S, I3>(state),
        ])
    }
}

// ─────────────────────────────────────────────────────────────
//  Board invariants
// ─────────────────────────────────────────────────────────────

/// Every stone belongs to exactly one live chain, that chain lists it, and
/// orthogonally adjacent same-color stones share a chain.
pub struct ChainMembershipInvariant;

impl Invariant<Board> for ChainMembershipInvariant {
    fn holds(board: &Board) -> bool {
        let stones_listed = board.fields().iter().filter_map(Field::stone).all(|stone| {
            board
                .chain(stone.chain())
                .is_some_and(|chain| chain.contains(stone.point()))
        });
        let members_placed = board.chains().all(|(id, chain)| {
            chain
                .stones()
                .iter()
                .all(|&point| board.chain_id_at(point) == Some(id))
        });
        let maximal = board.fields().iter().filter_map(Field::stone).all(|stone| {
            stone.point().neighbors().all(|neighbor| match board.stone_at(neighbor) {
                Some(other) if other.color() == stone.color() => other.chain() == stone.chain(),
                _ => true,
            })
        });
        stones_listed && members_placed && maximal
    }

    fn description() -> &'static str {
        "Each stone is in exactly one maximal chain"
    }
}

/// Every member of a chain has the chain's color.
pub struct UniformChainColorInvariant;

impl Invariant<Board> for UniformChainColorInvariant {
    fn holds(board: &Board) -> bool {
        board.chains().all(|(_, chain)| {
            chain.stones().iter().all(|&point| {
                board
                    .stone_at(point)
                    .is_some_and(|stone| stone.color() == chain.color())
            })
        })
    }

    fn description() -> &'static str {
        "All stones of a chain share its color"
    }
}

/// No chain without liberties is left on the board.
pub struct NoCapturableChainInvariant;

impl Invariant<Board> for NoCapturableChainInvariant {
    fn holds(board: &Board) -> bool {
        board.chains().all(|(_, chain)| !chain.is_dead(board))
    }

    fn description() -> &'static str {
        "No chain on the board has zero liberties"
    }
}

/// All board invariants as a composable set.
pub type BoardInvariants = (
    ChainMembershipInvariant,
    UniformChainColorInvariant,
    NoCapturableChainInvariant,
);

// ─────────────────────────────────────────────────────────────
//  Context invariants
// ─────────────────────────────────────────────────────────────

/// No point is claimed by both colors.
pub struct TerritoryDisjointInvariant;

impl Invariant<GameContext> for TerritoryDisjointInvariant {
    fn holds(context: &GameContext) -> bool {
        context
            .territory()
            .black()
            .is_disjoint(context.territory().white())
    }

    fn description() -> &'static str {
        "Black and white territory do not overlap"
    }
}

/// The pass counter never reaches two outside negotiations.
pub struct PassCounterInvariant;

impl Invariant<GameContext> for PassCounterInvariant {
    fn holds(context: &GameContext) -> bool {
        *context.consecutive_passes() < 2
    }

    fn description() -> &'static str {
        "Fewer than two consecutive passes are pending"
    }
}

/// All context invariants as a composable set.
pub type ContextInvariants = (TerritoryDisjointInvariant, PassCounterInvariant);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, PlayerColor, Point};

    #[test]
    fn test_empty_board_holds() {
        assert!(BoardInvariants::check_all(&Board::new()).is_ok());
    }

    #[test]
    fn test_board_holds_after_captures_and_merges() {
        let mut board = Board::new();
        for (x, y, color) in [
            (1, 0, PlayerColor::White),
            (0, 1, PlayerColor::White),
            (2, 1, PlayerColor::White),
            (1, 1, PlayerColor::Black),
            (1, 2, PlayerColor::White),
            (5, 5, PlayerColor::Black),
            (5, 6, PlayerColor::Black),
            (6, 5, PlayerColor::Black),
        ] {
            board.place_stone(x, y, color).unwrap();
        }
        assert!(BoardInvariants::check_all(&board).is_ok());
    }

    #[test]
    fn test_two_invariants_as_set() {
        type Membership = (ChainMembershipInvariant, UniformChainColorInvariant);
        let mut board = Board::new();
        board.place_stone(3, 3, PlayerColor::Black).unwrap();
        assert!(Membership::check_all(&board).is_ok());
    }

    #[test]
    fn test_context_holds_after_claims() {
        let mut context = GameContext::new(Color::Black);
        let point = Point { x: 4, y: 4 };
        assert!(context.add_territory(Color::Black, point));
        assert!(!context.add_territory(Color::White, point));
        assert!(ContextInvariants::check_all(&context).is_ok());
    }

    #[test]
    fn test_violation_display() {
        let violation = InvariantViolation::new("x");
        assert_eq!(violation.to_string(), "Invariant violated: x");
    }
}
