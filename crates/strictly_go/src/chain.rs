//! Chains of connected same-color stones.

use crate::board::Board;
use crate::types::{Color, Point};
use std::collections::BTreeSet;

/// A maximal connected group of same-color stones.
///
/// Chains live in the board's arena and are addressed by
/// [`ChainId`](crate::ChainId). Liberties are never cached: placements and
/// captures next to a chain change them without touching the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoneChain {
    color: Color,
    stones: Vec<Point>,
}

impl StoneChain {
    pub(crate) fn new(color: Color, stones: Vec<Point>) -> Self {
        Self { color, stones }
    }

    /// Color shared by every member.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Member positions.
    pub fn stones(&self) -> &[Point] {
        &self.stones
    }

    /// Number of stones in the chain.
    pub fn len(&self) -> usize {
        self.stones.len()
    }

    /// Returns true for a released arena slot.
    pub fn is_empty(&self) -> bool {
        self.stones.is_empty()
    }

    /// Returns true if `point` is a member.
    pub fn contains(&self, point: Point) -> bool {
        self.stones.contains(&point)
    }

    /// Union of the empty neighbors of every member.
    pub fn liberties(&self, board: &Board) -> BTreeSet<Point> {
        self.stones
            .iter()
            .flat_map(|&stone| board.stone_liberties_unchecked(stone))
            .collect()
    }

    /// Size of [`StoneChain::liberties`]; shared liberties count once.
    pub fn liberty_count(&self, board: &Board) -> usize {
        self.liberties(board).len()
    }

    /// Returns true when the chain has no liberty left.
    pub fn is_dead(&self, board: &Board) -> bool {
        self.stones
            .iter()
            .all(|&stone| board.stone_liberties_unchecked(stone).next().is_none())
    }

    /// Adds the members taken from another chain.
    pub(crate) fn absorb(&mut self, mut stones: Vec<Point>) {
        self.stones.append(&mut stones);
    }

    pub(crate) fn remove(&mut self, point: Point) {
        self.stones.retain(|&p| p != point);
    }

    pub(crate) fn take_stones(&mut self) -> Vec<Point> {
        std::mem::take(&mut self.stones)
    }
}
