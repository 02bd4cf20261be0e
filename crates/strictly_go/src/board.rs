//! The 19×19 board: placement, capture, suicide and ko.

use crate::action::MoveError;
use crate::chain::StoneChain;
use crate::field::Field;
use crate::invariants::{BoardInvariants, InvariantSet};
use crate::stone::{ChainId, Stone};
use crate::types::{BOARD_SIZE, Color, FIELD_COUNT, Intersection, PlayerColor, Point};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, instrument, trace};

/// Result of a successful placement.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Placement {
    /// Where the stone went.
    point: Point,
    /// Color of the placed stone.
    color: Color,
    /// Enemy stones removed by this move.
    captured: Vec<Point>,
    /// Stone that may not be captured back on the next move, if any.
    ko: Option<Point>,
}

/// Go board with its chain arena and ko slot.
///
/// Stones live inside their fields (an arena indexed by coordinate) and
/// refer to their chain by [`ChainId`]. Released chain slots are reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    fields: Vec<Field>,
    chains: Vec<StoneChain>,
    free_chains: Vec<ChainId>,
    ko: Option<Point>,
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            fields: (0..FIELD_COUNT)
                .filter_map(Point::from_index)
                .map(Field::new)
                .collect(),
            chains: Vec::new(),
            free_chains: Vec::new(),
            ko: None,
        }
    }

    /// Number of lines per side.
    pub fn size(&self) -> usize {
        BOARD_SIZE
    }

    /// Removes every stone and the ko restriction.
    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    // ─────────────────────────────────────────────────────────────
    //  Bounds-safe queries
    // ─────────────────────────────────────────────────────────────

    /// Returns true if `(x, y)` lies on the board.
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        Point::checked(x, y).is_some()
    }

    /// Returns the field at `(x, y)`, or `None` off the board.
    pub fn field(&self, x: i32, y: i32) -> Option<&Field> {
        Point::checked(x, y).map(|point| &self.fields[point.index()])
    }

    /// Returns the stone at `(x, y)`, or `None` if empty or off the board.
    pub fn stone(&self, x: i32, y: i32) -> Option<&Stone> {
        self.field(x, y).and_then(Field::stone)
    }

    /// Returns the field at `point`, or `None` off the board.
    pub fn field_at(&self, point: Point) -> Option<&Field> {
        point.on_board().then(|| &self.fields[point.index()])
    }

    /// Returns the stone at `point`, or `None` if empty or off the board.
    pub fn stone_at(&self, point: Point) -> Option<&Stone> {
        self.field_at(point).and_then(Field::stone)
    }

    /// Returns true if `(x, y)` is on the board and holds no stone.
    pub fn is_empty(&self, x: i32, y: i32) -> bool {
        self.field(x, y).is_some_and(Field::is_empty)
    }

    /// Returns true if `point` is on the board and holds no stone.
    pub fn is_empty_at(&self, point: Point) -> bool {
        self.field_at(point).is_some_and(Field::is_empty)
    }

    /// Empty neighbors of the stone at `(x, y)`.
    pub fn stone_liberties(&self, x: i32, y: i32) -> Option<BTreeSet<Point>> {
        let stone = self.stone(x, y)?;
        Some(self.stone_liberties_unchecked(stone.point()).collect())
    }

    pub(crate) fn stone_liberties_unchecked(
        &self,
        point: Point,
    ) -> impl Iterator<Item = Point> + '_ {
        self.fields[point.index()]
            .neighbors()
            .iter()
            .copied()
            .filter(|&neighbor| self.is_empty_at(neighbor))
    }

    /// Stone that may not be captured on the next move.
    pub fn ko(&self) -> Option<Point> {
        self.ko
    }

    /// Drops the ko restriction, e.g. after a pass.
    pub fn clear_ko(&mut self) {
        self.ko = None;
    }

    /// Returns a live chain by id.
    pub fn chain(&self, id: ChainId) -> Option<&StoneChain> {
        self.chains.get(id).filter(|chain| !chain.is_empty())
    }

    /// Id of the chain holding the stone at `point`.
    pub fn chain_id_at(&self, point: Point) -> Option<ChainId> {
        self.stone_at(point).map(Stone::chain)
    }

    /// Chain holding the stone at `point`.
    pub fn chain_at(&self, point: Point) -> Option<&StoneChain> {
        self.chain_id_at(point).and_then(|id| self.chain(id))
    }

    /// Every live chain with its id.
    pub fn chains(&self) -> impl Iterator<Item = (ChainId, &StoneChain)> {
        self.chains
            .iter()
            .enumerate()
            .filter(|(_, chain)| !chain.is_empty())
    }

    /// Number of live chains.
    pub fn live_chain_count(&self) -> usize {
        self.chains().count()
    }

    /// Every field, row-major.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Number of stones of `color` on the board.
    pub fn stone_count(&self, color: Color) -> usize {
        self.fields
            .iter()
            .filter_map(Field::stone)
            .filter(|stone| stone.color() == color)
            .count()
    }

    // ─────────────────────────────────────────────────────────────
    //  Placement
    // ─────────────────────────────────────────────────────────────

    /// Places a stone of `color` at `(x, y)`.
    ///
    /// The checks run in a fixed order: ko, then suicide, then captures are
    /// applied, the ko slot is updated and the new stone is merged with its
    /// friendly neighbors. Every rejected placement is fully reverted.
    ///
    /// # Errors
    ///
    /// [`MoveError::OutOfBounds`], [`MoveError::FieldOccupied`],
    /// [`MoveError::IllegalStoneColor`], [`MoveError::KoRecapture`] or
    /// [`MoveError::Suicide`].
    #[instrument(skip(self), fields(ko = ?self.ko))]
    pub fn place_stone(
        &mut self,
        x: i32,
        y: i32,
        color: PlayerColor,
    ) -> Result<Placement, MoveError> {
        let point = Point::checked(x, y).ok_or(MoveError::OutOfBounds { x, y })?;
        if !self.is_empty_at(point) {
            return Err(MoveError::FieldOccupied(point));
        }

        // Tentative placement in a chain of its own.
        let mut stone = Stone::new(point, color, 0)?;
        let color = stone.color();
        let own = self.alloc_chain(color, vec![point]);
        stone.set_chain(own);
        self.fields[point.index()].put(stone);

        let mut friendly: Vec<ChainId> = Vec::new();
        let mut doomed: Vec<ChainId> = Vec::new();
        for &neighbor in self.fields[point.index()].neighbors() {
            let Some(other) = self.stone_at(neighbor) else {
                continue;
            };
            let id = other.chain();
            if other.color() == color {
                if !friendly.contains(&id) {
                    friendly.push(id);
                }
            } else if !doomed.contains(&id) && self.chains[id].is_dead(self) {
                doomed.push(id);
            }
        }
        trace!(?friendly, ?doomed, "Scanned neighbors");

        if let Some(ko) = self.ko {
            if doomed.iter().any(|&id| self.chains[id].contains(ko)) {
                self.remove_at(point);
                debug!(%point, %ko, "Rejected ko recapture");
                return Err(MoveError::KoRecapture(point));
            }
        }

        let mut liberties = self.chains[own].liberties(self);
        for &id in &friendly {
            liberties.extend(self.chains[id].liberties(self));
        }
        if liberties.is_empty() && doomed.is_empty() {
            self.remove_at(point);
            debug!(%point, "Rejected suicide");
            return Err(MoveError::Suicide(point));
        }

        let mut captured = Vec::new();
        for id in doomed {
            captured.extend(self.capture_chain(id));
        }

        self.ko = if captured.len() == 1
            && friendly.is_empty()
            && self.chains[own].liberty_count(self) == 1
        {
            Some(point)
        } else {
            None
        };

        let chain = friendly
            .into_iter()
            .fold(own, |into, id| self.merge_chains(into, id));

        debug!(
            %point,
            %color,
            chain,
            captured = captured.len(),
            ko = ?self.ko,
            "Stone placed"
        );
        debug_assert!(
            BoardInvariants::check_all(self).is_ok(),
            "board invariants violated after placing at {point}"
        );

        Ok(Placement {
            point,
            color,
            captured,
            ko: self.ko,
        })
    }

    /// Removes the stone at `(x, y)`, splitting its chain if the stone was
    /// a bridge. Returns the removed stone.
    #[instrument(skip(self))]
    pub fn remove_stone(&mut self, x: i32, y: i32) -> Option<Stone> {
        let point = Point::checked(x, y)?;
        self.remove_at(point)
    }

    /// Removes every member of chain `id` and releases the slot.
    /// Returns the emptied fields.
    pub(crate) fn capture_chain(&mut self, id: ChainId) -> Vec<Point> {
        let stones = self.chains[id].take_stones();
        for &point in &stones {
            self.fields[point.index()].take();
        }
        self.free_chains.push(id);
        debug!(chain = id, size = stones.len(), "Chain captured");
        stones
    }

    fn remove_at(&mut self, point: Point) -> Option<Stone> {
        let stone = self.fields[point.index()].take()?;
        let id = stone.chain();
        self.chains[id].remove(point);
        if self.chains[id].is_empty() {
            self.free_chains.push(id);
        } else {
            self.split_chain(id);
        }
        if self.ko == Some(point) {
            self.ko = None;
        }
        Some(stone)
    }

    /// Merges two chains, the larger one absorbing the smaller.
    /// Returns the surviving id.
    fn merge_chains(&mut self, a: ChainId, b: ChainId) -> ChainId {
        if a == b {
            return a;
        }
        let (into, from) = if self.chains[a].len() >= self.chains[b].len() {
            (a, b)
        } else {
            (b, a)
        };
        let stones = self.chains[from].take_stones();
        self.reassign(&stones, into);
        self.chains[into].absorb(stones);
        self.free_chains.push(from);
        into
    }

    /// Rebuilds chain `id` after a member was removed, carving any
    /// disconnected remainder into new chains.
    fn split_chain(&mut self, id: ChainId) {
        let color = self.chains[id].color();
        let mut remaining = self.chains[id].take_stones();
        let mut keep_id = true;
        while let Some(&start) = remaining.first() {
            let group = self.connected_group(start, color);
            remaining.retain(|point| !group.contains(point));
            let target = if keep_id {
                self.chains[id].absorb(group.clone());
                id
            } else {
                self.alloc_chain(color, group.clone())
            };
            keep_id = false;
            self.reassign(&group, target);
        }
    }

    fn connected_group(&self, start: Point, color: Color) -> Vec<Point> {
        let mut group = vec![start];
        let mut stack = vec![start];
        while let Some(point) = stack.pop() {
            for &neighbor in self.fields[point.index()].neighbors() {
                let same = self
                    .stone_at(neighbor)
                    .is_some_and(|stone| stone.color() == color);
                if same && !group.contains(&neighbor) {
                    group.push(neighbor);
                    stack.push(neighbor);
                }
            }
        }
        group
    }

    fn reassign(&mut self, stones: &[Point], id: ChainId) {
        for &point in stones {
            if let Some(stone) = self.fields[point.index()].stone_mut() {
                stone.set_chain(id);
            }
        }
    }

    fn alloc_chain(&mut self, color: Color, stones: Vec<Point>) -> ChainId {
        let chain = StoneChain::new(color, stones);
        match self.free_chains.pop() {
            Some(id) => {
                self.chains[id] = chain;
                id
            }
            None => {
                self.chains.push(chain);
                self.chains.len() - 1
            }
        }
    }

    // ─────────────────────────────────────────────────────────────
    //  Rendering
    // ─────────────────────────────────────────────────────────────

    /// Copies the board into a plain grid.
    pub fn snapshot(&self) -> BoardSnapshot {
        let mut rows = [[Intersection::Empty; BOARD_SIZE]; BOARD_SIZE];
        for stone in self.fields.iter().filter_map(Field::stone) {
            let point = stone.point();
            rows[point.y as usize][point.x as usize] = stone.color().into();
        }
        BoardSnapshot { rows }
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        self.snapshot().display()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable copy of the board: 19 rows of 19 intersections.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoardSnapshot {
    rows: [[Intersection; BOARD_SIZE]; BOARD_SIZE],
}

impl BoardSnapshot {
    /// Intersection at `(x, y)`, or `None` off the board.
    pub fn get(&self, x: i32, y: i32) -> Option<Intersection> {
        Point::checked(x, y).and_then(|point| self.at(point))
    }

    /// Intersection at `point`, or `None` off the board.
    pub fn at(&self, point: Point) -> Option<Intersection> {
        point
            .on_board()
            .then(|| self.rows[point.y as usize][point.x as usize])
    }

    /// Rows, top to bottom.
    pub fn rows(&self) -> &[[Intersection; BOARD_SIZE]; BOARD_SIZE] {
        &self.rows
    }

    /// Number of stones of `color`.
    pub fn count(&self, color: Color) -> usize {
        let wanted = Intersection::from(color);
        self.rows
            .iter()
            .flatten()
            .filter(|&&cell| cell == wanted)
            .count()
    }

    /// Formats the grid with column and row numbers.
    pub fn display(&self) -> String {
        let mut result = String::from("   ");
        for x in 0..BOARD_SIZE {
            result.push_str(&format!("{:>2}", x % 10));
        }
        result.push('\n');
        for (y, row) in self.rows.iter().enumerate() {
            result.push_str(&format!("{:>2} ", y));
            for cell in row {
                result.push(' ');
                result.push(cell.symbol());
            }
            result.push('\n');
        }
        result
    }
}
