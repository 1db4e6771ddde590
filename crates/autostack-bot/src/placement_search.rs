//! Brute-force search for the best placement of one piece kind.
//!
//! # How It Works
//!
//! For every orientation of the kind, the piece is slid from its spawn position to both walls to
//! find the reachable columns. Each column is then simulated on a scratch copy of the board: the
//! piece is dropped, locked, and full rows are cleared. The resulting board is scored with
//! [`board_metrics`](crate::board_metrics) and compared against the best candidate so far.
//!
//! # Ordering
//!
//! Candidates are compared lexicographically, most important first:
//!
//! 1. fewer holes
//! 2. fewer line-dependency cells (the rightmost column is not counted)
//! 3. fewer filled cells in the rightmost column, but only while the best candidate has no holes
//! 4. lower stack deviation
//! 5. fewer filled cells in the rightmost column
//!
//! A candidate that merely ties never replaces the current best, so the first candidate in scan
//! order (orientation ascending, then column ascending) wins among equals.
//!
//! Only placements reachable by rotating at spawn, sliding, and dropping straight down are
//! considered. Pieces are never tucked under overhangs.

use std::cmp::Ordering;

use autostack_engine::{AllocationError, Board, BoardDimensions, Piece, PieceKind};
use serde::{Deserialize, Serialize};

use crate::{SearchError, board_metrics};

/// The decision left behind by the last placement search.
///
/// `holes`, `line_dep_cells`, and `stack_height` describe the board after the chosen placement.
/// `dest_orient_index` and `dest_x` are the target the command sequencer steers toward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotState {
    pub holes: usize,
    pub line_dep_cells: usize,
    pub stack_height: usize,
    pub dest_orient_index: usize,
    pub dest_x: i32,
}

#[derive(Debug, Clone, Copy)]
struct Score {
    holes: usize,
    line_dep_cells: usize,
    in_rightmost_col: usize,
    dev: f64,
}

impl Score {
    fn evaluate(board: &Board) -> Self {
        let in_rightmost_col = board
            .cols()
            .checked_sub(1)
            .map_or(0, |col| board_metrics::column_fill_count(board, col));
        Self {
            holes: board_metrics::hole_count(board),
            line_dep_cells: board_metrics::line_dependency_cells(board, true),
            in_rightmost_col,
            dev: board_metrics::stack_deviation(board).unwrap_or(0.0),
        }
    }

    fn improves_on(&self, best: &Self) -> bool {
        if self.holes != best.holes {
            return self.holes < best.holes;
        }
        if self.line_dep_cells != best.line_dep_cells {
            return self.line_dep_cells < best.line_dep_cells;
        }
        if best.holes == 0 && self.in_rightmost_col != best.in_rightmost_col {
            return self.in_rightmost_col < best.in_rightmost_col;
        }
        match self.dev.total_cmp(&best.dev) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => self.in_rightmost_col < best.in_rightmost_col,
        }
    }
}

/// Placement search with a reusable scratch board.
///
/// The scratch board is allocated once and overwritten from the searched board for every
/// candidate, so repeated searches on boards of the same dimensions do not allocate.
#[derive(Debug, Clone)]
pub struct PlacementSearch {
    scratch: Board,
}

impl PlacementSearch {
    /// Creates a search for boards of the given dimensions.
    pub fn new(dimensions: BoardDimensions) -> Result<Self, AllocationError> {
        Ok(Self {
            scratch: Board::with_dimensions(dimensions)?,
        })
    }

    #[must_use]
    pub fn dimensions(&self) -> BoardDimensions {
        self.scratch.dimensions()
    }

    /// Finds the best placement of `kind` on `board`.
    ///
    /// `board` is only read. Fails with [`SearchError::DimensionMismatch`] if its dimensions
    /// differ from the ones this search was created for.
    pub fn find_best_placement(
        &mut self,
        board: &Board,
        kind: PieceKind,
    ) -> Result<BotState, SearchError> {
        self.scratch.copy_from(board)?;

        let (spawn_x, spawn_y) = Piece::spawn_position(kind, board.dimensions());
        let mut best: Option<(Score, BotState)> = None;

        for orient_index in 0..kind.orientations() {
            let mut piece = Piece::new(kind, orient_index, spawn_x, spawn_y);
            while piece.move_left(board) {}
            let left_range = piece.x();
            piece.set_position(spawn_x, spawn_y);
            while piece.move_right(board) {}
            let right_range = piece.x();

            for x in left_range..=right_range {
                self.scratch.copy_from(board)?;
                piece.set_position(x, spawn_y);
                piece.drop_to_floor(&self.scratch);
                piece.place(&mut self.scratch);
                self.scratch.clean();

                let score = Score::evaluate(&self.scratch);
                if best.as_ref().is_none_or(|(b, _)| score.improves_on(b)) {
                    let state = BotState {
                        holes: score.holes,
                        line_dep_cells: score.line_dep_cells,
                        stack_height: board_metrics::stack_height(&self.scratch),
                        dest_orient_index: orient_index,
                        dest_x: x,
                    };
                    best = Some((score, state));
                }
            }
        }

        // every kind has an orientation and every slide range holds its start column
        Ok(best.map(|(_, state)| state).unwrap_or_default())
    }
}

/// Finds the best placement of `kind` on `board` with a freshly allocated scratch board.
///
/// Use [`PlacementSearch`] to reuse the scratch board across calls.
pub fn find_best_placement(board: &Board, kind: PieceKind) -> Result<BotState, SearchError> {
    PlacementSearch::new(board.dimensions())?.find_best_placement(board, kind)
}
