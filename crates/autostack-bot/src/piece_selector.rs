//! Choosing which piece kind to hand out next.
//!
//! The selector favours the player: it tries the seven kinds in a shuffled order and hands out
//! the first one that can be placed without adding holes, without adding line-dependency
//! cells, and without pushing the stack over a height ceiling. When no kind qualifies, a
//! uniformly random kind is handed out instead.

use autostack_engine::{AllocationError, Board, BoardDimensions, PieceKind};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    SearchError, board_metrics,
    placement_search::{BotState, PlacementSearch},
};

/// Rows kept free between the stack ceiling and the top of the visible area.
const HEIGHT_MARGIN: usize = 4;

/// The kind handed out and the placement the bot will steer it to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceChoice {
    pub kind: PieceKind,
    pub bot_state: BotState,
    /// `true` when no kind met the conditions and `kind` was drawn at random.
    pub fallback: bool,
}

/// Highest stack an accepted placement may leave behind.
///
/// This is the visible height minus four rows, or the full visible height on boards of four
/// rows or fewer.
#[must_use]
pub fn stack_height_limit(dimensions: BoardDimensions) -> usize {
    let visible = dimensions.visible_rows();
    if dimensions.rows > HEIGHT_MARGIN {
        visible.saturating_sub(HEIGHT_MARGIN)
    } else {
        visible
    }
}

/// Piece selector with a reusable placement search.
#[derive(Debug, Clone)]
pub struct PieceSelector {
    search: PlacementSearch,
}

impl PieceSelector {
    pub fn new(dimensions: BoardDimensions) -> Result<Self, AllocationError> {
        Ok(Self {
            search: PlacementSearch::new(dimensions)?,
        })
    }

    /// Chooses the next kind for `board`.
    ///
    /// When every kind fails the conditions, the fallback kind is searched again so the
    /// returned [`BotState`] always belongs to the returned kind.
    pub fn choose_next_piece<R>(
        &mut self,
        board: &Board,
        rng: &mut R,
    ) -> Result<PieceChoice, SearchError>
    where
        R: Rng + ?Sized,
    {
        let bag = PieceKind::shuffled_bag(rng);
        let init_holes = board_metrics::hole_count(board);
        let init_line_deps = board_metrics::line_dependency_cells(board, true);
        let height_limit = stack_height_limit(board.dimensions());

        for kind in bag {
            let bot_state = self.search.find_best_placement(board, kind)?;
            if bot_state.holes <= init_holes
                && bot_state.line_dep_cells <= init_line_deps
                && bot_state.stack_height <= height_limit
            {
                return Ok(PieceChoice {
                    kind,
                    bot_state,
                    fallback: false,
                });
            }
        }

        let kind: PieceKind = rng.random();
        let bot_state = self.search.find_best_placement(board, kind)?;
        Ok(PieceChoice {
            kind,
            bot_state,
            fallback: true,
        })
    }
}

/// Chooses the next kind for `board` with a freshly allocated scratch board.
pub fn choose_next_piece<R>(board: &Board, rng: &mut R) -> Result<PieceChoice, SearchError>
where
    R: Rng + ?Sized,
{
    PieceSelector::new(board.dimensions())?.choose_next_piece(board, rng)
}
