//! Board and piece model for the autostack bot.
//!
//! - [`core`] - the cell grid ([`Board`]), piece kinds with their rotation tables
//!   ([`PieceKind`]), and falling piece instances ([`Piece`])
//! - [`engine`] - bookkeeping shared by drivers: seeded randomness ([`PieceSeed`]) and
//!   line-clear statistics ([`GameStats`])

use std::collections::TryReserveError;

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// A board could not be created.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum AllocationError {
    #[display("board has {hidden_rows} hidden rows but only {rows} rows")]
    HiddenRowsExceedRows { rows: usize, hidden_rows: usize },
    #[display("board dimensions {dimensions} overflow the cell count")]
    TooLarge { dimensions: BoardDimensions },
    #[display("failed to allocate board cells")]
    OutOfMemory(TryReserveError),
}

/// Two boards with different dimensions were used where equal dimensions are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("board dimensions differ: expected {expected}, found {found}")]
pub struct DimensionMismatchError {
    pub expected: BoardDimensions,
    pub found: BoardDimensions,
}

/// An orientation index outside a piece kind's rotation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("{kind:?} has no orientation {orient_index}")]
pub struct InvalidOrientationError {
    pub kind: PieceKind,
    pub orient_index: usize,
}

/// A textual board could not be parsed.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ParseBoardError {
    #[display("expected {expected} rows, found {found}")]
    RowCount { expected: usize, found: usize },
    #[display("row {row} has {found} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[display("invalid cell {ch:?} at row {row}, column {col}")]
    InvalidCell { row: usize, col: usize, ch: char },
    #[display("{_0}")]
    Allocation(AllocationError),
}
