//! Greedy placement bot for the autostack board.
//!
//! The bot looks at one piece at a time. It never looks ahead, never holds, and only reaches
//! placements that a rotate-slide-drop sequence from the spawn position can reach.
//!
//! # Architecture
//!
//! ```text
//! BotSession (drives a board one command at a time)
//!     ↓ uses
//! Piece Selector (pick a kind whose best placement does no harm)
//!     ↓ uses
//! Placement Search (best orientation and column for one kind)
//!     ↓ uses
//! Board Metrics (holes, line dependencies, deviation, height)
//! ```
//!
//! The [`command_sequencer`] turns the chosen placement into one input per tick. It reads the
//! [`BotState`] left behind by the last search and nothing else.
//!
//! # Example
//!
//! ```
//! use autostack_bot::{command_sequencer, placement_search};
//! use autostack_engine::{Board, Piece, PieceKind};
//!
//! let board = Board::standard()?;
//! let bot = placement_search::find_best_placement(&board, PieceKind::O)?;
//! assert_eq!(bot.holes, 0);
//!
//! let piece = Piece::spawn(PieceKind::O, &board);
//! let commands = command_sequencer::next_command(&piece, &bot);
//! assert!(commands.left);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use autostack_engine::{AllocationError, DimensionMismatchError};

pub use self::{
    command_sequencer::{Command, CommandSet},
    piece_selector::PieceChoice,
    placement_search::BotState,
    session::*,
};

pub mod board_metrics;
pub mod command_sequencer;
pub mod piece_selector;
pub mod placement_search;
mod session;

/// A placement search could not run.
#[derive(
    Debug, derive_more::Display, derive_more::Error, derive_more::From, derive_more::IsVariant,
)]
pub enum SearchError {
    #[display("cannot allocate scratch board: {_0}")]
    Allocation(AllocationError),
    #[display("cannot copy board into scratch board: {_0}")]
    DimensionMismatch(DimensionMismatchError),
}
