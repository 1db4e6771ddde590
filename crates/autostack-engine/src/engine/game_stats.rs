use serde::{Deserialize, Serialize};

/// Number of rows cleared at once that counts as a tetris.
pub const TETRIS_LINES: usize = 4;

/// Lines needed to advance one level.
pub const LINES_PER_LEVEL: usize = 10;

/// Statistics of a bot session.
///
/// - **Completed pieces**: total number of pieces locked
/// - **Line clear distribution**: count of drops clearing 0, 1, 2, 3 and 4+ rows
/// - **Level**: one level per [`LINES_PER_LEVEL`] cleared lines
/// - **Top-outs**: how many times a spawned piece collided and the board was reset
///
/// # Example
///
/// ```
/// use autostack_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// stats.complete_piece_drop(4);
/// stats.complete_piece_drop(0);
///
/// assert_eq!(stats.completed_pieces(), 2);
/// assert_eq!(stats.tetrises(), 1);
/// assert_eq!(stats.line_cleared_counter()[0], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
    top_outs: usize,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    /// Creates a new statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
            top_outs: 0,
        }
    }

    /// Returns the total number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    /// Returns the total number of lines cleared across all line clears.
    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns the current level based on total lines cleared.
    #[must_use]
    pub const fn level(&self) -> usize {
        self.total_cleared_lines / LINES_PER_LEVEL
    }

    /// Returns a histogram of drops by cleared rows.
    ///
    /// Index 4 counts drops that cleared four or more rows.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Returns the number of drops that cleared at least [`TETRIS_LINES`] rows.
    #[must_use]
    pub const fn tetrises(&self) -> usize {
        self.line_cleared_counter[TETRIS_LINES]
    }

    #[must_use]
    pub const fn top_outs(&self) -> usize {
        self.top_outs
    }

    /// Updates statistics after a piece is locked and full rows are cleaned.
    pub fn complete_piece_drop(&mut self, cleared_lines: usize) {
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines;
        self.line_cleared_counter[cleared_lines.min(TETRIS_LINES)] += 1;
    }

    /// Records a spawn collision that reset the board.
    pub fn record_top_out(&mut self) {
        self.top_outs += 1;
    }
}
