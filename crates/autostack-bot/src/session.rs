use autostack_engine::{Board, BoardDimensions, GameStats, Piece};
use rand::Rng;

use crate::{
    SearchError,
    command_sequencer::{self, Command},
    piece_selector::{PieceChoice, PieceSelector},
    placement_search::BotState,
};

/// What a single [`BotSession::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum TickOutcome {
    /// The command was applied to the falling piece. A blocked rotation or slide forces the
    /// piece straight down on the following ticks.
    Moved(Command),
    /// The piece could not move down and was locked into the board.
    Locked { piece: Piece, cleared_lines: usize },
    /// The piece was locked, the next piece collided at spawn, and the board was reset.
    ToppedOut { piece: Piece, cleared_lines: usize },
}

/// A headless bot game: the board, the falling piece, and the bot steering it.
///
/// Each [`tick`](Self::tick) applies exactly one command from the
/// [command sequencer](crate::command_sequencer). When the piece cannot move down it is locked,
/// full rows are cleared, and the [piece selector](crate::piece_selector) picks and plans the
/// next piece. A piece that collides right after spawning tops the game out: the board is
/// cleared and a new piece is chosen for the empty board.
#[derive(Debug, Clone)]
pub struct BotSession<R> {
    board: Board,
    piece: Piece,
    choice: PieceChoice,
    force_drop: bool,
    stats: GameStats,
    selector: PieceSelector,
    rng: R,
}

impl<R> BotSession<R>
where
    R: Rng,
{
    /// Starts a session on an empty board.
    pub fn new(dimensions: BoardDimensions, rng: R) -> Result<Self, SearchError> {
        Self::with_board(Board::with_dimensions(dimensions)?, rng)
    }

    /// Starts a session on an existing board.
    pub fn with_board(board: Board, mut rng: R) -> Result<Self, SearchError> {
        let mut selector = PieceSelector::new(board.dimensions())?;
        let choice = selector.choose_next_piece(&board, &mut rng)?;
        let piece = Piece::spawn(choice.kind, &board);
        Ok(Self {
            board,
            piece,
            choice,
            force_drop: false,
            stats: GameStats::new(),
            selector,
            rng,
        })
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn piece(&self) -> &Piece {
        &self.piece
    }

    /// Returns the decision the falling piece is being steered by.
    #[must_use]
    pub fn choice(&self) -> &PieceChoice {
        &self.choice
    }

    #[must_use]
    pub fn bot_state(&self) -> &BotState {
        &self.choice.bot_state
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    /// Returns whether a blocked move has switched the bot to dropping straight down.
    #[must_use]
    pub fn force_drop(&self) -> bool {
        self.force_drop
    }

    /// Applies one command to the falling piece.
    pub fn tick(&mut self) -> Result<TickOutcome, SearchError> {
        let command = if self.force_drop {
            Command::Down
        } else {
            command_sequencer::next_command(&self.piece, &self.choice.bot_state)
                .command()
                .unwrap_or(Command::Down)
        };

        if !command.apply(&mut self.piece, &self.board) {
            if command == Command::Down {
                return self.lock_piece();
            }
            self.force_drop = true;
        }
        Ok(TickOutcome::Moved(command))
    }

    /// Ticks until the falling piece is locked.
    ///
    /// Returns the [`TickOutcome::Locked`] or [`TickOutcome::ToppedOut`] of the final tick.
    pub fn play_piece(&mut self) -> Result<TickOutcome, SearchError> {
        loop {
            let outcome = self.tick()?;
            if !outcome.is_moved() {
                return Ok(outcome);
            }
        }
    }

    fn lock_piece(&mut self) -> Result<TickOutcome, SearchError> {
        let piece = self.piece;
        piece.place(&mut self.board);
        let cleared_lines = self.board.clean();
        self.stats.complete_piece_drop(cleared_lines);

        self.spawn_next()?;
        if self.piece.collides(&self.board) {
            self.stats.record_top_out();
            self.board.clear();
            self.spawn_next()?;
            return Ok(TickOutcome::ToppedOut {
                piece,
                cleared_lines,
            });
        }
        Ok(TickOutcome::Locked {
            piece,
            cleared_lines,
        })
    }

    fn spawn_next(&mut self) -> Result<(), SearchError> {
        self.choice = self
            .selector
            .choose_next_piece(&self.board, &mut self.rng)?;
        self.piece = Piece::spawn(self.choice.kind, &self.board);
        self.force_drop = false;
        Ok(())
    }
}
