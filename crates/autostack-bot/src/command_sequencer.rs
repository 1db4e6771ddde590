//! Turning a chosen placement into one input per tick.
//!
//! The sequencer has no memory of its own. Each call compares the falling piece with the target
//! stored in [`BotState`] and emits the single next input, in a fixed order: rotate until the
//! orientation matches, then slide until the column matches, then move down.

use std::fmt;

use autostack_engine::{Board, Piece};
use serde::{Deserialize, Serialize};

use crate::placement_search::BotState;

/// A single discrete input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
pub enum Command {
    #[display("left")]
    Left,
    #[display("right")]
    Right,
    #[display("down")]
    Down,
    #[display("rotate-ccw")]
    RotateCcw,
    #[display("rotate-cw")]
    RotateCw,
}

impl Command {
    /// Applies the command to `piece` with the piece motion rules. Returns whether the piece
    /// moved.
    pub fn apply(self, piece: &mut Piece, board: &Board) -> bool {
        match self {
            Self::Left => piece.move_left(board),
            Self::Right => piece.move_right(board),
            Self::Down => piece.move_down(board),
            Self::RotateCcw => piece.rotate_ccw(board),
            Self::RotateCw => piece.rotate_cw(board),
        }
    }
}

/// Input intents for one tick.
///
/// [`next_command`] sets at most one of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSet {
    pub left: bool,
    pub right: bool,
    pub down: bool,
    pub rotate_ccw: bool,
    pub rotate_cw: bool,
}

impl CommandSet {
    /// Returns the first active intent, in rotate, slide, down order.
    #[must_use]
    pub fn command(self) -> Option<Command> {
        [
            (self.rotate_cw, Command::RotateCw),
            (self.rotate_ccw, Command::RotateCcw),
            (self.right, Command::Right),
            (self.left, Command::Left),
            (self.down, Command::Down),
        ]
        .into_iter()
        .find_map(|(active, command)| active.then_some(command))
    }

    #[must_use]
    pub fn is_idle(self) -> bool {
        self == Self::default()
    }
}

impl From<Command> for CommandSet {
    fn from(command: Command) -> Self {
        let mut set = Self::default();
        match command {
            Command::Left => set.left = true,
            Command::Right => set.right = true,
            Command::Down => set.down = true,
            Command::RotateCcw => set.rotate_ccw = true,
            Command::RotateCw => set.rotate_cw = true,
        }
        set
    }
}

impl fmt::Display for CommandSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.command() {
            Some(command) => write!(f, "{command}"),
            None => write!(f, "idle"),
        }
    }
}

/// Derives the next input that moves `piece` toward the target in `bot`.
///
/// When the orientation differs, the piece rotates in the direction with fewer steps and
/// clockwise on a tie. A `bot.dest_orient_index` past the piece's rotation table wraps around
/// it.
#[must_use]
pub fn next_command(piece: &Piece, bot: &BotState) -> CommandSet {
    let n = piece.orientations();
    let current = piece.orient_index();
    let dest = bot.dest_orient_index % n;
    let command = if current != dest {
        let cw_steps = (dest + n - current) % n;
        let ccw_steps = (current + n - dest) % n;
        if ccw_steps < cw_steps {
            Command::RotateCcw
        } else {
            Command::RotateCw
        }
    } else if piece.x() < bot.dest_x {
        Command::Right
    } else if piece.x() > bot.dest_x {
        Command::Left
    } else {
        Command::Down
    };
    command.into()
}

/// Plays out the commands that bring `piece` from its current position to a lock.
///
/// Once a rotation or slide is blocked, only [`Command::Down`] follows. The last command is
/// the blocked down move that locks the piece.
#[must_use]
pub fn command_sequence(board: &Board, mut piece: Piece, bot: &BotState) -> Vec<Command> {
    let mut commands = vec![];
    let mut force_drop = false;
    loop {
        let command = if force_drop {
            Command::Down
        } else {
            next_command(&piece, bot).command().unwrap_or(Command::Down)
        };
        commands.push(command);
        if !command.apply(&mut piece, board) {
            if command == Command::Down {
                return commands;
            }
            force_drop = true;
        }
    }
}
