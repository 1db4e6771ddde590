use autostack_engine::BoardDimensions;
use clap::{Parser, Subcommand};

use self::{auto_play::AutoPlayArg, commands::CommandsArg, evaluate::EvaluateArg};

mod auto_play;
mod commands;
mod evaluate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Let the bot play a headless game
    AutoPlay(#[clap(flatten)] AutoPlayArg),
    /// Decide a placement for a board snapshot
    Evaluate(#[clap(flatten)] EvaluateArg),
    /// Print the commands that steer a piece into its chosen placement
    Commands(#[clap(flatten)] CommandsArg),
}

/// Board layout flags shared by the subcommands that create a board.
#[derive(Debug, Clone, Copy, clap::Args)]
pub(crate) struct BoardDimensionsArg {
    /// Total number of rows, hidden rows included
    #[arg(long, default_value_t = BoardDimensions::STANDARD.rows)]
    rows: usize,
    /// Number of columns
    #[arg(long, default_value_t = BoardDimensions::STANDARD.cols)]
    cols: usize,
    /// Rows above the visible area
    #[arg(long, default_value_t = BoardDimensions::STANDARD.hidden_rows)]
    hidden_rows: usize,
}

impl BoardDimensionsArg {
    pub(crate) fn dimensions(self) -> BoardDimensions {
        BoardDimensions::new(self.rows, self.cols, self.hidden_rows)
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::AutoPlay(arg) => auto_play::run(&arg)?,
        Mode::Evaluate(arg) => evaluate::run(&arg)?,
        Mode::Commands(arg) => commands::run(&arg)?,
    }
    Ok(())
}
