use std::path::PathBuf;

use anyhow::{Context, bail};
use autostack_bot::{BotState, Command, command_sequencer, placement_search};
use autostack_engine::{Piece, PieceKind};
use serde::Serialize;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CommandsArg {
    /// Board snapshot file (JSON)
    board_path: PathBuf,
    /// Kind of the spawned piece (I, O, J, L, S, T or Z)
    #[arg(long)]
    piece: PieceKind,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct CommandPlan {
    kind: PieceKind,
    bot_state: BotState,
    commands: Vec<Command>,
    /// Where the piece ends up after the last command
    locked_at: Piece,
}

pub(crate) fn run(arg: &CommandsArg) -> anyhow::Result<()> {
    let CommandsArg {
        board_path,
        piece: kind,
        output,
    } = arg;

    let board = util::read_board_file(board_path)?;
    let bot_state = placement_search::find_best_placement(&board, *kind)
        .with_context(|| format!("Failed to search placements for {kind:?}"))?;

    let spawned = Piece::spawn(*kind, &board);
    if spawned.collides(&board) {
        bail!("{kind:?} collides with the stack at its spawn position");
    }

    let commands = command_sequencer::command_sequence(&board, spawned, &bot_state);
    let mut locked_at = spawned;
    for command in &commands {
        command.apply(&mut locked_at, &board);
    }
    eprintln!(
        "{kind:?}: {} commands to orientation {} at x={}",
        commands.len(),
        bot_state.dest_orient_index,
        bot_state.dest_x
    );

    let plan = CommandPlan {
        kind: *kind,
        bot_state,
        commands,
        locked_at,
    };
    Output::save_json(&plan, output.clone())
}
