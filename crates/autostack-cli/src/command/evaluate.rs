use std::path::PathBuf;

use anyhow::Context;
use autostack_bot::{
    BotState, board_metrics, piece_selector::choose_next_piece,
    placement_search::find_best_placement,
};
use autostack_engine::{Board, BoardDimensions, PieceKind, PieceSeed};
use rand::Rng as _;
use serde::Serialize;

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct EvaluateArg {
    /// Board snapshot file (JSON)
    board_path: PathBuf,
    /// Search placements for this kind only (I, O, J, L, S, T or Z) instead of choosing one
    #[arg(long)]
    piece: Option<PieceKind>,
    /// Seed for piece selection as 32 hex digits (random if omitted, ignored with --piece)
    #[arg(long)]
    seed: Option<PieceSeed>,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct BoardReport {
    dimensions: BoardDimensions,
    holes: usize,
    line_dep_cells: usize,
    stack_height: usize,
    stack_deviation: Option<f64>,
    column_heights: Vec<usize>,
}

impl BoardReport {
    fn new(board: &Board) -> Self {
        Self {
            dimensions: board.dimensions(),
            holes: board_metrics::hole_count(board),
            line_dep_cells: board_metrics::line_dependency_cells(board, true),
            stack_height: board_metrics::stack_height(board),
            stack_deviation: board_metrics::stack_deviation(board),
            column_heights: board_metrics::column_heights(board),
        }
    }
}

#[derive(Debug, Serialize)]
struct Evaluation {
    board: BoardReport,
    kind: PieceKind,
    /// `None` when the kind was given on the command line
    fallback: Option<bool>,
    seed: Option<PieceSeed>,
    bot_state: BotState,
}

pub(crate) fn run(arg: &EvaluateArg) -> anyhow::Result<()> {
    let EvaluateArg {
        board_path,
        piece,
        seed,
        output,
    } = arg;

    let board = util::read_board_file(board_path)?;
    eprintln!(
        "Loaded {} board from {}",
        board.dimensions(),
        board_path.display()
    );

    let evaluation = if let Some(kind) = *piece {
        let bot_state = find_best_placement(&board, kind)
            .with_context(|| format!("Failed to search placements for {kind:?}"))?;
        Evaluation {
            board: BoardReport::new(&board),
            kind,
            fallback: None,
            seed: None,
            bot_state,
        }
    } else {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        eprintln!("Choosing a piece with seed {seed}");
        let choice = choose_next_piece(&board, &mut seed.rng())
            .context("Failed to choose the next piece")?;
        Evaluation {
            board: BoardReport::new(&board),
            kind: choice.kind,
            fallback: Some(choice.fallback),
            seed: Some(seed),
            bot_state: choice.bot_state,
        }
    };

    Output::save_json(&evaluation, output.clone())
}
