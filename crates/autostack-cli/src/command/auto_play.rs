use std::path::PathBuf;

use anyhow::Context;
use autostack_bot::BotSession;
use autostack_engine::PieceSeed;
use rand::Rng as _;

use crate::{command::BoardDimensionsArg, record::SessionRecorder};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    /// Number of pieces to lock before stopping
    #[arg(long, default_value_t = 1000)]
    pieces: usize,
    /// Seed for piece selection as 32 hex digits (random if omitted)
    #[arg(long)]
    seed: Option<PieceSeed>,
    #[clap(flatten)]
    board: BoardDimensionsArg,
    /// Print progress every N pieces (0 disables progress)
    #[arg(long, default_value_t = 100)]
    progress_interval: usize,
    /// Save the game recording to a file when the session ends
    #[arg(long)]
    save_recording: bool,
    /// Directory to save recording files
    #[arg(long, default_value = "./data/recordings/")]
    record_dir: PathBuf,
    /// Maximum number of turns to keep in the recording (oldest are discarded)
    #[arg(long, default_value_t = 10000)]
    history_size: usize,
}

pub(crate) fn run(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        pieces,
        seed,
        board,
        progress_interval,
        save_recording,
        record_dir,
        history_size,
    } = arg;

    let seed = seed.unwrap_or_else(|| rand::rng().random());
    let dimensions = board.dimensions();
    eprintln!("Playing {pieces} pieces on a {dimensions} board with seed {seed}");

    let mut session = BotSession::new(dimensions, seed.rng())
        .with_context(|| format!("Failed to start a session on a {dimensions} board"))?;
    let mut recorder = SessionRecorder::new(seed, dimensions, *history_size);

    for turn in 0..*pieces {
        let choice = *session.choice();
        let outcome = session
            .play_piece()
            .with_context(|| format!("Failed to choose the piece after turn {turn}"))?;
        recorder.record(&choice, outcome);

        let completed = turn + 1;
        if *progress_interval > 0 && completed % progress_interval == 0 {
            let stats = session.stats();
            eprintln!(
                "  {completed}/{pieces} pieces: {} lines, level {}, {} top-outs",
                stats.total_cleared_lines(),
                stats.level(),
                stats.top_outs()
            );
        }
    }

    let stats = session.stats();
    eprintln!();
    eprintln!("{}", session.board());
    eprintln!();
    eprintln!("Pieces:   {}", stats.completed_pieces());
    eprintln!("Lines:    {}", stats.total_cleared_lines());
    eprintln!("Level:    {}", stats.level());
    eprintln!("Tetrises: {}", stats.tetrises());
    eprintln!("Top-outs: {}", stats.top_outs());
    let [none, single, double, triple, tetris] = *stats.line_cleared_counter();
    eprintln!("Clears:   0={none} 1={single} 2={double} 3={triple} 4+={tetris}");

    if *save_recording {
        let path = recorder.save(stats, session.board(), record_dir)?;
        eprintln!("Saved recording to {}", path.display());
    }

    Ok(())
}
