use std::{
    collections::VecDeque,
    fs::{self, File},
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use autostack_bot::{BotState, PieceChoice, TickOutcome};
use autostack_engine::{Board, BoardDimensions, GameStats, Piece, PieceKind, PieceSeed};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved bot session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedSession {
    /// Timestamp when the recording was created (ISO 8601 format)
    pub recorded_at: DateTime<Utc>,
    /// Seed of the generator that drove piece selection
    pub seed: PieceSeed,
    pub dimensions: BoardDimensions,
    pub final_stats: GameStats,
    pub final_board: Board,
    /// The most recent locked pieces, oldest first
    pub turns: Vec<TurnRecord>,
}

/// One locked piece and the decision behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    /// Turn number (0-indexed, increments with each locked piece)
    pub turn: usize,
    pub kind: PieceKind,
    /// Whether the selector fell back to a random kind
    pub fallback: bool,
    pub bot_state: BotState,
    /// Where the piece actually locked
    pub placement: Piece,
    pub cleared_lines: usize,
    pub topped_out: bool,
}

/// Collects turn records while a session runs.
#[derive(Debug)]
pub struct SessionRecorder {
    seed: PieceSeed,
    dimensions: BoardDimensions,
    turns: RingBuffer<TurnRecord>,
    next_turn: usize,
}

impl SessionRecorder {
    /// Creates a recorder that keeps at most `history_size` turns.
    pub fn new(seed: PieceSeed, dimensions: BoardDimensions, history_size: usize) -> Self {
        Self {
            seed,
            dimensions,
            turns: RingBuffer::with_capacity(history_size),
            next_turn: 0,
        }
    }

    /// Records the outcome of a piece steered by `choice`. Outcomes that did not lock a piece
    /// are ignored.
    pub fn record(&mut self, choice: &PieceChoice, outcome: TickOutcome) {
        let (placement, cleared_lines, topped_out) = match outcome {
            TickOutcome::Moved(_) => return,
            TickOutcome::Locked {
                piece,
                cleared_lines,
            } => (piece, cleared_lines, false),
            TickOutcome::ToppedOut {
                piece,
                cleared_lines,
            } => (piece, cleared_lines, true),
        };
        self.turns.push(TurnRecord {
            turn: self.next_turn,
            kind: choice.kind,
            fallback: choice.fallback,
            bot_state: choice.bot_state,
            placement,
            cleared_lines,
            topped_out,
        });
        self.next_turn += 1;
    }

    /// Saves the recording to a JSON file in `record_dir` and returns its path.
    ///
    /// The filename is generated from the current timestamp: `bot_{YYYYMMDD_HHMMSS}.json`.
    /// `record_dir` is created if it does not exist.
    pub fn save(
        &self,
        final_stats: &GameStats,
        final_board: &Board,
        record_dir: &Path,
    ) -> anyhow::Result<PathBuf> {
        fs::create_dir_all(record_dir)
            .with_context(|| format!("Failed to create directory {}", record_dir.display()))?;

        let timestamp = Utc::now();
        let filename = format!("bot_{}.json", timestamp.format("%Y%m%d_%H%M%S"));
        let filepath = record_dir.join(filename);

        let data = RecordedSession {
            recorded_at: timestamp,
            seed: self.seed,
            dimensions: self.dimensions,
            final_stats: final_stats.clone(),
            final_board: final_board.clone(),
            turns: self.turns.to_vec(),
        };

        let file = File::create(&filepath)
            .with_context(|| format!("Failed to create file: {}", filepath.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &data)
            .with_context(|| format!("Failed to write JSON to {}", filepath.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush output to {}", filepath.display()))?;

        Ok(filepath)
    }
}

/// A fixed-capacity ring buffer that drops its oldest entry when full.
#[derive(Debug)]
struct RingBuffer<T> {
    capacity: usize,
    buf: VecDeque<T>,
}

impl<T> RingBuffer<T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            buf: VecDeque::with_capacity(capacity),
        }
    }

    fn push(&mut self, item: T) {
        if self.capacity == 0 {
            return;
        }
        if self.buf.len() >= self.capacity {
            self.buf.pop_front();
        }
        self.buf.push_back(item);
    }

    fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.buf.iter().cloned().collect()
    }
}
