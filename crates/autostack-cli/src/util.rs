use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use autostack_engine::Board;

/// Destination for JSON results: stdout, or a file when a path is given.
#[derive(Debug)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    /// Writes `value` as pretty JSON followed by a newline.
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let output = output_path.map_or(Output::Stdout, Output::File);
        match &output {
            Output::Stdout => output.write_json(&mut io::stdout().lock(), value),
            Output::File(path) => {
                let file = File::create(path).with_context(|| {
                    format!("Failed to create output file: {}", path.display())
                })?;
                output.write_json(&mut BufWriter::new(file), value)
            }
        }
    }

    fn write_json<W, T>(&self, writer: &mut W, value: &T) -> anyhow::Result<()>
    where
        W: io::Write,
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *writer, value)
            .with_context(|| format!("Failed to write JSON to {self}"))?;
        writeln!(writer)
            .and_then(|()| writer.flush())
            .with_context(|| format!("Failed to flush output to {self}"))?;
        Ok(())
    }
}

impl std::fmt::Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Output::Stdout => f.write_str("stdout"),
            Output::File(path) => write!(f, "{}", path.display()),
        }
    }
}

fn read_json_file<T>(file_kind: &str, path: &Path) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))
}

/// Reads a board snapshot.
///
/// The file holds the board dimensions and one string per row, top row first:
///
/// ```json
/// { "rows": 4, "cols": 4, "hidden_rows": 0, "cells": ["....", "....", "..T.", ".TTT"] }
/// ```
pub fn read_board_file<P>(path: P) -> anyhow::Result<Board>
where
    P: AsRef<Path>,
{
    read_json_file("board", path.as_ref())
}
