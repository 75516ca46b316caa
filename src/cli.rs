//! Command-line interface for the lesson player.

use anyhow::{bail, Context, Result};
use chess_rules::Square;
use clap::Parser;
use std::path::PathBuf;

/// Lesson Player - play a chess exercise in the terminal
#[derive(Parser, Debug)]
#[command(name = "lesson-player")]
#[command(about = "Play a scripted or goal chess exercise from a JSON file", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Exercise definition (lesson database JSON)
    #[arg(long)]
    pub exercise: PathBuf,

    /// Directory for progress snapshots (defaults to the user data directory)
    #[arg(long)]
    pub store_dir: Option<PathBuf>,

    /// Keep progress in memory only
    #[arg(long)]
    pub no_persist: bool,

    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Only advance the clock with `wait <ms>` instead of after every command
    #[arg(long)]
    pub manual_clock: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    pub log: String,
}

/// One line typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Move { from: Square, to: Square },
    Click(Square),
    AltClick(Square),
    Undo,
    Redo,
    Continue,
    Reset,
    Hint,
    Reveal,
    Wait(u64),
    Show,
    Help,
    Quit,
}

impl Input {
    pub fn parse(line: &str) -> Result<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let square = |text: &str| -> Result<Square> {
            text.parse()
                .with_context(|| format!("'{text}' is not a square"))
        };

        let input = match words.as_slice() {
            ["undo"] => Input::Undo,
            ["redo"] => Input::Redo,
            ["continue"] => Input::Continue,
            ["reset"] => Input::Reset,
            ["hint"] => Input::Hint,
            ["reveal"] => Input::Reveal,
            ["show"] => Input::Show,
            ["help"] | ["?"] => Input::Help,
            ["quit"] | ["exit"] => Input::Quit,
            ["wait", ms] => Input::Wait(ms.parse().with_context(|| format!("'{ms}' is not a delay"))?),
            ["click", at] => Input::Click(square(at)?),
            ["alt", at] => Input::AltClick(square(at)?),
            [from, to] => Input::Move {
                from: square(from)?,
                to: square(to)?,
            },
            [joined] if joined.len() == 4 && joined.is_ascii() => Input::Move {
                from: square(&joined[..2])?,
                to: square(&joined[2..])?,
            },
            _ => bail!("unrecognised command '{}' (try 'help')", line.trim()),
        };

        Ok(input)
    }
}

pub const HELP: &str = "\
moves:    e2 e4 | e2e4          drag a piece
          click e2 / alt e2     click / right-click a square
history:  undo | redo | continue
help:     hint | reveal
other:    reset | wait <ms> | show | quit";
