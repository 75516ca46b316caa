//! Lesson Player - terminal driver for the exercise engine
//!
//! Loads an exercise definition, restores saved progress and reads board
//! commands from stdin, printing the board events each command produces.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Input, HELP};
use std::io::{self, BufRead, Write};
use tracing::info;
use xfchess_lessons::chess_rules::ShakmatyRules;
use xfchess_lessons::core::logging::init_tracing;
use xfchess_lessons::core::settings_persistence::{load_settings, load_settings_from};
use xfchess_lessons::game::{BoardEvent, ExerciseDefinition, ExerciseMachine, MoveStatus};
use xfchess_lessons::input::{InputEvent, LessonBoard};
use xfchess_lessons::storage::{JsonFileStore, MemoryStore, SnapshotStore};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log);

    let json = std::fs::read_to_string(&cli.exercise)
        .with_context(|| format!("reading exercise {:?}", cli.exercise))?;
    let definition = ExerciseDefinition::from_json(&json)
        .with_context(|| format!("parsing exercise {:?}", cli.exercise))?;

    let settings = match &cli.settings {
        Some(path) => load_settings_from(path).with_context(|| format!("loading settings {path:?}"))?,
        None => load_settings(),
    };

    let store: Box<dyn SnapshotStore> = if cli.no_persist {
        Box::new(MemoryStore::new())
    } else {
        match &cli.store_dir {
            Some(dir) => Box::new(JsonFileStore::new(dir)),
            None => Box::new(JsonFileStore::in_data_dir()),
        }
    };

    info!("Starting lesson player for '{}'", definition.id);
    let mut machine = ExerciseMachine::new(definition, ShakmatyRules, store, settings);
    machine.load();

    let mut board = LessonBoard::new(machine);
    board.refresh();
    print_header(&board);
    print_events(&board.drain_events());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let input = match Input::parse(&line) {
            Ok(input) => input,
            Err(e) => {
                println!("{e:#}");
                continue;
            }
        };

        if !run(&mut board, input, cli.manual_clock) {
            break;
        }
        print_events(&board.drain_events());
    }

    Ok(())
}

/// Execute one command; `false` ends the session
fn run<S: SnapshotStore>(
    board: &mut LessonBoard<ShakmatyRules, S>,
    input: Input,
    manual_clock: bool,
) -> bool {
    let accepted = match input {
        Input::Move { from, to } => board.handle(InputEvent::PieceDropped {
            source: from,
            target: to,
        }),
        Input::Click(square) => board.handle(InputEvent::SquareClicked(square)),
        Input::AltClick(square) => board.handle(InputEvent::SquareAltClicked(square)),
        Input::Undo => board.machine_mut().undo(),
        Input::Redo => board.machine_mut().redo(),
        Input::Continue => board.machine_mut().continue_from_here(),
        Input::Reset => board.machine_mut().reset(),
        Input::Hint => board.machine_mut().toggle_hint(),
        Input::Reveal => board.machine_mut().reveal_move(),
        Input::Wait(ms) => {
            board.advance_time(ms);
            true
        }
        Input::Show => {
            print_header(board);
            true
        }
        Input::Help => {
            println!("{HELP}");
            true
        }
        Input::Quit => return false,
    };

    if !accepted {
        println!("(not accepted)");
    }

    board.refresh();
    if !manual_clock {
        board.run_until_idle();
    }
    true
}

fn print_header<S: SnapshotStore>(board: &LessonBoard<ShakmatyRules, S>) {
    let machine = board.machine();
    let session = machine.session();
    println!("Exercise: {} ({:?})", machine.definition().id, session.mode());
    if let Some(text) = machine.description() {
        println!("  {text}");
    }
    println!("  position: {}", session.displayed_position());
    println!(
        "  cursor {}, mistakes {}, completed {}",
        session.cursor(),
        session.wrong_attempts(),
        session.is_completed()
    );
}

fn print_events(events: &[BoardEvent]) {
    for event in events {
        match event {
            BoardEvent::PositionChanged(position) => println!("  position: {position}"),
            BoardEvent::StatusChanged(MoveStatus::Correct) => println!("  correct!"),
            BoardEvent::StatusChanged(MoveStatus::Incorrect) => println!("  incorrect, try again"),
            BoardEvent::StatusChanged(MoveStatus::None) => {}
            BoardEvent::GoalResultChanged(Some(result)) => {
                println!("  {} ({}/3 stars)", result.message, result.stars)
            }
            BoardEvent::GoalResultChanged(None) => {}
            BoardEvent::MoveQualityChanged(Some(quality)) => println!("  {quality}"),
            BoardEvent::MoveQualityChanged(None) => {}
            BoardEvent::HighlightsChanged(_) => {}
            BoardEvent::Sound(cue) => println!("  *{cue:?}*"),
            BoardEvent::Celebrate => println!("  *** well done ***"),
            BoardEvent::Completed => println!("  exercise completed"),
            BoardEvent::HintChanged(Some(hint)) => println!("  hint: {hint}"),
            BoardEvent::HintChanged(None) => println!("  hint hidden"),
            BoardEvent::MoveRevealed(Some((from, to))) => println!("  try {from}-{to}"),
            BoardEvent::MoveRevealed(None) => {}
            BoardEvent::PremoveChanged(Some(premove)) => {
                println!("  premove {}-{}", premove.from, premove.to)
            }
            BoardEvent::PremoveChanged(None) => {}
        }
    }
}
