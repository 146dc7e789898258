#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays a move string against a text level.

mod logging;
mod render;
mod settings;
mod snapshot_transfer;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use scale_sokoban_core::{Direction, LevelGrid, LevelMode};
use scale_sokoban_engine::Engine;
use scale_sokoban_system_input::FrameInput;
use scale_sokoban_world::query;

use crate::{
    settings::Settings,
    snapshot_transfer::{BoardSnapshot, SnapshotElement},
};

/// Upper bound on simulated frames spent settling after the script.
const SETTLE_FRAME_LIMIT: usize = 100_000;

/// Replays moves on a Scale Sokoban level and prints the resulting board.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the text level.
    level: PathBuf,
    /// Moves to replay: `u`/`d`/`l`/`r` step, `z` undoes, `!` restarts.
    #[arg(short, long, default_value = "")]
    moves: String,
    /// Play the moves as a passive demo instead of player input.
    #[arg(long)]
    demo: bool,
    /// Optional TOML settings file.
    #[arg(short, long)]
    settings: Option<PathBuf>,
    /// Print the final board as JSON instead of ASCII.
    #[arg(long)]
    json: bool,
    /// Print the final board as a single-line snapshot string.
    #[arg(long)]
    snapshot: bool,
    /// Fail unless the final board matches this snapshot string.
    #[arg(long, value_name = "SNAPSHOT")]
    expect: Option<String>,
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

/// One scripted action parsed from the move string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    Step(Direction),
    Undo,
    Restart,
}

fn parse_moves(moves: &str) -> Result<Vec<Action>> {
    moves
        .chars()
        .filter(|glyph| !glyph.is_whitespace() && *glyph != ',')
        .map(|glyph| match glyph.to_ascii_lowercase() {
            'u' => Ok(Action::Step(Direction::North)),
            'd' => Ok(Action::Step(Direction::South)),
            'l' => Ok(Action::Step(Direction::West)),
            'r' => Ok(Action::Step(Direction::East)),
            'z' => Ok(Action::Undo),
            '!' => Ok(Action::Restart),
            other => bail!("unknown move `{other}`"),
        })
        .collect()
}

/// Entry point for the Scale Sokoban command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let actions = parse_moves(&args.moves)?;
    let level_text = fs::read_to_string(&args.level)
        .with_context(|| format!("failed to read level at {}", args.level.display()))?;

    let (mode, script) = if args.demo {
        let script: Vec<Direction> = actions
            .iter()
            .filter_map(|action| match action {
                Action::Step(direction) => Some(*direction),
                _ => None,
            })
            .collect();
        if script.len() != actions.len() {
            warn!("demo mode ignores undo and restart moves");
        }
        (LevelMode::Demo, script)
    } else {
        (LevelMode::Interactive, Vec::new())
    };

    let mut engine = Engine::new(settings.engine_config(script));
    engine
        .load_level(LevelGrid::parse(&level_text), mode)
        .with_context(|| format!("level {} rejected", args.level.display()))?;

    if mode == LevelMode::Interactive {
        for action in &actions {
            match action {
                Action::Step(direction) => engine.attempt_move(*direction),
                Action::Undo => engine.undo(),
                Action::Restart => engine.restart(),
            }
            settle(&mut engine, &settings)?;
            if engine.take_level_complete() {
                info!("level complete");
            }
        }
    } else {
        settle(&mut engine, &settings)?;
    }

    report(args, &engine)
}

/// Ticks the engine until playback is idle and the demo script is spent.
fn settle(engine: &mut Engine, settings: &Settings) -> Result<()> {
    for _ in 0..SETTLE_FRAME_LIMIT {
        let playing = engine.tick(settings.frame(), FrameInput::default());
        if !playing && !engine.demo().is_active() {
            return Ok(());
        }
    }
    bail!("engine did not settle within {SETTLE_FRAME_LIMIT} frames")
}

fn report(args: &Args, engine: &Engine) -> Result<()> {
    let level = query::level(engine.world());
    let view = engine.element_view();
    let snapshot = BoardSnapshot {
        columns: level.columns(),
        rows: level.rows(),
        complete: engine.is_complete(),
        elements: view.iter().map(SnapshotElement::from).collect(),
    };
    debug!(
        "final history depth {}",
        query::history_depth(engine.world())
    );

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&snapshot).context("failed to encode board json")?
        );
    } else if args.snapshot {
        println!("{}", snapshot.encode()?);
    } else {
        println!("{}", render::render_board(level, &view));
        println!("complete: {}", snapshot.complete);
    }

    if let Some(expected) = &args.expect {
        let expected = BoardSnapshot::decode(expected).context("invalid --expect snapshot")?;
        if expected != snapshot {
            bail!("final board does not match the expected snapshot");
        }
    }
    Ok(())
}
