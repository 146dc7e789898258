use std::time::Duration;

use scale_sokoban_core::{Command, Direction, Event, LevelGrid, LevelMode, SoundCue};
use scale_sokoban_system_playback::{Config, Playback};
use scale_sokoban_world::{self as world, World};

const LEVEL: &str = ".......\n.......\n.......\n.pb+...\n.......\n.......\n.......";

fn loaded_world() -> (World, Vec<Event>) {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::LoadLevel {
            grid: LevelGrid::parse(LEVEL),
            mode: LevelMode::Interactive,
        },
        &mut events,
    );
    (world, events)
}

fn move_events(world: &mut World) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Move {
            direction: Direction::East,
        },
        &mut events,
    );
    events
}

fn tick(dt: Duration) -> Event {
    Event::TimeAdvanced { dt }
}

/// Plays the move with the provided tick lengths and records every frame's
/// started cues plus the frame on which completion evaluation was requested.
fn play(ticks: &[Duration]) -> (Vec<SoundCue>, Option<usize>) {
    let (mut world, loaded) = loaded_world();
    let mut playback = Playback::new(Config::default());
    let mut commands = Vec::new();
    playback.handle(&loaded, &mut commands);
    assert!(commands.is_empty());

    let queued = move_events(&mut world);
    playback.handle(&queued, &mut commands);
    let mut cues = playback.started_cues().to_vec();

    let mut evaluated_at = None;
    for (frame, dt) in ticks.iter().enumerate() {
        playback.handle(&[tick(*dt)], &mut commands);
        cues.extend_from_slice(playback.started_cues());
        if evaluated_at.is_none() && commands.contains(&Command::EvaluateCompletion) {
            evaluated_at = Some(frame);
        }
    }
    (cues, evaluated_at)
}

#[test]
fn push_then_growth_plays_in_sequence() {
    let (mut world, loaded) = loaded_world();
    let mut playback = Playback::default();
    let mut commands = Vec::new();
    playback.handle(&loaded, &mut commands);

    let queued = move_events(&mut world);
    playback.handle(&queued, &mut commands);
    assert_eq!(playback.pending(), 2);
    assert_eq!(playback.started_cues(), &[SoundCue::Move]);
    assert!(commands.is_empty(), "no evaluation while playing");

    playback.handle(&[tick(Duration::from_millis(120))], &mut commands);
    assert_eq!(playback.pending(), 1);
    assert_eq!(playback.started_cues(), &[SoundCue::Scale]);

    playback.handle(&[tick(Duration::from_millis(199))], &mut commands);
    assert!(playback.is_playing());
    assert!(commands.is_empty());

    playback.handle(&[tick(Duration::from_millis(1))], &mut commands);
    assert!(!playback.is_playing());
    assert_eq!(commands, vec![Command::EvaluateCompletion]);
}

#[test]
fn large_tick_drains_several_batches() {
    let (cues, evaluated_at) = play(&[Duration::from_secs(1)]);
    assert_eq!(cues, vec![SoundCue::Move, SoundCue::Scale]);
    assert_eq!(evaluated_at, Some(0));
}

#[test]
fn split_ticks_play_identically() {
    let whole = play(&[Duration::from_millis(320)]);
    let split = play(&[Duration::from_millis(16); 20]);

    assert_eq!(whole.0, split.0);
    assert_eq!(whole.1, Some(0));
    assert_eq!(split.1, Some(19), "320ms elapses on the twentieth tick");
}

#[test]
fn undo_cancels_playback_and_requests_evaluation() {
    let (mut world, loaded) = loaded_world();
    let mut playback = Playback::default();
    let mut commands = Vec::new();
    playback.handle(&loaded, &mut commands);
    playback.handle(&move_events(&mut world), &mut commands);
    assert!(playback.is_playing());

    let mut undo = Vec::new();
    world::apply(&mut world, Command::Undo, &mut undo);
    playback.handle(&undo, &mut commands);

    assert!(!playback.is_playing());
    assert_eq!(commands, vec![Command::EvaluateCompletion]);
}

#[test]
fn idle_playback_stays_quiet() {
    let mut playback = Playback::default();
    let mut commands = Vec::new();
    playback.handle(&[tick(Duration::from_millis(16))], &mut commands);
    assert!(commands.is_empty());
    assert!(playback.active().is_none());
}
