#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Facade that drives the Scale Sokoban world and its systems frame by frame.
//!
//! The engine owns the authoritative [`World`] together with the playback,
//! input and demo systems and pumps commands between them until no system
//! has anything left to say.

use std::time::Duration;

use log::{debug, info};
use scale_sokoban_core::{
    Command, Direction, ElementView, Event, LevelError, LevelGrid, LevelMode, SoundCue,
};
use scale_sokoban_system_demo::{self as demo, Demo};
use scale_sokoban_system_input::{self as input, FrameInput, Input};
use scale_sokoban_system_playback::{self as playback, Playback};
use scale_sokoban_world::{self as world, query, World};

/// Aggregated configuration for every system the engine drives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    /// Animation timing used to play effect batches.
    pub playback: playback::Config,
    /// Input gating options.
    pub input: input::Config,
    /// Scripted demo driver settings.
    pub demo: demo::Config,
}

/// Single-threaded puzzle engine advanced by explicit calls.
#[derive(Debug)]
pub struct Engine {
    world: World,
    playback: Playback,
    input: Input,
    demo: Demo,
    completion_signal: bool,
    started_cues: Vec<SoundCue>,
}

impl Engine {
    /// Creates an engine without a loaded level.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            world: World::new(),
            playback: Playback::new(config.playback),
            input: Input::new(config.input),
            demo: Demo::new(config.demo),
            completion_signal: false,
            started_cues: Vec::new(),
        }
    }

    /// Loads a level, resetting history and pending effects.
    ///
    /// A rejected level leaves the previously loaded one in place.
    pub fn load_level(&mut self, grid: LevelGrid, mode: LevelMode) -> Result<(), LevelError> {
        let events = self.execute(Command::LoadLevel { grid, mode });
        for event in &events {
            if let Event::LevelRejected { reason } = event {
                return Err(*reason);
            }
        }
        info!("level ready in {mode:?} mode");
        Ok(())
    }

    /// Reloads the active level from its source grid.
    pub fn restart(&mut self) {
        let _ = self.execute(Command::RestartLevel);
    }

    /// Attempts one discrete move of every player.
    ///
    /// The move is applied immediately; its effects queue behind any batches
    /// still playing.
    pub fn attempt_move(&mut self, direction: Direction) {
        let _ = self.execute(Command::Move { direction });
    }

    /// Snaps back to the state before the last displacing move.
    pub fn undo(&mut self) {
        let _ = self.execute(Command::Undo);
    }

    /// Advances playback by `elapsed` and feeds the frame's input through the
    /// gating systems.
    ///
    /// Returns whether an effect batch is still playing afterwards.
    pub fn tick(&mut self, elapsed: Duration, frame_input: FrameInput) -> bool {
        self.started_cues.clear();
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt: elapsed }, &mut events);
        self.pump(events, Some(frame_input));
        self.playback.is_playing()
    }

    /// Whether the completion evaluator last succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        query::is_complete(&self.world)
    }

    /// Returns `true` once per completion, clearing the signal.
    pub fn take_level_complete(&mut self) -> bool {
        std::mem::take(&mut self.completion_signal)
    }

    /// Sound cues of the batches that started since the last `tick`.
    #[must_use]
    pub fn started_cues(&self) -> &[SoundCue] {
        &self.started_cues
    }

    /// Current element positions and sizes.
    #[must_use]
    pub fn element_view(&self) -> ElementView {
        query::element_view(&self.world)
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Read-only access to effect playback.
    #[must_use]
    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    /// Read-only access to the demo driver.
    #[must_use]
    pub fn demo(&self) -> &Demo {
        &self.demo
    }

    /// Read-only access to input gating state.
    #[must_use]
    pub fn input(&self) -> &Input {
        &self.input
    }

    fn execute(&mut self, command: Command) -> Vec<Event> {
        self.started_cues.clear();
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        self.pump(events.clone(), None);
        events
    }

    /// Routes events through every system and applies the commands they
    /// answer with until a round produces no commands.
    ///
    /// Frame input is held back until the world has settled so a completion
    /// check always runs before the next move.
    fn pump(&mut self, mut events: Vec<Event>, mut frame_input: Option<FrameInput>) {
        loop {
            for event in &events {
                match event {
                    Event::LevelCompleted => self.completion_signal = true,
                    Event::LevelLoaded { .. } | Event::HistoryRestored { .. } => {
                        self.completion_signal = false;
                    }
                    _ => {}
                }
            }

            let mut commands = Vec::new();
            self.playback.handle(&events, &mut commands);
            self.started_cues
                .extend_from_slice(self.playback.started_cues());

            let busy = self.playback.is_playing();
            self.demo.handle(&events, busy, &mut commands);

            let input = if commands.is_empty() {
                frame_input.take().unwrap_or_default()
            } else {
                FrameInput::default()
            };
            self.input.handle(&events, input, busy, &mut commands);

            if commands.is_empty() {
                break;
            }

            events.clear();
            for command in commands {
                debug!("engine applying {command:?}");
                world::apply(&mut self.world, command, &mut events);
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
