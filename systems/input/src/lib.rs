#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input system that gates adapter-provided frame input into commands.

use scale_sokoban_core::{Command, Direction, Event, LevelMode};

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Direction requested on this frame, if any.
    pub direction: Option<Direction>,
    /// Indicates whether the player requested an undo on this frame.
    pub undo: bool,
    /// Indicates whether the player requested a level restart on this frame.
    pub restart: bool,
    /// Toggles the pause overlay.
    pub pause_toggle: bool,
    /// Closes the level intro if one is showing.
    pub dismiss_intro: bool,
}

impl FrameInput {
    /// Input carrying only a directional request.
    #[must_use]
    pub const fn direction(direction: Direction) -> Self {
        Self {
            direction: Some(direction),
            undo: false,
            restart: false,
            pause_toggle: false,
            dismiss_intro: false,
        }
    }

    /// Input carrying only an undo request.
    #[must_use]
    pub const fn undo() -> Self {
        Self {
            direction: None,
            undo: true,
            restart: false,
            pause_toggle: false,
            dismiss_intro: false,
        }
    }
}

/// Configuration parameters required to construct the input system.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Config {
    intro_on_load: bool,
}

impl Config {
    /// Creates a new configuration; `intro_on_load` opens a modal intro for
    /// every interactive level until it is dismissed.
    #[must_use]
    pub const fn new(intro_on_load: bool) -> Self {
        Self { intro_on_load }
    }
}

/// Input system that forwards at most one directional command per idle frame.
#[derive(Clone, Debug)]
pub struct Input {
    config: Config,
    mode: Option<LevelMode>,
    paused: bool,
    intro_open: bool,
    complete: bool,
}

impl Input {
    /// Creates a new input system using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            mode: None,
            paused: false,
            intro_open: false,
            complete: false,
        }
    }

    /// Consumes world events and frame input to emit player commands.
    ///
    /// `playback_busy` must reflect whether effect batches are still playing;
    /// directional input is dropped while they are.
    pub fn handle(
        &mut self,
        events: &[Event],
        input: FrameInput,
        playback_busy: bool,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::LevelLoaded { mode, .. } => {
                    self.mode = Some(*mode);
                    self.intro_open = self.config.intro_on_load && *mode == LevelMode::Interactive;
                    self.complete = false;
                }
                Event::HistoryRestored { .. } => self.complete = false,
                Event::LevelCompleted => self.complete = true,
                _ => {}
            }
        }

        if input.pause_toggle {
            self.paused = !self.paused;
        }
        if input.dismiss_intro {
            self.intro_open = false;
        }
        if self.is_blocked() {
            return;
        }

        if input.restart {
            out.push(Command::RestartLevel);
            return;
        }
        if input.undo {
            out.push(Command::Undo);
            return;
        }
        if self.complete || playback_busy {
            return;
        }
        if let Some(direction) = input.direction {
            out.push(Command::Move { direction });
        }
    }

    /// Reports whether the pause overlay is active.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Reports whether the level intro is still showing.
    #[must_use]
    pub const fn intro_open(&self) -> bool {
        self.intro_open
    }

    /// Player input is ignored while paused, during the intro, and outside
    /// interactive levels.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.paused || self.intro_open || self.mode != Some(LevelMode::Interactive)
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
