#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Demo driver that replays a scripted direction list on passive levels.

use std::time::Duration;

use scale_sokoban_core::{Command, Direction, Event, LevelMode};

/// Configuration parameters required to construct the demo system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    step_interval: Duration,
    script: Vec<Direction>,
    repeat: bool,
}

impl Config {
    /// Creates a new configuration using the provided cadence and script.
    ///
    /// When `repeat` is set the level restarts after the last scripted step
    /// and the script plays again.
    #[must_use]
    pub fn new(step_interval: Duration, script: Vec<Direction>, repeat: bool) -> Self {
        Self {
            step_interval,
            script,
            repeat,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_millis(400), Vec::new(), true)
    }
}

/// Pure system that emits scripted moves while a demo level is loaded.
#[derive(Debug)]
pub struct Demo {
    config: Config,
    accumulator: Duration,
    cursor: usize,
    active: bool,
}

impl Demo {
    /// Creates a new demo system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            accumulator: Duration::ZERO,
            cursor: 0,
            active: false,
        }
    }

    /// Consumes world events and emits at most one scripted command.
    ///
    /// Steps are only taken on frames that advance time, and leftover time is
    /// clamped to one interval. Pacing therefore depends on how time is split
    /// into frames: one long frame yields a single step where several short
    /// ones covering the same span yield one step each. Batch playback does
    /// not share this property.
    pub fn handle(&mut self, events: &[Event], playback_busy: bool, out: &mut Vec<Command>) {
        let mut frame = false;
        for event in events {
            match event {
                Event::LevelLoaded { mode, .. } => {
                    self.active = *mode == LevelMode::Demo && !self.config.script.is_empty();
                    self.accumulator = Duration::ZERO;
                    self.cursor = 0;
                }
                Event::TimeAdvanced { dt } if self.active => {
                    self.accumulator = self.accumulator.saturating_add(*dt);
                    frame = true;
                }
                _ => {}
            }
        }

        if !frame
            || playback_busy
            || self.config.script.is_empty()
            || self.config.step_interval.is_zero()
            || self.accumulator < self.config.step_interval
        {
            return;
        }

        self.accumulator -= self.config.step_interval;
        self.accumulator = self.accumulator.min(self.config.step_interval);

        if let Some(direction) = self.config.script.get(self.cursor).copied() {
            self.cursor += 1;
            out.push(Command::Move { direction });
        } else if self.config.repeat {
            out.push(Command::RestartLevel);
        } else {
            self.active = false;
        }
    }

    /// Index of the next scripted step.
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Reports whether a demo level is being driven.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}

impl Default for Demo {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_is_clamped_after_long_stall() {
        let mut demo = Demo::new(Config::new(
            Duration::from_millis(100),
            vec![Direction::East; 4],
            false,
        ));
        let mut commands = Vec::new();
        demo.handle(
            &[
                Event::LevelLoaded {
                    mode: LevelMode::Demo,
                    columns: 3,
                    rows: 3,
                },
                Event::TimeAdvanced {
                    dt: Duration::from_secs(5),
                },
            ],
            false,
            &mut commands,
        );
        assert_eq!(commands.len(), 1);
        assert_eq!(demo.accumulator, Duration::from_millis(100));
    }
}
