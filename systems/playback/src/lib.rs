#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Effect playback system that times queued batches and gates completion checks.

use std::{collections::VecDeque, time::Duration};

use scale_sokoban_core::{BatchKind, Command, Effect, EffectBatch, Event, SoundCue};

/// Configuration parameters required to construct the playback system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    move_duration: Duration,
    scale_duration: Duration,
}

impl Config {
    /// Creates a new configuration from per-effect animation durations.
    #[must_use]
    pub const fn new(move_duration: Duration, scale_duration: Duration) -> Self {
        Self {
            move_duration,
            scale_duration,
        }
    }

    /// Time a single move effect takes to play.
    #[must_use]
    pub const fn move_duration(&self) -> Duration {
        self.move_duration
    }

    /// Time a single scale effect takes to play.
    #[must_use]
    pub const fn scale_duration(&self) -> Duration {
        self.scale_duration
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Duration::from_millis(120), Duration::from_millis(200))
    }
}

/// Batch currently being played together with its normalised progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveBatch<'a> {
    /// Batch at the front of the queue.
    pub batch: &'a EffectBatch,
    /// Fraction of the batch already played, in `[0, 1]`.
    pub progress: f32,
}

/// Pure system that plays effect batches strictly one after another.
#[derive(Debug)]
pub struct Playback {
    config: Config,
    queue: VecDeque<EffectBatch>,
    elapsed: Duration,
    awaiting_evaluation: bool,
    started_cues: Vec<SoundCue>,
}

impl Playback {
    /// Creates a new playback system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            queue: VecDeque::new(),
            elapsed: Duration::ZERO,
            awaiting_evaluation: false,
            started_cues: Vec::new(),
        }
    }

    /// Consumes world events, advances playback and emits completion checks.
    ///
    /// `Command::EvaluateCompletion` is emitted once the queue drains after
    /// state-changing batches were played, or after an undo.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        self.started_cues.clear();

        for event in events {
            match event {
                Event::LevelLoaded { .. } => {
                    self.reset();
                    self.awaiting_evaluation = false;
                }
                Event::HistoryRestored { .. } => {
                    self.reset();
                    self.awaiting_evaluation = true;
                }
                Event::EffectBatchQueued { batch } => self.enqueue(batch.clone()),
                Event::TimeAdvanced { dt } => self.advance(*dt),
                _ => {}
            }
        }

        // Sound-only batches take no time and never hold the queue.
        self.advance(Duration::ZERO);

        if self.queue.is_empty() && self.awaiting_evaluation {
            self.awaiting_evaluation = false;
            out.push(Command::EvaluateCompletion);
        }
    }

    /// Reports whether any batch is queued or playing.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Number of batches waiting, including the one playing.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Batch at the front of the queue and how far it has played.
    #[must_use]
    pub fn active(&self) -> Option<ActiveBatch<'_>> {
        let batch = self.queue.front()?;
        let duration = self.batch_duration(batch);
        let progress = if duration.is_zero() {
            1.0
        } else {
            (self.elapsed.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
        };
        Some(ActiveBatch { batch, progress })
    }

    /// Sound cues of every batch that started during the last `handle` call.
    #[must_use]
    pub fn started_cues(&self) -> &[SoundCue] {
        &self.started_cues
    }

    /// Total time the batch needs; its effects play in parallel.
    #[must_use]
    pub fn batch_duration(&self, batch: &EffectBatch) -> Duration {
        batch
            .effects()
            .iter()
            .map(|effect| match effect {
                Effect::Move { .. } => self.config.move_duration,
                Effect::Scale { .. } => self.config.scale_duration,
                Effect::Sound { .. } => Duration::ZERO,
            })
            .max()
            .unwrap_or(Duration::ZERO)
    }

    fn reset(&mut self) {
        self.queue.clear();
        self.elapsed = Duration::ZERO;
    }

    fn enqueue(&mut self, batch: EffectBatch) {
        if batch.kind() != BatchKind::Completion {
            self.awaiting_evaluation = true;
        }
        if self.queue.is_empty() {
            self.record_start(&batch);
        }
        self.queue.push_back(batch);
    }

    fn advance(&mut self, dt: Duration) {
        let mut budget = dt;
        while let Some(front) = self.queue.front() {
            let remaining = self.batch_duration(front).saturating_sub(self.elapsed);
            if budget < remaining {
                self.elapsed += budget;
                return;
            }

            budget -= remaining;
            self.elapsed = Duration::ZERO;
            let _ = self.queue.pop_front();
            if let Some(next) = self.queue.front().cloned() {
                self.record_start(&next);
            }
        }
    }

    fn record_start(&mut self, batch: &EffectBatch) {
        self.started_cues
            .extend(batch.effects().iter().filter_map(|effect| match effect {
                Effect::Sound { cue } => Some(*cue),
                _ => None,
            }));
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
