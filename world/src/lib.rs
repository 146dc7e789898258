#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Scale Sokoban.

mod board;
mod colliders;
mod completion;
mod history;
mod level;
mod push;
mod registry;
mod triggers;

use log::{debug, info, trace};
use scale_sokoban_core::{
    BatchKind, Command, Direction, Effect, EffectBatch, ElementKind, Event, LevelGrid, LevelMode,
    SoundCue, BIG_SUB_STEPS,
};

use crate::{board::Board, history::History};

pub use level::Level;

/// Represents the authoritative Scale Sokoban world state.
#[derive(Debug)]
pub struct World {
    board: Board,
    history: History,
    mode: LevelMode,
    source: Option<LevelGrid>,
    complete: bool,
}

impl World {
    /// Creates an empty world; a level must be loaded before play.
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: Board::default(),
            history: History::default(),
            mode: LevelMode::Interactive,
            source: None,
            complete: false,
        }
    }

    fn load(&mut self, grid: LevelGrid, mode: LevelMode, out_events: &mut Vec<Event>) {
        let (level, seeds) = match level::build(&grid) {
            Ok(built) => built,
            Err(reason) => {
                info!("level rejected: {reason}");
                out_events.push(Event::LevelRejected { reason });
                return;
            }
        };

        let columns = level.columns();
        let rows = level.rows();
        self.board = Board::install(level, seeds);
        self.history.clear();
        self.mode = mode;
        self.source = Some(grid);
        self.complete = false;
        debug!("loaded {columns}x{rows} level in {mode:?} mode");
        out_events.push(Event::LevelLoaded {
            mode,
            columns,
            rows,
        });
    }

    fn attempt_move(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        self.history.capture(self.board.capture());
        let mut moved_any = false;

        for player in self.board.elements.ids_of_kind(ElementKind::Player) {
            let Some(start) = self.board.elements.get(player).copied() else {
                continue;
            };
            let sub_steps = if start.big { BIG_SUB_STEPS } else { 1 };

            for _ in 0..sub_steps {
                let Some(current) = self.board.elements.get(player).copied() else {
                    break;
                };
                let moving = match self.board.resolve_push(player, direction, !current.big) {
                    Ok(moving) => moving,
                    Err(reason) => {
                        trace!("push of element {} {direction:?} rejected: {reason}", player.get());
                        break;
                    }
                };

                let effects = self.board.displace(&moving, direction);
                moved_any = true;
                let mut batch = EffectBatch::new(BatchKind::Push, effects);
                if self.mode.plays_movement_sound() {
                    batch.push_sound(SoundCue::Move);
                }
                out_events.push(Event::EffectBatchQueued { batch });

                let mut cascade = Vec::new();
                let affected = triggers::run_cascade(&mut self.board, player, &mut cascade);
                out_events.extend(
                    cascade
                        .into_iter()
                        .map(|batch| Event::EffectBatchQueued { batch }),
                );
                if affected {
                    break;
                }
            }
        }

        if moved_any {
            debug!(
                "move {direction:?} accepted, history depth {}",
                self.history.depth()
            );
        } else {
            self.history.discard_last();
        }
    }

    fn undo(&mut self, out_events: &mut Vec<Event>) {
        let Some(states) = self.history.pop() else {
            return;
        };
        self.board.restore(&states);
        self.complete = false;
        let depth = self.history.depth();
        debug!("undo restored history entry, depth now {depth}");
        out_events.push(Event::HistoryRestored { depth });
    }

    fn evaluate_completion(&mut self, out_events: &mut Vec<Event>) {
        let satisfied = completion::targets_satisfied(&self.board);
        if satisfied && !self.complete {
            info!("level complete");
            out_events.push(Event::EffectBatchQueued {
                batch: EffectBatch::new(
                    BatchKind::Completion,
                    vec![Effect::Sound {
                        cue: SoundCue::Complete,
                    }],
                ),
            });
            out_events.push(Event::LevelCompleted);
        }
        self.complete = satisfied;
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::LoadLevel { grid, mode } => world.load(grid, mode, out_events),
        Command::RestartLevel => {
            if let Some(grid) = world.source.clone() {
                let mode = world.mode;
                world.load(grid, mode, out_events);
            }
        }
        Command::Move { direction } => world.attempt_move(direction, out_events),
        Command::Undo => world.undo(out_events),
        Command::Tick { dt } => out_events.push(Event::TimeAdvanced { dt }),
        Command::EvaluateCompletion => world.evaluate_completion(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use scale_sokoban_core::{
        CellCoord, ColliderView, Direction, ElementId, ElementSnapshot, ElementView, LevelMode,
        PushError,
    };

    use super::{completion, Level, World};

    /// Provides read-only access to the active level geometry.
    #[must_use]
    pub fn level(world: &World) -> &Level {
        &world.board.level
    }

    /// Mode the active level runs in.
    #[must_use]
    pub fn mode(world: &World) -> LevelMode {
        world.mode
    }

    /// Captures a read-only view of every element.
    #[must_use]
    pub fn element_view(world: &World) -> ElementView {
        ElementView::from_snapshots(
            world
                .board
                .elements
                .iter()
                .map(|element| element.snapshot())
                .collect(),
        )
    }

    /// Exposes a read-only view of the collider overlay.
    #[must_use]
    pub fn collider_view(world: &World) -> ColliderView<'_> {
        let (columns, rows) = world.board.colliders.dimensions();
        ColliderView::new(world.board.colliders.cells(), columns, rows)
    }

    /// Snapshot of the element covering the provided cell, if any.
    #[must_use]
    pub fn element_at(world: &World, cell: CellCoord) -> Option<ElementSnapshot> {
        let id = world.board.colliders.lookup(cell)?;
        world.board.elements.get(id).map(|element| element.snapshot())
    }

    /// Number of undoable moves.
    #[must_use]
    pub fn history_depth(world: &World) -> usize {
        world.history.depth()
    }

    /// Whether the completion evaluator last succeeded.
    #[must_use]
    pub fn is_complete(world: &World) -> bool {
        world.complete
    }

    /// Evaluates the targets against the current state without raising signals.
    #[must_use]
    pub fn targets_satisfied(world: &World) -> bool {
        completion::targets_satisfied(&world.board)
    }

    /// Computes the set of elements a push of `element` would move.
    pub fn resolve_push(
        world: &World,
        element: ElementId,
        direction: Direction,
        limit_push_power: bool,
    ) -> Result<Vec<ElementId>, PushError> {
        world
            .board
            .resolve_push(element, direction, limit_push_power)
    }

    /// Reports whether the collider overlay matches every element's footprint.
    ///
    /// Each footprint cell inside the grid must map to its element and no
    /// other cell may map to it.
    #[must_use]
    pub fn colliders_consistent(world: &World) -> bool {
        let board = &world.board;
        let footprints_registered = board.elements.iter().all(|element| {
            element
                .footprint()
                .flatten()
                .filter(|cell| board.level.contains(*cell))
                .all(|cell| board.colliders.lookup(cell) == Some(element.id))
        });
        let expected: usize = board
            .elements
            .iter()
            .map(|element| {
                element
                    .footprint()
                    .flatten()
                    .filter(|cell| board.level.contains(*cell))
                    .count()
            })
            .sum();
        let registered = board.colliders.cells().iter().flatten().count();
        footprints_registered && expected == registered
    }
}
