#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Scale Sokoban engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of unit sub-steps a big player performs for a single directional input.
pub const BIG_SUB_STEPS: usize = 3;

/// Describes how a level is being played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelMode {
    /// The player drives the level through adapter input.
    Interactive,
    /// Passive playback driven by a scripted timer; movement is silent.
    Demo,
}

impl LevelMode {
    /// Reports whether accepted pushes should carry a movement sound cue.
    #[must_use]
    pub const fn plays_movement_sound(self) -> bool {
        matches!(self, Self::Interactive)
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the current level with the provided symbolic grid.
    LoadLevel {
        /// Parsed grid produced by the level loader.
        grid: LevelGrid,
        /// Mode the level should run in.
        mode: LevelMode,
    },
    /// Reloads the most recently accepted level in its original mode.
    RestartLevel,
    /// Attempts to move every player one discrete step in the given direction.
    Move {
        /// Direction of the attempted step.
        direction: Direction,
    },
    /// Restores the element state captured before the last displacing move.
    Undo,
    /// Advances presentation time by the provided delta.
    Tick {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the world evaluate the win condition.
    EvaluateCompletion,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a level was (re)initialized.
    LevelLoaded {
        /// Mode the level runs in.
        mode: LevelMode,
        /// Number of columns in the level grid.
        columns: u32,
        /// Number of rows in the level grid.
        rows: u32,
    },
    /// Reports that a level grid was refused; the previous level remains active.
    LevelRejected {
        /// Specific reason the grid was refused.
        reason: LevelError,
    },
    /// Indicates that presentation time advanced.
    TimeAdvanced {
        /// Duration of time that elapsed in the tick.
        dt: Duration,
    },
    /// Publishes a fully computed batch of presentation effects.
    EffectBatchQueued {
        /// Batch appended to the effect stream.
        batch: EffectBatch,
    },
    /// Announces that an undo snapped the elements back to an earlier state.
    HistoryRestored {
        /// Number of history entries that remain after the restore.
        depth: usize,
    },
    /// One-shot signal raised when every target became satisfied.
    LevelCompleted,
}

/// Cardinal directions available to pushes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Unit offset expressed as `(column delta, row delta)`.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    /// Direction rotated a quarter turn clockwise.
    #[must_use]
    pub const fn rotate_clockwise(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// Converts a unit vector on one axis into a direction.
    ///
    /// Returns `None` for the zero vector, diagonals and non-unit lengths.
    #[must_use]
    pub const fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Self::North),
            (1, 0) => Some(Self::East),
            (0, 1) => Some(Self::South),
            (-1, 0) => Some(Self::West),
            _ => None,
        }
    }
}

/// Stable identifier assigned to an element when its level is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(u32);

impl ElementId {
    /// Creates a new element identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Kinds of movable elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// Element driven by directional input.
    Player,
    /// Element that can only move by being pushed.
    Box,
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Cell displaced by the provided offset, or `None` when it would leave
    /// the non-negative quadrant.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        let column = self.column.checked_add_signed(dx)?;
        let row = self.row.checked_add_signed(dy)?;
        Some(Self::new(column, row))
    }

    /// Neighboring cell one unit away in the provided direction.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }
}

/// Cell that must hold a box of a particular size for the level to complete.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    cell: CellCoord,
    big: bool,
}

impl Target {
    /// Creates a target at the provided cell requiring the given box size.
    #[must_use]
    pub const fn new(cell: CellCoord, big: bool) -> Self {
        Self { cell, big }
    }

    /// Cell the satisfying box must be anchored on.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Whether the satisfying box must be big.
    #[must_use]
    pub const fn big(&self) -> bool {
        self.big
    }
}

/// Symbolic cell content produced by the level loader.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// Plain floor.
    Ground,
    /// Wall covering the 3×3 block centered on the cell, clipped to the grid.
    Wall3x3,
    /// Wall covering only this cell.
    Wall1x1,
    /// Tile that grows a small element anchored on it.
    Grow,
    /// Tile that shrinks a big element anchored on it.
    Shrink,
    /// Target requiring a big box.
    TargetBig,
    /// Target requiring a small box.
    TargetSmall,
    /// Big player anchored on the cell.
    PlayerBig,
    /// Small player on the cell.
    PlayerSmall,
    /// Big box anchored on the cell.
    BoxBig,
    /// Small box on the cell.
    BoxSmall,
    /// Glyph the loader did not understand; played as ground.
    Unrecognized(char),
}

impl Symbol {
    /// Maps a text level glyph onto its symbol.
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Self {
        match glyph {
            '.' | ' ' => Self::Ground,
            '#' => Self::Wall3x3,
            '*' => Self::Wall1x1,
            '+' => Self::Grow,
            '-' => Self::Shrink,
            'T' => Self::TargetBig,
            't' => Self::TargetSmall,
            'P' => Self::PlayerBig,
            'p' => Self::PlayerSmall,
            'B' => Self::BoxBig,
            'b' => Self::BoxSmall,
            other => Self::Unrecognized(other),
        }
    }

    /// Glyph used to write the symbol back into the text level format.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Ground => '.',
            Self::Wall3x3 => '#',
            Self::Wall1x1 => '*',
            Self::Grow => '+',
            Self::Shrink => '-',
            Self::TargetBig => 'T',
            Self::TargetSmall => 't',
            Self::PlayerBig => 'P',
            Self::PlayerSmall => 'p',
            Self::BoxBig => 'B',
            Self::BoxSmall => 'b',
            Self::Unrecognized(glyph) => glyph,
        }
    }
}

/// Row-major grid of symbols handed to the world when a level loads.
///
/// The grid is stored as given; geometry validation (empty or ragged rows)
/// happens when the world loads it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelGrid {
    rows: Vec<Vec<Symbol>>,
}

impl LevelGrid {
    /// Wraps already parsed rows.
    #[must_use]
    pub fn from_rows(rows: Vec<Vec<Symbol>>) -> Self {
        Self { rows }
    }

    /// Parses the text level format, one line per row.
    ///
    /// Blank lines are skipped and trailing carriage returns are ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let rows = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(|line| line.chars().map(Symbol::from_glyph).collect())
            .collect();
        Self { rows }
    }

    /// Rows of the grid from top to bottom.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Symbol>] {
        &self.rows
    }
}

/// Reasons a level grid may be refused by the world.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelError {
    /// The grid contained no rows.
    #[error("level grid has no rows")]
    Empty,
    /// The first row contained no cells.
    #[error("level grid has zero width")]
    ZeroWidth,
    /// A row's length differs from the first row's length.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Width established by the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A dimension does not fit the engine's cell coordinates.
    #[error("level grid exceeds the supported dimensions")]
    TooLarge,
}

/// Reasons a push cannot be carried out.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PushError {
    /// Some element would leave the grid.
    #[error("push would leave the grid")]
    OutOfBounds,
    /// Some element would overlap a wall.
    #[error("push blocked by wall at ({}, {})", .cell.column(), .cell.row())]
    Wall {
        /// Wall cell that blocked the push.
        cell: CellCoord,
    },
    /// A small pusher met a big element.
    #[error("element {} at ({}, {}) is too heavy to push", .element.get(), .cell.column(), .cell.row())]
    TooHeavy {
        /// Cell where the heavy element was met.
        cell: CellCoord,
        /// Element that could not be pushed.
        element: ElementId,
    },
}

/// Audio cues emitted alongside visual effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    /// Played when the player pushes.
    Move,
    /// Played when an element grows or shrinks.
    Scale,
    /// Played when the level becomes complete.
    Complete,
}

/// Single presentation-facing change descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// An element's anchor moved one cell.
    Move {
        /// Element that moved.
        element: ElementId,
        /// Anchor before the move.
        from: CellCoord,
        /// Anchor after the move.
        to: CellCoord,
    },
    /// An element changed size; bigness runs from 0.0 (small) to 1.0 (big).
    Scale {
        /// Element that changed size.
        element: ElementId,
        /// Bigness before the change.
        from: f32,
        /// Bigness after the change.
        to: f32,
    },
    /// An audio cue to play when the batch starts.
    Sound {
        /// Cue to play.
        cue: SoundCue,
    },
}

impl Effect {
    /// Bigness value of a small element.
    pub const SMALL: f32 = 0.0;
    /// Bigness value of a big element.
    pub const BIG: f32 = 1.0;

    /// Scale effect for an element becoming big.
    #[must_use]
    pub const fn grow(element: ElementId) -> Self {
        Self::Scale {
            element,
            from: Self::SMALL,
            to: Self::BIG,
        }
    }

    /// Scale effect for an element becoming small.
    #[must_use]
    pub const fn shrink(element: ElementId) -> Self {
        Self::Scale {
            element,
            from: Self::BIG,
            to: Self::SMALL,
        }
    }
}

/// Logical event a batch represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchKind {
    /// One push sub-step of the player.
    Push,
    /// One trigger firing, including any neighbor displacement it caused.
    Trigger,
    /// Level completion fanfare.
    Completion,
}

/// Atomic, ordered group of effects for one logical engine event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectBatch {
    kind: BatchKind,
    effects: Vec<Effect>,
}

impl EffectBatch {
    /// Creates a batch from its effects.
    #[must_use]
    pub fn new(kind: BatchKind, effects: Vec<Effect>) -> Self {
        Self { kind, effects }
    }

    /// Logical event the batch represents.
    #[must_use]
    pub const fn kind(&self) -> BatchKind {
        self.kind
    }

    /// Effects in emission order.
    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Appends a sound cue to the batch.
    pub fn push_sound(&mut self, cue: SoundCue) {
        self.effects.push(Effect::Sound { cue });
    }

    /// Number of [`Effect::Move`] entries in the batch.
    #[must_use]
    pub fn move_count(&self) -> usize {
        self.effects
            .iter()
            .filter(|effect| matches!(effect, Effect::Move { .. }))
            .count()
    }

    /// Whether the batch contains a [`Effect::Scale`] entry.
    #[must_use]
    pub fn has_scale(&self) -> bool {
        self.effects
            .iter()
            .any(|effect| matches!(effect, Effect::Scale { .. }))
    }
}

/// Immutable representation of a single element's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Stable identifier of the element.
    pub id: ElementId,
    /// Kind of the element.
    pub kind: ElementKind,
    /// Anchor cell; the center of the footprint when big.
    pub anchor: CellCoord,
    /// Whether the element currently covers a 3×3 footprint.
    pub big: bool,
}

/// Read-only snapshot describing all elements of the level.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementView {
    snapshots: Vec<ElementSnapshot>,
}

impl ElementView {
    /// Creates a new element view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ElementSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &ElementSnapshot> {
        self.snapshots.iter()
    }

    /// Snapshot of the element with the provided identifier.
    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&ElementSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ElementSnapshot> {
        self.snapshots
    }
}

/// Read-only view into the dense collider grid.
#[derive(Clone, Copy, Debug)]
pub struct ColliderView<'a> {
    cells: &'a [Option<ElementId>],
    columns: u32,
    rows: u32,
}

impl<'a> ColliderView<'a> {
    /// Captures a new collider view backed by the provided row-major slice.
    #[must_use]
    pub fn new(cells: &'a [Option<ElementId>], columns: u32, rows: u32) -> Self {
        Self {
            cells,
            columns,
            rows,
        }
    }

    /// Returns the element covering the provided cell, if any.
    #[must_use]
    pub fn occupant(&self, cell: CellCoord) -> Option<ElementId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Returns an iterator over all cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = Option<ElementId>> + 'a {
        self.cells.iter().copied()
    }

    /// Provides the dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BatchKind, CellCoord, ColliderView, Direction, Effect, EffectBatch, ElementId, LevelGrid,
        PushError, Symbol,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn offset_refuses_negative_coordinates() {
        let origin = CellCoord::new(0, 3);
        assert_eq!(origin.offset(-1, 0), None);
        assert_eq!(origin.offset(2, -3), Some(CellCoord::new(2, 0)));
        assert_eq!(origin.step(Direction::West), None);
        assert_eq!(origin.step(Direction::South), Some(CellCoord::new(0, 4)));
    }

    #[test]
    fn from_delta_accepts_only_axis_unit_vectors() {
        for direction in Direction::ALL {
            let (dx, dy) = direction.delta();
            assert_eq!(Direction::from_delta(dx, dy), Some(direction));
        }
        assert_eq!(Direction::from_delta(0, 0), None);
        assert_eq!(Direction::from_delta(1, 1), None);
        assert_eq!(Direction::from_delta(2, 0), None);
    }

    #[test]
    fn rotate_clockwise_is_perpendicular() {
        for direction in Direction::ALL {
            let (dx, dy) = direction.delta();
            let (px, py) = direction.rotate_clockwise().delta();
            assert_eq!(dx * px + dy * py, 0);
        }
    }

    #[test]
    fn parse_maps_glyphs_and_skips_blank_lines() {
        let grid = LevelGrid::parse("#.p\r\n\n+-?\n");
        assert_eq!(
            grid.rows(),
            &[
                vec![Symbol::Wall3x3, Symbol::Ground, Symbol::PlayerSmall],
                vec![Symbol::Grow, Symbol::Shrink, Symbol::Unrecognized('?')],
            ]
        );
    }

    #[test]
    fn glyph_inverts_from_glyph() {
        for glyph in ['.', '#', '*', '+', '-', 'T', 't', 'P', 'p', 'B', 'b', 'x'] {
            assert_eq!(Symbol::from_glyph(glyph).glyph(), glyph);
        }
    }

    #[test]
    fn batch_counts_moves_and_scales() {
        let element = ElementId::new(1);
        let mut batch = EffectBatch::new(
            BatchKind::Trigger,
            vec![
                Effect::Move {
                    element: ElementId::new(2),
                    from: CellCoord::new(1, 1),
                    to: CellCoord::new(2, 1),
                },
                Effect::grow(element),
            ],
        );
        batch.push_sound(super::SoundCue::Scale);
        assert_eq!(batch.move_count(), 1);
        assert!(batch.has_scale());
        assert_eq!(batch.effects().len(), 3);
    }

    #[test]
    fn collider_view_ignores_out_of_range_cells() {
        let cells = [None, Some(ElementId::new(4)), None, None];
        let view = ColliderView::new(&cells, 2, 2);
        assert_eq!(view.occupant(CellCoord::new(1, 0)), Some(ElementId::new(4)));
        assert_eq!(view.occupant(CellCoord::new(2, 0)), None);
        assert_eq!(view.occupant(CellCoord::new(0, 2)), None);
    }

    #[test]
    fn effect_batch_round_trips_through_bincode() {
        let batch = EffectBatch::new(
            BatchKind::Push,
            vec![
                Effect::Move {
                    element: ElementId::new(0),
                    from: CellCoord::new(1, 2),
                    to: CellCoord::new(2, 2),
                },
                Effect::Sound {
                    cue: super::SoundCue::Move,
                },
            ],
        );
        assert_round_trip(&batch);
    }

    #[test]
    fn push_error_round_trips_through_bincode() {
        assert_round_trip(&PushError::TooHeavy {
            cell: CellCoord::new(3, 4),
            element: ElementId::new(9),
        });
    }
}
