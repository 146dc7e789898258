//! Immutable per-level geometry derived from the loader's symbol grid.

use log::warn;
use scale_sokoban_core::{CellCoord, ElementKind, LevelError, LevelGrid, Symbol, Target};

use crate::registry::{footprint, ElementSeed};

/// Static geometry of the active level: walls, trigger tiles and targets.
#[derive(Clone, Debug, Default)]
pub struct Level {
    columns: u32,
    rows: u32,
    walls: Vec<bool>,
    grow_cells: Vec<CellCoord>,
    shrink_cells: Vec<CellCoord>,
    targets: Vec<Target>,
}

impl Level {
    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Reports whether the cell is a wall. Cells outside the grid are not walls.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.walls.get(index).copied())
            .unwrap_or(false)
    }

    /// Grow tiles in row-major order.
    #[must_use]
    pub fn grow_cells(&self) -> &[CellCoord] {
        &self.grow_cells
    }

    /// Shrink tiles in row-major order.
    #[must_use]
    pub fn shrink_cells(&self) -> &[CellCoord] {
        &self.shrink_cells
    }

    /// Targets defining the win condition.
    #[must_use]
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Whether the cell is inside the grid and not a wall.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord) -> bool {
        self.contains(cell) && !self.is_wall(cell)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }

    fn mark_wall(&mut self, cell: CellCoord) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.walls.get_mut(index) {
                *slot = true;
            }
        }
    }
}

/// Validates the grid and splits it into static geometry and element seeds.
pub(crate) fn build(grid: &LevelGrid) -> Result<(Level, Vec<ElementSeed>), LevelError> {
    let (columns, rows) = validate(grid)?;
    let cell_count = usize::try_from(u64::from(columns) * u64::from(rows))
        .map_err(|_| LevelError::TooLarge)?;

    let mut level = Level {
        columns,
        rows,
        walls: vec![false; cell_count],
        ..Level::default()
    };
    let mut seeds = Vec::new();

    for (row, symbols) in (0u32..).zip(grid.rows()) {
        for (column, symbol) in (0u32..).zip(symbols) {
            let cell = CellCoord::new(column, row);
            match *symbol {
                Symbol::Ground => {}
                Symbol::Wall3x3 => {
                    for covered in footprint(cell, true).flatten() {
                        level.mark_wall(covered);
                    }
                }
                Symbol::Wall1x1 => level.mark_wall(cell),
                Symbol::Grow => level.grow_cells.push(cell),
                Symbol::Shrink => level.shrink_cells.push(cell),
                Symbol::TargetBig => level.targets.push(Target::new(cell, true)),
                Symbol::TargetSmall => level.targets.push(Target::new(cell, false)),
                Symbol::PlayerBig => seeds.push(seed(ElementKind::Player, cell, true)),
                Symbol::PlayerSmall => seeds.push(seed(ElementKind::Player, cell, false)),
                Symbol::BoxBig => seeds.push(seed(ElementKind::Box, cell, true)),
                Symbol::BoxSmall => seeds.push(seed(ElementKind::Box, cell, false)),
                Symbol::Unrecognized(glyph) => {
                    warn!("unrecognized level symbol {glyph:?} at ({column}, {row}) treated as ground");
                }
            }
        }
    }

    Ok((level, seeds))
}

fn validate(grid: &LevelGrid) -> Result<(u32, u32), LevelError> {
    let rows = grid.rows();
    let first = rows.first().ok_or(LevelError::Empty)?;
    let expected = first.len();
    if expected == 0 {
        return Err(LevelError::ZeroWidth);
    }

    if let Some((row, found)) = rows
        .iter()
        .map(Vec::len)
        .enumerate()
        .find(|(_, found)| *found != expected)
    {
        return Err(LevelError::RaggedRow {
            row,
            expected,
            found,
        });
    }

    let columns = u32::try_from(expected).map_err(|_| LevelError::TooLarge)?;
    let row_count = u32::try_from(rows.len()).map_err(|_| LevelError::TooLarge)?;
    Ok((columns, row_count))
}

const fn seed(kind: ElementKind, anchor: CellCoord, big: bool) -> ElementSeed {
    ElementSeed { kind, anchor, big }
}
