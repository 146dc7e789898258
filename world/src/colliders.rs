//! Dense collider overlay mapping every covered cell back to its element.

use scale_sokoban_core::{CellCoord, ElementId};

use crate::registry::Element;

/// One slot per cell, row-major, holding the element covering it.
#[derive(Clone, Debug, Default)]
pub(crate) struct ColliderIndex {
    columns: u32,
    rows: u32,
    cells: Vec<Option<ElementId>>,
}

impl ColliderIndex {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![None; capacity],
        }
    }

    /// Registers the element's current footprint.
    ///
    /// The caller removes any previous registration first; cells outside the
    /// grid are skipped.
    pub(crate) fn place(&mut self, element: &Element) {
        for cell in element.footprint().flatten() {
            if let Some(index) = self.index(cell) {
                if let Some(slot) = self.cells.get_mut(index) {
                    debug_assert!(
                        slot.map_or(true, |occupant| occupant == element.id),
                        "collider at ({}, {}) already belongs to another element",
                        cell.column(),
                        cell.row()
                    );
                    *slot = Some(element.id);
                }
            }
        }
    }

    /// Clears every footprint cell that still points at the element.
    pub(crate) fn remove(&mut self, element: &Element) {
        for cell in element.footprint().flatten() {
            if let Some(index) = self.index(cell) {
                if let Some(slot) = self.cells.get_mut(index) {
                    if *slot == Some(element.id) {
                        *slot = None;
                    }
                }
            }
        }
    }

    pub(crate) fn lookup(&self, cell: CellCoord) -> Option<ElementId> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    pub(crate) fn clear(&mut self) {
        self.cells.fill(None);
    }

    pub(crate) fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }

    pub(crate) fn cells(&self) -> &[Option<ElementId>] {
        &self.cells
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }
}
