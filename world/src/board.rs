//! Live play field: level geometry, element registry and collider overlay.

use log::warn;
use scale_sokoban_core::{CellCoord, ElementId};

use crate::{
    colliders::ColliderIndex,
    level::Level,
    registry::{footprint, ElementRegistry, ElementSeed, ElementState},
};

/// Everything that must stay consistent while elements move.
///
/// Every mutation follows remove-collider, mutate, place-collider so that
/// each covered cell maps back to exactly one element at all times.
#[derive(Clone, Debug, Default)]
pub(crate) struct Board {
    pub(crate) level: Level,
    pub(crate) elements: ElementRegistry,
    pub(crate) colliders: ColliderIndex,
}

impl Board {
    /// Builds a board, dropping seeds whose footprint overlaps an earlier element.
    pub(crate) fn install(level: Level, seeds: Vec<ElementSeed>) -> Self {
        let mut board = Self {
            colliders: ColliderIndex::new(level.columns(), level.rows()),
            elements: ElementRegistry::default(),
            level,
        };

        for seed in seeds {
            let overlapping = footprint(seed.anchor, seed.big)
                .flatten()
                .any(|cell| board.colliders.lookup(cell).is_some());
            if overlapping {
                warn!(
                    "dropping {:?} at ({}, {}): footprint overlaps another element",
                    seed.kind,
                    seed.anchor.column(),
                    seed.anchor.row()
                );
                continue;
            }
            let element = board.elements.spawn(seed);
            board.colliders.place(&element);
        }

        board
    }

    /// Changes an element's size in place around its anchor.
    pub(crate) fn resize(&mut self, id: ElementId, big: bool) {
        let Some(element) = self.elements.get_mut(id) else {
            return;
        };
        self.colliders.remove(element);
        element.big = big;
        self.colliders.place(element);
    }

    /// Captures the mutable state of every element.
    pub(crate) fn capture(&self) -> Vec<ElementState> {
        self.elements.states()
    }

    /// Snaps every listed element back to the captured state and rebuilds the overlay.
    pub(crate) fn restore(&mut self, states: &[ElementState]) {
        self.colliders.clear();
        for state in states {
            if let Some(element) = self.elements.get_mut(state.id) {
                element.anchor = state.anchor;
                element.big = state.big;
            }
        }
        for element in self.elements.iter() {
            self.colliders.place(element);
        }
    }

    /// Whether `id` could cover the footprint at `anchor` without meeting a
    /// wall, the grid edge or another element.
    pub(crate) fn footprint_clear_for(&self, id: ElementId, anchor: CellCoord, big: bool) -> bool {
        footprint(anchor, big).all(|cell| {
            cell.map_or(false, |cell| {
                self.level.is_open(cell)
                    && self
                        .colliders
                        .lookup(cell)
                        .map_or(true, |occupant| occupant == id)
            })
        })
    }
}
