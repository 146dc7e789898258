//! Element registry owning the mutable state of every movable element.

use scale_sokoban_core::{CellCoord, ElementId, ElementKind, ElementSnapshot};

const SMALL_OFFSETS: [(i32, i32); 1] = [(0, 0)];
const BIG_OFFSETS: [(i32, i32); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Cells covered by an element anchored at `anchor`.
///
/// Cells that would fall at a negative coordinate are yielded as `None` so
/// callers can decide whether that counts as out of bounds or is skipped.
pub(crate) fn footprint(anchor: CellCoord, big: bool) -> impl Iterator<Item = Option<CellCoord>> {
    let offsets: &'static [(i32, i32)] = if big { &BIG_OFFSETS } else { &SMALL_OFFSETS };
    offsets
        .iter()
        .map(move |&(dx, dy)| anchor.offset(dx, dy))
}

/// Authoritative record of a single element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Element {
    pub(crate) id: ElementId,
    pub(crate) kind: ElementKind,
    pub(crate) anchor: CellCoord,
    pub(crate) big: bool,
}

impl Element {
    pub(crate) fn footprint(&self) -> impl Iterator<Item = Option<CellCoord>> {
        footprint(self.anchor, self.big)
    }

    pub(crate) fn snapshot(&self) -> ElementSnapshot {
        ElementSnapshot {
            id: self.id,
            kind: self.kind,
            anchor: self.anchor,
            big: self.big,
        }
    }

    pub(crate) fn state(&self) -> ElementState {
        ElementState {
            id: self.id,
            anchor: self.anchor,
            big: self.big,
        }
    }
}

/// Mutable portion of an element captured for history and rollback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ElementState {
    pub(crate) id: ElementId,
    pub(crate) anchor: CellCoord,
    pub(crate) big: bool,
}

/// Element data requested by the level before identifiers are assigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ElementSeed {
    pub(crate) kind: ElementKind,
    pub(crate) anchor: CellCoord,
    pub(crate) big: bool,
}

/// Dense registry where an element's identifier is its position.
#[derive(Clone, Debug, Default)]
pub(crate) struct ElementRegistry {
    elements: Vec<Element>,
}

impl ElementRegistry {
    /// Appends a new element, assigning the next identifier.
    pub(crate) fn spawn(&mut self, seed: ElementSeed) -> Element {
        let id = ElementId::new(u32::try_from(self.elements.len()).unwrap_or(u32::MAX));
        let element = Element {
            id,
            kind: seed.kind,
            anchor: seed.anchor,
            big: seed.big,
        };
        self.elements.push(element);
        element
    }

    pub(crate) fn get(&self, id: ElementId) -> Option<&Element> {
        let index = usize::try_from(id.get()).ok()?;
        self.elements.get(index)
    }

    pub(crate) fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        let index = usize::try_from(id.get()).ok()?;
        self.elements.get_mut(index)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Identifiers of every element of `kind` in registry order.
    pub(crate) fn ids_of_kind(&self, kind: ElementKind) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|element| element.kind == kind)
            .map(|element| element.id)
            .collect()
    }

    pub(crate) fn states(&self) -> Vec<ElementState> {
        self.elements.iter().map(Element::state).collect()
    }
}
