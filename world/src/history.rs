//! Undo stack of element snapshots.

use crate::registry::ElementState;

/// Stack holding one snapshot per displacing move.
#[derive(Clone, Debug, Default)]
pub(crate) struct History {
    entries: Vec<Vec<ElementState>>,
}

impl History {
    /// Pushes the state captured before a move attempt.
    pub(crate) fn capture(&mut self, states: Vec<ElementState>) {
        self.entries.push(states);
    }

    /// Drops the latest snapshot without applying it.
    pub(crate) fn discard_last(&mut self) {
        let _ = self.entries.pop();
    }

    /// Removes and returns the latest snapshot.
    pub(crate) fn pop(&mut self) -> Option<Vec<ElementState>> {
        self.entries.pop()
    }

    pub(crate) fn depth(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scale_sokoban_core::{CellCoord, ElementId};

    fn state(column: u32) -> ElementState {
        ElementState {
            id: ElementId::new(0),
            anchor: CellCoord::new(column, 0),
            big: false,
        }
    }

    #[test]
    fn pop_returns_latest_snapshot() {
        let mut history = History::default();
        history.capture(vec![state(1)]);
        history.capture(vec![state(2)]);

        assert_eq!(history.pop(), Some(vec![state(2)]));
        assert_eq!(history.depth(), 1);
    }

    #[test]
    fn discard_on_empty_stack_is_noop() {
        let mut history = History::default();
        history.discard_last();
        assert_eq!(history.depth(), 0);
        assert_eq!(history.pop(), None);
    }
}
