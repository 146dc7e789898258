//! Win condition: every target covered by a box of the required size.

use scale_sokoban_core::ElementKind;

use crate::board::Board;

/// Reports whether every target is satisfied.
///
/// A level without targets never completes. The vacuous case is refused so a
/// degenerate level cannot finish on its first settled move.
pub(crate) fn targets_satisfied(board: &Board) -> bool {
    let targets = board.level.targets();
    if targets.is_empty() {
        return false;
    }

    targets.iter().all(|target| {
        board
            .colliders
            .lookup(target.cell())
            .and_then(|id| board.elements.get(id))
            .map_or(false, |element| {
                element.kind == ElementKind::Box
                    && element.anchor == target.cell()
                    && element.big == target.big()
            })
    })
}
