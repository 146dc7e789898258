//! Push resolution: the transitive set of elements a directional push moves.

use std::collections::VecDeque;

use scale_sokoban_core::{CellCoord, Direction, Effect, ElementId, PushError};

use crate::board::Board;

const SMALL_SPREAD: [i32; 1] = [0];
const BIG_SPREAD: [i32; 3] = [-1, 0, 1];

/// Cells an element must enter when it moves one unit in `direction`.
///
/// A small element enters the neighboring cell. A big element sweeps a
/// three-wide front just beyond its own footprint.
fn leading_edge(
    anchor: CellCoord,
    big: bool,
    direction: Direction,
) -> impl Iterator<Item = Option<CellCoord>> {
    let (dx, dy) = direction.delta();
    let (px, py) = direction.rotate_clockwise().delta();
    let (reach, spread): (i32, &'static [i32]) = if big {
        (2, &BIG_SPREAD)
    } else {
        (1, &SMALL_SPREAD)
    };
    spread
        .iter()
        .map(move |&side| anchor.offset(dx * reach + px * side, dy * reach + py * side))
}

impl Board {
    /// Computes every element that moves when `initiator` is pushed.
    ///
    /// The search is breadth-first from the initiator. Any leading-edge cell
    /// outside the grid or on a wall aborts the whole push, as does meeting a
    /// big element when `limit_push_power` is set. On success the moving set
    /// includes the initiator and is ordered by discovery.
    pub(crate) fn resolve_push(
        &self,
        initiator: ElementId,
        direction: Direction,
        limit_push_power: bool,
    ) -> Result<Vec<ElementId>, PushError> {
        let mut moving = vec![initiator];
        let mut frontier = VecDeque::from([initiator]);

        while let Some(id) = frontier.pop_front() {
            let Some(element) = self.elements.get(id) else {
                continue;
            };

            for target in leading_edge(element.anchor, element.big, direction) {
                let cell = target
                    .filter(|cell| self.level.contains(*cell))
                    .ok_or(PushError::OutOfBounds)?;
                if self.level.is_wall(cell) {
                    return Err(PushError::Wall { cell });
                }

                let Some(blocker) = self.colliders.lookup(cell) else {
                    continue;
                };
                if moving.contains(&blocker) {
                    continue;
                }

                let heavy = self.elements.get(blocker).map_or(false, |other| other.big);
                if limit_push_power && heavy {
                    return Err(PushError::TooHeavy {
                        cell,
                        element: blocker,
                    });
                }

                moving.push(blocker);
                frontier.push_back(blocker);
            }
        }

        Ok(moving)
    }

    /// Moves an already resolved set one unit and reports the motion.
    pub(crate) fn displace(&mut self, moving: &[ElementId], direction: Direction) -> Vec<Effect> {
        for id in moving {
            if let Some(element) = self.elements.get(*id) {
                self.colliders.remove(element);
            }
        }

        let mut effects = Vec::with_capacity(moving.len());
        for id in moving {
            let Some(element) = self.elements.get_mut(*id) else {
                continue;
            };
            let from = element.anchor;
            if let Some(to) = from.step(direction) {
                element.anchor = to;
                effects.push(Effect::Move {
                    element: *id,
                    from,
                    to,
                });
            }
        }

        for id in moving {
            if let Some(element) = self.elements.get(*id) {
                self.colliders.place(element);
            }
        }

        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scale_sokoban_core::LevelGrid;

    fn board(text: &str) -> Board {
        let (level, seeds) = crate::level::build(&LevelGrid::parse(text)).expect("level builds");
        Board::install(level, seeds)
    }

    #[test]
    fn small_leading_edge_is_adjacent_cell() {
        let cells: Vec<_> = leading_edge(CellCoord::new(2, 2), false, Direction::North)
            .flatten()
            .collect();
        assert_eq!(cells, vec![CellCoord::new(2, 1)]);
    }

    #[test]
    fn big_leading_edge_spans_three_cells_beyond_footprint() {
        let mut cells: Vec<_> = leading_edge(CellCoord::new(2, 2), true, Direction::East)
            .flatten()
            .collect();
        cells.sort();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(4, 1),
                CellCoord::new(4, 2),
                CellCoord::new(4, 3),
            ]
        );
    }

    #[test]
    fn push_collects_line_of_boxes() {
        let board = board("pbb..");
        let moving = board
            .resolve_push(ElementId::new(0), Direction::East, true)
            .expect("push resolves");
        assert_eq!(
            moving,
            vec![ElementId::new(0), ElementId::new(1), ElementId::new(2)]
        );
    }

    #[test]
    fn push_fails_at_grid_edge() {
        let board = board("..pbb");
        assert_eq!(
            board.resolve_push(ElementId::new(0), Direction::East, true),
            Err(PushError::OutOfBounds)
        );
    }

    #[test]
    fn displace_moves_every_member_and_keeps_overlay() {
        let mut board = board("pb...");
        let moving = board
            .resolve_push(ElementId::new(0), Direction::East, true)
            .expect("push resolves");
        let effects = board.displace(&moving, Direction::East);

        assert_eq!(effects.len(), 2);
        assert_eq!(board.colliders.lookup(CellCoord::new(0, 0)), None);
        assert_eq!(
            board.colliders.lookup(CellCoord::new(1, 0)),
            Some(ElementId::new(0))
        );
        assert_eq!(
            board.colliders.lookup(CellCoord::new(2, 0)),
            Some(ElementId::new(1))
        );
    }
}
