//! Grow and shrink tiles, evaluated to a fixed point after every push.

use log::{debug, warn};
use scale_sokoban_core::{
    BatchKind, CellCoord, Direction, Effect, EffectBatch, ElementId, SoundCue,
};

use crate::board::Board;

/// Upper bound on fixed-point rounds for a single push sub-step.
const CASCADE_ROUND_LIMIT: usize = 64;

/// Corner cells of a 3×3 footprint as (horizontal, vertical) offsets. The
/// horizontal axis is tried first when a corner occupant must be pushed away.
const CORNERS: [(Direction, Direction); 4] = [
    (Direction::West, Direction::North),
    (Direction::East, Direction::North),
    (Direction::West, Direction::South),
    (Direction::East, Direction::South),
];

/// Result of one trigger evaluation round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct TriggerRound {
    /// At least one trigger fired and queued a batch.
    pub(crate) fired: bool,
    /// The initiator was displaced by a neighbor's growth or grew itself.
    ///
    /// Shrinking in place does not count; a shrunk player keeps stepping.
    pub(crate) initiator_affected: bool,
}

/// Re-evaluates triggers until a round fires nothing.
///
/// Returns whether the initiator was displaced or grew along the way.
pub(crate) fn run_cascade(
    board: &mut Board,
    initiator: ElementId,
    out: &mut Vec<EffectBatch>,
) -> bool {
    let mut affected = false;
    for _ in 0..CASCADE_ROUND_LIMIT {
        let round = check_triggers(board, initiator, out);
        affected |= round.initiator_affected;
        if !round.fired {
            return affected;
        }
    }
    warn!("trigger cascade did not settle after {CASCADE_ROUND_LIMIT} rounds");
    affected
}

/// Fires every shrink tile, then every grow tile, whose precondition holds.
pub(crate) fn check_triggers(
    board: &mut Board,
    initiator: ElementId,
    out: &mut Vec<EffectBatch>,
) -> TriggerRound {
    let mut round = TriggerRound::default();

    let shrink_cells = board.level.shrink_cells().to_vec();
    for cell in shrink_cells {
        let Some(id) = anchored_at(board, cell, true) else {
            continue;
        };
        board.resize(id, false);
        debug!("element {} shrank at ({}, {})", id.get(), cell.column(), cell.row());

        let mut batch = EffectBatch::new(BatchKind::Trigger, vec![Effect::shrink(id)]);
        batch.push_sound(SoundCue::Scale);
        out.push(batch);
        round.fired = true;
    }

    let grow_cells = board.level.grow_cells().to_vec();
    for cell in grow_cells {
        let Some(id) = anchored_at(board, cell, false) else {
            continue;
        };
        let Some(growth) = try_grow(board, id, cell) else {
            continue;
        };
        debug!(
            "element {} grew at ({}, {}) displacing {} neighbor(s)",
            id.get(),
            cell.column(),
            cell.row(),
            growth.displaced.len()
        );

        let mut batch = EffectBatch::new(BatchKind::Trigger, growth.effects);
        batch.push_sound(SoundCue::Scale);
        out.push(batch);
        round.fired = true;
        round.initiator_affected |= id == initiator || growth.displaced.contains(&initiator);
    }

    round
}

/// Element of the requested size whose anchor sits exactly on `cell`.
fn anchored_at(board: &Board, cell: CellCoord, big: bool) -> Option<ElementId> {
    let id = board.colliders.lookup(cell)?;
    let element = board.elements.get(id)?;
    (element.anchor == cell && element.big == big).then_some(id)
}

#[derive(Debug)]
struct Growth {
    effects: Vec<Effect>,
    displaced: Vec<ElementId>,
}

/// Grows `id` around `anchor`, pushing neighbors out of the new footprint.
///
/// Either every required neighbor push happens and the element becomes big,
/// or the board is left exactly as it was.
fn try_grow(board: &mut Board, id: ElementId, anchor: CellCoord) -> Option<Growth> {
    let fits_geometry = crate::registry::footprint(anchor, true)
        .all(|cell| cell.map_or(false, |cell| board.level.is_open(cell)));
    if !fits_geometry {
        return None;
    }

    let plan = plan_neighbor_pushes(board, id, anchor)?;
    let checkpoint = board.capture();
    let mut effects = Vec::new();
    let mut displaced: Vec<ElementId> = Vec::new();

    for (neighbor, direction) in plan {
        if !overlaps_block(board, neighbor, anchor) {
            continue;
        }
        match board.resolve_push(neighbor, direction, false) {
            Ok(moving) => {
                effects.extend(board.displace(&moving, direction));
                for moved in moving {
                    if !displaced.contains(&moved) {
                        displaced.push(moved);
                    }
                }
            }
            Err(reason) => {
                debug!("growth of element {} abandoned: {reason}", id.get());
                board.restore(&checkpoint);
                return None;
            }
        }
    }

    let still_anchored = board
        .elements
        .get(id)
        .map_or(false, |element| element.anchor == anchor);
    if !still_anchored || !board.footprint_clear_for(id, anchor, true) {
        board.restore(&checkpoint);
        return None;
    }

    board.resize(id, true);
    effects.push(Effect::grow(id));
    Some(Growth { effects, displaced })
}

/// Chooses a push direction for every element inside the would-be footprint.
///
/// Cardinal neighbors are pushed straight away from the anchor. Corner
/// occupants not already scheduled are pushed along the horizontal axis when
/// that resolves, otherwise the vertical one. Returns `None` as soon as some
/// occupant cannot be moved.
fn plan_neighbor_pushes(
    board: &Board,
    id: ElementId,
    anchor: CellCoord,
) -> Option<Vec<(ElementId, Direction)>> {
    let mut plan: Vec<(ElementId, Direction)> = Vec::new();

    for direction in Direction::ALL {
        let Some(occupant) = anchor
            .step(direction)
            .and_then(|cell| board.colliders.lookup(cell))
        else {
            continue;
        };
        if occupant == id || plan.iter().any(|(planned, _)| *planned == occupant) {
            continue;
        }
        if board.resolve_push(occupant, direction, false).is_err() {
            return None;
        }
        plan.push((occupant, direction));
    }

    for (horizontal, vertical) in CORNERS {
        let Some(occupant) = anchor
            .step(horizontal)
            .and_then(|cell| cell.step(vertical))
            .and_then(|cell| board.colliders.lookup(cell))
        else {
            continue;
        };
        if occupant == id || plan.iter().any(|(planned, _)| *planned == occupant) {
            continue;
        }
        let direction = [horizontal, vertical]
            .into_iter()
            .find(|direction| board.resolve_push(occupant, *direction, false).is_ok())?;
        plan.push((occupant, direction));
    }

    Some(plan)
}

/// Whether any cell of the element lies in the 3×3 block around `anchor`.
fn overlaps_block(board: &Board, id: ElementId, anchor: CellCoord) -> bool {
    board.elements.get(id).map_or(false, |element| {
        element.footprint().flatten().any(|cell| {
            cell.column().abs_diff(anchor.column()) <= 1 && cell.row().abs_diff(anchor.row()) <= 1
        })
    })
}
