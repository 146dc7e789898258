use scale_sokoban_core::{
    BatchKind, CellCoord, Command, Direction, Effect, EffectBatch, ElementId, ElementSnapshot,
    Event, LevelGrid, LevelMode,
};
use scale_sokoban_world::{self as world, query, World};

fn world_from(text: &str) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::LoadLevel {
            grid: LevelGrid::parse(text),
            mode: LevelMode::Interactive,
        },
        &mut events,
    );
    assert!(matches!(events.as_slice(), [Event::LevelLoaded { .. }]));
    world
}

fn step(world: &mut World, direction: Direction) -> Vec<EffectBatch> {
    let mut events = Vec::new();
    world::apply(world, Command::Move { direction }, &mut events);
    events
        .into_iter()
        .filter_map(|event| match event {
            Event::EffectBatchQueued { batch } => Some(batch),
            _ => None,
        })
        .collect()
}

fn element(world: &World, id: u32) -> ElementSnapshot {
    query::element_view(world)
        .get(ElementId::new(id))
        .copied()
        .expect("element exists")
}

fn scales(batch: &EffectBatch) -> Vec<(ElementId, f32, f32)> {
    batch
        .effects()
        .iter()
        .filter_map(|effect| match effect {
            Effect::Scale { element, from, to } => Some((*element, *from, *to)),
            _ => None,
        })
        .collect()
}

#[test]
fn small_player_grows_with_clear_neighbors() {
    let mut world = world_from(".......\n.......\n.......\n..p+...\n.......\n.......\n.......");

    let batches = step(&mut world, Direction::East);

    assert_eq!(batches.len(), 2);
    assert_eq!(batches[1].kind(), BatchKind::Trigger);
    assert_eq!(batches[1].move_count(), 0);
    assert_eq!(scales(&batches[1]), vec![(ElementId::new(0), 0.0, 1.0)]);

    let player = element(&world, 0);
    assert!(player.big);
    assert_eq!(player.anchor, CellCoord::new(3, 3));
    assert!(query::colliders_consistent(&world));
}

#[test]
fn growing_box_pushes_pusher_back() {
    let mut world = world_from(".......\n.......\n.......\n.pb+...\n.......\n.......\n.......");

    let batches = step(&mut world, Direction::East);

    assert_eq!(batches.len(), 2);
    let trigger = &batches[1];
    assert_eq!(trigger.kind(), BatchKind::Trigger);
    assert!(trigger.has_scale());
    assert_eq!(scales(trigger), vec![(ElementId::new(1), 0.0, 1.0)]);
    assert!(trigger.effects().contains(&Effect::Move {
        element: ElementId::new(0),
        from: CellCoord::new(2, 3),
        to: CellCoord::new(1, 3),
    }));

    assert!(element(&world, 1).big);
    assert_eq!(element(&world, 0).anchor, CellCoord::new(1, 3));
    assert!(query::colliders_consistent(&world));
}

#[test]
fn blocked_growth_leaves_every_neighbor_in_place() {
    // The north neighbor is pinned under a wall, so the pusher must not be
    // displaced either.
    let mut world = world_from(".......\n...*...\n...b...\n.pb+...\n.......\n.......\n.......");

    let batches = step(&mut world, Direction::East);

    assert_eq!(batches.len(), 1, "only the push itself is queued");
    assert!(!element(&world, 2).big);
    assert_eq!(element(&world, 2).anchor, CellCoord::new(3, 3));
    assert_eq!(element(&world, 1).anchor, CellCoord::new(2, 3));
    assert_eq!(element(&world, 0).anchor, CellCoord::new(3, 2));
    assert!(query::colliders_consistent(&world));
}

#[test]
fn growth_refused_when_footprint_touches_wall() {
    let mut world = world_from(".......\n.......\n....*..\n..p+...\n.......\n.......\n.......");

    let batches = step(&mut world, Direction::East);

    assert_eq!(batches.len(), 1);
    assert!(!element(&world, 0).big);
}

#[test]
fn big_box_shrinks_in_place() {
    let mut world = world_from(".........\n.........\n.........\n.P..B-...\n.........\n.........\n.........");

    let batches = step(&mut world, Direction::East);

    let kinds: Vec<_> = batches.iter().map(EffectBatch::kind).collect();
    assert_eq!(
        kinds,
        vec![
            BatchKind::Push,
            BatchKind::Trigger,
            BatchKind::Push,
            BatchKind::Push
        ]
    );
    assert_eq!(scales(&batches[1]), vec![(ElementId::new(1), 1.0, 0.0)]);
    assert_eq!(batches[1].move_count(), 0);
    assert_eq!(batches[2].move_count(), 1, "player closes the gap alone");
    assert!(batches[3].effects().contains(&Effect::Move {
        element: ElementId::new(1),
        from: CellCoord::new(5, 3),
        to: CellCoord::new(6, 3),
    }));

    let shrunk = element(&world, 1);
    assert!(!shrunk.big);
    assert_eq!(shrunk.anchor, CellCoord::new(6, 3));
    assert!(query::colliders_consistent(&world));
}

#[test]
fn shrunk_player_finishes_move_as_small_player() {
    let mut world = world_from(".......\n.......\n.P-....\n.......\n.......");

    let batches = step(&mut world, Direction::East);

    let kinds: Vec<_> = batches.iter().map(EffectBatch::kind).collect();
    assert_eq!(
        kinds,
        vec![
            BatchKind::Push,
            BatchKind::Trigger,
            BatchKind::Push,
            BatchKind::Push
        ]
    );
    assert_eq!(scales(&batches[1]), vec![(ElementId::new(0), 1.0, 0.0)]);
    assert!(batches[3].effects().contains(&Effect::Move {
        element: ElementId::new(0),
        from: CellCoord::new(3, 2),
        to: CellCoord::new(4, 2),
    }));

    let player = element(&world, 0);
    assert!(!player.big);
    assert_eq!(player.anchor, CellCoord::new(4, 2));
    assert_eq!(query::history_depth(&world), 1);
    assert!(query::colliders_consistent(&world));
}

#[test]
fn growth_displaces_corner_occupant_horizontally() {
    // Box 0 sits on the north-east corner of the grow tile at (3,3).
    let mut world = world_from(".......\n.......\n....b..\n.pb+...\n.......\n.......\n.......");

    let batches = step(&mut world, Direction::East);

    let kinds: Vec<_> = batches.iter().map(EffectBatch::kind).collect();
    assert_eq!(kinds, vec![BatchKind::Push, BatchKind::Trigger]);
    let trigger = &batches[1];
    assert_eq!(trigger.move_count(), 2);
    assert_eq!(scales(trigger), vec![(ElementId::new(2), 0.0, 1.0)]);
    assert!(trigger.effects().contains(&Effect::Move {
        element: ElementId::new(0),
        from: CellCoord::new(4, 2),
        to: CellCoord::new(5, 2),
    }));

    let corner = element(&world, 0);
    assert_eq!((corner.anchor, corner.big), (CellCoord::new(5, 2), false));
    let player = element(&world, 1);
    assert_eq!((player.anchor, player.big), (CellCoord::new(1, 3), false));
    let grown = element(&world, 2);
    assert_eq!((grown.anchor, grown.big), (CellCoord::new(3, 3), true));
    assert!(query::colliders_consistent(&world));
}

#[test]
fn growth_pushes_big_box_onto_shrink_tile_in_later_round() {
    // Growing box 1 shoves big box 2 east so its anchor lands on the shrink
    // tile at (6,5); the shrink fires on the next cascade round.
    let mut world = world_from(
        ".........\n.........\n.........\n.........\n.........\n.pb+.B-..\n.........\n.........\n.........",
    );

    let batches = step(&mut world, Direction::East);

    let kinds: Vec<_> = batches.iter().map(EffectBatch::kind).collect();
    assert_eq!(
        kinds,
        vec![BatchKind::Push, BatchKind::Trigger, BatchKind::Trigger]
    );

    let growth = &batches[1];
    assert_eq!(scales(growth), vec![(ElementId::new(1), 0.0, 1.0)]);
    assert!(growth.effects().contains(&Effect::Move {
        element: ElementId::new(2),
        from: CellCoord::new(5, 5),
        to: CellCoord::new(6, 5),
    }));
    assert!(growth.effects().contains(&Effect::Move {
        element: ElementId::new(0),
        from: CellCoord::new(2, 5),
        to: CellCoord::new(1, 5),
    }));

    let shrink = &batches[2];
    assert_eq!(shrink.move_count(), 0);
    assert_eq!(scales(shrink), vec![(ElementId::new(2), 1.0, 0.0)]);

    let player = element(&world, 0);
    assert_eq!((player.anchor, player.big), (CellCoord::new(1, 5), false));
    let grown = element(&world, 1);
    assert_eq!((grown.anchor, grown.big), (CellCoord::new(3, 5), true));
    let shrunk = element(&world, 2);
    assert_eq!((shrunk.anchor, shrunk.big), (CellCoord::new(6, 5), false));
    assert!(query::colliders_consistent(&world));
}
