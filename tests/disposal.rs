use glam::{IVec2, Vec2};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

use tileworld::constants::{DISPOSAL_QUEUE_CAPACITY, ENTITY_MOVE_TIME_MS};
use tileworld::entity::{Direction, EntityId};
use tileworld::events::NetworkEvent;
use tileworld::map::MapId;

mod common;

use common::{spawn_npc, Harness, CENTER_MAP, LOCAL_PLAYER};

#[test]
fn test_local_player_is_never_disposed() {
    let harness = Harness::new(common::options());
    harness.enter_world();
    harness.send(spawn_npc(2, CENTER_MAP));
    harness.tick();

    harness.send(NetworkEvent::EntityLeft(LOCAL_PLAYER));
    harness.send(NetworkEvent::EntityLeft(EntityId(2)));
    harness.tick();

    assert_that(&harness.session(|session| session.entities.contains(LOCAL_PLAYER))).is_true();
    assert_that(&harness.session(|session| session.entities.contains(EntityId(2)))).is_false();
    assert_that(&harness.session(|session| session.entities.disposal_queue().is_empty())).is_true();
    assert_that(&harness.session(|session| session.local_map_id())).is_equal_to(Some(CENTER_MAP));
}

#[test]
fn test_disposal_waits_until_maps_are_ready() {
    let harness = Harness::new(common::options());
    harness.enter_world();
    harness.send(spawn_npc(2, CENTER_MAP));
    harness.tick();

    harness.session_mut(|session| session.maps.remove(MapId(1)));
    harness.send(NetworkEvent::EntityLeft(EntityId(2)));
    harness.tick();
    assert_that(&harness.session(|session| session.entities.contains(EntityId(2)))).is_true();

    harness.send(common::map_data(MapId(1)));
    harness.tick();
    assert_that(&harness.session(|session| session.entities.contains(EntityId(2)))).is_false();
}

#[test]
fn test_disposal_overflow_is_swept_on_later_frames() {
    const OVERFLOW: u64 = 76;
    let npcs = DISPOSAL_QUEUE_CAPACITY as u64 + OVERFLOW;

    let harness = Harness::new(common::options());
    harness.enter_world();
    for id in 2..npcs + 2 {
        harness.send(spawn_npc(id, CENTER_MAP));
    }
    harness.tick();

    // Keep the sweep paused while every NPC leaves.
    harness.session_mut(|session| session.maps.remove(MapId(1)));
    for id in 2..npcs + 2 {
        harness.send(NetworkEvent::EntityLeft(EntityId(id)));
    }
    harness.tick();
    assert_that(&harness.session(|session| session.entities.disposal_queue().len())).is_equal_to(npcs as usize);

    harness.send(common::map_data(MapId(1)));
    harness.tick();
    assert_that(&harness.session(|session| session.entities.len())).is_equal_to(1 + OVERFLOW as usize);

    harness.tick();
    assert_that(&harness.session(|session| session.entities.len())).is_equal_to(1);
    assert_that(&harness.session(|session| session.entities.contains(LOCAL_PLAYER))).is_true();
    assert_that(&harness.session(|session| session.entities.disposal_queue().is_empty())).is_true();
}

#[test]
fn test_unknown_entity_updates_are_ignored() {
    let harness = Harness::new(common::options());
    harness.enter_world();
    harness.send(NetworkEvent::EntityMoved {
        id: EntityId(99),
        map: CENTER_MAP,
        tile: IVec2::ZERO,
        direction: Direction::Up,
    });
    harness.send(NetworkEvent::EntityLeft(EntityId(99)));
    harness.tick();

    assert_that(&harness.session(|session| session.entities.len())).is_equal_to(1);
}

#[test]
fn test_entities_walk_between_tiles() {
    let harness = Harness::new(common::options());
    harness.enter_world();
    harness.send(NetworkEvent::EntityMoved {
        id: LOCAL_PLAYER,
        map: CENTER_MAP,
        tile: IVec2::new(4, 5),
        direction: Direction::Down,
    });
    harness.tick();

    harness.tick_after(ENTITY_MOVE_TIME_MS / 2);
    let offset = harness.session(|session| session.local_entity().map(|entity| entity.offset()));
    assert_eq!(offset, Some(Vec2::new(0.0, -0.5)));

    harness.tick_after(ENTITY_MOVE_TIME_MS);
    let moving = harness.session(|session| session.local_entity().map(|entity| entity.is_moving()));
    assert_eq!(moving, Some(false));
}
