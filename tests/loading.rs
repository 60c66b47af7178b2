use pretty_assertions::assert_eq;
use speculoos::prelude::*;

use tileworld::config::ClientOptions;
use tileworld::constants::MAP_TEXTURE_BUDGET;
use tileworld::events::NetworkEvent;
use tileworld::map::MapId;
use tileworld::state::ClientState;

mod common;

use common::{grid_3x3, map_data, spawn_local, Call, Harness, CENTER_MAP};

fn cached_options() -> ClientOptions {
    ClientOptions {
        render_cache: true,
        ..common::options()
    }
}

#[test]
fn test_menu_waits_for_join_request() {
    let harness = Harness::new(common::options());
    for _ in 0..5 {
        harness.tick();
    }
    assert_that(&harness.state()).is_equal_to(ClientState::Menu);
    assert_that(&harness.calls.count(|call| *call == Call::EnterGame)).is_equal_to(0);
}

#[test]
fn test_join_request_tears_down_menu_and_enters_game() {
    let harness = Harness::new(common::options());
    harness.join();

    let calls = harness.calls.calls();
    let destroy = calls.iter().position(|call| *call == Call::DestroyMenu);
    let enter = calls.iter().position(|call| *call == Call::EnterGame);
    assert_that(&destroy).is_some();
    assert_that(&enter).is_some();
    assert_that(&harness.session(|session| session.waiting_on_server)).is_true();
}

#[test]
fn test_loading_without_local_map_does_nothing() {
    let harness = Harness::new(common::options());
    harness.join();
    harness.send(NetworkEvent::MapGrid(grid_3x3()));
    harness.calls.clear();

    for _ in 0..10 {
        harness.tick_after(5_000);
    }
    assert_that(&harness.state()).is_equal_to(ClientState::Loading);
    assert_that(&harness.need_map_requests()).is_equal_to(0);

    // Player known, but its map has not arrived.
    harness.send(spawn_local(CENTER_MAP));
    harness.tick_after(5_000);
    assert_that(&harness.state()).is_equal_to(ClientState::Loading);
    assert_that(&harness.need_map_requests()).is_equal_to(0);
}

#[test]
fn test_loading_waits_for_every_neighbor() {
    let harness = Harness::new(common::options());
    harness.join();
    harness.send(NetworkEvent::MapGrid(grid_3x3()));
    harness.send(spawn_local(CENTER_MAP));
    for id in 1..=8 {
        harness.send(map_data(MapId(id)));
    }
    harness.tick();
    assert_that(&harness.state()).is_equal_to(ClientState::Loading);

    harness.send(map_data(MapId(9)));
    harness.tick();
    assert_that(&harness.state()).is_equal_to(ClientState::InGame);
}

#[test]
fn test_entering_game_plays_local_map_music_and_fades_in() {
    let harness = Harness::new(common::options());
    harness.enter_world();

    let calls = harness.calls.calls();
    let tail: Vec<Call> = calls[calls.len() - 2..].to_vec();
    assert_eq!(tail, vec![Call::PlayMusic("theme 5".to_string()), Call::FadeIn]);
    assert_that(&harness.session(|session| session.needs_maps)).is_false();
}

#[test]
fn test_render_targets_and_tilesets_are_set_up_once() {
    let harness = Harness::new(cached_options());
    harness.join();
    for _ in 0..3 {
        harness.tick();
    }
    assert_eq!(
        harness.calls.count(|call| *call == Call::CreateRenderTargets(MAP_TEXTURE_BUDGET)),
        1
    );
    assert_that(&harness.calls.count(|call| matches!(call, Call::LoadTilesets(_)))).is_equal_to(0);

    harness.send(NetworkEvent::GameData {
        tilesets: vec!["terrain".to_string(), "water".to_string()],
    });
    harness.tick();
    harness.tick();
    assert_eq!(
        harness.calls.count(|call| matches!(call, Call::LoadTilesets(_))),
        1
    );
}

#[test]
fn test_render_targets_skipped_without_cache() {
    let harness = Harness::new(common::options());
    harness.join();
    harness.tick();
    assert_that(&harness.calls.count(|call| matches!(call, Call::CreateRenderTargets(_)))).is_equal_to(0);
}

#[test]
fn test_loading_pre_renders_one_map_per_frame() {
    let harness = Harness::new(cached_options());
    harness.join();
    harness.send(NetworkEvent::MapGrid(grid_3x3()));
    harness.send(spawn_local(CENTER_MAP));
    for id in 1..=9 {
        harness.send(map_data(MapId(id)));
    }

    for frame in 1..=9 {
        harness.tick();
        assert_that(&harness.state()).is_equal_to(ClientState::Loading);
        let rendered = harness.session(|session| session.maps.iter().filter(|map| map.is_rendered()).count());
        assert_eq!(rendered, frame);
    }

    harness.tick();
    assert_that(&harness.state()).is_equal_to(ClientState::InGame);
}

#[test]
fn test_world_updates_before_joining_are_dropped() {
    let harness = Harness::new(common::options());
    harness.tick();
    harness.send(NetworkEvent::MapGrid(grid_3x3()));
    harness.send(map_data(MapId(1)));
    harness.tick();

    assert_that(&harness.session(|session| session.grid.is_empty())).is_true();
    assert_that(&harness.session(|session| session.maps.is_empty())).is_true();
}

#[test]
fn test_fatal_error_stops_processing() {
    let harness = Harness::new(common::options());
    harness.join();
    harness.send(NetworkEvent::Fatal {
        reason: "protocol mismatch".to_string(),
    });
    harness.tick();
    assert_that(&harness.state()).is_equal_to(ClientState::Error);

    harness.send(NetworkEvent::MapGrid(grid_3x3()));
    harness.tick();
    assert_that(&harness.state()).is_equal_to(ClientState::Error);
    assert_that(&harness.session(|session| session.grid.is_empty())).is_true();
}
