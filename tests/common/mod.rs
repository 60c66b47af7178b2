#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::IVec2;
use parking_lot::Mutex;

use tileworld::audio::Audio;
use tileworld::clock::ManualClock;
use tileworld::config::ClientOptions;
use tileworld::entity::{Entity, EntityId, EntityKind};
use tileworld::error::SendError;
use tileworld::events::{Inbox, InboxSender, NetworkEvent};
use tileworld::game::{Client, FrameScheduler};
use tileworld::map::{Grid, MapData, MapId, RenderProgress};
use tileworld::platform::{
    AudioBackend, Content, Fade, Input, Network, Platform, PreRenderStep, Renderer, TextureKind, Ui,
};
use tileworld::session::Session;
use tileworld::state::ClientState;

pub const LOCAL_PLAYER: EntityId = EntityId(1);
pub const CENTER_MAP: MapId = MapId(5);
pub const REQUEST_TIMEOUT_MS: u64 = 1_000;

/// Every collaborator call the client made, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    EnterGame,
    NeedMap(MapId),
    Logout(bool),
    CreateRenderTargets(u32),
    PreRender(MapId),
    ReleaseTextures(MapId),
    PlayMusic(String),
    StopMusic,
    InputEnabled(bool),
    Error(String, String),
    DestroyMenu,
    InitMenu,
    LoadTilesets(Vec<String>),
    FadeIn,
    FadeOut,
}

#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Call>>>);

impl Recorder {
    pub fn record(&self, call: Call) {
        self.0.lock().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().clone()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().iter().filter(|call| matches(call)).count()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

pub struct FakeNetwork {
    calls: Recorder,
    connected: Arc<AtomicBool>,
}

impl Network for FakeNetwork {
    fn update(&mut self) {}

    fn send_enter_game(&mut self) -> Result<(), SendError> {
        self.calls.record(Call::EnterGame);
        Ok(())
    }

    fn send_need_map(&mut self, map: MapId) -> Result<(), SendError> {
        if !self.connected.load(Ordering::Relaxed) {
            return Err(SendError::Disconnected);
        }
        self.calls.record(Call::NeedMap(map));
        Ok(())
    }

    fn send_logout(&mut self, character_select: bool) -> Result<(), SendError> {
        self.calls.record(Call::Logout(character_select));
        Ok(())
    }
}

/// Composites one layer per step and finishes once every layer is done.
pub struct FakeRenderer {
    calls: Recorder,
}

impl Renderer for FakeRenderer {
    fn create_map_render_targets(&mut self, tile_budget: u32) {
        self.calls.record(Call::CreateRenderTargets(tile_budget));
    }

    fn pre_render_step(&mut self, map: MapId, data: &MapData, progress: &mut RenderProgress) -> PreRenderStep {
        self.calls.record(Call::PreRender(map));
        progress.layers_done += 1;
        if progress.layers_done >= data.layers {
            PreRenderStep::Finished
        } else {
            PreRenderStep::Progressed
        }
    }

    fn release_map_textures(&mut self, map: MapId) {
        self.calls.record(Call::ReleaseTextures(map));
    }

    fn update_player_light(&mut self, _player: Option<&Entity>) {}
}

pub struct FakeAudio {
    calls: Recorder,
}

impl AudioBackend for FakeAudio {
    fn play_music(&mut self, track: &str, _fade_in_secs: f32, _fade_out_secs: f32, _looped: bool) {
        self.calls.record(Call::PlayMusic(track.to_string()));
    }

    fn stop_music(&mut self, _fade_secs: f32) {
        self.calls.record(Call::StopMusic);
    }

    fn set_volume(&mut self, _volume: u8) {}

    fn update(&mut self) {}
}

pub struct FakeUi {
    calls: Recorder,
    input_enabled: Option<bool>,
}

impl Ui for FakeUi {
    fn set_input_enabled(&mut self, enabled: bool) {
        if self.input_enabled != Some(enabled) {
            self.input_enabled = Some(enabled);
            self.calls.record(Call::InputEnabled(enabled));
        }
    }

    fn push_error(&mut self, title: &str, body: &str) {
        self.calls.record(Call::Error(title.to_string(), body.to_string()));
    }

    fn destroy_menu(&mut self) {
        self.calls.record(Call::DestroyMenu);
    }

    fn init_menu(&mut self) {
        self.calls.record(Call::InitMenu);
    }
}

pub struct FakeContent {
    calls: Recorder,
    images: HashSet<String>,
}

impl Content for FakeContent {
    fn load_tilesets(&mut self, names: &[String]) {
        self.calls.record(Call::LoadTilesets(names.to_vec()));
    }

    fn has_texture(&self, kind: TextureKind, name: &str) -> bool {
        kind == TextureKind::Image && self.images.contains(name)
    }
}

pub struct FakeFade {
    calls: Recorder,
    done: Arc<AtomicBool>,
}

impl Fade for FakeFade {
    fn update(&mut self) {}

    fn fade_in(&mut self) {
        self.calls.record(Call::FadeIn);
    }

    fn fade_out(&mut self) {
        self.calls.record(Call::FadeOut);
    }

    fn done_fading(&self) -> bool {
        self.done.load(Ordering::Relaxed)
    }
}

pub struct NoInput;

impl Input for NoInput {
    fn update(&mut self) {}
}

/// A client wired to recording fakes and a manual clock.
pub struct Harness {
    pub scheduler: FrameScheduler,
    pub clock: ManualClock,
    pub calls: Recorder,
    pub inbox: InboxSender,
    pub fade_done: Arc<AtomicBool>,
    pub connected: Arc<AtomicBool>,
}

impl Harness {
    pub fn new(options: ClientOptions) -> Self {
        Self::with_images(options, &[])
    }

    /// `available` lists the intro images the content manager can resolve.
    pub fn with_images(options: ClientOptions, available: &[&str]) -> Self {
        let calls = Recorder::default();
        let clock = ManualClock::new(1);
        let fade_done = Arc::new(AtomicBool::new(true));
        let connected = Arc::new(AtomicBool::new(true));

        let platform = Platform {
            network: Box::new(FakeNetwork {
                calls: calls.clone(),
                connected: connected.clone(),
            }),
            renderer: Box::new(FakeRenderer { calls: calls.clone() }),
            audio: Audio::new(Box::new(FakeAudio { calls: calls.clone() })),
            ui: Box::new(FakeUi {
                calls: calls.clone(),
                input_enabled: None,
            }),
            content: Box::new(FakeContent {
                calls: calls.clone(),
                images: available.iter().map(|name| name.to_string()).collect(),
            }),
            fade: Box::new(FakeFade {
                calls: calls.clone(),
                done: fade_done.clone(),
            }),
            input: Box::new(NoInput),
            clock: Box::new(clock.clone()),
        };

        let inbox = Inbox::new();
        let sender = inbox.sender();
        let scheduler = FrameScheduler::new(Client::new(options, inbox, platform));

        Self {
            scheduler,
            clock,
            calls,
            inbox: sender,
            fade_done,
            connected,
        }
    }

    pub fn tick(&self) {
        self.scheduler.tick();
    }

    pub fn tick_after(&self, ms: u64) {
        self.clock.advance(ms);
        self.scheduler.tick();
    }

    pub fn send(&self, event: NetworkEvent) {
        assert!(self.inbox.send(event));
    }

    pub fn state(&self) -> ClientState {
        self.scheduler.state()
    }

    pub fn session<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        self.scheduler.with(|client| f(client.session()))
    }

    pub fn session_mut<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        self.scheduler.with(|client| f(client.session_mut()))
    }

    pub fn need_map_requests(&self) -> usize {
        self.calls.count(|call| matches!(call, Call::NeedMap(_)))
    }

    /// Walks an empty intro and the menu, leaving the client in `Loading`.
    pub fn join(&self) {
        self.tick();
        assert_eq!(self.state(), ClientState::Menu);
        self.scheduler.with(|client| client.request_join());
        self.tick();
        assert_eq!(self.state(), ClientState::Loading);
    }

    /// Joins, delivers the 3x3 world and the local player, and ticks into `InGame`.
    pub fn enter_world(&self) {
        self.join();
        self.send(NetworkEvent::GameData {
            tilesets: vec!["terrain".to_string()],
        });
        self.send(NetworkEvent::MapGrid(grid_3x3()));
        for id in 1..=9 {
            self.send(map_data(MapId(id)));
        }
        self.send(spawn_local(CENTER_MAP));
        self.tick();
        assert_eq!(self.state(), ClientState::InGame);
    }
}

/// Options with the render cache off, no intro and a short request timeout.
pub fn options() -> ClientOptions {
    ClientOptions {
        render_cache: false,
        map_request_timeout_ms: REQUEST_TIMEOUT_MS,
        ..Default::default()
    }
}

/// Maps 1 through 9, row by row; map 5 is in the middle.
pub fn grid_3x3() -> Grid {
    let cells = (1..=9).map(|id| Some(MapId(id))).collect();
    Grid::new(3, 3, cells).unwrap()
}

pub fn map_data(id: MapId) -> NetworkEvent {
    NetworkEvent::MapData {
        id,
        data: MapData {
            name: format!("map {}", id.0),
            music: Some(format!("theme {}", id.0)),
            layers: 2,
            revision: 1,
        },
    }
}

pub fn spawn_local(map: MapId) -> NetworkEvent {
    NetworkEvent::EntitySpawned {
        entity: Entity::new(LOCAL_PLAYER, EntityKind::Player, "Hero", map, IVec2::new(4, 4)),
        local: true,
    }
}

pub fn spawn_npc(id: u64, map: MapId) -> NetworkEvent {
    NetworkEvent::EntitySpawned {
        entity: Entity::new(EntityId(id), EntityKind::Npc, format!("npc {id}"), map, IVec2::new(1, 1)),
        local: false,
    }
}
