//! Collaborators that need no window, audio device or server.
//!
//! Each one logs what it is asked to do. [`LoopbackServer`] answers requests by queueing
//! the responses a real server would send, built from a generated square world.

use std::collections::HashSet;

use circular_buffer::CircularBuffer;
use glam::IVec2;
use tracing::{debug, info, trace, warn};

use crate::audio::Audio;
use crate::clock::SystemClock;
use crate::entity::{Entity, EntityId, EntityKind};
use crate::error::{GameResult, SendError};
use crate::events::{InboxSender, NetworkEvent};
use crate::map::{Grid, MapData, MapId, RenderProgress};
use crate::platform::{AudioBackend, Content, Fade, Input, Network, Platform, PreRenderStep, Renderer, TextureKind, Ui};
use crate::world_time::TimeSync;

/// Number of user-facing errors kept by [`HeadlessUi`].
const ERROR_LOG_SIZE: usize = 16;

/// Tile layers in every generated map.
const GENERATED_LAYERS: u32 = 5;

/// A square world of `size * size` maps with the local player spawned on the center map.
#[derive(Debug, Clone)]
pub struct GeneratedWorld {
    size: u32,
    tilesets: Vec<String>,
}

impl GeneratedWorld {
    pub fn new(size: u32) -> Self {
        Self {
            size: size.max(1),
            tilesets: vec!["terrain".to_string(), "buildings".to_string()],
        }
    }

    fn map_at(&self, x: u32, y: u32) -> MapId {
        MapId(u64::from(y * self.size + x) + 1)
    }

    pub fn grid(&self) -> GameResult<Grid> {
        let cells = (0..self.size)
            .flat_map(|y| (0..self.size).map(move |x| (x, y)))
            .map(|(x, y)| Some(self.map_at(x, y)))
            .collect();
        Grid::new(self.size, self.size, cells)
    }

    pub fn spawn_map(&self) -> MapId {
        self.map_at(self.size / 2, self.size / 2)
    }

    pub fn contains(&self, id: MapId) -> bool {
        (1..=u64::from(self.size * self.size)).contains(&id.0)
    }

    pub fn map_data(&self, id: MapId) -> MapData {
        MapData {
            name: format!("Generated {id}"),
            music: (id == self.spawn_map()).then(|| "town".to_string()),
            layers: GENERATED_LAYERS,
            revision: 1,
        }
    }
}

/// A network collaborator that answers its own requests.
pub struct LoopbackServer {
    inbox: InboxSender,
    world: GeneratedWorld,
    connected: bool,
}

impl LoopbackServer {
    pub fn new(inbox: InboxSender, world: GeneratedWorld) -> Self {
        Self {
            inbox,
            world,
            connected: true,
        }
    }

    /// Drops the connection; every later send fails and the client is told the connection is gone.
    pub fn disconnect(&mut self) {
        if self.connected {
            self.connected = false;
            self.inbox.send(NetworkEvent::ConnectionLost);
        }
    }

    fn push(&self, event: NetworkEvent) -> Result<(), SendError> {
        if self.inbox.send(event) {
            Ok(())
        } else {
            Err(SendError::Disconnected)
        }
    }
}

impl Network for LoopbackServer {
    fn update(&mut self) {}

    fn send_enter_game(&mut self) -> Result<(), SendError> {
        if !self.connected {
            return Err(SendError::Disconnected);
        }
        info!("Loopback server accepted enter game");

        let grid = self.world.grid().map_err(|error| {
            warn!(%error, "Generated world has an invalid grid");
            SendError::Disconnected
        })?;
        let spawn = self.world.spawn_map();
        let player = Entity::new(EntityId(1), EntityKind::Player, "Player", spawn, IVec2::new(8, 8));
        let neighborhood: Vec<MapId> = grid
            .position_of(spawn)
            .map(|center| grid.neighborhood(center).map(|(_, id)| id).collect())
            .unwrap_or_default();

        self.push(NetworkEvent::JoinGame)?;
        self.push(NetworkEvent::GameData {
            tilesets: self.world.tilesets.clone(),
        })?;
        self.push(NetworkEvent::MapGrid(grid))?;
        for id in neighborhood {
            self.push(NetworkEvent::MapData {
                id,
                data: self.world.map_data(id),
            })?;
        }
        self.push(NetworkEvent::EntitySpawned {
            entity: player,
            local: true,
        })?;
        self.push(NetworkEvent::TimeSync(TimeSync {
            time_of_day_ms: 8 * 60 * 60 * 1_000,
            rate: 1.0,
        }))
    }

    fn send_need_map(&mut self, map: MapId) -> Result<(), SendError> {
        if !self.connected {
            return Err(SendError::Disconnected);
        }
        if !self.world.contains(map) {
            return Err(SendError::Rejected(map));
        }
        trace!(%map, "Loopback server sending map");
        self.push(NetworkEvent::MapData {
            id: map,
            data: self.world.map_data(map),
        })
    }

    fn send_logout(&mut self, character_select: bool) -> Result<(), SendError> {
        info!(character_select, "Loopback server received logout");
        Ok(())
    }
}

/// Pretends to composite one layer per step.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    render_targets: u32,
}

impl Renderer for HeadlessRenderer {
    fn create_map_render_targets(&mut self, tile_budget: u32) {
        debug!(tile_budget, "Creating map render targets");
        self.render_targets = tile_budget;
    }

    fn pre_render_step(&mut self, map: MapId, data: &MapData, progress: &mut RenderProgress) -> PreRenderStep {
        if self.render_targets == 0 {
            return PreRenderStep::Failed;
        }
        if progress.layers_done < data.layers {
            progress.layers_done += 1;
            trace!(%map, layers_done = progress.layers_done, "Composited layer");
        }
        if progress.layers_done >= data.layers {
            PreRenderStep::Finished
        } else {
            PreRenderStep::Progressed
        }
    }

    fn release_map_textures(&mut self, map: MapId) {
        trace!(%map, "Released map textures");
    }

    fn update_player_light(&mut self, _player: Option<&Entity>) {}
}

#[derive(Debug, Default)]
pub struct HeadlessAudio;

impl AudioBackend for HeadlessAudio {
    fn play_music(&mut self, track: &str, fade_in_secs: f32, fade_out_secs: f32, looped: bool) {
        info!(track, fade_in_secs, fade_out_secs, looped, "Music started");
    }

    fn stop_music(&mut self, fade_secs: f32) {
        info!(fade_secs, "Music stopped");
    }

    fn set_volume(&mut self, volume: u8) {
        trace!(volume, "Volume set");
    }

    fn update(&mut self) {}
}

/// Keeps the most recent error messages instead of showing them.
#[derive(Debug, Default)]
pub struct HeadlessUi {
    errors: CircularBuffer<ERROR_LOG_SIZE, (String, String)>,
    input_enabled: bool,
    menu_open: bool,
}

impl HeadlessUi {
    pub fn errors(&self) -> impl Iterator<Item = &(String, String)> {
        self.errors.iter()
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    pub fn is_input_enabled(&self) -> bool {
        self.input_enabled
    }
}

impl Ui for HeadlessUi {
    fn set_input_enabled(&mut self, enabled: bool) {
        if self.input_enabled != enabled {
            debug!(enabled, "Input routing toggled");
            self.input_enabled = enabled;
        }
    }

    fn push_error(&mut self, title: &str, body: &str) {
        warn!(title, body, "Error message");
        self.errors.push_back((title.to_string(), body.to_string()));
    }

    fn destroy_menu(&mut self) {
        self.menu_open = false;
    }

    fn init_menu(&mut self) {
        self.menu_open = true;
    }
}

/// Resolves textures from a fixed set of names, plus any tilesets loaded later.
#[derive(Debug, Default)]
pub struct HeadlessContent {
    textures: HashSet<(TextureKind, String)>,
}

impl HeadlessContent {
    pub fn with_images<'a>(images: impl IntoIterator<Item = &'a String>) -> Self {
        Self {
            textures: images.into_iter().map(|name| (TextureKind::Image, name.clone())).collect(),
        }
    }
}

impl Content for HeadlessContent {
    fn load_tilesets(&mut self, names: &[String]) {
        info!(count = names.len(), "Loaded tilesets");
        self.textures
            .extend(names.iter().map(|name| (TextureKind::Tileset, name.clone())));
    }

    fn has_texture(&self, kind: TextureKind, name: &str) -> bool {
        self.textures.contains(&(kind, name.to_string()))
    }
}

/// Fades complete immediately.
#[derive(Debug, Default)]
pub struct InstantFade;

impl Fade for InstantFade {
    fn update(&mut self) {}

    fn fade_in(&mut self) {
        trace!("Fade in");
    }

    fn fade_out(&mut self) {
        trace!("Fade out");
    }

    fn done_fading(&self) -> bool {
        true
    }
}

#[derive(Debug, Default)]
pub struct NoInput;

impl Input for NoInput {
    fn update(&mut self) {}
}

/// Assembles a headless platform around `network`, timed by the system clock.
pub fn platform(network: Box<dyn Network>, intro_images: &[String]) -> Platform {
    Platform {
        network,
        renderer: Box::new(HeadlessRenderer::default()),
        audio: Audio::new(Box::new(HeadlessAudio)),
        ui: Box::new(HeadlessUi::default()),
        content: Box::new(HeadlessContent::with_images(intro_images)),
        fade: Box::new(InstantFade),
        input: Box::new(NoInput),
        clock: Box::new(SystemClock::new()),
    }
}
