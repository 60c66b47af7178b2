//! The frame loop: one locked tick that applies network traffic and dispatches on [`ClientState`].

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, error, info, trace, warn};

use crate::config::ClientOptions;
use crate::constants::MAP_TEXTURE_BUDGET;
use crate::events::{Inbox, InboxSender, NetworkEvent};
use crate::holds::PendingEvents;
use crate::map::streaming::{self, Readiness};
use crate::map::{Grid, MapData, MapId, Released};
use crate::platform::{Platform, TextureKind};
use crate::session::Session;
use crate::state::{ClientState, FadeRequest};

/// The client: options, session state and every collaborator it drives.
pub struct Client {
    options: ClientOptions,
    session: Session,
    platform: Platform,
    inbox: Inbox,
    created_map_textures: bool,
    loaded_tilesets: bool,
}

impl Client {
    /// `inbox` is the intake the platform's network producers were given senders for.
    pub fn new(options: ClientOptions, inbox: Inbox, platform: Platform) -> Self {
        let session = Session::new(&options);
        Self {
            options,
            session,
            platform,
            inbox,
            created_map_textures: false,
            loaded_tilesets: false,
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut Platform {
        &mut self.platform
    }

    pub fn state(&self) -> ClientState {
        self.session.state
    }

    /// A handle network producers use to queue inbound events for the next tick.
    pub fn inbox_sender(&self) -> InboxSender {
        self.inbox.sender()
    }

    /// Called by the menu when the player chooses to enter the game.
    pub fn request_join(&mut self) {
        debug!("Join requested");
        self.session.join_requested = true;
    }

    pub fn logout(&mut self, character_select: bool) {
        self.session.logout(&mut self.platform, &self.options, character_select);
    }

    /// Runs a single frame.
    pub fn update(&mut self) {
        let now = self.platform.now_ms();

        self.platform.network.update();
        for event in self.inbox.drain() {
            self.apply_network_event(event, now);
        }
        self.platform.fade.update();
        self.platform.ui.set_input_enabled(self.session.state != ClientState::Intro);

        match self.session.state {
            ClientState::Intro => self.process_intro(now),
            ClientState::Menu => self.process_menu(),
            ClientState::Loading => self.process_loading(),
            ClientState::InGame => self.process_in_game(now),
            ClientState::Error => {}
        }

        self.platform.input.update();
        self.platform.audio.update();
    }

    fn transition(&mut self, to: ClientState) {
        let from = self.session.state;
        if from != to {
            info!("ClientState transition from {from} to {to}");
            self.session.state = to;
        }
    }

    fn enter_menu(&mut self) {
        self.transition(ClientState::Menu);
        if let Some(track) = self.options.menu_music.as_deref() {
            let fade = self.options.music_fade_secs;
            self.platform.audio.play_music(track, fade, fade, true);
        }
    }

    fn process_intro(&mut self, now: u64) {
        let index = self.session.intro.index();
        let Some(image) = self.options.intro_images.get(index) else {
            self.enter_menu();
            return;
        };

        if self.platform.content.has_texture(TextureKind::Image, image) {
            let fade_done = self.platform.fade.done_fading();
            match self.session.intro.advance(now, self.options.intro_delay_ms, fade_done) {
                Some(FadeRequest::In) => self.platform.fade.fade_in(),
                Some(FadeRequest::Out) => self.platform.fade.fade_out(),
                None => {}
            }
        } else {
            debug!(%image, "Intro image missing, skipping");
            self.session.intro.skip();
        }

        if self.session.intro.is_finished(self.options.intro_images.len()) {
            self.enter_menu();
        }
    }

    fn process_menu(&mut self) {
        if !self.session.join_requested {
            return;
        }

        self.transition(ClientState::Loading);
        self.platform.ui.destroy_menu();
        match self.platform.network.send_enter_game() {
            Ok(()) => self.session.waiting_on_server = true,
            Err(error) => warn!(%error, "Failed to send enter game"),
        }
    }

    fn process_loading(&mut self) {
        if !self.created_map_textures {
            if self.options.render_cache {
                self.platform.renderer.create_map_render_targets(MAP_TEXTURE_BUDGET);
            }
            self.created_map_textures = true;
        }
        if !self.loaded_tilesets && self.session.has_game_data {
            debug!(count = self.session.tilesets.len(), "Loading tilesets");
            self.platform.content.load_tilesets(&self.session.tilesets);
            self.loaded_tilesets = true;
        }

        let Some(local_map) = self.session.local_map() else {
            return;
        };
        let music = local_map.music().map(str::to_string);

        let readiness = streaming::check_strict(
            Some(local_map.id()),
            &self.session.grid,
            &self.session.maps,
            self.platform.renderer.as_mut(),
            self.options.render_cache,
        );
        if let Readiness::Waiting(gap) = readiness {
            trace!(?gap, "Neighborhood not ready");
            return;
        }

        let fade = self.options.music_fade_secs;
        match music {
            Some(track) => self.platform.audio.play_music(&track, fade, fade, true),
            None => self.platform.audio.stop_music(fade),
        }
        self.session.needs_maps = false;
        self.transition(ClientState::InGame);
        self.platform.fade.fade_in();
    }

    fn process_in_game(&mut self, now: u64) {
        if self.session.connection_lost {
            self.logout(false);
            let strings = &self.options.strings;
            self.platform
                .ui
                .push_error(&strings.lost_connection_title, &strings.lost_connection_body);
            self.session.connection_lost = false;
            return;
        }

        let report = streaming::update_relaxed(
            self.session.local_map_id(),
            &self.session.grid,
            &mut self.session.maps,
            self.platform.network.as_mut(),
            self.platform.renderer.as_mut(),
            self.options.render_cache,
            now,
        );
        let needs_maps = !report.can_show_world;
        if needs_maps != self.session.needs_maps {
            info!(needs_maps, "Neighborhood readiness changed");
            self.session.needs_maps = needs_maps;
        }

        if !self.session.needs_maps {
            self.session.entities.update_all(now);
            let removed = self.session.entities.sweep(self.session.local_player);
            if !removed.is_empty() {
                debug!(count = removed.len(), "Disposed entities");
            }

            let center = self.session.local_map().and_then(|map| map.grid_position());
            for map in self.session.maps.iter_mut().filter(|map| map.is_loaded()) {
                let in_view = center
                    .zip(map.grid_position())
                    .is_some_and(|(center, position)| Grid::is_neighbor(center, position));
                map.update(now, in_view);
            }
        }

        if self.session.animation.advance(now) {
            trace!(frame = self.session.animation.frame(), "Animation frame");
        }

        let maps = &self.session.maps;
        self.session.holds.purge_stale(|id| maps.contains(id));

        self.platform.renderer.update_player_light(self.session.local_entity());
        self.session.world_clock.update(now);
    }

    fn apply_network_event(&mut self, event: NetworkEvent, now: u64) {
        let state = self.session.state;
        if event.is_world_delta() && !matches!(state, ClientState::Loading | ClientState::InGame) {
            debug!(%state, ?event, "Dropping world update outside of the game");
            return;
        }

        match event {
            NetworkEvent::JoinGame => {
                self.session.waiting_on_server = false;
                self.session.join_game(&mut self.platform, &self.options);
            }
            NetworkEvent::GameData { tilesets } => {
                self.session.tilesets = tilesets;
                self.session.has_game_data = true;
            }
            NetworkEvent::MapGrid(grid) => self.apply_grid(grid),
            NetworkEvent::MapData { id, data } => self.apply_map(id, data),
            NetworkEvent::EntitySpawned { entity, local } => {
                let id = entity.id();
                if local {
                    debug!(entity = %id, map = %entity.map(), "Local player spawned");
                    self.session.local_player = Some(id);
                }
                self.session.entities.insert(entity);
            }
            NetworkEvent::EntityMoved {
                id,
                map,
                tile,
                direction,
            } => match self.session.entities.get_mut(id) {
                Some(entity) => entity.move_to(map, tile, direction, now),
                None => trace!(entity = %id, "Move for unknown entity"),
            },
            NetworkEvent::EntityLeft(id) => {
                self.session.entities.mark_for_disposal(id);
            }
            NetworkEvent::EventHold { key, map } => self.session.holds.insert(key, map),
            NetworkEvent::EventHoldReleased(key) => {
                self.session.holds.release(key);
            }
            NetworkEvent::EventDialog(dialog) => self.session.dialogs.push(dialog),
            NetworkEvent::MapEvents { map, events } => {
                if !self.is_in_window(map) {
                    debug!(%map, count = events.len(), "Dropping events for a map outside the grid");
                } else if let Some(instance) = self.session.maps.get_mut(map).filter(|instance| instance.is_loaded()) {
                    instance.add_events(events);
                } else {
                    self.session.pending_events.push(PendingEvents { map, events });
                }
            }
            NetworkEvent::TimeSync(sync) => self.session.world_clock.sync(sync, now),
            NetworkEvent::ConnectionLost => {
                warn!("Connection to the server lost");
                self.session.connection_lost = true;
            }
            NetworkEvent::Fatal { reason } => {
                error!(%reason, "Fatal error reported by the network layer");
                self.transition(ClientState::Error);
            }
        }
    }

    /// Replaces the grid window, evicting maps that left it. The local player's map is never evicted.
    fn apply_grid(&mut self, grid: Grid) {
        let local = self.session.local_map_id();
        let evicted: Vec<MapId> = self
            .session
            .maps
            .ids()
            .filter(|id| !grid.contains(*id) && Some(*id) != local)
            .collect();

        for id in evicted {
            if let Some(mut map) = self.session.maps.remove(id) {
                if map.dispose(Released::all()).contains(Released::TEXTURES) {
                    self.platform.renderer.release_map_textures(id);
                }
                debug!(map = %id, "Evicted map outside the grid");
            }
        }
        self.session.maps.requests_mut().retain(|id| grid.contains(id));
        self.session
            .pending_events
            .retain(|pending| grid.contains(pending.map) || Some(pending.map) == local);
        self.session.maps.reposition(&grid);

        debug!(width = grid.width(), height = grid.height(), "Grid updated");
        self.session.grid = grid;
    }

    /// Whether `map` belongs to the current window. Everything does until the first grid arrives.
    fn is_in_window(&self, map: MapId) -> bool {
        self.session.grid.is_empty() || self.session.grid.contains(map) || self.session.local_map_id() == Some(map)
    }

    fn apply_map(&mut self, id: MapId, data: MapData) {
        let map = self.session.maps.insert_loaded(id, data, &self.session.grid);
        let pending = std::mem::take(&mut self.session.pending_events);
        let (ready, waiting): (Vec<_>, Vec<_>) = pending.into_iter().partition(|pending| pending.map == id);
        for pending in ready {
            map.add_events(pending.events);
        }
        self.session.pending_events = waiting;
        debug!(map = %id, "Map received");
    }
}

/// Serializes every frame and every outside access to the [`Client`] behind one lock.
///
/// Map render locks are only ever taken while this lock is held.
#[derive(Clone)]
pub struct FrameScheduler {
    client: Arc<Mutex<Client>>,
}

impl FrameScheduler {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(Mutex::new(client)),
        }
    }

    /// Runs one frame under the lock.
    pub fn tick(&self) {
        self.client.lock().update();
    }

    /// Runs `f` with exclusive access to the client, between frames.
    pub fn with<R>(&self, f: impl FnOnce(&mut Client) -> R) -> R {
        f(&mut self.client.lock())
    }

    pub fn state(&self) -> ClientState {
        self.client.lock().state()
    }

    pub fn inbox_sender(&self) -> InboxSender {
        self.client.lock().inbox_sender()
    }
}
