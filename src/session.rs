//! Session state shared by every state handler, and the join/logout sequences that reset it.

use tracing::{info, warn};

use crate::config::ClientOptions;
use crate::entity::{Entity, EntityId, EntityRegistry};
use crate::holds::{EventDialog, EventHolds, PendingEvents};
use crate::map::{Grid, MapId, MapInstance, MapInstanceCache, Released};
use crate::platform::Platform;
use crate::state::{AnimationTimer, ClientState, IntroSequence};
use crate::world_time::WorldClock;

/// Everything the frame loop knows about the current session.
///
/// Owned by the [`Client`](crate::game::Client) and only touched from inside the locked tick.
#[derive(Debug)]
pub struct Session {
    pub state: ClientState,
    pub intro: IntroSequence,
    pub logged_in: bool,
    pub waiting_on_server: bool,
    /// Set by the menu when the player asks to enter the game.
    pub join_requested: bool,
    /// True while the neighborhood around the local player is not ready to be shown.
    pub needs_maps: bool,
    pub connection_lost: bool,
    pub has_game_data: bool,
    pub local_player: Option<EntityId>,
    pub tilesets: Vec<String>,
    pub maps: MapInstanceCache,
    pub grid: Grid,
    pub entities: EntityRegistry,
    pub holds: EventHolds,
    pub dialogs: Vec<EventDialog>,
    pub pending_events: Vec<PendingEvents>,
    pub animation: AnimationTimer,
    pub world_clock: WorldClock,
}

impl Session {
    pub fn new(options: &ClientOptions) -> Self {
        Self {
            state: ClientState::default(),
            intro: IntroSequence::default(),
            logged_in: false,
            waiting_on_server: false,
            join_requested: false,
            needs_maps: true,
            connection_lost: false,
            has_game_data: false,
            local_player: None,
            tilesets: Vec::new(),
            maps: MapInstanceCache::new(options.map_request_timeout_ms),
            grid: Grid::default(),
            entities: EntityRegistry::new(),
            holds: EventHolds::new(),
            dialogs: Vec::new(),
            pending_events: Vec::new(),
            animation: AnimationTimer::default(),
            world_clock: WorldClock::new(),
        }
    }

    pub fn local_entity(&self) -> Option<&Entity> {
        self.local_player.and_then(|id| self.entities.get(id))
    }

    /// The map the local player currently stands on, whether or not it has arrived.
    pub fn local_map_id(&self) -> Option<MapId> {
        self.local_entity().map(Entity::map)
    }

    pub fn local_map(&self) -> Option<&MapInstance> {
        self.local_map_id().and_then(|id| self.maps.get(id))
    }

    /// Marks the session as joined and fades out the menu music.
    pub fn join_game(&mut self, platform: &mut Platform, options: &ClientOptions) {
        info!("Joined game");
        self.logged_in = true;
        platform.audio.stop_music(options.music_fade_secs);
    }

    /// Tears the session down and returns to the menu.
    ///
    /// Must run while the frame lock is held so no tick observes a partially cleared session.
    pub fn logout(&mut self, platform: &mut Platform, options: &ClientOptions, character_select: bool) {
        info!(character_select, "Logging out");
        platform.audio.stop_music(options.music_fade_secs);
        platform.fade.fade_out();
        if let Err(error) = platform.network.send_logout(character_select) {
            warn!(%error, "Failed to send logout");
        }

        self.logged_in = false;
        self.waiting_on_server = false;
        self.state = ClientState::Menu;
        self.join_requested = false;
        self.needs_maps = true;
        self.local_player = None;
        self.has_game_data = false;

        let mut disposed_maps = 0;
        for mut map in self.maps.drain() {
            if map.dispose(Released::all()).contains(Released::TEXTURES) {
                platform.renderer.release_map_textures(map.id());
            }
            disposed_maps += 1;
        }
        let disposed_entities = self.entities.dispose_all();

        self.tilesets.clear();
        self.grid.clear();
        self.holds.clear();
        self.dialogs.clear();
        self.pending_events.clear();
        self.world_clock.reset();
        info!(disposed_maps, disposed_entities, "Session cleared");

        platform.ui.init_menu();
        platform.fade.fade_in();
    }

    /// Whether every session collection is empty.
    pub fn is_cleared(&self) -> bool {
        self.maps.is_empty()
            && self.maps.requests().is_empty()
            && self.entities.is_empty()
            && self.grid.is_empty()
            && self.holds.is_empty()
            && self.dialogs.is_empty()
            && self.pending_events.is_empty()
    }
}
