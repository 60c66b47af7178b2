//! A single loaded map and its render cache state.

use bitflags::bitflags;
use glam::IVec2;
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::holds::EventId;
use crate::map::MapId;
use crate::platform::{PreRenderStep, Renderer};

/// Map payload delivered by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MapData {
    pub name: String,
    /// Track to play while the local player is on this map.
    pub music: Option<String>,
    /// Number of tile layers composited into the render cache.
    pub layers: u32,
    pub revision: u32,
}

bitflags! {
    /// Resources a map holds outside of the cache itself.
    ///
    /// Disposal releases each of these at most once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Released: u8 {
        /// Pre-rendered textures owned by the renderer.
        const TEXTURES = 1 << 0;
        /// The server-side subscription for this map's updates.
        const REGISTRATION = 1 << 1;
    }
}

/// Progress of an in-flight pre-render, owned by the map and advanced by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderProgress {
    pub layers_done: u32,
}

#[derive(Debug, Default)]
struct RenderState {
    rendered: bool,
    progress: RenderProgress,
}

/// A tile map known to the client.
///
/// The render state sits behind its own lock so its `rendered` flag is never observed halfway
/// through a pre-render. That lock is only ever taken while the caller already holds the
/// frame lock, never the other way around.
#[derive(Debug)]
pub struct MapInstance {
    id: MapId,
    grid_position: Option<IVec2>,
    data: MapData,
    loaded: bool,
    render: Mutex<RenderState>,
    released: Released,
    events: Vec<EventId>,
    in_view: bool,
    last_update_ms: Option<u64>,
}

impl MapInstance {
    /// Creates a map whose payload has not arrived yet.
    pub fn pending(id: MapId) -> Self {
        Self {
            id,
            grid_position: None,
            data: MapData::default(),
            loaded: false,
            render: Mutex::new(RenderState::default()),
            released: Released::empty(),
            events: Vec::new(),
            in_view: false,
            last_update_ms: None,
        }
    }

    /// Creates a map from a freshly received payload.
    pub fn loaded(id: MapId, data: MapData) -> Self {
        let mut map = Self::pending(id);
        map.load(data);
        map
    }

    /// Replaces the payload; any cached render is stale afterwards.
    pub fn load(&mut self, data: MapData) {
        self.data = data;
        self.loaded = true;
        self.released = Released::empty();
        *self.render.get_mut() = RenderState::default();
    }

    pub fn id(&self) -> MapId {
        self.id
    }

    pub fn data(&self) -> &MapData {
        &self.data
    }

    pub fn music(&self) -> Option<&str> {
        self.data.music.as_deref()
    }

    pub fn grid_position(&self) -> Option<IVec2> {
        self.grid_position
    }

    pub fn set_grid_position(&mut self, position: Option<IVec2>) {
        self.grid_position = position;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_rendered(&self) -> bool {
        self.render.lock().rendered
    }

    pub fn released(&self) -> Released {
        self.released
    }

    pub fn is_in_view(&self) -> bool {
        self.in_view
    }

    pub fn last_update_ms(&self) -> Option<u64> {
        self.last_update_ms
    }

    pub fn events(&self) -> &[EventId] {
        &self.events
    }

    pub fn add_events(&mut self, events: impl IntoIterator<Item = EventId>) {
        for event in events {
            if !self.events.contains(&event) {
                self.events.push(event);
            }
        }
    }

    /// Pre-renders this map until it is fully cached or a step fails.
    ///
    /// Holds the map's render lock for the whole loop. Returns whether the map is rendered.
    /// An unloaded map is never rendered.
    pub fn pre_render(&self, renderer: &mut dyn Renderer) -> bool {
        if !self.loaded {
            return false;
        }

        let mut state = self.render.lock();
        while !state.rendered {
            match renderer.pre_render_step(self.id, &self.data, &mut state.progress) {
                PreRenderStep::Progressed => {
                    trace!(map = %self.id, layers_done = state.progress.layers_done, "Pre-render step");
                }
                PreRenderStep::Finished => {
                    debug!(map = %self.id, layers = state.progress.layers_done, "Map pre-rendered");
                    state.rendered = true;
                }
                PreRenderStep::Failed => {
                    debug!(map = %self.id, layers_done = state.progress.layers_done, "Pre-render stalled");
                    break;
                }
            }
        }
        state.rendered
    }

    /// Per-frame update.
    pub fn update(&mut self, now_ms: u64, in_view: bool) {
        self.in_view = in_view;
        self.last_update_ms = Some(now_ms);
    }

    /// Releases the requested resources, skipping anything already released.
    ///
    /// Returns the resources released by this call so the caller can notify their owners.
    pub fn dispose(&mut self, release: Released) -> Released {
        let newly = release - self.released;
        self.released |= newly;

        if newly.contains(Released::TEXTURES) {
            *self.render.get_mut() = RenderState::default();
        }
        if !newly.is_empty() {
            debug!(map = %self.id, released = ?newly, "Disposed map resources");
        }
        newly
    }
}
