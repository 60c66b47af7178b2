//! Narrow interfaces to the subsystems the frame loop drives but does not implement.
//!
//! Graphics, audio mixing, network transport, GUI, fades and input polling all live behind
//! these traits. [`headless`] provides implementations that only log, plus a loopback server,
//! so the loop can run without any of them.

use strum_macros::{Display, EnumIter};

use crate::audio::Audio;
use crate::clock::Clock;
use crate::entity::Entity;
use crate::error::SendError;
use crate::map::{MapData, MapId, RenderProgress};

pub mod headless;

/// Outbound side of the network layer. Inbound traffic arrives through the [`Inbox`](crate::events::Inbox).
pub trait Network: Send {
    /// Pumps the transport once per frame.
    fn update(&mut self);

    fn send_enter_game(&mut self) -> Result<(), SendError>;

    fn send_need_map(&mut self, map: MapId) -> Result<(), SendError>;

    fn send_logout(&mut self, character_select: bool) -> Result<(), SendError>;
}

/// Outcome of a single pre-render step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreRenderStep {
    /// Some work was done and more remains.
    Progressed,
    /// The map's render cache is complete.
    Finished,
    /// No progress could be made this frame (e.g. no free render targets).
    Failed,
}

pub trait Renderer: Send {
    fn create_map_render_targets(&mut self, tile_budget: u32);

    /// Composites the next slice of `map` into its cached texture.
    ///
    /// Called with the map's render lock held; implementations must not query the map back.
    fn pre_render_step(&mut self, map: MapId, data: &MapData, progress: &mut RenderProgress) -> PreRenderStep;

    fn release_map_textures(&mut self, map: MapId);

    fn update_player_light(&mut self, player: Option<&Entity>);
}

pub trait AudioBackend: Send {
    fn play_music(&mut self, track: &str, fade_in_secs: f32, fade_out_secs: f32, looped: bool);

    fn stop_music(&mut self, fade_secs: f32);

    fn set_volume(&mut self, volume: u8);

    fn update(&mut self);
}

pub trait Ui: Send {
    fn set_input_enabled(&mut self, enabled: bool);

    fn push_error(&mut self, title: &str, body: &str);

    fn destroy_menu(&mut self);

    fn init_menu(&mut self);
}

/// Kinds of textures the content manager can resolve by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum TextureKind {
    Image,
    Tileset,
    Entity,
    Gui,
}

pub trait Content: Send {
    fn load_tilesets(&mut self, names: &[String]);

    fn has_texture(&self, kind: TextureKind, name: &str) -> bool;
}

pub trait Fade: Send {
    fn update(&mut self);

    fn fade_in(&mut self);

    fn fade_out(&mut self);

    fn done_fading(&self) -> bool;
}

pub trait Input: Send {
    fn update(&mut self);
}

/// Every collaborator the client talks to, owned by the client and only touched inside the tick.
pub struct Platform {
    pub network: Box<dyn Network>,
    pub renderer: Box<dyn Renderer>,
    pub audio: Audio,
    pub ui: Box<dyn Ui>,
    pub content: Box<dyn Content>,
    pub fade: Box<dyn Fade>,
    pub input: Box<dyn Input>,
    pub clock: Box<dyn Clock>,
}

impl Platform {
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}
