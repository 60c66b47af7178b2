use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_INTRO_DELAY_MS, DEFAULT_MAP_REQUEST_TIMEOUT_MS, DEFAULT_MUSIC_FADE_SECS};
use crate::error::ConfigError;

/// Prefix for environment variables that override [`ClientOptions`].
pub const ENV_PREFIX: &str = "TILEWORLD_";

/// User-facing strings surfaced by the client itself.
///
/// Full localization tables live with the UI; only the messages the frame loop
/// raises on its own are kept here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Strings {
    pub lost_connection_title: String,
    pub lost_connection_body: String,
}

impl Default for Strings {
    fn default() -> Self {
        Self {
            lost_connection_title: String::new(),
            lost_connection_body: "Lost connection to the game server.".to_string(),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Images shown, in order, before the menu
    pub intro_images: Vec<String>,
    /// How long each intro image is held once it has faded in
    pub intro_delay_ms: u64,
    /// Pre-render maps into cached textures instead of compositing every frame
    pub render_cache: bool,
    /// Track played on the menu, if any
    pub menu_music: Option<String>,
    /// Fade used when starting or stopping music
    pub music_fade_secs: f32,
    /// Minimum time between two "need map" requests for the same map
    pub map_request_timeout_ms: u64,
    pub strings: Strings,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            intro_images: Vec::new(),
            intro_delay_ms: DEFAULT_INTRO_DELAY_MS,
            render_cache: true,
            menu_music: None,
            music_fade_secs: DEFAULT_MUSIC_FADE_SECS,
            map_request_timeout_ms: DEFAULT_MAP_REQUEST_TIMEOUT_MS,
            strings: Strings::default(),
        }
    }
}

impl ClientOptions {
    /// Rejects values the frame loop cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map_request_timeout_ms == 0 {
            return Err(ConfigError::ZeroRequestTimeout);
        }
        if !self.music_fade_secs.is_finite() || self.music_fade_secs < 0.0 {
            return Err(ConfigError::InvalidFade(self.music_fade_secs));
        }
        Ok(())
    }

    /// Builds the layered configuration: defaults, then `TILEWORLD_*` environment variables.
    ///
    /// Nested keys use a double underscore, e.g. `TILEWORLD_STRINGS__LOST_CONNECTION_BODY`.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(ClientOptions::default())).merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extracts and validates options from a prepared [`Figment`].
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let options: ClientOptions = figment.extract()?;
        options.validate()?;
        Ok(options)
    }
}

pub fn load_config() -> Result<ClientOptions, ConfigError> {
    ClientOptions::from_figment(ClientOptions::figment())
}
