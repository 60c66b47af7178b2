//! This module contains all the constants used by the client.

use std::time::Duration;

/// Target duration of a single frame.
pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);

/// Milliseconds between ambient animation frame advances.
pub const ANIMATION_FRAME_INTERVAL_MS: u64 = 500;
/// Number of ambient animation frames; the counter wraps back to 0 after the last one.
pub const ANIMATION_FRAME_COUNT: u8 = 3;

/// Default time a "need map" request stays outstanding before it may be repeated.
pub const DEFAULT_MAP_REQUEST_TIMEOUT_MS: u64 = 2_000;

/// Width and height of the neighborhood kept ready around the local entity's map.
pub const NEIGHBORHOOD_SIZE: i32 = 3;

/// Maps rendered per neighborhood.
pub const NEIGHBORHOOD_MAPS: u32 = (NEIGHBORHOOD_SIZE * NEIGHBORHOOD_SIZE) as u32;
/// Render target layers reserved per cached map.
pub const LAYERS_PER_MAP: u32 = 18;
/// Number of map render targets allocated when the render cache is enabled.
pub const MAP_TEXTURE_BUDGET: u32 = NEIGHBORHOOD_MAPS * LAYERS_PER_MAP;

/// Default fade applied when starting or stopping music, in seconds.
pub const DEFAULT_MUSIC_FADE_SECS: f32 = 3.0;
/// Default time each intro image is held on screen.
pub const DEFAULT_INTRO_DELAY_MS: u64 = 2_000;

/// Time an entity takes to walk a single tile.
pub const ENTITY_MOVE_TIME_MS: u64 = 250;
/// Number of walk animation frames per direction.
pub const ENTITY_WALK_FRAMES: u8 = 4;

/// Maximum number of entities that can be marked for disposal in a single frame.
pub const DISPOSAL_QUEUE_CAPACITY: usize = 1024;

/// Milliseconds in a full in-game day.
pub const DAY_LENGTH_MS: u64 = 24 * 60 * 60 * 1_000;
