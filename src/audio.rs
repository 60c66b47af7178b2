//! This module handles music playback for the client.

use tracing::{debug, trace};

use crate::platform::AudioBackend;

const DEFAULT_VOLUME: u8 = 64;

/// The music player for the client.
///
/// Wraps an [`AudioBackend`] and remembers which track is playing so the same track is never
/// restarted. If no backend is available, audio is disabled and all functions silently do nothing.
pub struct Audio {
    backend: Option<Box<dyn AudioBackend>>,
    current_track: Option<String>,
}

impl Audio {
    pub fn new(mut backend: Box<dyn AudioBackend>) -> Self {
        backend.set_volume(DEFAULT_VOLUME);
        Self {
            backend: Some(backend),
            current_track: None,
        }
    }

    /// An audio player with no backend; every call is a no-op.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            current_track: None,
        }
    }

    /// Starts `track`, crossfading from whatever was playing.
    ///
    /// Does nothing if `track` is already the current track.
    pub fn play_music(&mut self, track: &str, fade_in_secs: f32, fade_out_secs: f32, looped: bool) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };

        if self.current_track.as_deref() == Some(track) {
            trace!(track, "Track already playing");
            return;
        }

        debug!(track, fade_in_secs, fade_out_secs, looped, "Playing music");
        backend.play_music(track, fade_in_secs, fade_out_secs, looped);
        self.current_track = Some(track.to_string());
    }

    /// Fades out the current track, if any.
    pub fn stop_music(&mut self, fade_secs: f32) {
        let Some(backend) = self.backend.as_mut() else {
            return;
        };

        if let Some(track) = self.current_track.take() {
            debug!(%track, fade_secs, "Stopping music");
            backend.stop_music(fade_secs);
        }
    }

    pub fn current_track(&self) -> Option<&str> {
        self.current_track.as_deref()
    }

    pub fn update(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            backend.update();
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.backend.is_none()
    }
}
