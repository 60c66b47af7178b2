//! Top-level client states and the small timed sequences driven by the frame scheduler.

use strum_macros::{Display, EnumIter};
use tracing::trace;

use crate::constants::{ANIMATION_FRAME_COUNT, ANIMATION_FRAME_INTERVAL_MS};

/// The high-level state of the client. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter)]
pub enum ClientState {
    /// Splash images are being shown.
    #[default]
    Intro,
    /// Waiting on the player to enter the game.
    Menu,
    /// Waiting for the maps around the local player to arrive and be cached.
    Loading,
    InGame,
    /// A fatal condition was reported; nothing is processed any more.
    Error,
}

/// Where the current intro image is in its fade cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntroPhase {
    /// Fading in; the hold timer has not started.
    #[default]
    FadingIn,
    /// Fully shown since the given time.
    Holding { since_ms: u64 },
    /// Fading out towards the next image.
    FadingOut,
}

/// A fade the intro wants started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeRequest {
    In,
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntroSequence {
    index: usize,
    phase: IntroPhase,
}

impl IntroSequence {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phase(&self) -> IntroPhase {
        self.phase
    }

    /// Whether every one of `count` images has been shown.
    pub fn is_finished(&self, count: usize) -> bool {
        self.index >= count
    }

    /// Moves straight to the next image without any timing.
    pub fn skip(&mut self) {
        self.index += 1;
        self.phase = IntroPhase::FadingIn;
    }

    /// Advances the current image by one frame.
    ///
    /// Returns the fade that must be started for this transition, if any.
    pub fn advance(&mut self, now_ms: u64, delay_ms: u64, fade_done: bool) -> Option<FadeRequest> {
        let from = self.phase;
        let request = match self.phase {
            IntroPhase::FadingIn if fade_done => {
                self.phase = IntroPhase::Holding { since_ms: now_ms };
                None
            }
            IntroPhase::Holding { since_ms } if now_ms > since_ms + delay_ms => {
                self.phase = IntroPhase::FadingOut;
                Some(FadeRequest::Out)
            }
            IntroPhase::FadingOut if fade_done => {
                self.index += 1;
                self.phase = IntroPhase::FadingIn;
                Some(FadeRequest::In)
            }
            _ => None,
        };
        if from != self.phase {
            trace!(index = self.index, ?from, to = ?self.phase, "Intro phase transition");
        }
        request
    }
}

/// The shared ambient animation frame, advanced on a fixed wall-clock cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimationTimer {
    frame: u8,
    next_at_ms: u64,
}

impl AnimationTimer {
    pub fn frame(&self) -> u8 {
        self.frame
    }

    /// Advances the frame once the interval has passed. Returns whether it advanced.
    pub fn advance(&mut self, now_ms: u64) -> bool {
        if self.next_at_ms >= now_ms {
            return false;
        }
        self.frame = (self.frame + 1) % ANIMATION_FRAME_COUNT;
        self.next_at_ms = now_ms + ANIMATION_FRAME_INTERVAL_MS;
        true
    }
}
