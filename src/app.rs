use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::constants::LOOP_TIME;
use crate::formatter;
use crate::game::FrameScheduler;
use crate::state::ClientState;

/// Frames between two frame-time summaries.
const SUMMARY_PERIOD: u64 = 60 * 60;

/// Drives a [`FrameScheduler`] at a fixed frame rate.
pub struct App {
    scheduler: FrameScheduler,
    frames: u64,
    period_start: Instant,
    period_sleep: Duration,
}

impl App {
    pub fn new(scheduler: FrameScheduler) -> Self {
        Self {
            scheduler,
            frames: 0,
            period_start: Instant::now(),
            period_sleep: Duration::ZERO,
        }
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Runs one frame and sleeps out the rest of the frame time.
    ///
    /// Returns false once the client has entered the error state.
    pub fn run(&mut self) -> bool {
        let start = Instant::now();

        self.scheduler.tick();
        formatter::increment_frame();
        self.frames += 1;

        let elapsed = start.elapsed();
        if elapsed < LOOP_TIME {
            let remaining = LOOP_TIME - elapsed;
            spin_sleep::sleep(remaining);
            self.period_sleep += remaining;
        } else {
            warn!("Frame loop behind schedule by: {:?}", elapsed - LOOP_TIME);
        }

        if self.frames % SUMMARY_PERIOD == 0 {
            let average_fps = SUMMARY_PERIOD as f32 / self.period_start.elapsed().as_secs_f32();
            let average_work = LOOP_TIME.saturating_sub(self.period_sleep / SUMMARY_PERIOD as u32);
            debug!(average_fps, ?average_work, "Frame time summary");
            self.period_start = Instant::now();
            self.period_sleep = Duration::ZERO;
        }

        if self.scheduler.state() == ClientState::Error {
            info!(frames = self.frames, "Client entered the error state, stopping");
            return false;
        }
        true
    }
}
