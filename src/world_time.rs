use crate::constants::DAY_LENGTH_MS;

/// Time-of-day snapshot pushed by the server.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSync {
    pub time_of_day_ms: u64,
    /// Game milliseconds per real millisecond.
    pub rate: f32,
}

/// Local estimate of the server's time of day, advanced every in-game frame.
#[derive(Debug, Clone, Default)]
pub struct WorldClock {
    synced: Option<Synced>,
}

#[derive(Debug, Clone, Copy)]
struct Synced {
    base_ms: u64,
    rate: f32,
    synced_at_ms: u64,
    time_of_day_ms: u64,
}

impl WorldClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync(&mut self, sync: TimeSync, now_ms: u64) {
        let base_ms = sync.time_of_day_ms % DAY_LENGTH_MS;
        self.synced = Some(Synced {
            base_ms,
            rate: sync.rate.max(0.0),
            synced_at_ms: now_ms,
            time_of_day_ms: base_ms,
        });
    }

    pub fn update(&mut self, now_ms: u64) {
        if let Some(synced) = self.synced.as_mut() {
            let elapsed = now_ms.saturating_sub(synced.synced_at_ms) as f64 * synced.rate as f64;
            synced.time_of_day_ms = (synced.base_ms + elapsed as u64) % DAY_LENGTH_MS;
        }
    }

    pub fn is_synced(&self) -> bool {
        self.synced.is_some()
    }

    pub fn time_of_day_ms(&self) -> Option<u64> {
        self.synced.map(|synced| synced.time_of_day_ms)
    }

    pub fn hour(&self) -> Option<u8> {
        self.time_of_day_ms()
            .map(|ms| (ms * 24 / DAY_LENGTH_MS) as u8)
    }

    pub fn reset(&mut self) {
        self.synced = None;
    }
}
