//! Event holds, dialogs and events waiting on a map that has not arrived yet.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::map::MapId;

/// Server-assigned identifier of a scripted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event#{}", self.0)
    }
}

/// Suspension markers keyed by event, each scoped to a map or global (`None`).
#[derive(Debug, Clone, Default)]
pub struct EventHolds {
    holds: HashMap<EventId, Option<MapId>>,
}

impl EventHolds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: EventId, map: Option<MapId>) {
        self.holds.insert(key, map);
    }

    /// Returns whether a hold was present.
    pub fn release(&mut self, key: EventId) -> bool {
        self.holds.remove(&key).is_some()
    }

    pub fn is_held(&self, key: EventId) -> bool {
        self.holds.contains_key(&key)
    }

    /// Removes holds bound to a map that `exists` no longer reports. Global holds are kept.
    ///
    /// Returns how many holds were purged.
    pub fn purge_stale(&mut self, mut exists: impl FnMut(MapId) -> bool) -> usize {
        let before = self.holds.len();
        self.holds.retain(|key, map| match map {
            Some(id) if !exists(*id) => {
                debug!(event = %key, map = %id, "Purging stale event hold");
                false
            }
            _ => true,
        });
        before - self.holds.len()
    }

    pub fn len(&self) -> usize {
        self.holds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holds.is_empty()
    }

    pub fn clear(&mut self) {
        self.holds.clear();
    }
}

/// A prompt shown to the player on behalf of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDialog {
    pub event: EventId,
    pub map: Option<MapId>,
    pub prompt: String,
    pub responses: Vec<String>,
}

/// Events received for a map before its payload arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEvents {
    pub map: MapId,
    pub events: Vec<EventId>,
}
