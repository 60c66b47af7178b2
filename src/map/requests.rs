use std::collections::HashMap;

use crate::map::MapId;

/// Tracks outstanding "need map" requests so that the same map is not requested every frame.
///
/// An id is present only while its map is unresolved; arrival of the map removes it.
#[derive(Debug, Clone)]
pub struct MapRequestTable {
    requested_at: HashMap<MapId, u64>,
    timeout_ms: u64,
}

impl MapRequestTable {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            requested_at: HashMap::new(),
            timeout_ms,
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    /// Whether a request for `id` may be sent at `now_ms`.
    ///
    /// True when nothing is outstanding, or when the last request has aged past the timeout.
    pub fn can_request(&self, id: MapId, now_ms: u64) -> bool {
        match self.requested_at.get(&id) {
            None => true,
            Some(&at) => now_ms.saturating_sub(at) >= self.timeout_ms,
        }
    }

    /// Records a successfully sent request.
    pub fn record(&mut self, id: MapId, now_ms: u64) {
        self.requested_at.insert(id, now_ms);
    }

    /// Removes the entry for a map that has arrived. Returns whether one was outstanding.
    pub fn resolve(&mut self, id: MapId) -> bool {
        self.requested_at.remove(&id).is_some()
    }

    pub fn is_pending(&self, id: MapId) -> bool {
        self.requested_at.contains_key(&id)
    }

    /// Drops every entry for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(MapId) -> bool) {
        self.requested_at.retain(|id, _| keep(*id));
    }

    pub fn len(&self) -> usize {
        self.requested_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requested_at.is_empty()
    }

    pub fn clear(&mut self) {
        self.requested_at.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_suppressed_until_timeout() {
        let mut table = MapRequestTable::new(1_000);
        let id = MapId(3);

        assert!(table.can_request(id, 0));
        table.record(id, 100);
        assert!(!table.can_request(id, 100));
        assert!(!table.can_request(id, 1_099));
        assert!(table.can_request(id, 1_100));
    }

    #[test]
    fn resolve_removes_entry() {
        let mut table = MapRequestTable::new(1_000);
        table.record(MapId(1), 0);
        assert!(table.resolve(MapId(1)));
        assert!(!table.resolve(MapId(1)));
        assert!(table.is_empty());
    }
}
