use std::collections::HashMap;

use tracing::debug;

use crate::map::{Grid, MapData, MapId, MapInstance, MapRequestTable};

/// Owns every map known to the client along with the outstanding request table.
///
/// Lookups for unknown ids return `None`; a missing map is an expected, transient condition.
#[derive(Debug)]
pub struct MapInstanceCache {
    maps: HashMap<MapId, MapInstance>,
    requests: MapRequestTable,
}

impl MapInstanceCache {
    pub fn new(request_timeout_ms: u64) -> Self {
        Self {
            maps: HashMap::new(),
            requests: MapRequestTable::new(request_timeout_ms),
        }
    }

    pub fn get(&self, id: MapId) -> Option<&MapInstance> {
        self.maps.get(&id)
    }

    pub fn get_mut(&mut self, id: MapId) -> Option<&mut MapInstance> {
        self.maps.get_mut(&id)
    }

    pub fn contains(&self, id: MapId) -> bool {
        self.maps.contains_key(&id)
    }

    /// Stores a freshly received map, replacing any previous payload for the same id.
    ///
    /// Resolves the map's outstanding request and takes its position from `grid`.
    pub fn insert_loaded(&mut self, id: MapId, data: MapData, grid: &Grid) -> &mut MapInstance {
        if self.requests.resolve(id) {
            debug!(map = %id, "Map request resolved");
        }

        let map = self.maps.entry(id).or_insert_with(|| MapInstance::pending(id));
        map.load(data);
        map.set_grid_position(grid.position_of(id));
        map
    }

    pub fn remove(&mut self, id: MapId) -> Option<MapInstance> {
        self.requests.resolve(id);
        self.maps.remove(&id)
    }

    /// Re-reads every map's position from a new grid.
    pub fn reposition(&mut self, grid: &Grid) {
        for map in self.maps.values_mut() {
            map.set_grid_position(grid.position_of(map.id()));
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = MapId> + '_ {
        self.maps.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MapInstance> {
        self.maps.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MapInstance> {
        self.maps.values_mut()
    }

    pub fn requests(&self) -> &MapRequestTable {
        &self.requests
    }

    pub fn requests_mut(&mut self) -> &mut MapRequestTable {
        &mut self.requests
    }

    /// Removes every map, handing each to the caller for disposal.
    pub fn drain(&mut self) -> impl Iterator<Item = MapInstance> + '_ {
        self.requests.clear();
        self.maps.drain().map(|(_, map)| map)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_resolves_request_and_positions_map() {
        let grid = Grid::from_rows(vec![vec![None, Some(MapId(2))]]).unwrap();
        let mut cache = MapInstanceCache::new(1_000);
        cache.requests_mut().record(MapId(2), 0);

        let map = cache.insert_loaded(MapId(2), MapData::default(), &grid);
        assert!(map.is_loaded());
        assert_eq!(map.grid_position(), Some(glam::IVec2::new(1, 0)));
        assert!(!cache.requests().is_pending(MapId(2)));
    }

    #[test]
    fn missing_lookup_is_none() {
        let cache = MapInstanceCache::new(1_000);
        assert!(cache.get(MapId(42)).is_none());
    }
}
