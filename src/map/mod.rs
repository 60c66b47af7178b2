//! Map instances, the grid window around the local entity, and map streaming.

use std::fmt;

pub mod cache;
pub mod grid;
pub mod instance;
pub mod requests;
pub mod streaming;

pub use cache::MapInstanceCache;
pub use grid::Grid;
pub use instance::{MapData, MapInstance, Released, RenderProgress};
pub use requests::MapRequestTable;

/// Stable identifier of a map on the authoritative server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapId(pub u64);

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "map#{:04x}", self.0)
    }
}
