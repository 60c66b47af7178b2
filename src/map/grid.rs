use std::collections::HashSet;

use glam::IVec2;

use crate::constants::NEIGHBORHOOD_SIZE;
use crate::error::{GameError, GameResult};
use crate::map::MapId;

/// The window of maps around the local entity, as sent by the server.
///
/// Cells are stored row-major. Lookups outside the window return `None`, the same as an
/// empty cell; neither is ever requested from the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Option<MapId>>,
    maps: HashSet<MapId>,
}

impl Grid {
    /// Builds a grid from row-major cells.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidState` if the cell count does not match the dimensions.
    pub fn new(width: u32, height: u32, cells: Vec<Option<MapId>>) -> GameResult<Self> {
        let expected = width as usize * height as usize;
        if cells.len() != expected {
            return Err(GameError::InvalidState(format!(
                "grid of {width}x{height} needs {expected} cells, got {}",
                cells.len()
            )));
        }

        let maps = cells.iter().flatten().copied().collect();
        Ok(Self {
            width: width as i32,
            height: height as i32,
            cells,
            maps,
        })
    }

    /// Builds a grid from rows of equal length.
    pub fn from_rows(rows: Vec<Vec<Option<MapId>>>) -> GameResult<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, Vec::len) as u32;
        if rows.iter().any(|row| row.len() as u32 != width) {
            return Err(GameError::InvalidState("grid rows have different lengths".to_string()));
        }
        Self::new(width, height, rows.into_iter().flatten().collect())
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    pub fn in_bounds(&self, position: IVec2) -> bool {
        (0..self.width).contains(&position.x) && (0..self.height).contains(&position.y)
    }

    /// The map at `position`, or `None` if the cell is empty or outside the window.
    pub fn get(&self, position: IVec2) -> Option<MapId> {
        if !self.in_bounds(position) {
            return None;
        }
        self.cells[(position.y * self.width + position.x) as usize]
    }

    pub fn position_of(&self, id: MapId) -> Option<IVec2> {
        if !self.maps.contains(&id) {
            return None;
        }
        self.cells
            .iter()
            .position(|cell| *cell == Some(id))
            .map(|index| IVec2::new(index as i32 % self.width, index as i32 / self.width))
    }

    /// Occupied, in-bounds cells of the square neighborhood centered on `center`, column by column.
    pub fn neighborhood(&self, center: IVec2) -> impl Iterator<Item = (IVec2, MapId)> + '_ {
        let radius = NEIGHBORHOOD_SIZE / 2;
        (center.x - radius..=center.x + radius)
            .flat_map(move |x| (center.y - radius..=center.y + radius).map(move |y| IVec2::new(x, y)))
            .filter_map(move |position| self.get(position).map(|id| (position, id)))
    }

    /// Whether `position` lies within the neighborhood of `center`.
    pub fn is_neighbor(center: IVec2, position: IVec2) -> bool {
        let delta = (position - center).abs();
        delta.x <= NEIGHBORHOOD_SIZE / 2 && delta.y <= NEIGHBORHOOD_SIZE / 2
    }

    pub fn contains(&self, id: MapId) -> bool {
        self.maps.contains(&id)
    }

    /// Every map referenced by the grid.
    pub fn maps(&self) -> impl Iterator<Item = MapId> + '_ {
        self.maps.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn clear(&mut self) {
        self.width = 0;
        self.height = 0;
        self.cells.clear();
        self.maps.clear();
    }
}
