//! Live actors and the registry that owns them.

use std::fmt;

use glam::{IVec2, Vec2};
use strum_macros::Display;
use tracing::trace;

use crate::constants::{ENTITY_MOVE_TIME_MS, ENTITY_WALK_FRAMES};
use crate::map::MapId;

mod registry;

pub use registry::{DisposalQueue, EntityRegistry};

/// Server-assigned entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum EntityKind {
    Player,
    Npc,
    Resource,
    Projectile,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

/// A walk between two adjacent tiles, interpolated by [`Entity::update`].
#[derive(Debug, Clone, Copy, PartialEq)]
struct Step {
    from: IVec2,
    started_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    name: String,
    map: MapId,
    tile: IVec2,
    direction: Direction,
    step: Option<Step>,
    /// Visual offset from `tile`, in tiles, while walking.
    offset: Vec2,
    walk_frame: u8,
    disposed: bool,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityKind, name: impl Into<String>, map: MapId, tile: IVec2) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            map,
            tile,
            direction: Direction::default(),
            step: None,
            offset: Vec2::ZERO,
            walk_frame: 0,
            disposed: false,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn map(&self) -> MapId {
        self.map
    }

    pub fn tile(&self) -> IVec2 {
        self.tile
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn walk_frame(&self) -> u8 {
        self.walk_frame
    }

    pub fn is_moving(&self) -> bool {
        self.step.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Applies an authoritative position.
    ///
    /// A move to an adjacent tile on the same map is animated; anything else is a warp.
    pub fn move_to(&mut self, map: MapId, tile: IVec2, direction: Direction, now_ms: u64) {
        let delta = (tile - self.tile).abs();
        let adjacent = map == self.map && delta.x + delta.y == 1;

        self.direction = direction;
        self.step = adjacent.then_some(Step {
            from: self.tile,
            started_ms: now_ms,
        });
        self.map = map;
        self.tile = tile;
        self.offset = if adjacent { (self.step_origin() - tile).as_vec2() } else { Vec2::ZERO };
    }

    fn step_origin(&self) -> IVec2 {
        self.step.map_or(self.tile, |step| step.from)
    }

    /// Advances walk interpolation and animation.
    pub fn update(&mut self, now_ms: u64) {
        let Some(step) = self.step else {
            return;
        };

        let elapsed = now_ms.saturating_sub(step.started_ms);
        if elapsed >= ENTITY_MOVE_TIME_MS {
            trace!(entity = %self.id, tile = ?self.tile, "Step finished");
            self.step = None;
            self.offset = Vec2::ZERO;
            self.walk_frame = 0;
            return;
        }

        let progress = elapsed as f32 / ENTITY_MOVE_TIME_MS as f32;
        self.offset = (step.from - self.tile).as_vec2() * (1.0 - progress);
        self.walk_frame = ((progress * ENTITY_WALK_FRAMES as f32) as u8).min(ENTITY_WALK_FRAMES - 1);
    }

    /// Marks the entity as gone. Returns false if it was already disposed.
    pub fn dispose(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        self.disposed = true;
        self.step = None;
        true
    }
}
