use std::collections::{HashMap, HashSet, VecDeque};

use smallvec::SmallVec;
use tracing::debug;

use crate::constants::DISPOSAL_QUEUE_CAPACITY;
use crate::entity::{Entity, EntityId};

/// Ordered set of entities marked for removal.
///
/// A sweep takes at most `capacity` ids. Ids marked beyond that wait in a backlog and
/// move into the queue, oldest first, as each sweep frees room.
#[derive(Debug, Clone)]
pub struct DisposalQueue {
    ids: SmallVec<[EntityId; 16]>,
    backlog: VecDeque<EntityId>,
    queued: HashSet<EntityId>,
    capacity: usize,
}

impl Default for DisposalQueue {
    fn default() -> Self {
        Self::with_capacity(DISPOSAL_QUEUE_CAPACITY)
    }
}

impl DisposalQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: SmallVec::new(),
            backlog: VecDeque::new(),
            queued: HashSet::new(),
            capacity: capacity.max(1),
        }
    }

    /// Queues `id`. Returns false if it was already queued.
    pub fn push(&mut self, id: EntityId) -> bool {
        if !self.queued.insert(id) {
            return false;
        }
        if self.ids.len() >= self.capacity {
            debug!(entity = %id, capacity = self.capacity, "Disposal queue full, deferring entity to a later sweep");
            self.backlog.push_back(id);
        } else {
            self.ids.push(id);
        }
        true
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.queued.contains(&id)
    }

    /// Every queued id in marking order, backlog included.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.ids.iter().chain(self.backlog.iter()).copied()
    }

    pub fn len(&self) -> usize {
        self.queued.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.backlog.clear();
        self.queued.clear();
    }

    /// Takes the current batch and refills the queue from the backlog.
    fn take(&mut self) -> SmallVec<[EntityId; 16]> {
        let batch = std::mem::take(&mut self.ids);
        for id in &batch {
            self.queued.remove(id);
        }
        while self.ids.len() < self.capacity {
            let Some(id) = self.backlog.pop_front() else {
                break;
            };
            self.ids.push(id);
        }
        batch
    }
}

/// Owns every live entity, keyed by id, plus the deferred disposal queue.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: HashMap<EntityId, Entity>,
    disposal: DisposalQueue,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entity. Returns the entity previously registered under the same id.
    pub fn insert(&mut self, entity: Entity) -> Option<Entity> {
        self.entities.insert(entity.id(), entity)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn disposal_queue(&self) -> &DisposalQueue {
        &self.disposal
    }

    /// Marks an entity for removal at the end of the frame.
    pub fn mark_for_disposal(&mut self, id: EntityId) -> bool {
        self.disposal.push(id)
    }

    /// Updates every live entity, skipping any already disposed.
    pub fn update_all(&mut self, now_ms: u64) {
        for entity in self.entities.values_mut().filter(|entity| !entity.is_disposed()) {
            entity.update(now_ms);
        }
    }

    /// Disposes and removes one batch of queued entities, skipping `keep`.
    ///
    /// Ids left in the backlog are picked up by the next sweep. Returns the ids actually
    /// removed, in queue order.
    pub fn sweep(&mut self, keep: Option<EntityId>) -> SmallVec<[EntityId; 8]> {
        let mut removed = SmallVec::new();
        for id in self.disposal.take() {
            if Some(id) == keep {
                debug!(entity = %id, "Local player queued for disposal, keeping it");
                continue;
            }
            if let Some(mut entity) = self.entities.remove(&id) {
                entity.dispose();
                removed.push(id);
            }
        }
        removed
    }

    /// Disposes and removes every entity and forgets anything queued.
    pub fn dispose_all(&mut self) -> usize {
        let count = self.entities.len();
        for (_, mut entity) in self.entities.drain() {
            entity.dispose();
        }
        self.disposal.clear();
        count
    }
}
