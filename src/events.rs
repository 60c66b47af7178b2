//! Inbound network traffic, queued by producer threads and applied inside the frame tick.

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use glam::IVec2;
use tracing::trace;

use crate::entity::{Direction, Entity, EntityId};
use crate::holds::{EventDialog, EventId};
use crate::map::{Grid, MapData, MapId};
use crate::world_time::TimeSync;

/// A world delta or session signal delivered by the network layer.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkEvent {
    /// The server accepted the enter-game request.
    JoinGame,
    /// Static game data needed before any map can be drawn.
    GameData { tilesets: Vec<String> },
    /// A new grid window around the local entity's map.
    MapGrid(Grid),
    MapData { id: MapId, data: MapData },
    EntitySpawned { entity: Entity, local: bool },
    EntityMoved {
        id: EntityId,
        map: MapId,
        tile: IVec2,
        direction: Direction,
    },
    EntityLeft(EntityId),
    EventHold { key: EventId, map: Option<MapId> },
    EventHoldReleased(EventId),
    EventDialog(EventDialog),
    MapEvents { map: MapId, events: Vec<EventId> },
    TimeSync(TimeSync),
    ConnectionLost,
    /// An unrecoverable condition reported by the transport.
    Fatal { reason: String },
}

impl NetworkEvent {
    /// Whether this event mutates world state and is only meaningful while loading or in game.
    pub fn is_world_delta(&self) -> bool {
        !matches!(
            self,
            NetworkEvent::JoinGame | NetworkEvent::GameData { .. } | NetworkEvent::ConnectionLost | NetworkEvent::Fatal { .. }
        )
    }
}

/// Thread-safe intake for [`NetworkEvent`]s.
///
/// Producers hold an [`InboxSender`]; only the tick drains the receiving side.
#[derive(Debug)]
pub struct Inbox {
    tx: Sender<NetworkEvent>,
    rx: Receiver<NetworkEvent>,
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Inbox {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> InboxSender {
        InboxSender { tx: self.tx.clone() }
    }

    /// Takes every event queued so far, in arrival order. Never blocks.
    pub fn drain(&self) -> Vec<NetworkEvent> {
        let mut events = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        if !events.is_empty() {
            trace!(count = events.len(), "Drained network events");
        }
        events
    }
}

/// Producer handle for an [`Inbox`].
#[derive(Debug, Clone)]
pub struct InboxSender {
    tx: Sender<NetworkEvent>,
}

impl InboxSender {
    /// Queues an event. Returns false if the inbox has been dropped.
    pub fn send(&self, event: NetworkEvent) -> bool {
        self.tx.send(event).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn drains_in_arrival_order_across_threads() {
        let inbox = Inbox::new();
        let sender = inbox.sender();
        thread::spawn(move || {
            sender.send(NetworkEvent::JoinGame);
            sender.send(NetworkEvent::ConnectionLost);
        })
        .join()
        .unwrap();

        assert_eq!(inbox.drain(), vec![NetworkEvent::JoinGame, NetworkEvent::ConnectionLost]);
        assert!(inbox.drain().is_empty());
    }

    #[test]
    fn session_signals_are_not_world_deltas() {
        assert!(!NetworkEvent::ConnectionLost.is_world_delta());
        assert!(NetworkEvent::EntityLeft(EntityId(1)).is_world_delta());
    }
}
