use std::collections::HashMap;

use tokio::sync::mpsc;

use super::types::{OutboundMessage, PeerId, RoomId};

/// Bookkeeping for one live connection.
#[derive(Debug)]
struct ConnectionEntry {
    /// Room this connection has joined; None until the first join-room.
    room: Option<RoomId>,
    /// Channel for outbound messages to this connection.
    /// Uses OutboundMessage for O(1) broadcast cloning.
    tx: mpsc::UnboundedSender<OutboundMessage>,
}

/// Tracks every live connection: its identity, its current room, and its
/// outbound sender.
///
/// Identities come from a monotonically increasing counter, so an identity
/// handed out once is never assigned again for the life of the process.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<PeerId, ConnectionEntry>,
    next_seq: u64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a newly opened connection and assign its identity.
    pub fn register(&mut self, tx: mpsc::UnboundedSender<OutboundMessage>) -> PeerId {
        self.next_seq += 1;
        let id = PeerId::from_seq(self.next_seq);
        self.connections.insert(id, ConnectionEntry { room: None, tx });
        id
    }

    /// Record the room a connection has joined. Ignored for unknown ids.
    pub fn set_room(&mut self, id: PeerId, room: RoomId) {
        if let Some(entry) = self.connections.get_mut(&id) {
            entry.room = Some(room);
        }
    }

    /// Room the connection currently occupies, if it has joined one.
    pub fn room_of(&self, id: PeerId) -> Option<&RoomId> {
        self.connections.get(&id).and_then(|entry| entry.room.as_ref())
    }

    /// Outbound sender for a live connection; None once it has closed.
    pub fn sender_of(&self, id: PeerId) -> Option<&mpsc::UnboundedSender<OutboundMessage>> {
        self.connections.get(&id).map(|entry| &entry.tx)
    }

    /// Drop all state for a closed connection. Idempotent: duplicate close
    /// events are harmless.
    pub fn unregister(&mut self, id: PeerId) {
        self.connections.remove(&id);
    }
}
