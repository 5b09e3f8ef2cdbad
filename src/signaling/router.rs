use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::messages::ServerMessage;
use super::registry::ConnectionRegistry;
use super::rooms::RoomDirectory;
use super::types::{OutboundMessage, PeerId, RoomId};

/// The protocol state machine: join, offer relay, answer relay, disconnect.
///
/// Owns the connection registry and the room directory outright; every
/// mutation of either goes through one of these methods, and the actor in
/// [`super::actor`] applies them one command at a time. The router itself is
/// purely synchronous: outbound messages are pushed onto per-connection
/// unbounded channels and never wait on a peer's I/O.
#[derive(Debug, Default)]
pub struct SignalingRouter {
    registry: ConnectionRegistry,
    rooms: RoomDirectory,
}

impl SignalingRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a newly opened connection: assign its identity and tell it.
    pub fn connect(&mut self, tx: mpsc::UnboundedSender<OutboundMessage>) -> PeerId {
        let id = self.registry.register(tx);
        self.send_to(id, &ServerMessage::YourId { id });
        info!("Connection registered as {}", id);
        id
    }

    /// Handle join-room.
    ///
    /// The joiner must learn who already exists before anyone is told about
    /// the joiner, so the all-users snapshot is taken and sent while the
    /// joiner is still outside the member list. A second join-room from a
    /// connection already in a room is ignored entirely.
    pub fn join(&mut self, id: PeerId, room: RoomId) {
        if self.registry.sender_of(id).is_none() {
            // closed before the command was applied; nothing to join
            return;
        }
        if let Some(current) = self.registry.room_of(id) {
            debug!("Ignoring join-room from {} already in {}", id, current);
            return;
        }

        self.registry.set_room(id, room.clone());

        let existing = self.rooms.members_except(&room, id);
        self.send_to(id, &ServerMessage::AllUsers { users: existing.clone() });

        self.rooms.add_member(room.clone(), id);

        let frame = encode(&ServerMessage::UserJoined { signal: None, caller_id: id });
        for member in &existing {
            if let Some(tx) = self.registry.sender_of(*member) {
                let _ = tx.send(frame.clone());
            }
        }

        info!("Peer {} joined room {}", id, room);
    }

    /// Handle sending-signal: deliver an offer to exactly one peer.
    ///
    /// `from` is always the server-known sender identity, never the
    /// client-supplied caller id. A target with no live connection drops the
    /// message; the sender is not told (best-effort delivery).
    pub fn sending_signal(&self, from: PeerId, target: PeerId, signal: Value) {
        self.relay(target, &ServerMessage::UserJoined { signal: Some(signal), caller_id: from });
    }

    /// Handle returning-signal: deliver an answer back to the offerer.
    pub fn returning_signal(&self, from: PeerId, target: PeerId, signal: Value) {
        self.relay(target, &ServerMessage::ReceivingReturnedSignal { id: from, signal });
    }

    /// Handle transport close. Valid from any state and idempotent, since
    /// close events can be delivered twice.
    pub fn disconnect(&mut self, id: PeerId) {
        if let Some(room) = self.registry.room_of(id).cloned() {
            self.rooms.remove_member(&room, id);

            let frame = encode(&ServerMessage::UserLeft { id });
            for member in self.rooms.members_except(&room, id) {
                if let Some(tx) = self.registry.sender_of(member) {
                    let _ = tx.send(frame.clone());
                }
            }

            info!("Peer {} left room {}", id, room);
        }
        self.registry.unregister(id);
    }

    fn relay(&self, target: PeerId, msg: &ServerMessage) {
        match self.registry.sender_of(target) {
            Some(tx) => {
                let _ = tx.send(encode(msg));
            }
            None => debug!("Relay target {} has no live connection, dropping", target),
        }
    }

    fn send_to(&self, id: PeerId, msg: &ServerMessage) {
        if let Some(tx) = self.registry.sender_of(id) {
            let _ = tx.send(encode(msg));
        }
    }
}

fn encode(msg: &ServerMessage) -> OutboundMessage {
    let json =
        serde_json::to_string(msg).expect("ServerMessage serialization should never fail");
    OutboundMessage::from(json)
}
