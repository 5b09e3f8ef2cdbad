use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{PeerId, RoomId};

/// Messages sent from client to server
///
/// Signal payloads are opaque: the server forwards them untouched and never
/// looks inside.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Enter a room and learn who is already there
    #[serde(rename = "join-room")]
    JoinRoom {
        #[serde(rename = "roomId")]
        room_id: RoomId,
    },

    /// Forward an offer to one peer in the room mesh
    #[serde(rename = "sending-signal")]
    SendingSignal {
        #[serde(rename = "userToSignal")]
        user_to_signal: PeerId,
        /// Claimed sender identity; the server substitutes the real one
        #[serde(rename = "callerId")]
        caller_id: PeerId,
        signal: Value,
    },

    /// Forward an answer back to the peer whose offer this answers
    #[serde(rename = "returning-signal")]
    ReturningSignal {
        #[serde(rename = "callerId")]
        caller_id: PeerId,
        signal: Value,
    },
}

/// Messages sent from server to client
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// The identity assigned to this connection, sent once on open
    #[serde(rename = "your-id")]
    YourId { id: PeerId },

    /// Everyone already in the room, in join order; sent only to a fresh joiner
    #[serde(rename = "all-users")]
    AllUsers { users: Vec<PeerId> },

    /// Join broadcast (signal = null) and offer envelope (signal = payload)
    #[serde(rename = "user-joined")]
    UserJoined {
        signal: Option<Value>,
        #[serde(rename = "callerId")]
        caller_id: PeerId,
    },

    /// Answer envelope, delivered to the original offerer
    #[serde(rename = "receiving-returned-signal")]
    ReceivingReturnedSignal { id: PeerId, signal: Value },

    /// Broadcast to the remaining members when a peer's connection closes
    #[serde(rename = "user-left")]
    UserLeft { id: PeerId },
}
