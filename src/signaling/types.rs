use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tokio_tungstenite::tungstenite::Utf8Bytes;

/// Signaling server errors
#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("internal error: {0}")]
    Internal(String),
}

const PEER_ID_PREFIX: &str = "peer_";
const PEER_ID_MAX_HEX: usize = 16;

/// Identity of one live connection: "peer_" + zero-padded lowercase hex.
///
/// Wraps the registry's sequence number, so within a process no identity is
/// ever assigned twice, even after its connection closes. Peers address each
/// other by this value alone; it carries no application-level user identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerId(u64);

impl PeerId {
    pub(crate) fn from_seq(seq: u64) -> Self {
        Self(seq)
    }

    /// Parse the wire form. Strict: the "peer_" prefix followed by 1 to 16
    /// hex digits; anything else is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let hex = s.strip_prefix(PEER_ID_PREFIX)?;
        if hex.is_empty() || hex.len() > PEER_ID_MAX_HEX {
            return None;
        }
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u64::from_str_radix(hex, 16).ok().map(Self)
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:08x}", PEER_ID_PREFIX, self.0)
    }
}

impl Serialize for PeerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <&str>::deserialize(deserializer)?;
        PeerId::parse(s).ok_or_else(|| serde::de::Error::custom("invalid peer id"))
    }
}

/// A caller-supplied room name. Arbitrary, case-sensitive, untrusted input;
/// kept verbatim, never truncated or normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Serialize for RoomId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RoomId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // untrusted input; may arrive with JSON escapes, which a borrowed
        // &str cannot represent
        Ok(RoomId(String::deserialize(deserializer)?))
    }
}

/// Wrapper for outbound WebSocket messages using tungstenite's Utf8Bytes.
#[derive(Debug, Clone)]
pub struct OutboundMessage(Utf8Bytes);

impl OutboundMessage {
    /// Create a new outbound message from any string type
    pub fn new(s: impl Into<Utf8Bytes>) -> Self {
        Self(s.into())
    }

    /// Get the inner Utf8Bytes for tungstenite Message::Text
    pub fn into_inner(self) -> Utf8Bytes {
        self.0
    }

    /// View the serialized frame
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for OutboundMessage {
    fn from(s: String) -> Self {
        Self(Utf8Bytes::from(s))
    }
}
