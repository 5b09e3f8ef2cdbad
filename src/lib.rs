//! Switchboard: a signaling relay for WebRTC peers.
//!
//! Peers connect over WebSocket, join a named room, learn who is already
//! there, and exchange opaque offer/answer payloads point-to-point until
//! their direct connections come up. The server never touches media.

pub mod signaling;
