//! WebSocket signaling relay for room-based P2P call setup

mod actor;
mod messages;
mod registry;
mod rooms;
mod router;
mod server;
mod types;

pub use actor::RouterHandle;
pub use messages::{ClientMessage, ServerMessage};
pub use router::SignalingRouter;
pub use server::{DEFAULT_SIGNALING_PORT, SignalingServer};
pub use types::{OutboundMessage, PeerId, RoomId, SignalingError};
