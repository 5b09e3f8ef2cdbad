use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use super::router::SignalingRouter;
use super::types::{OutboundMessage, PeerId, RoomId, SignalingError};

/// Commands sent to the signaling actor
pub(crate) enum RouterCommand {
    Connect {
        peer_tx: mpsc::UnboundedSender<OutboundMessage>,
        reply: oneshot::Sender<PeerId>,
    },
    Join {
        peer_id: PeerId,
        room_id: RoomId,
    },
    SendingSignal {
        peer_id: PeerId,
        target: PeerId,
        signal: Value,
    },
    ReturningSignal {
        peer_id: PeerId,
        target: PeerId,
        signal: Value,
    },
    Disconnect {
        peer_id: PeerId,
    },
}

/// The single serialization point for all room and registry mutation.
///
/// The actor owns the router; commands from every connection are applied one
/// at a time in arrival order, which is what makes the all-users snapshot in
/// a join immune to concurrent joins on the same room.
pub(crate) async fn signaling_actor(mut rx: mpsc::Receiver<RouterCommand>) {
    let mut router = SignalingRouter::new();

    while let Some(cmd) = rx.recv().await {
        match cmd {
            RouterCommand::Connect { peer_tx, reply } => {
                let peer_id = router.connect(peer_tx);
                let _ = reply.send(peer_id);
            }

            RouterCommand::Join { peer_id, room_id } => router.join(peer_id, room_id),

            RouterCommand::SendingSignal { peer_id, target, signal } => {
                router.sending_signal(peer_id, target, signal)
            }

            RouterCommand::ReturningSignal { peer_id, target, signal } => {
                router.returning_signal(peer_id, target, signal)
            }

            RouterCommand::Disconnect { peer_id } => router.disconnect(peer_id),
        }
    }
}

/// Handle to communicate with the signaling actor
#[derive(Clone)]
pub struct RouterHandle {
    pub(crate) tx: mpsc::Sender<RouterCommand>,
}

impl RouterHandle {
    /// Register a newly opened connection and obtain its identity
    pub async fn connect(
        &self,
        peer_tx: mpsc::UnboundedSender<OutboundMessage>,
    ) -> Result<PeerId, SignalingError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let _ = self
            .tx
            .send(RouterCommand::Connect {
                peer_tx,
                reply: reply_tx,
            })
            .await;
        reply_rx
            .await
            .map_err(|_| SignalingError::Internal("actor channel closed".to_string()))
    }

    /// Enter a room
    pub async fn join(&self, peer_id: PeerId, room_id: RoomId) {
        let _ = self.tx.send(RouterCommand::Join { peer_id, room_id }).await;
    }

    /// Forward an offer to one peer; `peer_id` is the sender
    pub async fn sending_signal(&self, peer_id: PeerId, target: PeerId, signal: Value) {
        let _ = self
            .tx
            .send(RouterCommand::SendingSignal { peer_id, target, signal })
            .await;
    }

    /// Forward an answer back to the offerer; `peer_id` is the sender
    pub async fn returning_signal(&self, peer_id: PeerId, target: PeerId, signal: Value) {
        let _ = self
            .tx
            .send(RouterCommand::ReturningSignal { peer_id, target, signal })
            .await;
    }

    /// Tear down a closed connection
    pub async fn disconnect(&self, peer_id: PeerId) {
        let _ = self.tx.send(RouterCommand::Disconnect { peer_id }).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signaling::messages::ServerMessage;

    fn spawn_actor() -> RouterHandle {
        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(signaling_actor(rx));
        RouterHandle { tx }
    }

    async fn next_message(rx: &mut mpsc::UnboundedReceiver<OutboundMessage>) -> ServerMessage {
        let frame = rx.recv().await.expect("connection channel closed");
        serde_json::from_str(frame.as_str()).expect("outbound frames parse back")
    }

    #[tokio::test]
    async fn connect_assigns_distinct_identities() {
        let handle = spawn_actor();
        let (a_tx, mut a_rx) = mpsc::unbounded_channel();
        let (b_tx, mut b_rx) = mpsc::unbounded_channel();

        let a = handle.connect(a_tx).await.unwrap();
        let b = handle.connect(b_tx).await.unwrap();
        assert_ne!(a, b);

        match next_message(&mut a_rx).await {
            ServerMessage::YourId { id } => assert_eq!(id, a),
            other => panic!("expected your-id, got {:?}", other),
        }
        match next_message(&mut b_rx).await {
            ServerMessage::YourId { id } => assert_eq!(id, b),
            other => panic!("expected your-id, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn commands_are_applied_in_submission_order() {
        let handle = spawn_actor();
        let (a_tx, mut a_rx) = mpsc::unbounded_channel();
        let (b_tx, mut b_rx) = mpsc::unbounded_channel();

        let a = handle.connect(a_tx).await.unwrap();
        let b = handle.connect(b_tx).await.unwrap();

        handle.join(a, RoomId::from("lobby")).await;
        handle.join(b, RoomId::from("lobby")).await;
        handle.disconnect(b).await;

        // a: your-id, all-users [], user-joined b, user-left b
        assert!(matches!(next_message(&mut a_rx).await, ServerMessage::YourId { .. }));
        match next_message(&mut a_rx).await {
            ServerMessage::AllUsers { users } => assert!(users.is_empty()),
            other => panic!("expected all-users, got {:?}", other),
        }
        match next_message(&mut a_rx).await {
            ServerMessage::UserJoined { signal: None, caller_id } => assert_eq!(caller_id, b),
            other => panic!("expected user-joined, got {:?}", other),
        }
        match next_message(&mut a_rx).await {
            ServerMessage::UserLeft { id } => assert_eq!(id, b),
            other => panic!("expected user-left, got {:?}", other),
        }

        // b: your-id, then the snapshot listing a
        assert!(matches!(next_message(&mut b_rx).await, ServerMessage::YourId { .. }));
        match next_message(&mut b_rx).await {
            ServerMessage::AllUsers { users } => assert_eq!(users, vec![a]),
            other => panic!("expected all-users, got {:?}", other),
        }
    }
}
