use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Bytes, Message};
use tracing::{debug, error, info, warn};

use super::actor::{RouterCommand, RouterHandle, signaling_actor};
use super::messages::ClientMessage;
use super::types::{OutboundMessage, PeerId};

pub const DEFAULT_SIGNALING_PORT: u16 = 4000;
const PING_INTERVAL: Duration = Duration::from_secs(30);
const PONG_TIMEOUT: Duration = Duration::from_secs(10);

pub struct SignalingServer {
    listener: TcpListener,
    handle: RouterHandle,
}

impl SignalingServer {
    /// Bind the listener and spawn the signaling actor
    pub async fn bind(addr: &str) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;

        let (tx, rx) = mpsc::channel::<RouterCommand>(1024);
        tokio::spawn(signaling_actor(rx));

        Ok(Self {
            listener,
            handle: RouterHandle { tx },
        })
    }

    /// Address the listener actually bound to (useful with port 0)
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(self) -> std::io::Result<()> {
        info!("Signaling server listening on {}", self.listener.local_addr()?);

        loop {
            let (stream, addr) = self.listener.accept().await?;
            let handle = self.handle.clone();

            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, addr, handle).await {
                    error!("Connection error from {}: {}", addr, e);
                }
            });
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    handle: RouterHandle,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_tx, mut ws_rx) = ws_stream.split();

    info!("WebSocket connection from {}", addr);

    let (tx, mut rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ctrl_tx, mut ctrl_rx) = mpsc::unbounded_channel::<Message>();

    // Identity is assigned the moment the transport opens, before any
    // client message; the registry holds the only long-lived sender.
    let peer_id = handle.connect(tx).await?;

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    let mut waiting_for_pong = false;
    let mut pong_deadline: Option<tokio::time::Instant> = None;

    let send_task = tokio::spawn(async move {
        loop {
            tokio::select! {
                Some(msg) = rx.recv() => {
                    let ws_msg = Message::Text(msg.into_inner());
                    if ws_tx.send(ws_msg).await.is_err() {
                        break;
                    }
                }
                Some(ctrl_msg) = ctrl_rx.recv() => {
                    if ws_tx.send(ctrl_msg).await.is_err() {
                        break;
                    }
                }
                else => break,
            }
        }
    });

    loop {
        let pong_timeout = async {
            match pong_deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            _ = ping_interval.tick() => {
                if waiting_for_pong {
                    warn!("No Pong received, disconnecting {}", addr);
                    break;
                }
                if ctrl_tx.send(Message::Ping(Bytes::new())).is_err() {
                    break;
                }
                waiting_for_pong = true;
                pong_deadline = Some(tokio::time::Instant::now() + PONG_TIMEOUT);
                debug!("Ping sent to {}", addr);
            }

            _ = pong_timeout => {
                warn!("Pong timeout, disconnecting {}", addr);
                break;
            }

            msg = ws_rx.next() => {
                let msg = match msg {
                    Some(Ok(m)) => m,
                    Some(Err(e)) => {
                        warn!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                };

                match msg {
                    Message::Text(text) => {
                        handle_text_message(&text, peer_id, &handle).await;
                    }
                    Message::Pong(_) => {
                        waiting_for_pong = false;
                        pong_deadline = None;
                        debug!("Pong received from {}", addr);
                    }
                    Message::Close(_) => {
                        info!("Close received from {}", addr);
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    // Whatever ended the read loop - clean close, protocol error, dead TCP,
    // pong timeout - the room and registry cleanup is the same.
    handle.disconnect(peer_id).await;

    send_task.abort();
    info!("WebSocket disconnected: {}", addr);

    Ok(())
}

/// Parse and dispatch one inbound text frame.
///
/// Anything that does not parse as a ClientMessage (bad JSON, unknown kind,
/// invalid identity) is dropped without a reply, so buggy or newer clients
/// cannot take the connection down.
async fn handle_text_message(text: &str, peer_id: PeerId, handle: &RouterHandle) {
    let client_msg: ClientMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            debug!("Ignoring unparseable message from {}: {}", peer_id, e);
            return;
        }
    };

    match client_msg {
        ClientMessage::JoinRoom { room_id } => {
            handle.join(peer_id, room_id).await;
        }

        ClientMessage::SendingSignal { user_to_signal, caller_id, signal } => {
            // the claimed caller id is untrusted; relays always carry the
            // identity the registry assigned to this connection
            if caller_id != peer_id {
                debug!("{} claimed caller id {}, substituting", peer_id, caller_id);
            }
            handle.sending_signal(peer_id, user_to_signal, signal).await;
        }

        ClientMessage::ReturningSignal { caller_id, signal } => {
            handle.returning_signal(peer_id, caller_id, signal).await;
        }
    }
}
