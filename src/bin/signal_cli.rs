use std::error::Error;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{self, AsyncBufReadExt};
use tokio_tungstenite::tungstenite::Message;

/// Manual test client: joins a room on a running signaling server, prints
/// every pushed event, and forwards stdin lines verbatim as raw frames.
///
/// Usage: signal_cli [ws://host:port] [room]
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let url = args.next().unwrap_or_else(|| "ws://127.0.0.1:4000".to_string());
    let room = args.next().unwrap_or_else(|| "lobby".to_string());

    // 1. Open the signaling connection
    let (ws, _) = tokio_tungstenite::connect_async(url.as_str()).await?;
    let (mut ws_tx, mut ws_rx) = ws.split();

    println!("Connected to {}", url);

    // Task 1: print everything the server pushes
    tokio::spawn(async move {
        while let Some(msg) = ws_rx.next().await {
            match msg {
                Ok(Message::Text(text)) => println!("< {}", text),
                Ok(Message::Close(_)) => {
                    println!("Server closed the connection");
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    eprintln!("Read error: {}", e);
                    break;
                }
            }
        }
    });

    // 2. Join the room; the your-id and all-users notices come back first
    let join = serde_json::json!({"type": "join-room", "roomId": room}).to_string();
    ws_tx.send(Message::text(join)).await?;

    println!("Joining room '{}'.", room);
    println!("Type a raw JSON frame and press Enter to send it:");

    // Task 2: read stdin and send raw frames
    let mut stdin = io::BufReader::new(io::stdin()).lines();
    while let Ok(Some(line)) = stdin.next_line().await {
        ws_tx.send(Message::text(line)).await?;
    }

    Ok(())
}
