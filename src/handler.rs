//! WebSocket connection handler
//!
//! Handles individual client connections: WebSocket handshake,
//! event parsing, and bidirectional communication with the LobbyServer.
//! The socket closing is reported to the server as a disconnect.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::error::AppError;
use crate::message::{ClientEvent, ServerEvent};
use crate::server::ServerCommand;
use crate::types::ConnectionId;

/// Handle a new TCP connection
///
/// Performs WebSocket handshake, sets up bidirectional communication,
/// and manages the connection lifecycle.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<ServerCommand>,
    session_buffer_size: usize,
) -> Result<(), AppError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!(%peer_addr, "New TCP connection");

    // WebSocket handshake
    let ws_stream = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let connection_id = ConnectionId::new();
    info!(%connection_id, %peer_addr, "Session connected");

    // Channel for server -> client events
    let (event_tx, mut event_rx) = mpsc::channel::<ServerEvent>(session_buffer_size);

    // Register with LobbyServer
    if cmd_tx
        .send(ServerCommand::Connect {
            connection_id,
            sender: event_tx,
        })
        .await
        .is_err()
    {
        error!(%connection_id, "Failed to register session - server closed");
        return Err(AppError::ChannelSend);
    }

    // Tell the client its own ID so it can find itself in member lists
    let connected = ServerEvent::Connected { connection_id };
    let json = serde_json::to_string(&connected)?;
    ws_sender.send(Message::Text(json.into())).await?;

    let cmd_tx_read = cmd_tx.clone();

    // Spawn read task (WebSocket -> ServerCommand)
    let mut read_task = tokio::spawn(async move {
        while let Some(msg_result) = ws_receiver.next().await {
            match msg_result {
                Ok(Message::Text(text)) => match serde_json::from_str::<ClientEvent>(&text) {
                    Ok(event) => {
                        let cmd = client_event_to_command(connection_id, event);
                        if cmd_tx_read.send(cmd).await.is_err() {
                            debug!(%connection_id, "Server closed, ending read task");
                            break;
                        }
                    }
                    Err(e) => {
                        // Malformed frames are dropped; the session stays open.
                        warn!(%connection_id, error = %e, "Invalid event frame");
                    }
                },
                Ok(Message::Close(_)) => {
                    debug!(%connection_id, "Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_)) => {
                    // Pong is handled automatically by tungstenite
                    debug!(%connection_id, "Ping");
                }
                Ok(_) => {
                    // Binary, pong or raw frames - ignore
                }
                Err(e) => {
                    error!(%connection_id, error = %e, "WebSocket error");
                    break;
                }
            }
        }
        debug!(%connection_id, "Read task ended");
    });

    // Spawn write task (ServerEvent -> WebSocket)
    let mut write_task = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if ws_sender.send(Message::Text(json.into())).await.is_err() {
                        debug!(%connection_id, "WebSocket send failed, ending write task");
                        break;
                    }
                    debug!(%connection_id, event = event.event_name(), "Event sent");
                }
                Err(e) => {
                    error!(%connection_id, error = %e, "Failed to serialize event");
                }
            }
        }
        debug!(%connection_id, "Write task ended");

        let _ = ws_sender.close().await;
    });

    // Wait for either task to complete, then stop the other
    tokio::select! {
        _ = &mut read_task => {
            debug!(%connection_id, "Read task completed");
            write_task.abort();
        }
        _ = &mut write_task => {
            debug!(%connection_id, "Write task completed");
            read_task.abort();
        }
    }

    let _ = cmd_tx
        .send(ServerCommand::Disconnect { connection_id })
        .await;

    info!(%connection_id, "Session disconnected");

    Ok(())
}

/// Convert a ClientEvent to a ServerCommand
fn client_event_to_command(connection_id: ConnectionId, event: ClientEvent) -> ServerCommand {
    match event {
        ClientEvent::CreateLobby { username } => ServerCommand::CreateLobby {
            connection_id,
            username,
        },
        ClientEvent::JoinLobby {
            room_code,
            username,
        } => ServerCommand::JoinLobby {
            connection_id,
            room_code,
            username,
        },
        ClientEvent::GetRoomInfo { room_code } => ServerCommand::GetRoomInfo {
            connection_id,
            room_code,
        },
        ClientEvent::LeaveLobby => ServerCommand::LeaveLobby { connection_id },
    }
}
