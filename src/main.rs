//! WebSocket Lobby Server - Entry Point
//!
//! Starts the TCP listener and LobbyServer actor, accepting connections.

use std::env;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lobby_server::{handle_connection, LobbyConfig, LobbyServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=lobby_server=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lobby_server=info")),
        )
        .init();

    let mut config = LobbyConfig::from_env()?;

    // Bind address from the command line wins over LOBBY_ADDR
    if let Some(addr) = env::args().nth(1) {
        config.bind_addr = addr;
    }

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(addr = %config.bind_addr, "WebSocket Lobby Server listening");

    // Create LobbyServer actor channel and start
    let (cmd_tx, cmd_rx) = mpsc::channel(config.channel_buffer_size);
    let server = LobbyServer::new(cmd_rx, config.code.clone());
    tokio::spawn(server.run());

    info!(
        code_length = config.code.length,
        code_capacity = config.code.capacity(),
        "LobbyServer actor started"
    );

    // Connection accept loop
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!(%addr, "New connection");
                let cmd_tx = cmd_tx.clone();
                let session_buffer_size = config.session_buffer_size;

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, cmd_tx, session_buffer_size).await {
                        error!(error = %e, "Connection handler error");
                    }
                });
            }
            Err(e) => {
                error!(error = %e, "Failed to accept connection");
            }
        }
    }
}
