//! WebSocket Lobby Server Library
//!
//! A lobby coordinator built with tokio-tungstenite using the Actor
//! pattern for state management.
//!
//! # Features
//! - WebSocket connection handling
//! - Lobby creation with short, reusable room codes
//! - Lobby joining and member list queries
//! - Silent cleanup of members on disconnect
//! - Per-room broadcast groups
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `LobbyServer` is the central actor owning the `RoomRegistry`
//! - Each connection has a `handler` task communicating with the server
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use lobby_server::{handle_connection, CodeConfig, LobbyServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     tokio::spawn(LobbyServer::new(cmd_rx, CodeConfig::default()).run());
//!
//!     while let Ok((stream, _)) = listener.accept().await {
//!         let cmd_tx = cmd_tx.clone();
//!         tokio::spawn(handle_connection(stream, cmd_tx, 32));
//!     }
//! }
//! ```

pub mod broadcast;
pub mod code;
pub mod config;
pub mod error;
pub mod handler;
pub mod message;
pub mod registry;
pub mod room;
pub mod server;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use broadcast::BroadcastGroups;
pub use code::CodeGenerator;
pub use config::{CodeConfig, LobbyConfig};
pub use error::{AppError, ConfigError, RegistryError, SendError};
pub use handler::handle_connection;
pub use message::{ClientEvent, ServerEvent};
pub use registry::{Departure, RoomRegistry};
pub use room::{Member, Room};
pub use server::{LobbyServer, ServerCommand};
pub use session::Session;
pub use types::{ConnectionId, RoomCode};
