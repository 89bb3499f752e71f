//! Message protocol definitions
//!
//! JSON events tagged by an `event` field, one per WebSocket text frame.
//! Event names and payload field names are the lobby wire contract and
//! must not change:
//!
//! ```text
//! → {"event":"createLobby","username":"Alice"}
//! ← {"event":"lobbyCreated","roomCode":"40712","members":[{"id":"…","username":"Alice"}]}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::room::Member;
use crate::types::{ConnectionId, RoomCode};

/// Reply text for unknown room codes
pub const LOBBY_NOT_FOUND_MESSAGE: &str = "This lobby does not exist";

/// Reply text when no room code can be allocated
pub const SERVER_BUSY_MESSAGE: &str = "Unable to create a lobby right now";

/// Client → Server event
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Create a new lobby with the caller as its first member
    CreateLobby { username: String },
    /// Join an existing lobby by code
    JoinLobby { room_code: String, username: String },
    /// Ask for the current member list of a lobby
    GetRoomInfo { room_code: String },
    /// Leave the current lobby without disconnecting
    LeaveLobby,
}

/// Server → Client event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Connection accepted, connection ID issued
    Connected { connection_id: ConnectionId },
    /// Lobby created; members holds just the creator
    LobbyCreated {
        room_code: RoomCode,
        members: Vec<Member>,
    },
    /// Lobby joined; members is the full post-join list
    LobbyJoined {
        room_code: RoomCode,
        members: Vec<Member>,
    },
    /// Room code is not an active lobby
    LobbyNotFound { message: String },
    /// Current members of the requested lobby
    RoomInfo { members: Vec<Member> },
    /// Request could not be served for server-side reasons
    ServerError { message: String },
}

impl ServerEvent {
    /// Wire name of the event, for logging
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerEvent::Connected { .. } => "connected",
            ServerEvent::LobbyCreated { .. } => "lobbyCreated",
            ServerEvent::LobbyJoined { .. } => "lobbyJoined",
            ServerEvent::LobbyNotFound { .. } => "lobbyNotFound",
            ServerEvent::RoomInfo { .. } => "roomInfo",
            ServerEvent::ServerError { .. } => "serverError",
        }
    }
}

/// Convert RegistryError to ServerEvent for client notification
///
/// Capacity faults are reported generically; their detail stays in the logs.
impl From<RegistryError> for ServerEvent {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::RoomNotFound(_) => ServerEvent::LobbyNotFound {
                message: LOBBY_NOT_FOUND_MESSAGE.to_string(),
            },
            RegistryError::CodeSpaceExhausted { .. } => ServerEvent::ServerError {
                message: SERVER_BUSY_MESSAGE.to_string(),
            },
        }
    }
}
