//! LobbyServer Actor implementation
//!
//! The event dispatcher. Owns the room registry, the broadcast groups and
//! the session table, and applies one command at a time from its mailbox,
//! so registry mutations never interleave.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::broadcast::BroadcastGroups;
use crate::code::CodeGenerator;
use crate::config::CodeConfig;
use crate::error::SendError;
use crate::message::ServerEvent;
use crate::registry::RoomRegistry;
use crate::room::Member;
use crate::session::Session;
use crate::types::{ConnectionId, RoomCode};

/// Commands sent from connection handlers to the LobbyServer actor
#[derive(Debug)]
pub enum ServerCommand {
    /// New session connected
    Connect {
        connection_id: ConnectionId,
        sender: mpsc::Sender<ServerEvent>,
    },
    /// Session ended (raised by the transport, never by the client)
    Disconnect { connection_id: ConnectionId },
    /// Create a lobby with the caller as first member
    CreateLobby {
        connection_id: ConnectionId,
        username: String,
    },
    /// Join an existing lobby
    JoinLobby {
        connection_id: ConnectionId,
        room_code: String,
        username: String,
    },
    /// Query a lobby's members
    GetRoomInfo {
        connection_id: ConnectionId,
        room_code: String,
    },
    /// Leave the current lobby but stay connected
    LeaveLobby { connection_id: ConnectionId },
    /// Push an event to every session subscribed to a room
    Broadcast {
        room_code: RoomCode,
        event: ServerEvent,
    },
}

/// The main LobbyServer actor
pub struct LobbyServer {
    /// All connected sessions: ConnectionId -> Session
    sessions: HashMap<ConnectionId, Session>,
    registry: RoomRegistry,
    groups: BroadcastGroups,
    /// Command receiver channel
    receiver: mpsc::Receiver<ServerCommand>,
}

impl LobbyServer {
    /// Create a new LobbyServer with the given command receiver
    pub fn new(receiver: mpsc::Receiver<ServerCommand>, codes: CodeConfig) -> Self {
        Self::with_registry(receiver, RoomRegistry::new(CodeGenerator::new(codes)))
    }

    pub fn with_registry(receiver: mpsc::Receiver<ServerCommand>, registry: RoomRegistry) -> Self {
        Self {
            sessions: HashMap::new(),
            registry,
            groups: BroadcastGroups::new(),
            receiver,
        }
    }

    /// Run the LobbyServer event loop
    ///
    /// Continuously receives and processes commands until all senders are dropped.
    pub async fn run(mut self) {
        info!("LobbyServer started");

        while let Some(cmd) = self.receiver.recv().await {
            self.handle_command(cmd);
        }

        info!("LobbyServer shutting down");
    }

    /// Process a single command
    fn handle_command(&mut self, cmd: ServerCommand) {
        match cmd {
            ServerCommand::Connect {
                connection_id,
                sender,
            } => {
                self.handle_connect(connection_id, sender);
            }
            ServerCommand::Disconnect { connection_id } => {
                self.handle_disconnect(connection_id);
            }
            ServerCommand::CreateLobby {
                connection_id,
                username,
            } => {
                self.handle_create_lobby(connection_id, username);
            }
            ServerCommand::JoinLobby {
                connection_id,
                room_code,
                username,
            } => {
                self.handle_join_lobby(connection_id, room_code, username);
            }
            ServerCommand::GetRoomInfo {
                connection_id,
                room_code,
            } => {
                self.handle_get_room_info(connection_id, room_code);
            }
            ServerCommand::LeaveLobby { connection_id } => {
                self.leave_current_room(connection_id);
            }
            ServerCommand::Broadcast { room_code, event } => {
                self.handle_broadcast(room_code, event);
            }
        }
    }

    /// Handle new session connection
    fn handle_connect(&mut self, connection_id: ConnectionId, sender: mpsc::Sender<ServerEvent>) {
        self.sessions
            .insert(connection_id, Session::new(connection_id, sender));
        debug!(
            %connection_id,
            sessions = self.sessions.len(),
            rooms = self.registry.room_count(),
            members = self.registry.member_count(),
            groups = self.groups.group_count(),
            "Session registered"
        );
    }

    /// Handle session disconnection
    ///
    /// Prunes registry state silently; remaining members are not notified.
    fn handle_disconnect(&mut self, connection_id: ConnectionId) {
        self.leave_current_room(connection_id);
        self.sessions.remove(&connection_id);
        debug!(
            %connection_id,
            sessions = self.sessions.len(),
            rooms = self.registry.room_count(),
            members = self.registry.member_count(),
            groups = self.groups.group_count(),
            "Session removed"
        );
    }

    /// Handle lobby creation
    fn handle_create_lobby(&mut self, connection_id: ConnectionId, username: String) {
        if !self.sessions.contains_key(&connection_id) {
            warn!(%connection_id, "createLobby from unknown session");
            return;
        }

        let previous = self.registry.room_of(connection_id).cloned();
        let creator = Member::new(connection_id, username);

        match self.registry.create_room(creator.clone()) {
            Ok(room_code) => {
                self.forget_previous_room(connection_id, previous, &room_code);
                self.groups.join(&room_code, connection_id);
                info!(
                    %connection_id,
                    %room_code,
                    username = %creator.username,
                    "Lobby created"
                );

                self.deliver(
                    connection_id,
                    ServerEvent::LobbyCreated {
                        room_code,
                        members: vec![creator],
                    },
                );
            }
            Err(e) => {
                error!(%connection_id, error = %e, "Failed to create lobby");
                self.deliver(connection_id, e.into());
            }
        }
    }

    /// Handle lobby joining
    ///
    /// Only the joining session is told; existing members are not.
    fn handle_join_lobby(&mut self, connection_id: ConnectionId, room_code: String, username: String) {
        if !self.sessions.contains_key(&connection_id) {
            warn!(%connection_id, "joinLobby from unknown session");
            return;
        }

        let room_code = RoomCode::parse(&room_code);
        let previous = self.registry.room_of(connection_id).cloned();

        match self
            .registry
            .join_room(&room_code, Member::new(connection_id, username))
        {
            Ok(members) => {
                self.forget_previous_room(connection_id, previous, &room_code);
                self.groups.join(&room_code, connection_id);
                info!(
                    %connection_id,
                    %room_code,
                    members = members.len(),
                    "Lobby joined"
                );

                self.deliver(connection_id, ServerEvent::LobbyJoined { room_code, members });
            }
            Err(e) => {
                debug!(%connection_id, %room_code, "Lobby not found on join");
                self.deliver(connection_id, e.into());
            }
        }
    }

    /// Handle member list query
    fn handle_get_room_info(&mut self, connection_id: ConnectionId, room_code: String) {
        if !self.sessions.contains_key(&connection_id) {
            return;
        }

        let room_code = RoomCode::parse(&room_code);
        let reply = match self.registry.get_members(&room_code) {
            Ok(members) => ServerEvent::RoomInfo { members },
            Err(e) => {
                debug!(%connection_id, %room_code, "Lobby not found on room info");
                e.into()
            }
        };

        self.deliver(connection_id, reply);
    }

    /// Handle a server-side broadcast to a room's group
    fn handle_broadcast(&mut self, room_code: RoomCode, event: ServerEvent) {
        let recipients = self.groups.recipients(&room_code).to_vec();
        let delivered = recipients
            .into_iter()
            .filter(|connection_id| self.deliver(*connection_id, event.clone()))
            .count();
        debug!(
            %room_code,
            event = event.event_name(),
            delivered,
            "Broadcast sent"
        );
    }

    /// Queue an event for one session without waiting on it
    ///
    /// A session whose buffer is full has stopped reading; it is dropped
    /// and removed from its room. Returns true if the event was queued.
    fn deliver(&mut self, connection_id: ConnectionId, event: ServerEvent) -> bool {
        let Some(session) = self.sessions.get(&connection_id) else {
            return false;
        };

        match session.send(event) {
            Ok(()) => true,
            Err(SendError::Full) => {
                warn!(%connection_id, "Session not reading, dropping it");
                self.handle_disconnect(connection_id);
                false
            }
            Err(SendError::ChannelClosed) => {
                // Its handler reports the disconnect shortly.
                debug!(%connection_id, "Session channel closed");
                false
            }
        }
    }

    /// Helper: Remove a session from its room, if any, and tidy its group
    fn leave_current_room(&mut self, connection_id: ConnectionId) {
        let Some(departure) = self.registry.remove_connection(connection_id) else {
            return;
        };

        self.groups.leave(&departure.room_code, connection_id);
        info!(%connection_id, room_code = %departure.room_code, "Left lobby");

        if departure.room_closed {
            self.groups.remove_group(&departure.room_code);
            info!(room_code = %departure.room_code, "Lobby closed (empty)");
        }
    }

    /// Helper: After a create/join moved a session, drop its old subscription
    fn forget_previous_room(
        &mut self,
        connection_id: ConnectionId,
        previous: Option<RoomCode>,
        current: &RoomCode,
    ) {
        let Some(previous) = previous else {
            return;
        };
        if previous == *current {
            return;
        }

        self.groups.leave(&previous, connection_id);
        info!(%connection_id, room_code = %previous, "Left lobby");

        if !self.registry.contains(&previous) {
            self.groups.remove_group(&previous);
            info!(room_code = %previous, "Lobby closed (empty)");
        }
    }
}
