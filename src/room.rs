//! Room and Member definitions
//!
//! A room is an ordered list of members. The first member is the lobby
//! creator; later members follow in join order.

use serde::Serialize;

use crate::types::{ConnectionId, RoomCode};

/// One connection's participation in a room
///
/// Serializes as `{"id": "<connection id>", "username": "..."}`.
/// Display names are not validated and need not be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub id: ConnectionId,
    pub username: String,
}

impl Member {
    pub fn new(id: ConnectionId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
        }
    }
}

/// Lobby room
///
/// Exists while it has at least one member; the registry deletes it
/// as soon as the last member is removed.
#[derive(Debug)]
pub struct Room {
    /// Room code for identification
    pub code: RoomCode,
    /// Members in join order
    members: Vec<Member>,
}

impl Room {
    /// Create a new room whose only member is its creator
    pub fn new(code: RoomCode, creator: Member) -> Self {
        Self {
            code,
            members: vec![creator],
        }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Append a member, keeping existing order
    pub fn push(&mut self, member: Member) {
        self.members.push(member);
    }

    /// Remove every entry for a connection
    ///
    /// Returns true if anything was removed.
    pub fn remove_connection(&mut self, id: ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m.id != id);
        self.members.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}
