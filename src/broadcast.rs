//! Broadcast groups
//!
//! Each room code maps to the sessions subscribed to it, so one event can
//! be fanned out to a whole room. Subscription order is kept. Empty groups
//! are dropped.

use std::collections::HashMap;

use crate::types::{ConnectionId, RoomCode};

#[derive(Debug, Default)]
pub struct BroadcastGroups {
    groups: HashMap<RoomCode, Vec<ConnectionId>>,
}

impl BroadcastGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a session to a room's group
    ///
    /// Returns false if it was already subscribed.
    pub fn join(&mut self, code: &RoomCode, id: ConnectionId) -> bool {
        let group = self.groups.entry(code.clone()).or_default();
        if group.contains(&id) {
            return false;
        }
        group.push(id);
        true
    }

    /// Unsubscribe a session from a room's group
    pub fn leave(&mut self, code: &RoomCode, id: ConnectionId) -> bool {
        let Some(group) = self.groups.get_mut(code) else {
            return false;
        };
        let before = group.len();
        group.retain(|member| *member != id);
        let removed = group.len() != before;
        if group.is_empty() {
            self.groups.remove(code);
        }
        removed
    }

    /// Drop a whole group, e.g. when its room closes
    pub fn remove_group(&mut self, code: &RoomCode) {
        self.groups.remove(code);
    }

    /// Sessions subscribed to a room, in subscription order
    pub fn recipients(&self, code: &RoomCode) -> &[ConnectionId] {
        self.groups.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}
