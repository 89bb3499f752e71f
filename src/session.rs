//! Session handle
//!
//! The dispatcher's view of one connected client: its connection ID and
//! the channel feeding that connection's WebSocket writer.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::SendError;
use crate::message::ServerEvent;
use crate::types::ConnectionId;

/// Connected session
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique identifier for this session
    pub id: ConnectionId,
    /// Server → Client event channel
    sender: mpsc::Sender<ServerEvent>,
}

impl Session {
    pub fn new(id: ConnectionId, sender: mpsc::Sender<ServerEvent>) -> Self {
        Self { id, sender }
    }

    /// Queue an event for this session only, never waiting for room
    ///
    /// Fails with `Full` if the client has stopped draining its buffer and
    /// with `ChannelClosed` if the client disconnected.
    pub fn send(&self, event: ServerEvent) -> Result<(), SendError> {
        self.sender.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => SendError::Full,
            TrySendError::Closed(_) => SendError::ChannelClosed,
        })
    }
}
