//! Error types for the lobby server
//!
//! Defines registry errors, transport-level errors, message send errors
//! and configuration errors. Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::types::RoomCode;

/// Room registry errors
///
/// `RoomNotFound` is user-facing and becomes a `lobbyNotFound` reply.
/// `CodeSpaceExhausted` is a server capacity fault and is only logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No active room with the given code
    #[error("Room not found: {0}")]
    RoomNotFound(RoomCode),

    /// Every code in the configured space is held by an active room
    #[error("Room code space exhausted ({capacity} codes in use)")]
    CodeSpaceExhausted { capacity: u64 },
}

/// Application-level errors
///
/// Fatal for the connection that raised them, never for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// WebSocket protocol error (fatal)
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// JSON serialization/deserialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Channel send error (fatal - internal channel broken)
    #[error("Channel send error")]
    ChannelSend,
}

/// Message send errors
///
/// Occurs when a session's channel is closed or its buffer is full.
#[derive(Debug, Error)]
pub enum SendError {
    /// The receiving end of the channel has been closed
    #[error("Channel closed")]
    ChannelClosed,

    /// The receiver has stopped draining its buffer
    #[error("Channel full")]
    Full,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable present but not parseable
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    /// Code alphabet must be non-empty, printable and free of repeats
    #[error("Room code alphabet must be non-empty, without whitespace, and contain unique characters")]
    InvalidAlphabet,

    /// Code length and attempt count must be at least 1
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}
