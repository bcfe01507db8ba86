//! Error types for the relay client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The room id cannot be sent in a handshake
    #[error("Invalid room id {0}")]
    InvalidRoom(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The server ended an established session
    #[error("Connection lost")]
    ConnectionLost,

    /// Every reconnection attempt failed
    #[error("Failed to reconnect after {0} attempts")]
    ReconnectExhausted(u32),
}
