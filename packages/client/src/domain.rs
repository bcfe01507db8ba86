//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement business logic
//! without side effects, making them easy to test.

use relay_server::domain::{Handshake, Role, RoomId};

use crate::error::ClientError;

/// Validate the room id by parsing the handshake frame the client would send.
///
/// The server drops connections whose handshake does not parse, so the same
/// parser runs here before connecting.
pub fn parse_room(role: Role, room: &str) -> Result<RoomId, ClientError> {
    let frame = format!("{}:{}", role, room);
    Handshake::parse(&frame)
        .into_result()
        .map(|(_, room_id)| room_id)
        .map_err(|e| ClientError::InvalidRoom(format!("'{}': {}", room, e)))
}

/// Check if the client should exit immediately based on the error type.
///
/// # Returns
///
/// `true` if retrying cannot help (e.g., InvalidRoom), `false` otherwise
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(error, ClientError::InvalidRoom(_))
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The number of reconnections already made
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    // Don't reconnect if the error requires immediate exit
    if should_exit_immediately(error) {
        return false;
    }

    // Don't reconnect if we've exhausted all attempts
    current_attempt < max_attempts
}
