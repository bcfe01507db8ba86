//! Handshake parsing.
//!
//! The first text frame on every connection is `<role>:<room_id>` with exactly
//! one `:`. There is no escaping; everything after the separator is the room id.

use std::fmt;

use thiserror::Error;

use super::value_object::{Role, RoomId};

/// Why a handshake frame could not be classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    #[error("missing ':' separator")]
    MissingSeparator,

    #[error("more than one ':' separator")]
    TooManySeparators,

    #[error("unknown role '{0}'")]
    UnknownRole(String),

    #[error("empty room id")]
    EmptyRoomId,
}

/// Classified handshake frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handshake {
    Master(RoomId),
    Servant(RoomId),
    Invalid(HandshakeError),
}

impl Handshake {
    pub fn parse(frame: &str) -> Self {
        let Some((role, room_id)) = frame.split_once(':') else {
            return Handshake::Invalid(HandshakeError::MissingSeparator);
        };
        if room_id.contains(':') {
            return Handshake::Invalid(HandshakeError::TooManySeparators);
        }

        let Ok(role) = role.parse::<Role>() else {
            return Handshake::Invalid(HandshakeError::UnknownRole(role.to_string()));
        };
        let Ok(room_id) = RoomId::try_from(room_id) else {
            return Handshake::Invalid(HandshakeError::EmptyRoomId);
        };

        match role {
            Role::Master => Handshake::Master(room_id),
            Role::Servant => Handshake::Servant(room_id),
        }
    }

    /// The negotiated role and room, or the classification failure.
    pub fn into_result(self) -> Result<(Role, RoomId), HandshakeError> {
        match self {
            Handshake::Master(room_id) => Ok((Role::Master, room_id)),
            Handshake::Servant(room_id) => Ok((Role::Servant, room_id)),
            Handshake::Invalid(reason) => Err(reason),
        }
    }
}

impl fmt::Display for Handshake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Handshake::Master(room_id) => f.write_str(&Role::Master.handshake(room_id)),
            Handshake::Servant(room_id) => f.write_str(&Role::Servant.handshake(room_id)),
            Handshake::Invalid(reason) => write!(f, "invalid handshake ({})", reason),
        }
    }
}
