//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{RepositoryError, RoomError};

/// ルーム参加のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    #[error("Connection '{0}' is already attached to a room")]
    DuplicateConnection(String),

    #[error("Room registry error: {0}")]
    Registry(String),
}

impl From<RepositoryError> for JoinRoomError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Room(RoomError::DuplicateParticipant(id)) => {
                JoinRoomError::DuplicateConnection(id)
            }
            other => JoinRoomError::Registry(other.to_string()),
        }
    }
}

/// メッセージ中継のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),
}

/// ルーム離脱のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LeaveRoomError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error("Connection '{0}' is not attached to the room")]
    NotAttached(String),
}

impl From<RepositoryError> for LeaveRoomError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::RoomNotFound(id) => LeaveRoomError::RoomNotFound(id),
            RepositoryError::Room(RoomError::ParticipantNotFound(id))
            | RepositoryError::Room(RoomError::DuplicateParticipant(id)) => {
                LeaveRoomError::NotAttached(id)
            }
        }
    }
}

/// ルーム詳細取得のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("Room not found")]
    RoomNotFound,

    #[error("Invalid room id")]
    InvalidRoomId,
}
