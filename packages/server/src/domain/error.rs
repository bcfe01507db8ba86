//! ドメイン層のエラー型

use thiserror::Error;

/// 値オブジェクトの生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("RoomId must not be empty")]
    EmptyRoomId,

    #[error("ConnectionId must not be empty")]
    EmptyConnectionId,

    #[error("Unknown role: '{0}'")]
    UnknownRole(String),
}

/// Room エンティティの操作エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("Connection '{0}' is already attached to this room")]
    DuplicateParticipant(String),

    #[error("Connection '{0}' is not attached to this room")]
    ParticipantNotFound(String),
}

/// ルームレジストリのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Room '{0}' not found")]
    RoomNotFound(String),

    #[error(transparent)]
    Room(#[from] RoomError),
}

/// 永続ストアのエラー
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Store lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("Store task failed: {0}")]
    Task(String),
}

/// メッセージ配信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Connection '{0}' is not registered")]
    ClientNotFound(String),

    #[error("Outbound queue of '{0}' is closed")]
    ChannelClosed(String),

    #[error("Timed out pushing to '{0}'")]
    Timeout(String),
}
