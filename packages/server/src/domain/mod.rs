//! ドメイン層
//!
//! ルーム・参加者・メッセージのモデルと、外部への依存を抽象化する trait を定義します。
//!
//! - `value_object`: RoomId / ConnectionId / Role などの値オブジェクト
//! - `entity`: Room / Participant / ConnectionHandle / StoredMessage
//! - `handshake`: 接続直後の最初のフレームのパーサー
//! - `relay`: ロールごとの配信ルール
//! - `repository`: ルームレジストリの trait（インメモリ）
//! - `message_store`: 永続ストアの trait（監査ログ）
//! - `message_pusher`: 接続への配信の trait

pub mod entity;
pub mod error;
pub mod handshake;
pub mod message_pusher;
pub mod message_store;
pub mod relay;
pub mod repository;
pub mod value_object;

pub use entity::{ConnectionHandle, Participant, Room, StoredMessage};
pub use error::{MessagePushError, RepositoryError, RoomError, StoreError, ValueObjectError};
pub use handshake::{Handshake, HandshakeError};
pub use message_pusher::{BroadcastReport, MessagePusher, PusherChannel};
pub use message_store::MessageStore;
#[cfg(test)]
pub use message_store::MockMessageStore;
pub use relay::{SERVANT_RESPONSE_PREFIX, broadcast_targets, outbound_payload, servant_response};
pub use repository::{Attachment, Detachment, RoomRepository};
pub use value_object::{ConnectionId, MessageContent, Role, RoomId, Timestamp};
