//! MessageStore trait 定義
//!
//! ルーム・servant・メッセージの永続的な記録（監査ログ）へのインターフェース。
//! 追記と upsert のみで、ライブなメンバーシップの復元には使いません。

use async_trait::async_trait;

use super::{ConnectionId, MessageContent, RoomId, StoreError, Timestamp};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// ルームの行を作成（既に存在する場合は何もしない）
    async fn ensure_room(&self, room_id: &RoomId) -> Result<(), StoreError>;

    /// ルームの master 監査ログに接続元アドレスを追記
    async fn append_master(
        &self,
        room_id: &RoomId,
        master: &ConnectionId,
    ) -> Result<(), StoreError>;

    /// servant の行を作成または更新
    async fn upsert_servant(
        &self,
        servant: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), StoreError>;

    /// メッセージを追記し、採番された ID を返す
    async fn append_message(
        &self,
        room_id: &RoomId,
        sender: &ConnectionId,
        message: &MessageContent,
        timestamp: Timestamp,
    ) -> Result<i64, StoreError>;
}
