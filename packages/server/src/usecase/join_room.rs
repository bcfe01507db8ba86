//! UseCase: ルーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - ルームの get-or-create、参加者の追加、永続ストアへの記録
//!
//! ### なぜこのテストが必要か
//! - どちらのロールでもルームを作成できることを保証
//! - master は監査ログに追記され、servant は upsert されることを確認
//! - 永続化に失敗しても参加できることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：master / servant の参加、既存ルームへの参加
//! - 異常系：同じ接続の二重参加
//! - エッジケース：永続ストアの障害

use std::sync::Arc;

use crate::domain::{
    ConnectionHandle, ConnectionId, MessagePusher, MessageStore, Participant, PusherChannel,
    Role, RoomId, RoomRepository, Timestamp,
};
use relay_shared::time::get_jst_timestamp;

use super::error::JoinRoomError;

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// Repository（ルームレジストリの抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessageStore（監査ログの抽象化）
    store: Arc<dyn MessageStore>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl JoinRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        store: Arc<dyn MessageStore>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            store,
            message_pusher,
        }
    }

    /// ルーム参加を実行
    ///
    /// # Arguments
    ///
    /// * `role` - ハンドシェイクで確定したロール
    /// * `room_id` - 参加するルーム（なければ作成）
    /// * `connection_id` - 接続元アドレス
    /// * `sender` - この接続の送信キュー
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectionHandle)` - 参加成功
    /// * `Err(JoinRoomError)` - 参加失敗（レジストリは変更されない）
    pub async fn execute(
        &self,
        role: Role,
        room_id: RoomId,
        connection_id: ConnectionId,
        sender: PusherChannel,
    ) -> Result<ConnectionHandle, JoinRoomError> {
        let now = Timestamp::new(get_jst_timestamp());

        // 1. ルームの get-or-create と参加者の追加
        let participant = Participant::new(connection_id.clone(), role, now);
        let attachment = self.repository.attach(&room_id, participant, now).await?;

        // 2. 送信キューを登録（これ以降のブロードキャストが届く）
        self.message_pusher
            .register_client(connection_id.clone(), sender)
            .await;

        if attachment.room_created {
            tracing::info!("Room '{}' created by {} '{}'", room_id, role, connection_id);
            if let Err(e) = self.store.ensure_room(&room_id).await {
                tracing::warn!("Failed to persist room '{}': {}", room_id, e);
            }
        }

        // 3. ロールごとの永続化（失敗しても参加は継続）
        let persisted = match role {
            Role::Master => self.store.append_master(&room_id, &connection_id).await,
            Role::Servant => self.store.upsert_servant(&connection_id, &room_id).await,
        };
        if let Err(e) = persisted {
            tracing::warn!(
                "Failed to persist {} '{}' for room '{}': {}",
                role,
                connection_id,
                room_id,
                e
            );
        }

        tracing::info!(
            "{} '{}' joined room '{}' ({} master(s), {} servant(s))",
            role,
            connection_id,
            room_id,
            attachment.room.masters.len(),
            attachment.room.servants.len()
        );

        Ok(ConnectionHandle::new(connection_id, role, room_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{MockMessageStore, StoreError},
        usecase::testing::{TestRelay, conn_id, room_id},
    };
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_master_join_creates_room_and_audits() {
        // テスト項目: master の参加でルームが作成され、監査ログに追記される
        // given (前提条件):
        let relay = TestRelay::in_memory();

        // when (操作):
        let (handle, _rx) = relay.connect(Role::Master, "r1", "10.0.0.1:5000").await;

        // then (期待する結果):
        assert_eq!(handle.role, Role::Master);
        assert_eq!(handle.room_id, room_id("r1"));
        let room = relay.repository.get_room(&room_id("r1")).await.unwrap();
        assert_eq!(room.member_ids(Role::Master), vec![conn_id("10.0.0.1:5000")]);
        assert_eq!(
            relay.store.master_audit(&room_id("r1")).await.unwrap(),
            Some(vec!["10.0.0.1:5000".to_string()])
        );
    }

    #[tokio::test]
    async fn test_servant_join_before_master() {
        // テスト項目: master がいないルームに servant が参加できる（ルームが作成される）
        // given (前提条件):
        let relay = TestRelay::in_memory();

        // when (操作):
        let (handle, _rx) = relay.connect(Role::Servant, "r1", "10.0.0.2:6000").await;

        // then (期待する結果):
        assert_eq!(handle.role, Role::Servant);
        let room = relay.repository.get_room(&room_id("r1")).await.unwrap();
        assert!(room.masters.is_empty());
        assert_eq!(room.member_ids(Role::Servant), vec![conn_id("10.0.0.2:6000")]);
        assert_eq!(
            relay.store.servant_room(&conn_id("10.0.0.2:6000")).await.unwrap(),
            Some("r1".to_string())
        );
        assert_eq!(
            relay.store.master_audit(&room_id("r1")).await.unwrap(),
            Some(vec![])
        );
    }

    #[tokio::test]
    async fn test_multiple_masters_share_room() {
        // テスト項目: 複数の master が同じルームに参加でき、監査ログに順に残る
        // given (前提条件):
        let relay = TestRelay::in_memory();
        let (_m1, _rx1) = relay.connect(Role::Master, "r1", "10.0.0.1:5000").await;

        // when (操作):
        let (_m2, _rx2) = relay.connect(Role::Master, "r1", "10.0.0.3:5001").await;

        // then (期待する結果):
        let room = relay.repository.get_room(&room_id("r1")).await.unwrap();
        assert_eq!(room.masters.len(), 2);
        assert_eq!(
            relay.store.master_audit(&room_id("r1")).await.unwrap(),
            Some(vec!["10.0.0.1:5000".to_string(), "10.0.0.3:5001".to_string()])
        );
    }

    #[tokio::test]
    async fn test_duplicate_connection_is_rejected() {
        // テスト項目: 同じ接続 ID での二重参加は拒否され、既存のメンバーは変わらない
        // given (前提条件):
        let relay = TestRelay::in_memory();
        let (_handle, _rx) = relay.connect(Role::Master, "r1", "10.0.0.1:5000").await;
        let (tx, _rx2) = mpsc::channel(1);

        // when (操作):
        let result = relay
            .join
            .execute(Role::Servant, room_id("r1"), conn_id("10.0.0.1:5000"), tx)
            .await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(JoinRoomError::DuplicateConnection("10.0.0.1:5000".to_string()))
        );
        let room = relay.repository.get_room(&room_id("r1")).await.unwrap();
        assert_eq!(room.masters.len(), 1);
        assert!(room.servants.is_empty());
    }

    #[tokio::test]
    async fn test_join_succeeds_when_store_fails() {
        // テスト項目: 永続ストアが失敗しても参加は成功する
        // given (前提条件):
        let mut store = MockMessageStore::new();
        store
            .expect_ensure_room()
            .returning(|_| Err(StoreError::Database("disk I/O error".to_string())));
        store
            .expect_append_master()
            .returning(|_, _| Err(StoreError::Database("disk I/O error".to_string())));
        let relay = TestRelay::new(store);

        // when (操作):
        let (handle, _rx) = relay.connect(Role::Master, "r1", "10.0.0.1:5000").await;

        // then (期待する結果):
        assert_eq!(handle.id, conn_id("10.0.0.1:5000"));
        assert_eq!(relay.repository.count_rooms().await, 1);
    }

    #[tokio::test]
    async fn test_existing_room_is_not_persisted_again() {
        // テスト項目: 既存のルームへの参加では ensure_room は呼ばれない
        // given (前提条件):
        let mut store = MockMessageStore::new();
        store.expect_ensure_room().times(1).returning(|_| Ok(()));
        store.expect_append_master().returning(|_, _| Ok(()));
        store.expect_upsert_servant().times(1).returning(|_, _| Ok(()));
        let relay = TestRelay::new(store);
        let (_m, _rx1) = relay.connect(Role::Master, "r1", "10.0.0.1:5000").await;

        // when (操作):
        let (_s, _rx2) = relay.connect(Role::Servant, "r1", "10.0.0.2:6000").await;

        // then (期待する結果):
        // MockMessageStore の times(1) が検証する
        assert_eq!(relay.repository.count_rooms().await, 1);
    }
}
