//! UseCase: メッセージ中継処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayMessageUseCase::execute() メソッド
//! - 受信したメッセージの記録と、ロールごとの配信
//!
//! ### なぜこのテストが必要か
//! - master のメッセージが同じルームの全 master（送信者を含む）と全 servant に届くことを保証
//! - servant のメッセージがプレフィックス付きで master にだけ届くことを保証
//! - 受信したメッセージが 1 件ずつ受信順に記録されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：ping / pong のシナリオ、複数ルーム
//! - エッジケース：master のいないルームでの servant の送信、永続ストアの障害

use std::sync::Arc;

use crate::domain::{
    BroadcastReport, ConnectionHandle, MessageContent, MessagePusher, MessageStore,
    RepositoryError, RoomRepository, Timestamp, broadcast_targets, outbound_payload,
};
use relay_shared::time::get_jst_timestamp;

use super::error::RelayError;

/// メッセージ中継のユースケース
pub struct RelayMessageUseCase {
    /// Repository（ルームレジストリの抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessageStore（監査ログの抽象化）
    store: Arc<dyn MessageStore>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl RelayMessageUseCase {
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

    /// 受信したメッセージを記録し、ルームに配信
    ///
    /// 記録が終わってから配信するため、同じ接続のメッセージは受信順にログへ残ります。
    ///
    /// # Arguments
    ///
    /// * `handle` - メッセージを受信した接続
    /// * `payload` - 受信したテキスト
    ///
    /// # Returns
    ///
    /// * `Ok(BroadcastReport)` - 配信結果（一部の失敗を含みうる）
    /// * `Err(RelayError)` - 接続のルームがレジストリにない
    pub async fn execute(
        &self,
        handle: &ConnectionHandle,
        payload: MessageContent,
    ) -> Result<BroadcastReport, RelayError> {
        let timestamp = Timestamp::new(get_jst_timestamp());

        // 1. 監査ログに記録（送信者はこの接続のアドレス。失敗しても配信は続ける）
        if let Err(e) = self
            .store
            .append_message(&handle.room_id, &handle.id, &payload, timestamp)
            .await
        {
            tracing::warn!(
                "Failed to persist message from '{}' in room '{}': {}",
                handle.id,
                handle.room_id,
                e
            );
        }

        // 2. 配信対象のスナップショットを取得
        let room = self
            .repository
            .get_room(&handle.room_id)
            .await
            .map_err(|e| match e {
                RepositoryError::RoomNotFound(id) => RelayError::RoomNotFound(id),
                RepositoryError::Room(_) => {
                    RelayError::RoomNotFound(handle.room_id.as_str().to_string())
                }
            })?;
        let targets = broadcast_targets(&room, handle.role);
        let outbound = outbound_payload(handle.role, &payload);

        // 3. 並行して配信
        tracing::debug!(
            "Relaying message from {} '{}' to {} connection(s) in room '{}'",
            handle.role,
            handle.id,
            targets.len(),
            handle.room_id
        );
        let report = self
            .message_pusher
            .broadcast(targets, outbound.as_str())
            .await;
        if !report.failed.is_empty() {
            tracing::warn!(
                "Relay from '{}' in room '{}' failed for {} connection(s)",
                handle.id,
                handle.room_id,
                report.failed.len()
            );
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{ConnectionId, MockMessageStore, Role, StoreError},
        usecase::testing::{TestRelay, conn_id, drain, room_id},
    };

    #[tokio::test]
    async fn test_ping_pong_scenario() {
        // テスト項目: master の ping が全員に届き、servant の pong が master にだけ届く
        // given (前提条件):
        let relay = TestRelay::in_memory();
        let (m, mut m_rx) = relay.connect(Role::Master, "r1", "10.0.0.1:5000").await;
        let (s1, mut s1_rx) = relay.connect(Role::Servant, "r1", "10.0.0.2:6000").await;
        let (_s2, mut s2_rx) = relay.connect(Role::Servant, "r1", "10.0.0.3:6000").await;

        // when (操作): master が ping を送信
        let report = relay
            .relay
            .execute(&m, MessageContent::from("ping"))
            .await
            .unwrap();

        // then (期待する結果): 送信者を含む 3 接続に届く
        assert_eq!(report.delivered, 3);
        assert_eq!(drain(&mut m_rx), vec!["ping".to_string()]);
        assert_eq!(drain(&mut s1_rx), vec!["ping".to_string()]);
        assert_eq!(drain(&mut s2_rx), vec!["ping".to_string()]);

        // when (操作): servant S1 が pong を返す
        let report = relay
            .relay
            .execute(&s1, MessageContent::from("pong"))
            .await
            .unwrap();

        // then (期待する結果): master にだけプレフィックス付きで届く
        assert_eq!(report.delivered, 1);
        assert_eq!(drain(&mut m_rx), vec!["Servant Response: pong".to_string()]);
        assert!(drain(&mut s1_rx).is_empty());
        assert!(drain(&mut s2_rx).is_empty());
    }

    #[tokio::test]
    async fn test_master_message_reaches_other_masters() {
        // テスト項目: master のメッセージは同じルームの他の master にも届く
        // given (前提条件):
        let relay = TestRelay::in_memory();
        let (m1, mut m1_rx) = relay.connect(Role::Master, "r1", "10.0.0.1:5000").await;
        let (_m2, mut m2_rx) = relay.connect(Role::Master, "r1", "10.0.0.4:5000").await;

        // when (操作):
        relay
            .relay
            .execute(&m1, MessageContent::from("status"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(drain(&mut m1_rx), vec!["status".to_string()]);
        assert_eq!(drain(&mut m2_rx), vec!["status".to_string()]);
    }

    #[tokio::test]
    async fn test_messages_do_not_cross_rooms() {
        // テスト項目: 別のルームの接続にはメッセージが届かない
        // given (前提条件):
        let relay = TestRelay::in_memory();
        let (m1, _m1_rx) = relay.connect(Role::Master, "r1", "10.0.0.1:5000").await;
        let (_s1, mut s1_rx) = relay.connect(Role::Servant, "r1", "10.0.0.2:6000").await;
        let (_m2, mut m2_rx) = relay.connect(Role::Master, "r2", "10.0.0.5:5000").await;
        let (s2, mut s2_rx) = relay.connect(Role::Servant, "r2", "10.0.0.6:6000").await;

        // when (操作):
        relay
            .relay
            .execute(&m1, MessageContent::from("only r1"))
            .await
            .unwrap();
        relay
            .relay
            .execute(&s2, MessageContent::from("only r2"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(drain(&mut s1_rx), vec!["only r1".to_string()]);
        assert!(drain(&mut s2_rx).is_empty());
        assert_eq!(
            drain(&mut m2_rx),
            vec!["Servant Response: only r2".to_string()]
        );
    }

    #[tokio::test]
    async fn test_servant_message_without_masters() {
        // テスト項目: master のいないルームでの servant の送信は誰にも届かず、エラーにもならない
        // given (前提条件):
        let relay = TestRelay::in_memory();
        let (s, mut s_rx) = relay.connect(Role::Servant, "r1", "10.0.0.2:6000").await;

        // when (操作):
        let report = relay
            .relay
            .execute(&s, MessageContent::from("anyone?"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(report, BroadcastReport::default());
        assert!(drain(&mut s_rx).is_empty());
    }

    #[tokio::test]
    async fn test_every_message_is_logged_in_receipt_order() {
        // テスト項目: 受信したメッセージは 1 件ずつ受信順に記録される（servant は自身のアドレスで記録）
        // given (前提条件):
        let relay = TestRelay::in_memory();
        let (m, _m_rx) = relay.connect(Role::Master, "r1", "10.0.0.1:5000").await;
        let (s, _s_rx) = relay.connect(Role::Servant, "r1", "10.0.0.2:6000").await;

        // when (操作):
        for payload in ["first", "second", "third"] {
            relay
                .relay
                .execute(&m, MessageContent::from(payload))
                .await
                .unwrap();
        }
        relay
            .relay
            .execute(&s, MessageContent::from("reply"))
            .await
            .unwrap();

        // then (期待する結果):
        let messages = relay.store.list_messages(&room_id("r1")).await.unwrap();
        let logged: Vec<(&str, &str)> = messages
            .iter()
            .map(|m| (m.sender.as_str(), m.message.as_str()))
            .collect();
        assert_eq!(
            logged,
            vec![
                ("10.0.0.1:5000", "first"),
                ("10.0.0.1:5000", "second"),
                ("10.0.0.1:5000", "third"),
                ("10.0.0.2:6000", "reply"),
            ]
        );
        assert!(messages.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_broadcast_happens_when_store_fails() {
        // テスト項目: メッセージの記録に失敗しても配信は行われる
        // given (前提条件):
        let mut store = MockMessageStore::new();
        store.expect_ensure_room().returning(|_| Ok(()));
        store.expect_append_master().returning(|_, _| Ok(()));
        store.expect_upsert_servant().returning(|_, _| Ok(()));
        store
            .expect_append_message()
            .times(1)
            .returning(|_, _, _, _| Err(StoreError::Database("database is locked".to_string())));
        let relay = TestRelay::new(store);
        let (m, _m_rx) = relay.connect(Role::Master, "r1", "10.0.0.1:5000").await;
        let (_s, mut s_rx) = relay.connect(Role::Servant, "r1", "10.0.0.2:6000").await;

        // when (操作):
        let report = relay
            .relay
            .execute(&m, MessageContent::from("ping"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(report.delivered, 2);
        assert_eq!(drain(&mut s_rx), vec!["ping".to_string()]);
    }

    #[tokio::test]
    async fn test_relay_from_evicted_room_fails() {
        // テスト項目: レジストリにないルームの接続からの中継は RoomNotFound
        // given (前提条件):
        let relay = TestRelay::in_memory();
        let handle = ConnectionHandle::new(
            ConnectionId::new("10.0.0.1:5000".to_string()).unwrap(),
            Role::Master,
            room_id("ghost"),
        );

        // when (操作):
        let result = relay
            .relay
            .execute(&handle, MessageContent::from("ping"))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(RelayError::RoomNotFound("ghost".to_string())));
    }

    #[tokio::test]
    async fn test_closed_peer_does_not_block_others() {
        // テスト項目: 受信側が閉じた接続があっても他の接続には届く
        // given (前提条件):
        let relay = TestRelay::in_memory();
        let (m, mut m_rx) = relay.connect(Role::Master, "r1", "10.0.0.1:5000").await;
        let (_s1, s1_rx) = relay.connect(Role::Servant, "r1", "10.0.0.2:6000").await;
        let (_s2, mut s2_rx) = relay.connect(Role::Servant, "r1", "10.0.0.3:6000").await;
        drop(s1_rx);

        // when (操作):
        let report = relay
            .relay
            .execute(&m, MessageContent::from("ping"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, vec![conn_id("10.0.0.2:6000")]);
        assert_eq!(drain(&mut m_rx), vec!["ping".to_string()]);
        assert_eq!(drain(&mut s2_rx), vec!["ping".to_string()]);
    }
}
