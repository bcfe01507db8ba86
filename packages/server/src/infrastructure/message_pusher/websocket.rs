//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの送信キュー（`PusherChannel`）を管理
//! - 複数の接続への並行したメッセージ送信（broadcast）
//!
//! ## 設計ノート
//!
//! キューの生成とソケットへの書き出しは UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装はキューの送信側だけを持ちます。
//!
//! ブロードキャストでは、ロック中に対象のキューを複製（スナップショット）してからロックを解放し、
//! 全ての送信を `join_all` で並行に待ちます。送信がタイムアウトした、またはキューが閉じていた
//! 接続はキューを登録解除します。キューが閉じると接続の writer タスクが終了し、
//! その接続自身の切断処理が走ります。ルームのメンバーシップには触れません。

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use futures_util::future::join_all;
use tokio::sync::Mutex;

use crate::domain::{
    BroadcastReport, ConnectionId, MessagePushError, MessagePusher, PusherChannel,
};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new(Duration::from_secs(5));
/// pusher.register_client(connection_id.clone(), tx).await;
/// let report = pusher.broadcast(vec![connection_id], "hello").await;
/// ```
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの送信キュー
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
    /// 1 件の送信を待つ上限
    send_timeout: Duration,
}

impl WebSocketMessagePusher {
    pub fn new(send_timeout: Duration) -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            send_timeout,
        }
    }

    async fn send_with_timeout(
        &self,
        connection_id: &ConnectionId,
        channel: PusherChannel,
        content: &str,
    ) -> Result<(), MessagePushError> {
        match tokio::time::timeout(self.send_timeout, channel.send(content.to_string())).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(MessagePushError::ChannelClosed(
                connection_id.as_str().to_string(),
            )),
            Err(_) => Err(MessagePushError::Timeout(connection_id.as_str().to_string())),
        }
    }

    /// 送信に失敗したキューを登録解除する
    ///
    /// 同じ接続 ID で別のキューが登録し直されている場合は何もしない。
    async fn drop_stale(&self, connection_id: &ConnectionId, channel: &PusherChannel) {
        let mut clients = self.clients.lock().await;
        if clients
            .get(connection_id)
            .is_some_and(|current| current.same_channel(channel))
        {
            clients.remove(connection_id);
            tracing::warn!(
                "Dropped outbound queue of '{}' after a failed push",
                connection_id
            );
        }
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
        clients.insert(connection_id, sender);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(connection_id);
        tracing::debug!(
            "Connection '{}' unregistered from MessagePusher",
            connection_id
        );
    }

    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str) -> BroadcastReport {
        // 呼び出し時点の対象のキューを複製する（ロックは送信前に解放）
        let snapshot: Vec<(ConnectionId, Option<PusherChannel>)> = {
            let clients = self.clients.lock().await;
            targets
                .into_iter()
                .map(|target| {
                    let channel = clients.get(&target).cloned();
                    (target, channel)
                })
                .collect()
        };

        let sends = snapshot.into_iter().map(|(target, channel)| async move {
            let result = match &channel {
                Some(channel) => {
                    self.send_with_timeout(&target, channel.clone(), content)
                        .await
                }
                None => Err(MessagePushError::ClientNotFound(
                    target.as_str().to_string(),
                )),
            };
            (target, channel, result)
        });

        let mut report = BroadcastReport::default();
        for (target, channel, result) in join_all(sends).await {
            match result {
                Ok(()) => {
                    tracing::debug!("Broadcasted message to '{}'", target);
                    report.delivered += 1;
                }
                Err(e) => {
                    // ブロードキャストでは一部の送信失敗を許容
                    tracing::warn!("Failed to push message to '{}': {}", target, e);
                    if let Some(channel) = channel {
                        self.drop_stale(&target, &channel).await;
                    }
                    report.failed.push(target);
                }
            }
        }

        report
    }
}
