//! MessagePusher trait 定義
//!
//! 接続へのメッセージ配信を抽象化します。各接続は有界キュー（`PusherChannel`）を持ち、
//! UI 層の writer タスクがキューからソケットへ書き出します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::ConnectionId;

/// 接続ごとの送信キュー
pub type PusherChannel = mpsc::Sender<String>;

/// ブロードキャストの結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// 送信できた接続数
    pub delivered: usize,
    /// 送信できなかった接続（未登録・キュー閉鎖・タイムアウト）
    pub failed: Vec<ConnectionId>,
}

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信キューを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信キューを登録解除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 複数の接続に並行して送信
    ///
    /// 一部の接続への送信失敗は他の接続への送信に影響せず、エラーとしても返しません。
    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str) -> BroadcastReport;
}
