//! UseCase: ルーム離脱処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - LeaveRoomUseCase::execute() メソッド
//! - 送信キューの登録解除と、ルームからの参加者の削除
//!
//! ### なぜこのテストが必要か
//! - 切断した接続に以降の配信が届かないことを保証
//! - 最後の参加者が離脱したルームが回収されることを確認
//! - master が抜けても servant と新しい master が同じルームで続行できることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：master / servant の離脱、最後の参加者の離脱
//! - 異常系：二重の離脱
//! - エッジケース：回収されたルームへの再参加

use std::sync::Arc;

use crate::domain::{ConnectionHandle, Detachment, MessagePusher, RoomRepository};

use super::error::LeaveRoomError;

/// ルーム離脱のユースケース
pub struct LeaveRoomUseCase {
    /// Repository（ルームレジストリの抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// ルーム離脱を実行
    ///
    /// 永続ストアには何も書き込みません（master の監査ログは追記のみ）。
    ///
    /// # Returns
    ///
    /// * `Ok(Detachment)` - 取り除いた参加者と、ルームが回収されたか
    /// * `Err(LeaveRoomError)` - ルームまたは参加者が見つからない
    pub async fn execute(&self, handle: &ConnectionHandle) -> Result<Detachment, LeaveRoomError> {
        // 1. 送信キューの登録解除（これ以降の配信はこの接続に届かない）
        self.message_pusher.unregister_client(&handle.id).await;

        // 2. ルームから削除し、空になれば回収
        let detachment = self
            .repository
            .detach(&handle.room_id, handle.role, &handle.id)
            .await?;

        tracing::info!(
            "{} '{}' left room '{}'",
            handle.role,
            handle.id,
            handle.room_id
        );
        if detachment.room_evicted {
            tracing::info!("Room '{}' is empty and was removed", handle.room_id);
        }

        Ok(detachment)
    }
}
