//! Repository trait 定義
//!
//! ルームレジストリ（ルーム ID → Room のライブなメンバーシップ）へのインターフェース。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{ConnectionId, Participant, RepositoryError, Role, Room, RoomId, Timestamp};

/// `attach` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// 参加後のルームのスナップショット
    pub room: Room,
    /// この呼び出しでルームが新規作成されたか
    pub room_created: bool,
}

/// `detach` の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detachment {
    /// 取り除かれた参加者
    pub participant: Participant,
    /// ルームが空になりレジストリから回収されたか
    pub room_evicted: bool,
}

/// Room Repository trait
///
/// ルームの作成・参加・離脱・回収を担います。
/// 参加（ルームの get-or-create とメンバー追加）と離脱（メンバー削除と空ルームの回収）は
/// それぞれ 1 回のロックの中で行われ、空のルームが参加の途中で回収されることはありません。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// ルームを取得し、なければ作成してから参加者を追加
    async fn attach(
        &self,
        room_id: &RoomId,
        participant: Participant,
        now: Timestamp,
    ) -> Result<Attachment, RepositoryError>;

    /// 参加者をルームから取り除き、ルームが空になれば回収
    async fn detach(
        &self,
        room_id: &RoomId,
        role: Role,
        connection_id: &ConnectionId,
    ) -> Result<Detachment, RepositoryError>;

    /// ルームのスナップショットを取得
    async fn get_room(&self, room_id: &RoomId) -> Result<Room, RepositoryError>;

    /// 全ルームのスナップショットを取得（ID 順）
    async fn get_rooms(&self) -> Vec<Room>;

    /// レジストリ内のルーム数
    async fn count_rooms(&self) -> usize;
}
