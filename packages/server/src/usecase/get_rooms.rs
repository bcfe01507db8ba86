//! UseCase: ルーム一覧取得

use std::sync::Arc;

use crate::domain::{Room, RoomRepository};

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// レジストリ内の全ルームを ID 順に返す
    pub async fn execute(&self) -> Vec<Room> {
        self.repository.get_rooms().await
    }

    /// レジストリ内のルーム数（ヘルスチェック用）
    pub async fn count(&self) -> usize {
        self.repository.count_rooms().await
    }
}
