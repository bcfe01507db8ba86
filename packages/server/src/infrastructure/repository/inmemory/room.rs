//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をルームレジストリとして使用します。
//!
//! ## ルームの寿命
//!
//! - どちらのロールでも、最初に参照した接続がルームを作成する
//! - master が抜けても他の master / servant は残る
//! - master と servant の両方が空になった時点でルームを回収する

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Attachment, ConnectionId, Detachment, Participant, RepositoryError, Role, Room, RoomId,
    RoomRepository, Timestamp,
};

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    /// ルーム ID → Room
    rooms: Mutex<HashMap<RoomId, Room>>,
}

impl InMemoryRoomRepository {
    /// 空のレジストリを作成
    pub fn new() -> Self {
        Self::default()
    }
}

/// ルームを取得し、なければ空のルームを作成して挿入する
///
/// 既存のルームは変更しません。戻り値の bool は新規作成されたかどうか。
fn get_or_create_room<'a>(
    rooms: &'a mut HashMap<RoomId, Room>,
    room_id: &RoomId,
    now: Timestamp,
) -> (&'a mut Room, bool) {
    let mut created = false;
    let room = rooms.entry(room_id.clone()).or_insert_with(|| {
        created = true;
        Room::new(room_id.clone(), now)
    });
    (room, created)
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn attach(
        &self,
        room_id: &RoomId,
        participant: Participant,
        now: Timestamp,
    ) -> Result<Attachment, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let (room, room_created) = get_or_create_room(&mut rooms, room_id, now);

        if let Err(e) = room.add_participant(participant) {
            // 作成したばかりのルームを空のまま残さない
            if room_created {
                rooms.remove(room_id);
            }
            return Err(e.into());
        }

        Ok(Attachment {
            room: room.clone(),
            room_created,
        })
    }

    async fn detach(
        &self,
        room_id: &RoomId,
        role: Role,
        connection_id: &ConnectionId,
    ) -> Result<Detachment, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.as_str().to_string()))?;

        let participant = room.remove_participant(role, connection_id)?;

        let room_evicted = room.is_empty();
        if room_evicted {
            rooms.remove(room_id);
        }

        Ok(Detachment {
            participant,
            room_evicted,
        })
    }

    async fn get_room(&self, room_id: &RoomId) -> Result<Room, RepositoryError> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.as_str().to_string()))
    }

    async fn get_rooms(&self) -> Vec<Room> {
        let rooms = self.rooms.lock().await;
        let mut rooms: Vec<Room> = rooms.values().cloned().collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        rooms
    }

    async fn count_rooms(&self) -> usize {
        self.rooms.lock().await.len()
    }
}
