//! エンティティ
//!
//! `Room` はルームレジストリが保持するライブなメンバーシップです。
//! 永続ストアの記録（監査ログ）とは独立しており、再起動後に復元されることはありません。

use serde::Serialize;

use super::{
    error::RoomError,
    value_object::{ConnectionId, MessageContent, Role, RoomId, Timestamp},
};

/// ルームに接続中の参加者（接続ハンドル）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Participant {
    pub id: ConnectionId,
    pub role: Role,
    pub connected_at: Timestamp,
}

impl Participant {
    pub fn new(id: ConnectionId, role: Role, connected_at: Timestamp) -> Self {
        Self {
            id,
            role,
            connected_at,
        }
    }
}

/// 接続ハンドル
///
/// ハンドシェイクで確定した接続のロールとルーム。接続のライフサイクルの間は変わりません。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    pub role: Role,
    pub room_id: RoomId,
}

impl ConnectionHandle {
    pub fn new(id: ConnectionId, role: Role, room_id: RoomId) -> Self {
        Self { id, role, room_id }
    }
}

/// ルーム
///
/// master と servant の集合を保持します。master は複数同時に参加できます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub masters: Vec<Participant>,
    pub servants: Vec<Participant>,
    pub created_at: Timestamp,
}

impl Room {
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self {
            id,
            masters: Vec::new(),
            servants: Vec::new(),
            created_at,
        }
    }

    fn members(&self, role: Role) -> &Vec<Participant> {
        match role {
            Role::Master => &self.masters,
            Role::Servant => &self.servants,
        }
    }

    fn members_mut(&mut self, role: Role) -> &mut Vec<Participant> {
        match role {
            Role::Master => &mut self.masters,
            Role::Servant => &mut self.servants,
        }
    }

    /// 参加者を自身のロールの集合に追加する
    ///
    /// 同じ接続 ID がどちらかの集合に既に存在する場合はエラー。
    pub fn add_participant(&mut self, participant: Participant) -> Result<(), RoomError> {
        if self.contains(&participant.id) {
            return Err(RoomError::DuplicateParticipant(
                participant.id.into_string(),
            ));
        }
        self.members_mut(participant.role).push(participant);
        Ok(())
    }

    /// 参加者を `role` の集合から取り除く
    pub fn remove_participant(
        &mut self,
        role: Role,
        id: &ConnectionId,
    ) -> Result<Participant, RoomError> {
        let members = self.members_mut(role);
        let position = members
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| RoomError::ParticipantNotFound(id.as_str().to_string()))?;
        Ok(members.remove(position))
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.masters.iter().chain(self.servants.iter()).any(|p| &p.id == id)
    }

    /// master / servant のどちらもいない
    pub fn is_empty(&self) -> bool {
        self.masters.is_empty() && self.servants.is_empty()
    }

    pub fn member_ids(&self, role: Role) -> Vec<ConnectionId> {
        self.members(role).iter().map(|p| p.id.clone()).collect()
    }
}

/// 永続ストアに記録されたメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: i64,
    pub timestamp: String,
    pub room_id: RoomId,
    pub sender: ConnectionId,
    pub message: MessageContent,
}
