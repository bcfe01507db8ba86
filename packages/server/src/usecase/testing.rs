//! UseCase テスト用のヘルパー

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionHandle, ConnectionId, MessageStore, Role, RoomId},
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository,
        store::SqliteMessageStore,
    },
};

use super::{JoinRoomUseCase, LeaveRoomUseCase, RelayMessageUseCase};

pub fn room_id(id: &str) -> RoomId {
    RoomId::new(id.to_string()).unwrap()
}

pub fn conn_id(id: &str) -> ConnectionId {
    ConnectionId::new(id.to_string()).unwrap()
}

/// 実際のレジストリ・ストア・pusher を組み合わせたリレー
pub struct TestRelay<S: MessageStore + 'static> {
    pub repository: Arc<InMemoryRoomRepository>,
    pub store: Arc<S>,
    pub join: JoinRoomUseCase,
    pub relay: RelayMessageUseCase,
    pub leave: LeaveRoomUseCase,
}

impl TestRelay<SqliteMessageStore> {
    pub fn in_memory() -> Self {
        Self::new(SqliteMessageStore::open_in_memory().unwrap())
    }
}

impl<S: MessageStore + 'static> TestRelay<S> {
    pub fn new(store: S) -> Self {
        let repository = Arc::new(InMemoryRoomRepository::new());
        let store = Arc::new(store);
        let pusher = Arc::new(WebSocketMessagePusher::new(Duration::from_millis(100)));
        Self {
            join: JoinRoomUseCase::new(repository.clone(), store.clone(), pusher.clone()),
            relay: RelayMessageUseCase::new(repository.clone(), store.clone(), pusher.clone()),
            leave: LeaveRoomUseCase::new(repository.clone(), pusher),
            repository,
            store,
        }
    }

    /// 接続してハンドルと受信キューを返す
    pub async fn connect(
        &self,
        role: Role,
        room: &str,
        addr: &str,
    ) -> (ConnectionHandle, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(16);
        let handle = self
            .join
            .execute(role, room_id(room), conn_id(addr), tx)
            .await
            .unwrap();
        (handle, rx)
    }
}

/// 受信キューに溜まっているフレームを全て取り出す
pub fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<String> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        frames.push(frame);
    }
    frames
}
