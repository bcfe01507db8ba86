//! SQLite 永続ストア
//!
//! ルーム・servant・メッセージの監査ログを SQLite に記録します。
//!
//! ## テーブル
//!
//! - `rooms` - ルーム ID と master アドレスの追記ログ（`,` 区切り）
//! - `servants` - servant アドレスと最後に参加したルーム
//! - `messages` - 受信したメッセージの追記ログ
//!
//! 書き込みはすべて `spawn_blocking` 上で直列に実行されます。
//! ライブなメンバーシップの復元には使いません。

mod schema;

use std::{
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use rusqlite::{Connection, params, types::Type};
use tracing::{debug, info};

use crate::domain::{
    ConnectionId, MessageContent, MessageStore, RoomId, StoreError, StoredMessage, Timestamp,
};
use relay_shared::time::timestamp_to_jst_rfc3339;

pub use schema::{MASTERS_DELIMITER, SCHEMA_VERSION};

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

/// `servants` と `messages` の外部キーが参照するルームの行を用意する
fn insert_room_if_absent(conn: &Connection, room_id: &str) -> rusqlite::Result<()> {
    conn.execute("INSERT OR IGNORE INTO rooms (id) VALUES (?1)", [room_id])?;
    Ok(())
}

/// SQLite による MessageStore 実装
#[derive(Clone)]
pub struct SqliteMessageStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteMessageStore {
    /// データベースファイルを開く（なければ作成）
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        info!("Opening relay database at {:?}", path);

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        Self::with_connection(conn)
    }

    /// インメモリのデータベースを開く
    pub fn open_in_memory() -> Result<Self, StoreError> {
        debug!("Opening in-memory relay database");
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 接続を排他的に借りてブロッキングスレッド上でクエリを実行
    async fn run<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
            f(&conn).map_err(StoreError::from)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }

    /// ルームのメッセージログを記録順に取得
    pub async fn list_messages(&self, room_id: &RoomId) -> Result<Vec<StoredMessage>, StoreError> {
        let room_id = room_id.as_str().to_string();
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, timestamp, room_id, sender, message FROM messages WHERE room_id = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map([room_id], |row| {
                let room_id: String = row.get(2)?;
                let sender: String = row.get(3)?;
                Ok(StoredMessage {
                    id: row.get(0)?,
                    timestamp: row.get(1)?,
                    room_id: RoomId::new(room_id).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
                    })?,
                    sender: ConnectionId::new(sender).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e))
                    })?,
                    message: MessageContent::new(row.get(4)?),
                })
            })?;
            rows.collect()
        })
        .await
    }

    /// ルームの master 監査ログ（区切り文字で分割済み）。ルームの行がなければ `None`
    pub async fn master_audit(&self, room_id: &RoomId) -> Result<Option<Vec<String>>, StoreError> {
        let room_id = room_id.as_str().to_string();
        self.run(move |conn| {
            match conn.query_row("SELECT masters FROM rooms WHERE id = ?1", [room_id], |row| {
                row.get::<_, String>(0)
            }) {
                Ok(masters) => Ok(Some(
                    masters
                        .split(MASTERS_DELIMITER)
                        .filter(|m| !m.is_empty())
                        .map(str::to_string)
                        .collect(),
                )),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
    }

    /// servant が最後に参加したルーム ID
    pub async fn servant_room(&self, servant: &ConnectionId) -> Result<Option<String>, StoreError> {
        let servant = servant.as_str().to_string();
        self.run(move |conn| {
            match conn.query_row(
                "SELECT room_id FROM servants WHERE id = ?1",
                [servant],
                |row| row.get(0),
            ) {
                Ok(room_id) => Ok(Some(room_id)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn ensure_room(&self, room_id: &RoomId) -> Result<(), StoreError> {
        let room_id = room_id.as_str().to_string();
        self.run(move |conn| insert_room_if_absent(conn, &room_id))
        .await
    }

    async fn append_master(
        &self,
        room_id: &RoomId,
        master: &ConnectionId,
    ) -> Result<(), StoreError> {
        let room_id = room_id.as_str().to_string();
        let master = master.as_str().to_string();
        self.run(move |conn| {
            conn.execute(
                "INSERT INTO rooms (id, masters) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET masters = CASE
                     WHEN rooms.masters = '' THEN excluded.masters
                     ELSE rooms.masters || ?3 || excluded.masters
                 END",
                params![room_id, master, MASTERS_DELIMITER],
            )?;
            Ok(())
        })
        .await
    }

    async fn upsert_servant(
        &self,
        servant: &ConnectionId,
        room_id: &RoomId,
    ) -> Result<(), StoreError> {
        let servant = servant.as_str().to_string();
        let room_id = room_id.as_str().to_string();
        self.run(move |conn| {
            insert_room_if_absent(conn, &room_id)?;
            conn.execute(
                "INSERT INTO servants (id, room_id) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET room_id = excluded.room_id",
                params![servant, room_id],
            )?;
            Ok(())
        })
        .await
    }

    async fn append_message(
        &self,
        room_id: &RoomId,
        sender: &ConnectionId,
        message: &MessageContent,
        timestamp: Timestamp,
    ) -> Result<i64, StoreError> {
        let room_id = room_id.as_str().to_string();
        let sender = sender.as_str().to_string();
        let message = message.as_str().to_string();
        let timestamp = timestamp_to_jst_rfc3339(timestamp.value());
        self.run(move |conn| {
            insert_room_if_absent(conn, &room_id)?;
            conn.execute(
                "INSERT INTO messages (timestamp, room_id, sender, message) VALUES (?1, ?2, ?3, ?4)",
                params![timestamp, room_id, sender, message],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }
}
