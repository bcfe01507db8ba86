//! Database schema definitions

use rusqlite::Connection;
use tracing::info;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Delimiter of the `rooms.masters` audit blob
pub const MASTERS_DELIMITER: &str = ",";

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating new relay database schema v{}", SCHEMA_VERSION);
        conn.execute_batch(RELAY_SCHEMA)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!(
            "Migrating relay schema from v{} to v{}",
            current_version, SCHEMA_VERSION
        );
        conn.execute_batch(RELAY_SCHEMA)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else {
        info!("Relay database schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Get current schema version (0 if not initialized)
fn get_schema_version(conn: &Connection) -> rusqlite::Result<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )?;

    match conn.query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
        row.get(0)
    }) {
        Ok(version) => Ok(version),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Rooms, servants and the message log.
///
/// Foreign keys are enforced (`PRAGMA foreign_keys=ON` on open); every write to
/// `servants` or `messages` inserts the `rooms` row first.
const RELAY_SCHEMA: &str = r#"
-- One row per room id ever seen; masters is an append-only audit blob
CREATE TABLE IF NOT EXISTS rooms (
    id TEXT PRIMARY KEY NOT NULL,
    masters TEXT NOT NULL DEFAULT ''
);

-- Last room each servant address joined
CREATE TABLE IF NOT EXISTS servants (
    id TEXT PRIMARY KEY NOT NULL,
    room_id TEXT NOT NULL,
    FOREIGN KEY (room_id) REFERENCES rooms(id)
);

-- Append-only message log
CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    room_id TEXT NOT NULL,
    sender TEXT NOT NULL,
    message TEXT NOT NULL,
    FOREIGN KEY (room_id) REFERENCES rooms(id)
);

CREATE INDEX IF NOT EXISTS idx_messages_room ON messages(room_id, id);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        // テスト項目: スキーマ初期化を繰り返してもバージョンは変わらない
        // given (前提条件):
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        // when (操作):
        init_schema(&conn).unwrap();

        // then (期待する結果):
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('rooms', 'servants', 'messages')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);
    }
}
