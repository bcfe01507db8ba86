//! 永続ストアの実装

pub mod sqlite;

pub use sqlite::SqliteMessageStore;
