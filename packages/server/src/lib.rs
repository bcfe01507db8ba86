//! Room relay server library.
//!
//! Masters broadcast to every participant of their room, servants answer to the
//! room's masters, and every received message is appended to a SQLite log.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
