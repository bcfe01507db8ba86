//! Interactive CLI client for the room relay server.
//!
//! Joins a room as master or servant, prints every frame the server relays, and
//! sends each stdin line as a text frame.

mod domain;
mod error;
mod formatter;
mod runner;
mod session;
mod ui;

pub use error::ClientError;
pub use runner::run_client;
