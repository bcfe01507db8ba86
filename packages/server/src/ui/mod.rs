//! WebSocket relay server: axum router, handlers and server runner.

mod config;
mod handler;
mod server;
mod signal;
pub mod state;

pub use config::ServerConfig;
pub use server::Server;
