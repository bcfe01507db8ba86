//! Data Transfer Objects (DTOs) for the relay server.
//!
//! Only the HTTP API uses DTOs; WebSocket frames are opaque text.
//!
//! - `http`: HTTP API response DTOs
//! - `conversion`: Domain entity → DTO conversion

pub mod conversion;
pub mod http;
