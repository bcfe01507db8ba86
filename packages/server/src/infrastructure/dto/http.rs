//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

/// Room summary for `GET /api/rooms`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub masters: Vec<String>,
    pub servants: Vec<String>,
    /// RFC 3339 (JST)
    pub created_at: String,
}

/// Participant detail for `GET /api/rooms/{room_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDetailDto {
    pub id: String,
    /// RFC 3339 (JST)
    pub connected_at: String,
}

/// Room detail for `GET /api/rooms/{room_id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub masters: Vec<ParticipantDetailDto>,
    pub servants: Vec<ParticipantDetailDto>,
    /// RFC 3339 (JST)
    pub created_at: String,
}
