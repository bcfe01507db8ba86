//! Conversion logic between domain entities and DTOs.

use relay_shared::time::timestamp_to_jst_rfc3339;

use crate::domain::entity::{Participant, Room};
use crate::infrastructure::dto::http::{ParticipantDetailDto, RoomDetailDto, RoomSummaryDto};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<Participant> for ParticipantDetailDto {
    fn from(model: Participant) -> Self {
        Self {
            id: model.id.into_string(),
            connected_at: timestamp_to_jst_rfc3339(model.connected_at.value()),
        }
    }
}

impl From<Room> for RoomSummaryDto {
    fn from(model: Room) -> Self {
        Self {
            id: model.id.into_string(),
            masters: model.masters.into_iter().map(|p| p.id.into_string()).collect(),
            servants: model
                .servants
                .into_iter()
                .map(|p| p.id.into_string())
                .collect(),
            created_at: timestamp_to_jst_rfc3339(model.created_at.value()),
        }
    }
}

impl From<Room> for RoomDetailDto {
    fn from(model: Room) -> Self {
        Self {
            id: model.id.into_string(),
            masters: model.masters.into_iter().map(Into::into).collect(),
            servants: model.servants.into_iter().map(Into::into).collect(),
            created_at: timestamp_to_jst_rfc3339(model.created_at.value()),
        }
    }
}
