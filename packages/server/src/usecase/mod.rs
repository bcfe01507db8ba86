//! UseCase 層
//!
//! master / servant の接続ライフサイクル（参加 → 受信・記録・配信のループ → 離脱）と、
//! ルーム一覧・詳細の取得を提供します。

mod error;
mod get_room_detail;
mod get_rooms;
mod join_room;
mod leave_room;
mod relay_message;

#[cfg(test)]
mod testing;

pub use error::{GetRoomDetailError, JoinRoomError, LeaveRoomError, RelayError};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::GetRoomsUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use relay_message::RelayMessageUseCase;
