//! Relay rules per role.
//!
//! - master → every master (including the sender) and every servant of the room
//! - servant → every master of the room, payload prefixed with
//!   [`SERVANT_RESPONSE_PREFIX`]

use super::{
    entity::Room,
    value_object::{ConnectionId, MessageContent, Role},
};

pub const SERVANT_RESPONSE_PREFIX: &str = "Servant Response: ";

/// Fixed transformation applied to every servant message before it reaches masters.
pub fn servant_response(payload: &MessageContent) -> MessageContent {
    MessageContent::new(format!("{}{}", SERVANT_RESPONSE_PREFIX, payload.as_str()))
}

/// Outbound payload for a message received from a `role` connection.
pub fn outbound_payload(role: Role, payload: &MessageContent) -> MessageContent {
    match role {
        Role::Master => payload.clone(),
        Role::Servant => servant_response(payload),
    }
}

/// Snapshot of the recipients for a message sent by a `role` connection.
pub fn broadcast_targets(room: &Room, role: Role) -> Vec<ConnectionId> {
    match role {
        Role::Master => {
            let mut targets = room.member_ids(Role::Master);
            targets.extend(room.member_ids(Role::Servant));
            targets
        }
        Role::Servant => room.member_ids(Role::Master),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Participant, RoomId, Timestamp};

    fn id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    fn room_with(masters: &[&str], servants: &[&str]) -> Room {
        let mut room = Room::new(RoomId::new("r1".to_string()).unwrap(), Timestamp::new(0));
        for m in masters {
            room.add_participant(Participant::new(id(m), Role::Master, Timestamp::new(0)))
                .unwrap();
        }
        for s in servants {
            room.add_participant(Participant::new(id(s), Role::Servant, Timestamp::new(0)))
                .unwrap();
        }
        room
    }

    #[test]
    fn test_servant_response_prefix() {
        // テスト項目: servant のメッセージに固定のプレフィックスが付く
        // given (前提条件):
        let payload = MessageContent::from("pong");

        // when (操作):
        let response = servant_response(&payload);

        // then (期待する結果):
        assert_eq!(response.as_str(), "Servant Response: pong");
    }

    #[test]
    fn test_master_payload_is_unchanged() {
        // テスト項目: master のメッセージはそのまま配信される
        // given (前提条件):
        let payload = MessageContent::from("ping");

        // when (操作):
        let outbound = outbound_payload(Role::Master, &payload);

        // then (期待する結果):
        assert_eq!(outbound, payload);
    }

    #[test]
    fn test_master_targets_include_all_masters_and_servants() {
        // テスト項目: master の送信先は送信者を含む全 master と全 servant
        // given (前提条件):
        let room = room_with(&["m1:1", "m2:1"], &["s1:1", "s2:1"]);

        // when (操作):
        let targets = broadcast_targets(&room, Role::Master);

        // then (期待する結果):
        assert_eq!(targets.len(), 4);
        for member in ["m1:1", "m2:1", "s1:1", "s2:1"] {
            assert!(targets.contains(&id(member)));
        }
    }

    #[test]
    fn test_servant_targets_are_masters_only() {
        // テスト項目: servant の送信先は master のみ（他の servant は含まない）
        // given (前提条件):
        let room = room_with(&["m1:1"], &["s1:1", "s2:1"]);

        // when (操作):
        let targets = broadcast_targets(&room, Role::Servant);

        // then (期待する結果):
        assert_eq!(targets, vec![id("m1:1")]);
    }

    #[test]
    fn test_servant_targets_without_masters() {
        // テスト項目: master がいないルームでは servant の送信先は空
        // given (前提条件):
        let room = room_with(&[], &["s1:1"]);

        // when (操作):
        let targets = broadcast_targets(&room, Role::Servant);

        // then (期待する結果):
        assert!(targets.is_empty());
    }
}
