//! Message formatting utilities for client display.

use relay_server::domain::SERVANT_RESPONSE_PREFIX;
use relay_shared::time::timestamp_to_jst_rfc3339;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the banner shown once the handshake is sent
    pub fn format_joined(role: &str, room: &str) -> String {
        format!(
            "\nJoined room '{}' as {}. Type messages and press Enter to send. Press Ctrl+C to exit.\n",
            room, role
        )
    }

    /// Format a frame relayed by the server
    ///
    /// Servant responses are shown without their prefix and marked as such.
    pub fn format_incoming(text: &str) -> String {
        match text.strip_prefix(SERVANT_RESPONSE_PREFIX) {
            Some(response) => format!("\n← [servant] {}\n", response),
            None => format!("\n← {}\n", text),
        }
    }

    /// Format a confirmation message after sending
    ///
    /// # Arguments
    ///
    /// * `sent_at` - Unix timestamp when the message was sent (milliseconds)
    pub fn format_sent_confirmation(sent_at: i64) -> String {
        let timestamp_str = timestamp_to_jst_rfc3339(sent_at);
        format!("sent at {}\n", timestamp_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_joined() {
        // テスト項目: 参加時のバナーにルームとロールが表示される
        // given (前提条件):
        let (role, room) = ("servant", "r1");

        // when (操作):
        let result = MessageFormatter::format_joined(role, room);

        // then (期待する結果):
        assert!(result.contains("room 'r1' as servant"));
    }

    #[test]
    fn test_format_incoming_plain() {
        // テスト項目: 通常のフレームはそのまま表示される
        // given (前提条件):
        let text = "ping";

        // when (操作):
        let result = MessageFormatter::format_incoming(text);

        // then (期待する結果):
        assert_eq!(result, "\n← ping\n");
    }

    #[test]
    fn test_format_incoming_servant_response() {
        // テスト項目: servant の応答はプレフィックスを外して印付きで表示される
        // given (前提条件):
        let text = "Servant Response: pong";

        // when (操作):
        let result = MessageFormatter::format_incoming(text);

        // then (期待する結果):
        assert_eq!(result, "\n← [servant] pong\n");
    }

    #[test]
    fn test_format_sent_confirmation() {
        // テスト項目: 送信確認メッセージが正しくフォーマットされる
        // given (前提条件):
        let sent_at = 1672498800000;

        // when (操作):
        let result = MessageFormatter::format_sent_confirmation(sent_at);

        // then (期待する結果):
        assert!(result.contains("sent at"));
        assert!(result.contains("2023-01-01"));
    }
}
