//! WebSocket client session management.

use futures_util::{SinkExt, StreamExt};
use relay_server::domain::{Role, RoomId};
use relay_shared::time::get_jst_timestamp;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use super::{error::ClientError, formatter::MessageFormatter, ui::redisplay_prompt};

/// Run one WebSocket client session
///
/// Sends the handshake, then prints every received frame and sends every input
/// line until the user ends input (`Ok`) or the connection ends (`Err`).
pub async fn run_client_session(
    url: &str,
    role: Role,
    room_id: &RoomId,
    prompt: &str,
    input_rx: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(url)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    let (mut write, mut read) = ws_stream.split();

    // The first frame selects the role and room
    write
        .send(Message::Text(role.handshake(room_id).into()))
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;

    tracing::info!("Connected to relay server!");
    print!(
        "{}",
        MessageFormatter::format_joined(role.as_str(), room_id.as_str())
    );
    redisplay_prompt(prompt);

    // Spawn a task to handle incoming messages
    let prompt_for_read = prompt.to_string();
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    print!("{}", MessageFormatter::format_incoming(text.as_str()));
                    redisplay_prompt(&prompt_for_read);
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    // Forward input lines until either side ends
    loop {
        tokio::select! {
            _ = &mut read_task => {
                return Err(ClientError::ConnectionLost);
            }
            line = input_rx.recv() => {
                let Some(line) = line else {
                    read_task.abort();
                    write.close().await.ok();
                    return Ok(());
                };

                if let Err(e) = write.send(Message::Text(line.into())).await {
                    tracing::warn!("Failed to send message: {}", e);
                    read_task.abort();
                    return Err(ClientError::ConnectionLost);
                }

                // Display sent timestamp and redisplay prompt
                let formatted = MessageFormatter::format_sent_confirmation(get_jst_timestamp());
                print!("{}", formatted);
                redisplay_prompt(prompt);
            }
        }
    }
}
