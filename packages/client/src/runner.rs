//! Client execution logic with reconnection support.

use std::time::Duration;

use relay_server::domain::Role;

use super::{
    domain::{parse_room, should_attempt_reconnect, should_exit_immediately},
    error::ClientError,
    session::run_client_session,
    ui::spawn_input_reader,
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Run the relay client with reconnection logic
///
/// Every reconnection sends the same handshake again.
pub async fn run_client(url: String, role: Role, room: String) -> Result<(), ClientError> {
    let room_id = parse_room(role, &room)?;
    let prompt = format!("{}@{}> ", role, room_id);
    let mut input_rx = spawn_input_reader(prompt.clone());
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {} as {} of room '{}' (attempt {}/{})",
            url,
            role,
            room_id,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS + 1
        );

        match run_client_session(&url, role, &room_id, &prompt, &mut input_rx).await {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                // If input ended (user exit), don't reconnect
                break;
            }
            Err(e) => {
                if should_exit_immediately(&e) {
                    return Err(e);
                }

                tracing::warn!("{}", e);
                if !should_attempt_reconnect(&e, reconnect_count, MAX_RECONNECT_ATTEMPTS) {
                    return Err(ClientError::ReconnectExhausted(MAX_RECONNECT_ATTEMPTS));
                }
                reconnect_count += 1;

                tracing::info!(
                    "Reconnecting in {} seconds... ({}/{})",
                    RECONNECT_INTERVAL_SECS,
                    reconnect_count,
                    MAX_RECONNECT_ATTEMPTS
                );

                tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
            }
        }
    }

    Ok(())
}
