//! WebSocket connection handlers.
//!
//! Every connection starts with a `<role>:<room_id>` text frame. After that the
//! reader relays each text frame in order while a writer task drains the
//! connection's outbound queue into the socket.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, Handshake, MessageContent},
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state, addr))
}

/// Reads frames until the first text frame.
///
/// Returns `None` when the peer closes, errors, or sends a binary frame first.
async fn read_handshake(socket: &mut WebSocket, connection_id: &ConnectionId) -> Option<String> {
    while let Some(msg) = socket.recv().await {
        match msg {
            Ok(Message::Text(text)) => return Some(text.as_str().to_string()),
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
            Ok(Message::Binary(_)) => {
                tracing::warn!(
                    "Invalid handshake from '{}': binary frame. Dropping connection.",
                    connection_id
                );
                return None;
            }
            Ok(Message::Close(_)) => {
                tracing::debug!("'{}' closed before handshake", connection_id);
                return None;
            }
            Err(e) => {
                tracing::debug!("'{}' failed before handshake: {}", connection_id, e);
                return None;
            }
        }
    }
    None
}

/// Spawns a task that drains the outbound queue into the WebSocket sink.
///
/// Each write is bounded by `send_timeout`. The task ends when the queue is
/// dropped (the pusher gave up on this peer) or a write fails or times out.
fn pusher_loop(
    mut rx: mpsc::Receiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
    send_timeout: Duration,
    connection_id: ConnectionId,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match tokio::time::timeout(send_timeout, sender.send(Message::Text(msg.into()))).await
            {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::debug!("Write to '{}' failed: {}", connection_id, e);
                    break;
                }
                Err(_) => {
                    tracing::warn!(
                        "Write to '{}' timed out after {:?}",
                        connection_id,
                        send_timeout
                    );
                    break;
                }
            }
        }
    })
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>, addr: SocketAddr) {
    let connection_id = ConnectionId::from(addr);

    // 1. ハンドシェイク
    let Some(frame) = read_handshake(&mut socket, &connection_id).await else {
        return;
    };
    let (role, room_id) = match Handshake::parse(&frame).into_result() {
        Ok(negotiated) => negotiated,
        Err(reason) => {
            tracing::warn!(
                "Invalid handshake {:?} from '{}': {}. Dropping connection.",
                frame,
                connection_id,
                reason
            );
            return;
        }
    };

    // 2. ルームに参加し、送信キューを登録
    let (tx, rx) = mpsc::channel(state.config.outbound_capacity());
    let handle = match state
        .join_room_usecase
        .execute(role, room_id, connection_id.clone(), tx)
        .await
    {
        Ok(handle) => handle,
        Err(e) => {
            tracing::warn!("Failed to attach '{}': {}", connection_id, e);
            return;
        }
    };

    let (sender, mut receiver) = socket.split();

    // 3. 受信ループ（1 件ずつ記録・配信が終わってから次を受信）
    let state_clone = state.clone();
    let handle_clone = handle.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error from '{}': {}", handle_clone.id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received from '{}': {}", handle_clone.id, text.as_str());
                    let payload = MessageContent::from(text.as_str());
                    if let Err(e) = state_clone
                        .relay_message_usecase
                        .execute(&handle_clone, payload)
                        .await
                    {
                        tracing::warn!("Failed to relay from '{}': {}", handle_clone.id, e);
                    }
                }
                Message::Binary(_) => {
                    tracing::debug!("Ignoring binary frame from '{}'", handle_clone.id);
                }
                Message::Close(_) => {
                    tracing::info!("'{}' requested close", handle_clone.id);
                    break;
                }
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }
    });

    // 4. 送信ループ
    let mut send_task = pusher_loop(
        rx,
        sender,
        state.config.send_timeout,
        connection_id.clone(),
    );

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // 5. 離脱（ルームが空になれば回収）
    if let Err(e) = state.leave_room_usecase.execute(&handle).await {
        tracing::warn!("Failed to detach '{}': {}", connection_id, e);
    }
}
