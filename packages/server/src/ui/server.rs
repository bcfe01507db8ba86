//! Server execution logic.

use std::{future::Future, net::SocketAddr, sync::Arc};

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::usecase::{
    GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase, LeaveRoomUseCase,
    RelayMessageUseCase,
};

use super::{
    ServerConfig,
    handler::{get_room_detail, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket relay server
///
/// This struct wires the use cases into an axum router and runs it.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     join_room_usecase,
///     relay_message_usecase,
///     leave_room_usecase,
///     get_rooms_usecase,
///     get_room_detail_usecase,
///     ServerConfig::default(),
/// );
/// server.run().await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `join_room_usecase` - UseCase for the handshake and room attach
    /// * `relay_message_usecase` - UseCase for persisting and relaying each message
    /// * `leave_room_usecase` - UseCase for the disconnect path
    /// * `get_rooms_usecase` - UseCase for the room list
    /// * `get_room_detail_usecase` - UseCase for a single room
    /// * `config` - Listener and delivery settings
    pub fn new(
        join_room_usecase: Arc<JoinRoomUseCase>,
        relay_message_usecase: Arc<RelayMessageUseCase>,
        leave_room_usecase: Arc<LeaveRoomUseCase>,
        get_rooms_usecase: Arc<GetRoomsUseCase>,
        get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
        config: ServerConfig,
    ) -> Self {
        Self {
            state: Arc::new(AppState {
                join_room_usecase,
                relay_message_usecase,
                leave_room_usecase,
                get_rooms_usecase,
                get_room_detail_usecase,
                config,
            }),
        }
    }

    /// Build the router
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/", get(websocket_handler))
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the relay server until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        // Bind the server to the host and port
        let bind_addr = self.state.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Relay server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// Connections see their peer address through `ConnectInfo`.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
    }
}
