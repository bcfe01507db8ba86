//! Room relay server.
//!
//! Masters broadcast to every participant of their room; servants answer to the
//! room's masters with a "Servant Response: " prefix. Every received message is
//! appended to a SQLite log.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin relay-server
//! cargo run --bin relay-server -- --port 9000 --database /tmp/relay.db
//! PORT=9000 RELAY_DATABASE=:memory: cargo run --bin relay-server
//! ```

use std::{sync::Arc, time::Duration};

use clap::Parser;
use relay_server::{
    domain::MessageStore,
    infrastructure::{
        message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository,
        store::SqliteMessageStore,
    },
    ui::{Server, ServerConfig},
    usecase::{
        GetRoomDetailUseCase, GetRoomsUseCase, JoinRoomUseCase, LeaveRoomUseCase,
        RelayMessageUseCase,
    },
};
use relay_shared::logger::setup_logger;

/// Database path that selects an in-memory store
const IN_MEMORY_DATABASE: &str = ":memory:";

#[derive(Parser, Debug)]
#[command(name = "relay-server")]
#[command(about = "Master/servant room relay over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value = "8765")]
    port: u16,

    /// SQLite database file (":memory:" for an in-memory store)
    #[arg(short = 'd', long, env = "RELAY_DATABASE", default_value = "relay.db")]
    database: String,

    /// Bound in milliseconds on enqueueing to a peer and on each socket write
    #[arg(long, default_value = "5000")]
    send_timeout_ms: u64,

    /// Capacity of each connection's outbound queue
    #[arg(long, default_value = "64", value_parser = clap::value_parser!(u64).range(1..))]
    outbound_buffer: u64,
}

impl Args {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            send_timeout: Duration::from_millis(self.send_timeout_ms),
            outbound_buffer: self.outbound_buffer as usize,
        }
    }
}

fn open_store(database: &str) -> Result<SqliteMessageStore, Box<dyn std::error::Error>> {
    let store = if database == IN_MEMORY_DATABASE {
        SqliteMessageStore::open_in_memory()?
    } else {
        SqliteMessageStore::open(database)?
    };
    Ok(store)
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(&["relay_server", "tower_http"], "debug");

    let args = Args::parse();
    let config = args.server_config();

    // Initialize dependencies in order:
    // 1. Repository / MessageStore
    // 2. MessagePusher
    // 3. UseCases
    // 4. Server

    // 1. Create Repository (in-memory registry) and MessageStore (SQLite)
    let repository = Arc::new(InMemoryRoomRepository::new());
    let store: Arc<dyn MessageStore> = match open_store(&args.database) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to open database '{}': {}", args.database, e);
            std::process::exit(1);
        }
    };

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new(config.send_timeout));

    // 3. Create UseCases
    let join_room_usecase = Arc::new(JoinRoomUseCase::new(
        repository.clone(),
        store.clone(),
        message_pusher.clone(),
    ));
    let relay_message_usecase = Arc::new(RelayMessageUseCase::new(
        repository.clone(),
        store,
        message_pusher.clone(),
    ));
    let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(
        repository.clone(),
        message_pusher,
    ));
    let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(repository.clone()));
    let get_room_detail_usecase = Arc::new(GetRoomDetailUseCase::new(repository));

    // 4. Create and run the server
    let server = Server::new(
        join_room_usecase,
        relay_message_usecase,
        leave_room_usecase,
        get_rooms_usecase,
        get_room_detail_usecase,
        config,
    );
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
