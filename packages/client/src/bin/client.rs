//! Interactive relay client.
//!
//! Joins a room as master or servant and sends each stdin line as a text frame.
//! Masters see their own messages and every servant response; servants see
//! every master message. Automatically reconnects on disconnection (max 5
//! attempts with 5 second interval).
//!
//! Run with:
//! ```not_rust
//! cargo run --bin relay-client -- --role master --room r1
//! cargo run --bin relay-client -- -r servant -R r1 -u ws://127.0.0.1:8765/ws
//! ```

use clap::Parser;
use relay_server::domain::Role;
use relay_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "relay-client")]
#[command(about = "Join a relay room as master or servant", long_about = None)]
struct Args {
    /// Role to join as ("master" or "servant")
    #[arg(short = 'r', long)]
    role: Role,

    /// Room to join (created on first use)
    #[arg(short = 'R', long)]
    room: String,

    /// WebSocket server URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8765/ws")]
    url: String,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(&["relay_client"], "info");

    let args = Args::parse();

    // Run the client
    if let Err(e) = relay_client::run_client(args.url, args.role, args.room).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
