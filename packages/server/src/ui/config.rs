//! Server runtime configuration.

use std::time::Duration;

/// Default port when neither `--port` nor `PORT` is given
pub const DEFAULT_PORT: u16 = 8765;
/// Default capacity of each connection's outbound queue
pub const DEFAULT_OUTBOUND_BUFFER: usize = 64;
/// Default bound on a single enqueue or socket write
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Listener and delivery settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address to bind to (e.g. "0.0.0.0")
    pub host: String,
    /// Port to bind to; 0 picks an ephemeral port
    pub port: u16,
    /// Bound on enqueueing to a peer and on each socket write
    pub send_timeout: Duration,
    /// Capacity of each connection's outbound queue (0 is treated as 1)
    pub outbound_buffer: usize,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Capacity for a new outbound queue; a bounded channel needs at least one slot
    pub fn outbound_capacity(&self) -> usize {
        self.outbound_buffer.max(1)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
        }
    }
}
