use std::net::SocketAddr;
use std::time::Duration;

/// Errors that can occur while reaching the ADB server.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server refused the connection or the socket could not be opened.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// The connection attempt did not complete in time.
    #[error("connect to {addr} timed out after {after:?}")]
    Timeout { addr: SocketAddr, after: Duration },

    /// A server address string could not be parsed.
    #[error("invalid server address {input:?}: {reason}")]
    InvalidAddr { input: String, reason: String },

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
