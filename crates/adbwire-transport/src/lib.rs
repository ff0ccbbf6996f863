//! TCP transport to a locally running ADB server.
//!
//! The ADB server listens on a loopback TCP port (5037 unless overridden).
//! Every protocol session in adbwire starts from a [`tokio::net::TcpStream`]
//! opened here; nothing above this layer knows how the socket was made.

pub mod addr;
pub mod error;
pub mod tcp;

pub use addr::{ServerAddr, DEFAULT_PORT};
pub use error::{Result, TransportError};
pub use tcp::connect;
