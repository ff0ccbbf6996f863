use std::time::Duration;

use tokio::net::TcpStream;
use tracing::debug;

use crate::addr::ServerAddr;
use crate::error::{Result, TransportError};

/// Open a TCP connection to the ADB server.
///
/// With `timeout = None` the attempt waits for the OS connect timeout.
/// The returned stream has `TCP_NODELAY` set: the host protocol is made of
/// small request headers that should not sit in Nagle's buffer.
pub async fn connect(addr: ServerAddr, timeout: Option<Duration>) -> Result<TcpStream> {
    let target = addr.socket_addr();
    let attempt = TcpStream::connect(target);

    let stream = match timeout {
        Some(after) => tokio::time::timeout(after, attempt)
            .await
            .map_err(|_| TransportError::Timeout {
                addr: target,
                after,
            })?,
        None => attempt.await,
    }
    .map_err(|source| TransportError::Connect {
        addr: target,
        source,
    })?;

    stream.set_nodelay(true)?;
    debug!(%addr, "connected to adb server");
    Ok(stream)
}
