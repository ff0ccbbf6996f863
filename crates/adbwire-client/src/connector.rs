use adbwire_frame::{host, wire, Status};
use adbwire_transport::ServerAddr;
use tokio::net::TcpStream;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

/// One TCP session with the ADB server, speaking the host protocol.
///
/// A session is single-use: after a service such as `shell:` or `sync:` is
/// accepted, the socket belongs to that service and is taken out with
/// [`into_stream`](Self::into_stream).
#[derive(Debug)]
pub struct HostConnection {
    stream: TcpStream,
    server: ServerAddr,
}

impl HostConnection {
    /// Connect to the server named in `config`.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let stream = adbwire_transport::connect(config.server, config.connect_timeout).await?;
        Ok(Self {
            stream,
            server: config.server,
        })
    }

    /// Send one host command and consume its status.
    ///
    /// `FAIL` becomes [`ClientError::Server`] carrying the server's message.
    pub async fn send_command(&mut self, command: &str) -> Result<()> {
        host::write_command(&mut self.stream, command).await?;
        match host::read_status(&mut self.stream).await? {
            Status::Okay => {
                debug!(server = %self.server, command, "host command accepted");
                Ok(())
            }
            Status::Fail => {
                let message = wire::read_hex_string(&mut self.stream).await?;
                debug!(server = %self.server, command, %message, "host command failed");
                Err(ClientError::Server(message))
            }
            Status::Other(token) => Err(ClientError::protocol(format!(
                "invalid response type {:?}",
                String::from_utf8_lossy(&token)
            ))),
        }
    }

    /// Read a 4-hex-digit length-prefixed UTF-8 string.
    pub async fn read_string(&mut self) -> Result<String> {
        Ok(wire::read_hex_string(&mut self.stream).await?)
    }

    /// Route the rest of this session to the device with `serial`.
    pub async fn select_device(&mut self, serial: &str) -> Result<()> {
        self.send_command(&format!("host:transport:{serial}")).await
    }

    pub fn server(&self) -> ServerAddr {
        self.server
    }

    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    pub fn into_stream(self) -> TcpStream {
        self.stream
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncWriteExt;

    use super::*;
    use crate::error::ErrorKind;
    use crate::mock;

    #[tokio::test]
    async fn okay_then_string() {
        let (config, server) = mock::serve(|mut s| async move {
            mock::expect_command(&mut s, "host:version").await;
            mock::write_hex_string(&mut s, "0029").await;
        })
        .await;

        let mut conn = HostConnection::connect(&config).await.unwrap();
        conn.send_command("host:version").await.unwrap();
        assert_eq!(conn.read_string().await.unwrap(), "0029");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn fail_carries_server_message() {
        let (config, server) = mock::serve(|mut s| async move {
            mock::read_command(&mut s).await;
            s.write_all(b"FAIL").await.unwrap();
            mock::write_hex_string(&mut s, "device 'abc' not found").await;
        })
        .await;

        let mut conn = HostConnection::connect(&config).await.unwrap();
        let err = conn.select_device("abc").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert!(matches!(err, ClientError::Server(ref m) if m == "device 'abc' not found"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unknown_status_is_protocol_error() {
        let (config, server) = mock::serve(|mut s| async move {
            mock::read_command(&mut s).await;
            s.write_all(b"WHAT").await.unwrap();
        })
        .await;

        let mut conn = HostConnection::connect(&config).await.unwrap();
        let err = conn.send_command("host:devices").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn early_close_is_connection_error() {
        let (config, server) = mock::serve(|mut s| async move {
            mock::read_command(&mut s).await;
            s.write_all(b"OK").await.unwrap();
        })
        .await;

        let mut conn = HostConnection::connect(&config).await.unwrap();
        let err = conn.send_command("host:devices").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn oversized_command_rejected_before_write() {
        let (config, server) = mock::serve(|s| async move {
            drop(s);
        })
        .await;

        let mut conn = HostConnection::connect(&config).await.unwrap();
        let command = "x".repeat(0x10000);
        let err = conn.send_command(&command).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        server.await.unwrap();
    }
}
