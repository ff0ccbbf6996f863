use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::connector::HostConnection;
use crate::devices::{parse_device_list, Device, DeviceTracker};
use crate::error::{ClientError, Result};
use crate::framebuffer::{self, Framebuffer};
use crate::shell::{self, ExecIo};
use crate::sync::AdbSyncClient;

/// Entry point for talking to an ADB server.
///
/// The client holds only configuration. Each call opens its own connection
/// and closes it on return, so one client can be shared freely across tasks.
#[derive(Debug, Clone, Default)]
pub struct AdbServicesClient {
    config: ClientConfig,
}

impl AdbServicesClient {
    /// Client for the default server at `127.0.0.1:5037`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Open a raw host-protocol session.
    pub async fn connect(&self) -> Result<HostConnection> {
        HostConnection::connect(&self.config).await
    }

    /// The server's internal protocol version (`host:version`).
    pub async fn host_version(&self) -> Result<u32> {
        let mut conn = self.connect().await?;
        conn.send_command("host:version").await?;
        let text = conn.read_string().await?;
        u32::from_str_radix(text.trim(), 16)
            .map_err(|_| ClientError::protocol(format!("invalid version {text:?}")))
    }

    /// One snapshot of attached devices.
    pub async fn devices(&self) -> Result<Vec<Device>> {
        let mut conn = self.connect().await?;
        conn.send_command("host:devices").await?;
        let body = conn.read_string().await?;
        let devices = parse_device_list(&body);
        debug!(count = devices.len(), "device snapshot");
        Ok(devices)
    }

    /// Subscribe to device list changes until `cancel` fires.
    pub async fn track_devices(&self, cancel: CancellationToken) -> Result<DeviceTracker> {
        let mut conn = self.connect().await?;
        conn.send_command("host:track-devices").await?;
        info!(server = %self.config.server, "tracking devices");
        Ok(DeviceTracker::new(conn, cancel))
    }

    /// Run `command` with `args` on the device and return its exit code.
    ///
    /// Each argument is single-quoted for the remote shell. Output frames are
    /// written to `io` in the order they arrive.
    pub async fn execute<S: AsRef<str>>(
        &self,
        serial: &str,
        command: &str,
        args: &[S],
        io: ExecIo<'_>,
        cancel: CancellationToken,
    ) -> Result<u8> {
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        let line = adbwire_frame::shell_command(command, args);
        let mut conn = self.connect().await?;
        conn.select_device(serial).await?;
        conn.send_command(&format!("shell,v2,raw:{line}")).await?;
        debug!(serial, command = %line, "shell started");
        shell::run(conn, io, self.config.stdin_chunk_size, cancel).await
    }

    /// Open a sync session for file operations on the device.
    pub async fn sync_client(&self, serial: &str) -> Result<AdbSyncClient> {
        let mut conn = self.connect().await?;
        conn.select_device(serial).await?;
        conn.send_command("sync:").await?;
        debug!(serial, "sync session open");
        Ok(AdbSyncClient::new(conn.into_stream()))
    }

    /// Capture the device screen.
    pub async fn capture_screen(&self, serial: &str) -> Result<Framebuffer> {
        let mut conn = self.connect().await?;
        conn.select_device(serial).await?;
        conn.send_command("framebuffer:").await?;
        framebuffer::read(conn).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::devices::ConnectionState;
    use crate::error::ErrorKind;
    use crate::mock;

    #[tokio::test]
    async fn host_version_parses_hex() {
        let (config, server) = mock::serve(|mut s| async move {
            mock::expect_command(&mut s, "host:version").await;
            mock::write_hex_string(&mut s, "0029").await;
        })
        .await;

        let client = AdbServicesClient::with_config(config);
        assert_eq!(client.host_version().await.unwrap(), 41);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn devices_snapshot() {
        let (config, server) = mock::serve(|mut s| async move {
            mock::expect_command(&mut s, "host:devices").await;
            mock::write_hex_string(&mut s, "emulator-5554\tdevice\nZX1\toffline\n").await;
        })
        .await;

        let client = AdbServicesClient::with_config(config);
        let devices = client.devices().await.unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].serial, "emulator-5554");
        assert_eq!(devices[1].state, ConnectionState::Offline);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn empty_device_list() {
        let (config, server) = mock::serve(|mut s| async move {
            mock::expect_command(&mut s, "host:devices").await;
            mock::write_hex_string(&mut s, "").await;
        })
        .await;

        let client = AdbServicesClient::with_config(config);
        assert!(client.devices().await.unwrap().is_empty());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unknown_serial_is_server_error() {
        let (config, server) = mock::serve(|mut s| async move {
            mock::read_command(&mut s).await;
            tokio::io::AsyncWriteExt::write_all(&mut s, b"FAIL").await.unwrap();
            mock::write_hex_string(&mut s, "device 'nope' not found").await;
        })
        .await;

        let client = AdbServicesClient::with_config(config);
        let err = client.capture_screen("nope").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn no_server_is_connection_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = ClientConfig::default()
            .with_server(addr.into())
            .with_connect_timeout(Some(Duration::from_secs(2)));
        let err = AdbServicesClient::with_config(config)
            .devices()
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
    }

    #[tokio::test]
    async fn pre_cancelled_exec_never_connects() {
        let config = ClientConfig::default().with_server("127.0.0.1:1".parse().unwrap());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = AdbServicesClient::with_config(config)
            .execute::<&str>("emu", "true", &[], ExecIo::new(), cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Cancelled));
    }
}
