use std::fmt;

use futures_core::Stream;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::connector::HostConnection;
use crate::error::{ClientError, Result};

/// Device connection state as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionState {
    Connecting,
    Authorizing,
    Unauthorized,
    NoPerm,
    Detached,
    Offline,
    Bootloader,
    Device,
    Host,
    Recovery,
    Sideload,
    Rescue,
    Unknown,
}

impl ConnectionState {
    /// Map the state column of a device list line.
    ///
    /// `no permissions` arrives with a reason and a help URL appended, so it
    /// is matched by prefix.
    pub fn from_token(token: &str) -> Self {
        match token {
            "offline" => Self::Offline,
            "bootloader" => Self::Bootloader,
            "device" => Self::Device,
            "host" => Self::Host,
            "recovery" => Self::Recovery,
            "rescue" => Self::Rescue,
            "sideload" => Self::Sideload,
            "unauthorized" => Self::Unauthorized,
            "authorizing" => Self::Authorizing,
            "connecting" => Self::Connecting,
            "detached" => Self::Detached,
            t if t.starts_with("no permissions") => Self::NoPerm,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Authorizing => "authorizing",
            Self::Unauthorized => "unauthorized",
            Self::NoPerm => "no-perm",
            Self::Detached => "detached",
            Self::Offline => "offline",
            Self::Bootloader => "bootloader",
            Self::Device => "device",
            Self::Host => "host",
            Self::Recovery => "recovery",
            Self::Sideload => "sideload",
            Self::Rescue => "rescue",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Device {
    pub serial: String,
    pub state: ConnectionState,
}

/// Parse one `<serial>\t<state>` line. Lines without a tab yield `None`.
pub fn parse_device_line(line: &str) -> Option<Device> {
    let line = line.trim_end_matches('\r');
    let (serial, state) = line.rsplit_once('\t')?;
    if serial.is_empty() {
        return None;
    }
    Some(Device {
        serial: serial.to_string(),
        state: ConnectionState::from_token(state),
    })
}

/// Parse a full device list body. Never fails; unparseable lines are skipped.
pub fn parse_device_list(body: &str) -> Vec<Device> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let device = parse_device_line(line);
            if device.is_none() {
                trace!(line, "skipping device line without a state column");
            }
            device
        })
        .collect()
}

/// Live device list subscription opened by
/// [`AdbServicesClient::track_devices`](crate::AdbServicesClient::track_devices).
///
/// Every update is the complete current device list.
#[derive(Debug)]
pub struct DeviceTracker {
    conn: Option<HostConnection>,
    cancel: CancellationToken,
}

impl DeviceTracker {
    pub(crate) fn new(conn: HostConnection, cancel: CancellationToken) -> Self {
        Self {
            conn: Some(conn),
            cancel,
        }
    }

    /// Wait for the next non-empty device list.
    ///
    /// Returns `Ok(None)` once the cancellation token fires. The socket is
    /// closed at that point and later calls keep returning `Ok(None)`.
    pub async fn next_update(&mut self) -> Result<Option<Vec<Device>>> {
        loop {
            let Some(conn) = self.conn.as_mut() else {
                return Ok(None);
            };

            let read = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                res = conn.read_string() => Some(res),
            };

            let payload = match read {
                None => {
                    debug!("device tracking cancelled");
                    self.conn = None;
                    return Ok(None);
                }
                Some(Err(err)) => {
                    self.conn = None;
                    return Err(err);
                }
                Some(Ok(payload)) => payload,
            };

            if payload.trim().is_empty() {
                trace!("device tracking heartbeat");
                continue;
            }

            let devices = parse_device_list(&payload);
            if devices.is_empty() {
                warn!(%payload, "unparseable device tracking update");
                self.conn = None;
                return Err(ClientError::protocol(format!(
                    "invalid response: {payload:?}"
                )));
            }
            debug!(count = devices.len(), "device list update");
            return Ok(Some(devices));
        }
    }

    /// Expose the updates as a stream that ends on cancellation.
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<Device>>> + Send {
        futures_util::stream::unfold(self, |mut tracker| async move {
            match tracker.next_update().await {
                Ok(Some(devices)) => Some((Ok(devices), tracker)),
                Ok(None) => None,
                Err(err) => Some((Err(err), tracker)),
            }
        })
    }
}
