//! Async client for a local ADB server.
//!
//! Start from [`AdbServicesClient`]: every operation opens its own TCP
//! session to the server, runs one service, and closes the session when it
//! returns. Long-lived services hand the session to a dedicated type:
//! [`DeviceTracker`] for `host:track-devices` and [`AdbSyncClient`] for
//! `sync:`.

pub mod client;
pub mod config;
pub mod connector;
pub mod devices;
pub mod error;
pub mod framebuffer;
pub mod shell;
pub mod stat;
pub mod sync;

#[cfg(test)]
mod mock;

pub use client::AdbServicesClient;
pub use config::ClientConfig;
pub use connector::HostConnection;
pub use devices::{parse_device_list, ConnectionState, Device, DeviceTracker};
pub use error::{ClientError, ErrorKind, Result};
pub use framebuffer::{Framebuffer, FramebufferSummary};
pub use shell::ExecIo;
pub use stat::{StatEntry, StatV2Entry, SyncErrorCode, UnixFileMode};
pub use sync::AdbSyncClient;
pub use tokio_util::sync::CancellationToken;
