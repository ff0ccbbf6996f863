//! Client for the wire protocol spoken by a local ADB server.
//!
//! adbwire talks to the `adb` host server over TCP (port 5037 by default) to
//! enumerate and track devices, run shell commands with separate stdout and
//! stderr plus an exit code, transfer files, and capture the screen.
//!
//! # Crate Structure
//!
//! - [`transport`]: TCP connection to the server
//! - [`frame`]: byte-exact codecs for host, shell v2, sync and framebuffer data
//! - [`client`]: async operations built on the two layers above
//!
//! ```no_run
//! # async fn demo() -> adbwire::client::Result<()> {
//! use adbwire::client::AdbServicesClient;
//!
//! let client = AdbServicesClient::new();
//! for device in client.devices().await? {
//!     println!("{}\t{}", device.serial, device.state);
//! }
//! # Ok(())
//! # }
//! ```

/// Re-export transport types.
pub mod transport {
    pub use adbwire_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use adbwire_frame::*;
}

/// Re-export client types.
pub mod client {
    pub use adbwire_client::*;
}

pub use adbwire_client::{AdbServicesClient, ClientConfig, ClientError};
