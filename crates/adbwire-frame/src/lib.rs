//! Byte-exact codecs for the wire formats spoken to an ADB server.
//!
//! Four formats live here, each in its own module:
//! - [`host`]: 4-hex-digit length-prefixed text commands and `OKAY`/`FAIL` status tokens
//! - [`shell`]: shell v2 frames (1-byte type, 4-byte little-endian length, payload)
//! - [`sync`]: sync requests/responses (4-byte ASCII id, 4-byte little-endian value)
//! - [`framebuffer`]: the fixed 14-word framebuffer header and its pixel layouts
//!
//! [`wire`] holds the guaranteed-full-read primitives the others build on.

pub mod error;
pub mod framebuffer;
pub mod host;
pub mod shell;
pub mod sync;
pub mod wire;

pub use error::{FrameError, Result};
pub use framebuffer::{ChannelSpec, FramebufferHeader, PixelLayout, FRAMEBUFFER_HEADER_SIZE};
pub use host::{encode_command, parse_hex_len, Status, MAX_COMMAND_LEN};
pub use shell::{
    decode_shell_frame, encode_shell_frame, shell_command, ShellCodec, ShellFrame,
    ShellFrameKind, DEFAULT_MAX_SHELL_PAYLOAD, SHELL_HEADER_SIZE,
};
pub use sync::{LegacyStat, StatV2Record, SyncId, SYNC_DATA_MAX};
