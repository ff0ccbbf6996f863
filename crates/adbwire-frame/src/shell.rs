use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{FrameError, Result};

/// Frame header: type (1) + length (4) = 5 bytes.
pub const SHELL_HEADER_SIZE: usize = 5;

/// Default ceiling for a single incoming shell frame payload: 16 MiB.
pub const DEFAULT_MAX_SHELL_PAYLOAD: usize = 16 * 1024 * 1024;

/// Shell v2 frame type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellFrameKind {
    Stdin,
    Stdout,
    Stderr,
    Exit,
    CloseStdin,
    WindowSizeChange,
    /// A type byte the protocol does not define.
    Unknown(u8),
}

impl ShellFrameKind {
    pub fn from_u8(id: u8) -> Self {
        match id {
            0 => ShellFrameKind::Stdin,
            1 => ShellFrameKind::Stdout,
            2 => ShellFrameKind::Stderr,
            3 => ShellFrameKind::Exit,
            4 => ShellFrameKind::CloseStdin,
            5 => ShellFrameKind::WindowSizeChange,
            other => ShellFrameKind::Unknown(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            ShellFrameKind::Stdin => 0,
            ShellFrameKind::Stdout => 1,
            ShellFrameKind::Stderr => 2,
            ShellFrameKind::Exit => 3,
            ShellFrameKind::CloseStdin => 4,
            ShellFrameKind::WindowSizeChange => 5,
            ShellFrameKind::Unknown(other) => other,
        }
    }

    /// Returns a human-readable name for the frame type.
    pub fn name(self) -> &'static str {
        match self {
            ShellFrameKind::Stdin => "stdin",
            ShellFrameKind::Stdout => "stdout",
            ShellFrameKind::Stderr => "stderr",
            ShellFrameKind::Exit => "exit",
            ShellFrameKind::CloseStdin => "close-stdin",
            ShellFrameKind::WindowSizeChange => "window-size-change",
            ShellFrameKind::Unknown(_) => "unknown",
        }
    }
}

/// One shell v2 frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellFrame {
    pub kind: ShellFrameKind,
    pub payload: Bytes,
}

impl ShellFrame {
    pub fn new(kind: ShellFrameKind, payload: impl Into<Bytes>) -> Self {
        Self {
            kind,
            payload: payload.into(),
        }
    }

    /// The zero-length frame that tells the remote process its stdin is done.
    pub fn close_stdin() -> Self {
        Self::new(ShellFrameKind::CloseStdin, Bytes::new())
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        SHELL_HEADER_SIZE + self.payload.len()
    }
}

/// Encode a shell frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬─────────────┬─────────────────┐
/// │ Type     │ Length      │ Payload         │
/// │ (1B)     │ (4B LE)     │ (Length bytes)  │
/// └──────────┴─────────────┴─────────────────┘
/// ```
pub fn encode_shell_frame(kind: ShellFrameKind, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let len = u32::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge {
        size: payload.len(),
        max: u32::MAX as usize,
    })?;
    dst.reserve(SHELL_HEADER_SIZE + payload.len());
    dst.put_u8(kind.as_u8());
    dst.put_u32_le(len);
    dst.put_slice(payload);
    Ok(())
}

/// Decode a shell frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_shell_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<ShellFrame>> {
    if src.len() < SHELL_HEADER_SIZE {
        return Ok(None);
    }

    let kind = ShellFrameKind::from_u8(src[0]);
    let payload_len = u32::from_le_bytes([src[1], src[2], src[3], src[4]]) as usize;

    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let total = SHELL_HEADER_SIZE + payload_len;
    if src.len() < total {
        src.reserve(total - src.len());
        return Ok(None);
    }

    src.advance(SHELL_HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(ShellFrame { kind, payload }))
}

/// `tokio_util` codec for shell v2 frames, used for both directions.
#[derive(Debug, Clone)]
pub struct ShellCodec {
    max_payload: usize,
}

impl ShellCodec {
    pub fn new() -> Self {
        Self::with_max_payload(DEFAULT_MAX_SHELL_PAYLOAD)
    }

    pub fn with_max_payload(max_payload: usize) -> Self {
        Self { max_payload }
    }
}

impl Default for ShellCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for ShellCodec {
    type Item = ShellFrame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<ShellFrame>> {
        decode_shell_frame(src, self.max_payload)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<ShellFrame>> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => Err(FrameError::ConnectionClosed),
        }
    }
}

impl Encoder<ShellFrame> for ShellCodec {
    type Error = FrameError;

    fn encode(&mut self, frame: ShellFrame, dst: &mut BytesMut) -> Result<()> {
        encode_shell_frame(frame.kind, &frame.payload, dst)
    }
}

/// Build the `shell,v2,raw:` command line: each argument single-quoted,
/// embedded single quotes written as `'\''`.
pub fn shell_command<S: AsRef<str>>(command: &str, args: &[S]) -> String {
    let mut line = String::with_capacity(command.len() + args.len() * 8);
    line.push_str(command);
    for arg in args {
        line.push_str(" '");
        line.push_str(&arg.as_ref().replace('\'', "'\\''"));
        line.push('\'');
    }
    line
}
