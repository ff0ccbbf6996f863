//! Host command framing.
//!
//! Wire format:
//! ```text
//! request:   ┌───────────────────────┬────────────────────┐
//!            │ Length (4 hex digits) │ Command (UTF-8)    │
//!            │ uppercase, zero-pad   │ e.g. host:devices  │
//!            └───────────────────────┴────────────────────┘
//! response:  "OKAY" | "FAIL" + Length (4 hex digits) + message
//! ```

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::error::{FrameError, Result};
use crate::wire;

/// Largest command the 4-hex-digit prefix can describe.
pub const MAX_COMMAND_LEN: usize = 0xFFFF;

pub const OKAY: [u8; 4] = *b"OKAY";
pub const FAIL: [u8; 4] = *b"FAIL";

/// Status token that answers every host command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Okay,
    Fail,
    /// Anything else; the host protocol has no other tokens.
    Other([u8; 4]),
}

impl Status {
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        match bytes {
            OKAY => Status::Okay,
            FAIL => Status::Fail,
            other => Status::Other(other),
        }
    }
}

/// Encode `command` with its 4-hex-digit byte length prefix.
pub fn encode_command(command: &str, dst: &mut BytesMut) -> Result<()> {
    let len = command.len();
    if len > MAX_COMMAND_LEN {
        return Err(FrameError::CommandTooLong { len });
    }
    dst.reserve(4 + len);
    dst.put_slice(format!("{len:04X}").as_bytes());
    dst.put_slice(command.as_bytes());
    Ok(())
}

/// Parse a 4-hex-digit length prefix.
pub fn parse_hex_len(digits: &[u8; 4]) -> Result<usize> {
    let text = std::str::from_utf8(digits)
        .map_err(|_| FrameError::InvalidLength(String::from_utf8_lossy(digits).into_owned()))?;
    usize::from_str_radix(text, 16).map_err(|_| FrameError::InvalidLength(text.to_string()))
}

/// Write a framed host command in a single write.
pub async fn write_command<W>(writer: &mut W, command: &str) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = BytesMut::new();
    encode_command(command, &mut buf)?;
    trace!(command, "sending host command");
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Read the 4-byte status token that follows a host command.
pub async fn read_status<R>(reader: &mut R) -> Result<Status>
where
    R: AsyncRead + Unpin + ?Sized,
{
    Ok(Status::from_bytes(wire::read_id(reader).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_uppercase_zero_padded_length() {
        let mut buf = BytesMut::new();
        encode_command("host:devices", &mut buf).unwrap();
        assert_eq!(buf.as_ref(), b"000Chost:devices");
    }

    #[test]
    fn length_counts_utf8_bytes_not_chars() {
        let mut buf = BytesMut::new();
        encode_command("é", &mut buf).unwrap();
        assert_eq!(&buf[..4], b"0002");
    }

    #[test]
    fn empty_command_is_four_zeroes() {
        let mut buf = BytesMut::new();
        encode_command("", &mut buf).unwrap();
        assert_eq!(buf.as_ref(), b"0000");
    }

    #[test]
    fn oversized_command_rejected() {
        let command = "x".repeat(MAX_COMMAND_LEN + 1);
        let mut buf = BytesMut::new();
        let err = encode_command(&command, &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::CommandTooLong { len } if len == 0x10000));
        assert!(buf.is_empty());
    }

    #[test]
    fn hex_length_roundtrip_across_range() {
        let lengths = (0..=0x0FFF)
            .chain((0x1000..=MAX_COMMAND_LEN).step_by(0x0FF1))
            .chain([0xABCD, 0xFFFE, MAX_COMMAND_LEN]);
        for len in lengths {
            let mut buf = BytesMut::new();
            encode_command(&"a".repeat(len), &mut buf).unwrap();
            let digits: [u8; 4] = buf[..4].try_into().unwrap();
            assert_eq!(parse_hex_len(&digits).unwrap(), len, "len {len:#x}");
        }
    }

    #[test]
    fn parse_accepts_lowercase_and_rejects_garbage() {
        assert_eq!(parse_hex_len(b"00ff").unwrap(), 255);
        assert!(matches!(
            parse_hex_len(b"00G1"),
            Err(FrameError::InvalidLength(_))
        ));
        assert!(matches!(
            parse_hex_len(&[0xFF, 0x00, 0x00, 0x00]),
            Err(FrameError::InvalidLength(_))
        ));
    }

    #[test]
    fn status_tokens() {
        assert_eq!(Status::from_bytes(*b"OKAY"), Status::Okay);
        assert_eq!(Status::from_bytes(*b"FAIL"), Status::Fail);
        assert_eq!(Status::from_bytes(*b"WHAT"), Status::Other(*b"WHAT"));
    }

    #[tokio::test]
    async fn write_command_emits_one_framed_request() {
        let mut out = Vec::new();
        write_command(&mut out, "host:version").await.unwrap();
        assert_eq!(out, b"000Chost:version");
    }

    #[tokio::test]
    async fn read_status_needs_four_bytes() {
        let mut short: &[u8] = b"OK";
        assert!(matches!(
            read_status(&mut short).await,
            Err(FrameError::ConnectionClosed)
        ));
    }
}
