//! Guaranteed-full-read primitives over any `AsyncRead`.
//!
//! The ADB server writes whatever it has; a 4-byte token can arrive split
//! across two TCP segments. Everything here loops until the requested length
//! is satisfied, and reports a stream that ends early as
//! [`FrameError::ConnectionClosed`].

use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{FrameError, Result};
use crate::host::parse_hex_len;

/// Fill `buf` completely from `reader`.
pub async fn read_full<R>(reader: &mut R, buf: &mut [u8]) -> Result<()>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                return Err(FrameError::ConnectionClosed)
            }
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(())
}

/// Read exactly `N` bytes into a fixed array.
pub async fn read_array<const N: usize, R>(reader: &mut R) -> Result<[u8; N]>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = [0u8; N];
    read_full(reader, &mut buf).await?;
    Ok(buf)
}

/// Read exactly `len` bytes into a fresh buffer, refusing lengths above `max`.
pub async fn read_vec<R>(reader: &mut R, len: usize, max: usize) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin + ?Sized,
{
    if len > max {
        return Err(FrameError::PayloadTooLarge { size: len, max });
    }
    let mut buf = vec![0u8; len];
    read_full(reader, &mut buf).await?;
    Ok(buf)
}

/// Read a 4-byte ASCII identifier (`OKAY`, `DATA`, `DENT`, ...).
pub async fn read_id<R>(reader: &mut R) -> Result<[u8; 4]>
where
    R: AsyncRead + Unpin + ?Sized,
{
    read_array::<4, _>(reader).await
}

pub async fn read_u32_le<R>(reader: &mut R) -> Result<u32>
where
    R: AsyncRead + Unpin + ?Sized,
{
    Ok(u32::from_le_bytes(read_array(reader).await?))
}

pub async fn read_u32_be<R>(reader: &mut R) -> Result<u32>
where
    R: AsyncRead + Unpin + ?Sized,
{
    Ok(u32::from_be_bytes(read_array(reader).await?))
}

pub async fn read_u64_le<R>(reader: &mut R) -> Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
{
    Ok(u64::from_le_bytes(read_array(reader).await?))
}

pub async fn read_i64_le<R>(reader: &mut R) -> Result<i64>
where
    R: AsyncRead + Unpin + ?Sized,
{
    Ok(i64::from_le_bytes(read_array(reader).await?))
}

/// Read a 4-ASCII-hex-digit length prefix.
pub async fn read_hex_len<R>(reader: &mut R) -> Result<usize>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let digits = read_array::<4, _>(reader).await?;
    parse_hex_len(&digits)
}

/// Read a hex-length-prefixed UTF-8 string (host protocol results and `FAIL` bodies).
pub async fn read_hex_string<R>(reader: &mut R) -> Result<String>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let len = read_hex_len(reader).await?;
    let body = read_vec(reader, len, usize::from(u16::MAX)).await?;
    Ok(String::from_utf8(body)?)
}

/// Read a `u32` little-endian length-prefixed UTF-8 string (sync `FAIL` bodies, entry names).
pub async fn read_le_string<R>(reader: &mut R, max: usize) -> Result<String>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let len = read_u32_le(reader).await? as usize;
    let body = read_vec(reader, len, max).await?;
    Ok(String::from_utf8(body)?)
}
