//! Sync protocol framing.
//!
//! Wire format, both directions:
//! ```text
//! ┌──────────────┬─────────────┬─────────────────────────┐
//! │ Id (4 ASCII) │ Value (4B LE)│ Body (Value bytes, or  │
//! │ RECV, DATA.. │ length/mtime │ fixed-size record)      │
//! └──────────────┴─────────────┴─────────────────────────┘
//! ```
//! Responses to `STAT`/`STA2`/`LST2`/`LIST`/`LIS2` carry fixed-size
//! little-endian records whose layouts are decoded here.

use bytes::{BufMut, BytesMut};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::error::{FrameError, Result};

/// Largest `DATA` chunk either side may send: 64 KiB.
pub const SYNC_DATA_MAX: usize = 64 * 1024;

/// Request/response header: id (4) + value (4).
pub const SYNC_HEADER_SIZE: usize = 8;

/// Legacy stat record after the id: mode, size, mtime (`u32` LE each).
pub const LEGACY_STAT_SIZE: usize = 12;

/// Stat v2 record after the id.
pub const STAT_V2_SIZE: usize = 68;

/// Record that follows `DONE` at the end of a `LIST` listing.
pub const LIST_DONE_SENTINEL: usize = 16;

/// Record that follows `DONE` at the end of a `LIS2` listing.
pub const LIS2_DONE_SENTINEL: usize = 72;

/// Longest path accepted in a sync request.
pub const MAX_PATH_LEN: usize = 1024;

/// 4-byte sync command and response identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncId {
    Recv,
    Send,
    Data,
    Done,
    Okay,
    Fail,
    List,
    Lis2,
    Dent,
    Dnt2,
    Stat,
    Sta2,
    Lst2,
    Quit,
}

impl SyncId {
    pub const fn code(self) -> [u8; 4] {
        match self {
            SyncId::Recv => *b"RECV",
            SyncId::Send => *b"SEND",
            SyncId::Data => *b"DATA",
            SyncId::Done => *b"DONE",
            SyncId::Okay => *b"OKAY",
            SyncId::Fail => *b"FAIL",
            SyncId::List => *b"LIST",
            SyncId::Lis2 => *b"LIS2",
            SyncId::Dent => *b"DENT",
            SyncId::Dnt2 => *b"DNT2",
            SyncId::Stat => *b"STAT",
            SyncId::Sta2 => *b"STA2",
            SyncId::Lst2 => *b"LST2",
            SyncId::Quit => *b"QUIT",
        }
    }

    pub fn from_code(code: [u8; 4]) -> Option<Self> {
        let id = match &code {
            b"RECV" => SyncId::Recv,
            b"SEND" => SyncId::Send,
            b"DATA" => SyncId::Data,
            b"DONE" => SyncId::Done,
            b"OKAY" => SyncId::Okay,
            b"FAIL" => SyncId::Fail,
            b"LIST" => SyncId::List,
            b"LIS2" => SyncId::Lis2,
            b"DENT" => SyncId::Dent,
            b"DNT2" => SyncId::Dnt2,
            b"STAT" => SyncId::Stat,
            b"STA2" => SyncId::Sta2,
            b"LST2" => SyncId::Lst2,
            b"QUIT" => SyncId::Quit,
            _ => return None,
        };
        Some(id)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SyncId::Recv => "RECV",
            SyncId::Send => "SEND",
            SyncId::Data => "DATA",
            SyncId::Done => "DONE",
            SyncId::Okay => "OKAY",
            SyncId::Fail => "FAIL",
            SyncId::List => "LIST",
            SyncId::Lis2 => "LIS2",
            SyncId::Dent => "DENT",
            SyncId::Dnt2 => "DNT2",
            SyncId::Stat => "STAT",
            SyncId::Sta2 => "STA2",
            SyncId::Lst2 => "LST2",
            SyncId::Quit => "QUIT",
        }
    }
}

impl std::fmt::Display for SyncId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encode an 8-byte header: id followed by `value` as `u32` LE.
pub fn encode_header(id: SyncId, value: u32, dst: &mut BytesMut) {
    dst.reserve(SYNC_HEADER_SIZE);
    dst.put_slice(&id.code());
    dst.put_u32_le(value);
}

/// Encode a request carrying a path or other string payload.
pub fn encode_request(id: SyncId, payload: &str, dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PATH_LEN {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PATH_LEN,
        });
    }
    encode_header(id, payload.len() as u32, dst);
    dst.put_slice(payload.as_bytes());
    Ok(())
}

/// Write a request in a single write.
pub async fn write_request<W>(writer: &mut W, id: SyncId, payload: &str) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = BytesMut::new();
    encode_request(id, payload, &mut buf)?;
    trace!(%id, payload, "sync request");
    writer.write_all(&buf).await?;
    Ok(())
}

/// Write a bare header (`DONE` with an mtime, `QUIT`).
pub async fn write_header<W>(writer: &mut W, id: SyncId, value: u32) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = BytesMut::new();
    encode_header(id, value, &mut buf);
    writer.write_all(&buf).await?;
    Ok(())
}

/// Write one `DATA` chunk: header and bytes together.
pub async fn write_data<W>(writer: &mut W, chunk: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    if chunk.len() > SYNC_DATA_MAX {
        return Err(FrameError::PayloadTooLarge {
            size: chunk.len(),
            max: SYNC_DATA_MAX,
        });
    }
    let mut buf = BytesMut::with_capacity(SYNC_HEADER_SIZE + chunk.len());
    encode_header(SyncId::Data, chunk.len() as u32, &mut buf);
    buf.put_slice(chunk);
    writer.write_all(&buf).await?;
    Ok(())
}

/// `SEND` payload: `<path>,0<permission bits in octal>`.
pub fn send_target(path: &str, mode: u32) -> String {
    format!("{path},0{:o}", mode & 0o777)
}

fn le_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn le_u64(bytes: &[u8], at: usize) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(word)
}

fn le_i64(bytes: &[u8], at: usize) -> i64 {
    le_u64(bytes, at) as i64
}

/// Legacy stat record, also the head of a `DENT` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LegacyStat {
    pub mode: u32,
    pub size: u32,
    pub mtime: u32,
}

impl LegacyStat {
    pub fn from_le_bytes(bytes: &[u8; LEGACY_STAT_SIZE]) -> Self {
        Self {
            mode: le_u32(bytes, 0),
            size: le_u32(bytes, 4),
            mtime: le_u32(bytes, 8),
        }
    }
}

/// Stat v2 record, also the head of a `DNT2` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatV2Record {
    pub error: u32,
    pub dev: u64,
    pub ino: u64,
    pub mode: u32,
    pub nlink: u32,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
    pub atime: i64,
    pub mtime: i64,
    pub ctime: i64,
}

impl StatV2Record {
    pub fn from_le_bytes(bytes: &[u8; STAT_V2_SIZE]) -> Self {
        Self {
            error: le_u32(bytes, 0),
            dev: le_u64(bytes, 4),
            ino: le_u64(bytes, 12),
            mode: le_u32(bytes, 20),
            nlink: le_u32(bytes, 24),
            uid: le_u32(bytes, 28),
            gid: le_u32(bytes, 32),
            size: le_u64(bytes, 36),
            atime: le_i64(bytes, 44),
            mtime: le_i64(bytes, 52),
            ctime: le_i64(bytes, 60),
        }
    }
}
