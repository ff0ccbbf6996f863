//! Sync file-transfer client.
//!
//! A sync session is a single socket running one request at a time. Calls on
//! a shared [`AdbSyncClient`] queue on its mutex and may follow each other on
//! the same session. Device-side failures (`FAIL`, errno in a stat record) are
//! read to the end of their reply. A call dropped mid-transfer, or one that
//! hit a connection or protocol error, leaves the stream mid-message and the
//! client should be discarded.

use std::time::{SystemTime, UNIX_EPOCH};

use adbwire_frame::sync::{
    self as wire_sync, LEGACY_STAT_SIZE, LIS2_DONE_SENTINEL, LIST_DONE_SENTINEL, STAT_V2_SIZE,
};
use adbwire_frame::{wire, LegacyStat, StatV2Record, SyncId, SYNC_DATA_MAX};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use crate::error::{ClientError, Result};
use crate::stat::{StatEntry, StatV2Entry};

/// Longest entry name accepted in a listing.
const MAX_NAME_LEN: usize = 4096;

/// Longest `FAIL` message accepted.
const MAX_FAIL_LEN: usize = 64 * 1024;

/// File operations on one device over a `sync:` session.
#[derive(Debug)]
pub struct AdbSyncClient {
    stream: Mutex<TcpStream>,
}

impl AdbSyncClient {
    pub(crate) fn new(stream: TcpStream) -> Self {
        Self {
            stream: Mutex::new(stream),
        }
    }

    /// Copy the remote file at `path` into `sink`.
    pub async fn pull<W>(&self, path: &str, sink: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut stream = self.stream.lock().await;
        wire_sync::write_request(&mut *stream, SyncId::Recv, path).await?;

        let mut buf = vec![0u8; SYNC_DATA_MAX];
        let mut total = 0u64;
        loop {
            match read_response(&mut *stream).await? {
                SyncId::Data => {
                    let len = wire::read_u32_le(&mut *stream).await? as usize;
                    if len > SYNC_DATA_MAX {
                        return Err(ClientError::protocol(format!(
                            "DATA chunk of {len} bytes exceeds {SYNC_DATA_MAX}"
                        )));
                    }
                    wire::read_full(&mut *stream, &mut buf[..len]).await?;
                    sink.write_all(&buf[..len])
                        .await
                        .map_err(adbwire_frame::FrameError::from)?;
                    total += len as u64;
                    trace!(len, "pull chunk");
                }
                SyncId::Done => {
                    let _ = wire::read_u32_le(&mut *stream).await?;
                    break;
                }
                other => return Err(unexpected(other)),
            }
        }
        sink.flush().await.map_err(adbwire_frame::FrameError::from)?;
        debug!(path, bytes = total, "pull complete");
        Ok(total)
    }

    /// Upload `source` to `path` with permission bits `mode` and
    /// modification time `mtime`.
    pub async fn push<R>(
        &self,
        path: &str,
        source: &mut R,
        mtime: SystemTime,
        mode: u32,
    ) -> Result<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut stream = self.stream.lock().await;
        let target = wire_sync::send_target(path, mode);
        wire_sync::write_request(&mut *stream, SyncId::Send, &target).await?;

        let mut buf = vec![0u8; SYNC_DATA_MAX];
        let mut total = 0u64;
        loop {
            let n = source
                .read(&mut buf)
                .await
                .map_err(adbwire_frame::FrameError::from)?;
            if n == 0 {
                break;
            }
            wire_sync::write_data(&mut *stream, &buf[..n]).await?;
            total += n as u64;
            trace!(len = n, "push chunk");
        }

        wire_sync::write_header(&mut *stream, SyncId::Done, unix_seconds(mtime)).await?;
        stream
            .flush()
            .await
            .map_err(adbwire_frame::FrameError::from)?;

        let status = read_response(&mut *stream).await?;
        let _ = wire::read_u32_le(&mut *stream).await?;
        match status {
            SyncId::Okay => {
                debug!(path, bytes = total, "push complete");
                Ok(total)
            }
            other => Err(unexpected(other)),
        }
    }

    /// Legacy directory listing. Entries carry no error field.
    pub async fn list(&self, path: &str) -> Result<Vec<StatEntry>> {
        let mut stream = self.stream.lock().await;
        wire_sync::write_request(&mut *stream, SyncId::List, path).await?;

        let mut entries = Vec::new();
        loop {
            match read_response(&mut *stream).await? {
                SyncId::Dent => {
                    let raw = wire::read_array::<LEGACY_STAT_SIZE, _>(&mut *stream).await?;
                    let name = wire::read_le_string(&mut *stream, MAX_NAME_LEN).await?;
                    entries.push(StatEntry::from_record(
                        join_path(path, &name),
                        LegacyStat::from_le_bytes(&raw),
                    ));
                }
                SyncId::Done => {
                    wire::read_array::<LIST_DONE_SENTINEL, _>(&mut *stream).await?;
                    break;
                }
                SyncId::Stat => warn!(path, "ignoring stray STAT in listing"),
                other => return Err(unexpected(other)),
            }
        }
        debug!(path, count = entries.len(), "list complete");
        Ok(entries)
    }

    /// Directory listing with 64-bit sizes, ids and all three timestamps.
    ///
    /// The first entry carrying a nonzero errno fails the whole call. The
    /// listing is still read through `DONE`, so the session stays usable.
    pub async fn list_v2(&self, path: &str) -> Result<Vec<StatV2Entry>> {
        let mut stream = self.stream.lock().await;
        wire_sync::write_request(&mut *stream, SyncId::Lis2, path).await?;

        let mut entries = Vec::new();
        let mut failed = None;
        loop {
            match read_response(&mut *stream).await? {
                SyncId::Dnt2 => {
                    let raw = wire::read_array::<STAT_V2_SIZE, _>(&mut *stream).await?;
                    let name = wire::read_le_string(&mut *stream, MAX_NAME_LEN).await?;
                    let record = StatV2Record::from_le_bytes(&raw);
                    match StatV2Entry::from_record(join_path(path, &name), record) {
                        Ok(entry) => entries.push(entry),
                        Err((code, path)) => {
                            trace!(%path, %code, "listing entry failed");
                            if failed.is_none() {
                                failed = Some(ClientError::Sync { code, path });
                            }
                        }
                    }
                }
                SyncId::Done => {
                    wire::read_array::<LIS2_DONE_SENTINEL, _>(&mut *stream).await?;
                    break;
                }
                SyncId::Stat => warn!(path, "ignoring stray STAT in listing"),
                other => return Err(unexpected(other)),
            }
        }
        if let Some(err) = failed {
            return Err(err);
        }
        debug!(path, count = entries.len(), "list_v2 complete");
        Ok(entries)
    }

    /// Legacy stat. A missing file comes back as an all-zero record.
    pub async fn stat(&self, path: &str) -> Result<StatEntry> {
        let mut stream = self.stream.lock().await;
        wire_sync::write_request(&mut *stream, SyncId::Stat, path).await?;
        match read_response(&mut *stream).await? {
            SyncId::Stat => {
                let raw = wire::read_array::<LEGACY_STAT_SIZE, _>(&mut *stream).await?;
                Ok(StatEntry::from_record(
                    path.to_string(),
                    LegacyStat::from_le_bytes(&raw),
                ))
            }
            other => Err(unexpected(other)),
        }
    }

    /// Stat v2. With `lstat`, symlinks are reported rather than followed.
    pub async fn stat_v2(&self, path: &str, lstat: bool) -> Result<StatV2Entry> {
        let id = if lstat { SyncId::Lst2 } else { SyncId::Sta2 };
        let mut stream = self.stream.lock().await;
        wire_sync::write_request(&mut *stream, id, path).await?;

        let reply = read_response(&mut *stream).await?;
        if reply != id {
            return Err(unexpected(reply));
        }
        let raw = wire::read_array::<STAT_V2_SIZE, _>(&mut *stream).await?;
        StatV2Entry::from_record(path.to_string(), StatV2Record::from_le_bytes(&raw))
            .map_err(|(code, path)| ClientError::Sync { code, path })
    }

    /// Send `QUIT` and close the session.
    pub async fn close(self) -> Result<()> {
        let mut stream = self.stream.into_inner();
        wire_sync::write_header(&mut stream, SyncId::Quit, 0).await?;
        stream
            .shutdown()
            .await
            .map_err(adbwire_frame::FrameError::from)?;
        Ok(())
    }

    pub fn into_inner(self) -> TcpStream {
        self.stream.into_inner()
    }
}

/// Read a response id, turning `FAIL` into [`ClientError::Server`].
async fn read_response(stream: &mut TcpStream) -> Result<SyncId> {
    let code = wire::read_id(stream).await?;
    match SyncId::from_code(code) {
        Some(SyncId::Fail) => {
            let message = wire::read_le_string(stream, MAX_FAIL_LEN).await?;
            debug!(%message, "sync request failed");
            Err(ClientError::Server(message))
        }
        Some(id) => Ok(id),
        None => Err(ClientError::protocol(format!(
            "invalid response type {:?}",
            String::from_utf8_lossy(&code)
        ))),
    }
}

fn unexpected(id: SyncId) -> ClientError {
    ClientError::protocol(format!("invalid response type {id}"))
}

fn join_path(dir: &str, name: &str) -> String {
    format!("{}/{}", dir.trim_end_matches('/'), name)
}

fn unix_seconds(time: SystemTime) -> u32 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| u32::try_from(d.as_secs()).unwrap_or(u32::MAX))
        .unwrap_or(0)
}
