//! Shell v2 command execution.
//!
//! One socket, two directions: the caller's task reads frames and routes
//! them, a spawned pump writes `Stdin` frames. The pump owns the write half
//! and hands it back when it finishes, so finishing stdin never half-closes
//! the socket while output is still arriving.

use adbwire_frame::{FrameError, ShellCodec, ShellFrame, ShellFrameKind};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::connector::HostConnection;
use crate::error::{ClientError, Result};

type ShellSink = FramedWrite<OwnedWriteHalf, ShellCodec>;

/// Byte streams wired to a remote command. `None` discards (or, for stdin,
/// never sends) that stream.
#[derive(Default)]
pub struct ExecIo<'a> {
    pub stdin: Option<Box<dyn AsyncRead + Send + Unpin>>,
    pub stdout: Option<&'a mut (dyn AsyncWrite + Send + Unpin)>,
    pub stderr: Option<&'a mut (dyn AsyncWrite + Send + Unpin)>,
}

impl<'a> ExecIo<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdin(mut self, reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        self.stdin = Some(Box::new(reader));
        self
    }

    pub fn stdout<W: AsyncWrite + Send + Unpin>(mut self, writer: &'a mut W) -> Self {
        self.stdout = Some(writer);
        self
    }

    pub fn stderr<W: AsyncWrite + Send + Unpin>(mut self, writer: &'a mut W) -> Self {
        self.stderr = Some(writer);
        self
    }
}

impl std::fmt::Debug for ExecIo<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecIo")
            .field("stdin", &self.stdin.is_some())
            .field("stdout", &self.stdout.is_some())
            .field("stderr", &self.stderr.is_some())
            .finish()
    }
}

/// Drive an accepted `shell,v2,raw:` session until the exit frame.
pub(crate) async fn run(
    conn: HostConnection,
    mut io: ExecIo<'_>,
    stdin_chunk_size: usize,
    cancel: CancellationToken,
) -> Result<u8> {
    let (read_half, write_half) = conn.into_stream().into_split();
    let mut frames = FramedRead::new(read_half, ShellCodec::new());
    let sink = FramedWrite::new(write_half, ShellCodec::new());

    let pump_token = cancel.child_token();
    let (pump, idle_sink) = match io.stdin.take() {
        Some(stdin) => {
            let handle = tokio::spawn(pump_stdin(
                stdin,
                sink,
                stdin_chunk_size.max(1),
                pump_token.clone(),
            ));
            (Some(handle), None)
        }
        None => (None, Some(sink)),
    };

    let outcome = read_until_exit(&mut frames, &mut io, &cancel).await;

    pump_token.cancel();
    let pump_result = match pump {
        Some(handle) => match handle.await {
            Ok((_sink, result)) => result,
            Err(join) => Err(FrameError::Io(std::io::Error::other(join)).into()),
        },
        None => Ok(()),
    };
    drop(idle_sink);

    let code = outcome?;
    pump_result?;
    debug!(code, "remote command exited");
    Ok(code)
}

async fn read_until_exit(
    frames: &mut FramedRead<OwnedReadHalf, ShellCodec>,
    io: &mut ExecIo<'_>,
    cancel: &CancellationToken,
) -> Result<u8> {
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            frame = frames.next() => frame,
        };
        let frame = match next {
            Some(frame) => frame?,
            None => return Err(FrameError::ConnectionClosed.into()),
        };
        trace!(kind = frame.kind.name(), len = frame.payload.len(), "shell frame");

        match frame.kind {
            ShellFrameKind::Stdout => relay(io.stdout.as_mut(), &frame.payload).await?,
            ShellFrameKind::Stderr => relay(io.stderr.as_mut(), &frame.payload).await?,
            ShellFrameKind::Exit => {
                let code = frame
                    .payload
                    .first()
                    .copied()
                    .ok_or_else(|| ClientError::protocol("empty exit frame"))?;
                flush(io.stdout.as_mut()).await?;
                flush(io.stderr.as_mut()).await?;
                return Ok(code);
            }
            other => {
                return Err(ClientError::protocol(format!(
                    "invalid shell frame type {} ({})",
                    other.as_u8(),
                    other.name()
                )))
            }
        }
    }
}

async fn relay<W>(target: Option<&mut W>, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    if let Some(target) = target {
        target.write_all(payload).await.map_err(FrameError::from)?;
    }
    Ok(())
}

async fn flush<W>(target: Option<&mut W>) -> Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    if let Some(target) = target {
        target.flush().await.map_err(FrameError::from)?;
    }
    Ok(())
}

async fn pump_stdin(
    mut stdin: Box<dyn AsyncRead + Send + Unpin>,
    mut sink: ShellSink,
    chunk_size: usize,
    token: CancellationToken,
) -> (ShellSink, Result<()>) {
    let result = pump(&mut *stdin, &mut sink, chunk_size, &token).await;
    (sink, result)
}

async fn pump(
    stdin: &mut (dyn AsyncRead + Send + Unpin),
    sink: &mut ShellSink,
    chunk_size: usize,
    token: &CancellationToken,
) -> Result<()> {
    let mut buf = vec![0u8; chunk_size];
    loop {
        let n = tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(()),
            read = stdin.read(&mut buf) => read.map_err(FrameError::from)?,
        };
        if n == 0 {
            break;
        }
        let frame = ShellFrame::new(ShellFrameKind::Stdin, Bytes::copy_from_slice(&buf[..n]));
        tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(()),
            sent = sink.send(frame) => sent?,
        }
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => return Ok(()),
        sent = sink.send(ShellFrame::close_stdin()) => sent?,
    }
    trace!("stdin closed");
    Ok(())
}
