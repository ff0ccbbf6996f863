use adbwire_frame::FrameError;
use adbwire_transport::TransportError;

use crate::stat::SyncErrorCode;

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The server sent bytes that do not fit the protocol.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The server answered `FAIL` with this message.
    #[error("server error: {0}")]
    Server(String),

    /// A sync stat record carried a nonzero errno.
    #[error("sync error on {path}: {code}")]
    Sync { code: SyncErrorCode, path: String },

    /// The caller's cancellation token fired.
    #[error("operation cancelled")]
    Cancelled,
}

/// Coarse classification of a [`ClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The socket could not be opened, failed, or closed early.
    Connection,
    /// Malformed or unexpected data.
    Protocol,
    /// The server refused the request.
    Server,
    /// A file operation failed on the device.
    Sync,
    Cancelled,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Transport(_) => ErrorKind::Connection,
            ClientError::Frame(err) if err.is_connection() => ErrorKind::Connection,
            ClientError::Frame(_) | ClientError::Protocol(_) => ErrorKind::Protocol,
            ClientError::Server(_) => ErrorKind::Server,
            ClientError::Sync { .. } => ErrorKind::Sync,
            ClientError::Cancelled => ErrorKind::Cancelled,
        }
    }

    pub(crate) fn protocol(msg: impl Into<String>) -> Self {
        ClientError::Protocol(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
