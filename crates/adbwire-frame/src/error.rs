/// Errors that can occur while encoding or decoding ADB wire data.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// An I/O error occurred while reading or writing the stream.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The connection was closed before the requested bytes arrived.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,

    /// A host command does not fit the 4-hex-digit length prefix.
    #[error("command too long ({len} bytes, max 65535)")]
    CommandTooLong { len: usize },

    /// A length prefix could not be parsed.
    #[error("invalid length prefix {0:?}")]
    InvalidLength(String),

    /// A string payload is not valid UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// The payload exceeds the configured maximum size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

impl FrameError {
    /// True when the failure came from the socket rather than from the bytes on it.
    pub fn is_connection(&self) -> bool {
        matches!(self, FrameError::Io(_) | FrameError::ConnectionClosed)
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
