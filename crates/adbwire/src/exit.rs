use std::fmt;
use std::io;

use adbwire_client::{ClientError, ErrorKind};

pub const SUCCESS: i32 = 0;
/// The server answered `FAIL`.
pub const FAILURE: i32 = 1;
/// A file operation failed on the device.
pub const SYNC_ERROR: i32 = 2;
pub const CONNECTION_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
/// The server sent something the protocol does not allow.
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;
pub const CANCELLED: i32 = 130;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Local filesystem or terminal failures.
pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn code_for_kind(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Connection => CONNECTION_ERROR,
        ErrorKind::Protocol => DATA_INVALID,
        ErrorKind::Server => FAILURE,
        ErrorKind::Sync => SYNC_ERROR,
        ErrorKind::Cancelled => CANCELLED,
    }
}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    CliError::new(code_for_kind(err.kind()), format!("{context}: {err}"))
}
