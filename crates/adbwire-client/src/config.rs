use std::time::Duration;

use adbwire_transport::ServerAddr;

/// Configuration for [`AdbServicesClient`](crate::AdbServicesClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Where the ADB server listens.
    pub server: ServerAddr,
    /// Bound on each TCP connect; `None` waits for the OS.
    pub connect_timeout: Option<Duration>,
    /// Bytes read from stdin per shell `Stdin` frame.
    pub stdin_chunk_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: ServerAddr::default(),
            connect_timeout: Some(Duration::from_secs(5)),
            stdin_chunk_size: 1024,
        }
    }
}

impl ClientConfig {
    pub fn with_server(mut self, server: ServerAddr) -> Self {
        self.server = server;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Zero is treated as one byte.
    pub fn with_stdin_chunk_size(mut self, size: usize) -> Self {
        self.stdin_chunk_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.server.port(), 5037);
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.stdin_chunk_size, 1024);
    }

    #[test]
    fn chunk_size_setter() {
        assert_eq!(ClientConfig::default().with_stdin_chunk_size(4096).stdin_chunk_size, 4096);
    }
}
