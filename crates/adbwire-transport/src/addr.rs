use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use crate::error::TransportError;

/// Port the ADB server listens on unless `ANDROID_ADB_SERVER_PORT` says otherwise.
pub const DEFAULT_PORT: u16 = 5037;

/// Endpoint of an ADB server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServerAddr(SocketAddr);

impl ServerAddr {
    /// Create an endpoint from an IP address and port.
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self(SocketAddr::new(ip, port))
    }

    /// Loopback endpoint on the given port.
    pub fn loopback(port: u16) -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    /// The underlying socket address.
    pub fn socket_addr(&self) -> SocketAddr {
        self.0
    }

    pub fn port(&self) -> u16 {
        self.0.port()
    }
}

impl Default for ServerAddr {
    fn default() -> Self {
        Self::loopback(DEFAULT_PORT)
    }
}

impl From<SocketAddr> for ServerAddr {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl fmt::Display for ServerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Accepts `ip:port`, a bare `port` (loopback), or `localhost[:port]`.
impl FromStr for ServerAddr {
    type Err = TransportError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid(input, "address must not be empty"));
        }

        if let Ok(addr) = trimmed.parse::<SocketAddr>() {
            return Ok(Self(addr));
        }
        if let Ok(port) = trimmed.parse::<u16>() {
            return Ok(Self::loopback(port));
        }
        if let Ok(ip) = trimmed.parse::<IpAddr>() {
            return Ok(Self::new(ip, DEFAULT_PORT));
        }

        let (host, port) = match trimmed.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| invalid(input, "port is not a number in 0..=65535"))?;
                (host, port)
            }
            None => (trimmed, DEFAULT_PORT),
        };

        if host.eq_ignore_ascii_case("localhost") {
            Ok(Self::loopback(port))
        } else {
            Err(invalid(input, "expected an IP address, a port, or localhost"))
        }
    }
}

fn invalid(input: &str, reason: &str) -> TransportError {
    TransportError::InvalidAddr {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}
