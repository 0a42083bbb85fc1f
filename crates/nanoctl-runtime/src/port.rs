//! Gateway port allocation.
//!
//! A port counts as free when a connection attempt to it fails. This is a
//! check-then-use heuristic: the port is only safe because the caller
//! binds it immediately afterwards.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpStream};
use std::ops::RangeInclusive;
use std::time::Duration;

use nanoctl_common::constants::PORT_NOT_FOUND;

/// Decides whether a local port is already taken.
pub trait PortProbe: Send + Sync {
    /// Returns `true` if something accepts connections on `port`.
    fn is_in_use(&self, port: u16) -> bool;
}

/// Probes ports with a short TCP connection attempt.
#[derive(Debug, Clone, Copy)]
pub struct TcpPortProbe {
    host: IpAddr,
    timeout: Duration,
}

impl TcpPortProbe {
    /// Probes `0.0.0.0` with the given connection timeout.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            timeout,
        }
    }

    /// Probes another host address.
    #[must_use]
    pub const fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }
}

impl PortProbe for TcpPortProbe {
    fn is_in_use(&self, port: u16) -> bool {
        TcpStream::connect_timeout(&SocketAddr::new(self.host, port), self.timeout).is_ok()
    }
}

/// Result of a port scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayPort {
    /// First port of the range nothing answered on.
    Free(u16),
    /// Every port of the range is taken.
    NotFound,
}

impl fmt::Display for GatewayPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free(port) => write!(f, "{port}"),
            Self::NotFound => write!(f, "{PORT_NOT_FOUND}"),
        }
    }
}

/// Scans `range` in ascending order and returns the first free port.
pub fn allocate_gateway_port(range: RangeInclusive<u16>, probe: &dyn PortProbe) -> GatewayPort {
    for port in range {
        if probe.is_in_use(port) {
            tracing::trace!(port, "port in use");
            continue;
        }
        tracing::debug!(port, "gateway port allocated");
        return GatewayPort::Free(port);
    }
    GatewayPort::NotFound
}
