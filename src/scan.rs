//! TCP probing of candidate hosts.
//!
//! A probe is a plain `connect()` with a short timeout. Refusals,
//! timeouts and unreachable routes are normal negative outcomes; only
//! errors that mean probing itself is broken (fd exhaustion and
//! friends) surface as errors.

use std::io::ErrorKind;
use std::net::{SocketAddr, SocketAddrV4};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::error::DiscoveryError;

/// Try to open a TCP connection to `addr` within `limit`.
///
/// `Ok(false)` is the ordinary miss. A host is probed at most once per
/// scan pass; there are no retries here.
pub async fn probe_port(addr: SocketAddrV4, limit: Duration) -> Result<bool, DiscoveryError> {
    match timeout(limit, TcpStream::connect(SocketAddr::V4(addr))).await {
        Ok(Ok(_stream)) => Ok(true),
        Ok(Err(e)) => match e.kind() {
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::TimedOut
            | ErrorKind::HostUnreachable
            | ErrorKind::NetworkUnreachable
            | ErrorKind::AddrNotAvailable
            | ErrorKind::PermissionDenied => Ok(false),
            _ => Err(DiscoveryError::Resource(e)),
        },
        Err(_elapsed) => Ok(false),
    }
}
