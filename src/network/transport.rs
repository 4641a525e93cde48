//! Transports
//!
//! Stream transports are anything `Read + Write`. Datagram transports
//! expose the sender of every message, which is what [`DatagramTransport`]
//! captures.

use std::io;
use std::net::{SocketAddr, UdpSocket};

use crate::config::PeerPolicy;
use crate::error::{CalcError, Result};
use crate::log::LogSink;

/// A connectionless, message-oriented socket
pub trait DatagramTransport {
    /// Send one datagram to `peer`, returning the bytes sent
    fn send_to(&self, payload: &[u8], peer: SocketAddr) -> io::Result<usize>;

    /// Block for one datagram, returning its length and sender
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;

    fn local_addr(&self) -> io::Result<SocketAddr>;
}

impl DatagramTransport for UdpSocket {
    fn send_to(&self, payload: &[u8], peer: SocketAddr) -> io::Result<usize> {
        UdpSocket::send_to(self, payload, peer)
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        UdpSocket::recv_from(self, buf)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        UdpSocket::local_addr(self)
    }
}

/// Apply the peer policy to a received datagram
///
/// `Ok(true)` means serve it, `Ok(false)` means drop it silently,
/// `Err(PeerAddressMismatch)` means stop.
pub fn verify_peer(
    expected: &str,
    actual: SocketAddr,
    matches: bool,
    policy: PeerPolicy,
    log: &dyn LogSink,
) -> Result<bool> {
    if matches {
        return Ok(true);
    }

    log.log(&format!(
        "Error: received a packet from unknown source {} (expected {})",
        actual, expected
    ));

    match policy {
        PeerPolicy::Abort => Err(CalcError::PeerAddressMismatch {
            expected: expected.to_string(),
            actual,
        }),
        PeerPolicy::Ignore => {
            tracing::debug!("Ignoring datagram from {}", actual);
            Ok(false)
        }
    }
}
