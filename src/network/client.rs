//! Clients
//!
//! Blocking clients for both transports. Each call to `request` sends one
//! line and waits for its reply.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs, UdpSocket};
use std::sync::Arc;

use crate::config::PeerPolicy;
use crate::error::{CalcError, Result};
use crate::log::LogSink;
use crate::protocol::{decode_frame, encode_datagram, encode_frame, read_frame, write_frame};
use super::transport::{verify_peer, DatagramTransport};

/// Resolve a `host:port` argument
///
/// A missing or empty host or port falls back to the matching part of
/// `default`, so `":9000"` and `"example.org"` both work.
pub fn resolve_endpoint(arg: Option<&str>, default: SocketAddr) -> Result<SocketAddr> {
    let arg = match arg.map(str::trim) {
        Some(arg) if !arg.is_empty() => arg,
        _ => return Ok(default),
    };

    let (host, port) = match arg.rsplit_once(':') {
        Some((host, port)) => (host, port),
        None => (arg, ""),
    };

    let host = match host.trim_matches(|c: char| c == '[' || c == ']') {
        "" => default.ip().to_string(),
        host => host.to_string(),
    };
    let port = match port {
        "" => default.port(),
        port => port
            .parse::<u16>()
            .map_err(|_| CalcError::InvalidAddress(format!("invalid port in '{}'", arg)))?,
    };

    (host.as_str(), port)
        .to_socket_addrs()
        .map_err(|e| CalcError::InvalidAddress(format!("cannot resolve '{}': {}", arg, e)))?
        .next()
        .ok_or_else(|| CalcError::InvalidAddress(format!("'{}' resolved to no address", arg)))
}

// =============================================================================
// Stream Client
// =============================================================================

/// TCP client: one connection, many requests
pub struct StreamClient {
    stream: TcpStream,
    buffer_size: usize,
    log: Arc<dyn LogSink>,
    welcome: String,
}

impl StreamClient {
    /// Connect and read the welcome banner
    pub fn connect(server: SocketAddr, buffer_size: usize, log: Arc<dyn LogSink>) -> Result<Self> {
        let mut stream = TcpStream::connect(server).map_err(|e| {
            log.log(&format!("Connection to {} failed: {}", server, e));
            e
        })?;
        stream.set_nodelay(true)?;
        log.log(&format!("Connection established with {}", server));

        let welcome = match read_frame(&mut stream, buffer_size)? {
            Some(frame) => decode_frame(&frame),
            None => {
                return Err(CalcError::TransportShortRead {
                    expected: buffer_size,
                    received: 0,
                })
            }
        };

        Ok(Self {
            stream,
            buffer_size,
            log,
            welcome,
        })
    }

    /// Banner the server sent on connect
    pub fn welcome(&self) -> &str {
        &self.welcome
    }

    /// Send one request and wait for the reply
    pub fn request(&mut self, line: &str) -> Result<String> {
        write_frame(&mut self.stream, &encode_frame(line, self.buffer_size))?;
        self.log.log(&format!("Sent: {}", line));

        let reply = match read_frame(&mut self.stream, self.buffer_size)? {
            Some(frame) => decode_frame(&frame),
            None => {
                self.log.log("Server closed the connection.");
                return Err(CalcError::TransportShortRead {
                    expected: self.buffer_size,
                    received: 0,
                });
            }
        };

        self.log.log(&format!("Received: {}", reply));
        Ok(reply)
    }
}

// =============================================================================
// Datagram Client
// =============================================================================

/// UDP client: every request is an independent exchange
pub struct DatagramClient<T = UdpSocket> {
    transport: T,
    server: SocketAddr,
    buffer_size: usize,
    policy: PeerPolicy,
    log: Arc<dyn LogSink>,
}

impl DatagramClient<UdpSocket> {
    /// Bind an ephemeral local socket for talking to `server`
    pub fn open(
        server: SocketAddr,
        buffer_size: usize,
        policy: PeerPolicy,
        log: Arc<dyn LogSink>,
    ) -> Result<Self> {
        let local: SocketAddr = if server.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };
        let socket = UdpSocket::bind(local)?;
        log.log(&format!("Socket bound to {}, server {}", socket.local_addr()?, server));

        Ok(Self::with_transport(socket, server, buffer_size, policy, log))
    }
}

impl<T: DatagramTransport> DatagramClient<T> {
    pub fn with_transport(
        transport: T,
        server: SocketAddr,
        buffer_size: usize,
        policy: PeerPolicy,
        log: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            transport,
            server,
            buffer_size,
            policy,
            log,
        }
    }

    pub fn server(&self) -> SocketAddr {
        self.server
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.transport.local_addr()?)
    }

    /// Send one request and wait for the reply from the server
    ///
    /// Replies from any other address go through the peer policy: with
    /// `Ignore` they are dropped and the wait continues.
    pub fn request(&self, line: &str) -> Result<String> {
        let payload = encode_datagram(line, self.buffer_size);
        let sent = self.transport.send_to(&payload, self.server)?;
        if sent != payload.len() {
            return Err(CalcError::TransportShortWrite {
                expected: payload.len(),
                written: sent,
            });
        }
        self.log.log(&format!("Sent to {}: {}", self.server, line));

        let mut buf = vec![0u8; self.buffer_size];
        loop {
            let (len, from) = self.transport.recv_from(&mut buf)?;

            let expected = self.server.to_string();
            if !verify_peer(&expected, from, from == self.server, self.policy, self.log.as_ref())? {
                continue;
            }

            let reply = decode_frame(&buf[..len]);
            self.log.log(&format!("Received result from server {}: {}", from, reply));
            return Ok(reply);
        }
    }
}
