//! UDP Server
//!
//! Every datagram is one complete request and gets one reply, sent back to
//! the address it came from. Nothing is kept between datagrams.

use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{CalcError, Result};
use crate::log::LogSink;
use crate::protocol::{decode_frame, encode_datagram};
use super::transport::{verify_peer, DatagramTransport};

/// What happened to one received datagram
#[derive(Debug, Clone, PartialEq)]
pub enum Exchange {
    /// Request answered
    Served { peer: SocketAddr, request: String, reply: String },

    /// Empty datagram or transient receive error; nothing sent
    Skipped,

    /// Sender is not the peer this server serves; dropped
    Rejected { peer: SocketAddr },

    /// The reply could not be sent in full; the listener carries on
    ReplyFailed { peer: SocketAddr },
}

/// UDP server for the calculator
pub struct DatagramServer<T = UdpSocket> {
    transport: T,
    config: Config,
    engine: Engine,
    log: Arc<dyn LogSink>,
}

impl DatagramServer<UdpSocket> {
    /// Bind the UDP socket described by `config`
    pub fn bind(config: Config, log: Arc<dyn LogSink>) -> Result<Self> {
        config.validate()?;

        let socket = UdpSocket::bind(&config.listen_addr)?;
        log.log(&format!("Listening on {}", socket.local_addr()?));

        Ok(Self::with_transport(socket, config, log))
    }
}

impl<T: DatagramTransport> DatagramServer<T> {
    pub fn with_transport(transport: T, config: Config, log: Arc<dyn LogSink>) -> Self {
        Self {
            transport,
            engine: Engine::new(config.encoder_mode),
            config,
            log,
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.transport.local_addr()?)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Receive and answer exactly one datagram (blocking)
    pub fn handle_one(&self) -> Result<Exchange> {
        let mut buf = vec![0u8; self.config.buffer_size];

        let (len, peer) = match self.transport.recv_from(&mut buf) {
            Ok(received) => received,
            Err(e) if matches!(e.kind(), ErrorKind::Interrupted | ErrorKind::ConnectionReset) => {
                // ICMP unreachable from an earlier reply surfaces here on some platforms
                tracing::debug!("Transient receive error: {}", e);
                return Ok(Exchange::Skipped);
            }
            Err(e) => {
                self.log.log(&format!("recvfrom() failed: {}", e));
                return Err(e.into());
            }
        };

        if len == 0 {
            self.log.log(&format!("Empty datagram from {}", peer));
            return Ok(Exchange::Skipped);
        }

        if !self.accepts(peer)? {
            return Ok(Exchange::Rejected { peer });
        }

        let request = decode_frame(&buf[..len]);
        self.log.log(&format!("Request operation '{}' from client {}", request, peer));

        let response = self.engine.execute(&request);
        let reply = self.engine.encode(&response);
        let payload = encode_datagram(&reply, self.config.buffer_size);

        match self.transport.send_to(&payload, peer) {
            Ok(sent) if sent == payload.len() => {
                self.log.log(&format!("Replied to {}: {}", peer, reply));
                Ok(Exchange::Served { peer, request, reply })
            }
            Ok(sent) => {
                let e = CalcError::TransportShortWrite {
                    expected: payload.len(),
                    written: sent,
                };
                self.log.log(&format!("sendto() to {} failed: {}", peer, e));
                Ok(Exchange::ReplyFailed { peer })
            }
            Err(e) => {
                self.log.log(&format!("sendto() to {} failed: {}", peer, e));
                Ok(Exchange::ReplyFailed { peer })
            }
        }
    }

    /// Serve datagrams until a fatal error (blocking)
    pub fn run(&self) -> Result<()> {
        loop {
            if let Exchange::Rejected { peer } = self.handle_one()? {
                tracing::debug!("Dropped datagram from {}", peer);
            }
        }
    }

    fn accepts(&self, peer: SocketAddr) -> Result<bool> {
        match self.config.allowed_peer {
            None => Ok(true),
            Some(allowed) => verify_peer(
                &allowed.to_string(),
                peer,
                peer.ip() == allowed,
                self.config.peer_policy,
                self.log.as_ref(),
            ),
        }
    }
}
