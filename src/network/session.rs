//! Stream Session
//!
//! Serves one stream connection from accept to close.
//!
//! ```text
//! Connected ──welcome──▶ AwaitingRequest ──frame──▶ Processing
//!                              ▲                        │
//!                              └──────── reply ─────────┤
//!                                                       │ Bye / short read /
//!                                                       ▼ write failure
//!                                                     Closed
//! ```

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{CalcError, Result};
use crate::log::LogSink;
use crate::protocol::{decode_frame, encode_frame, read_frame, write_frame};

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connected,
    AwaitingRequest,
    Processing,
    Closed,
}

/// Why a session ended without a transport error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Client sent `=` and got `Bye`
    Terminated,

    /// Client went away between requests
    PeerClosed,
}

/// Handles a single client connection
pub struct StreamSession<'a, S> {
    /// The connection, owned for the whole session
    stream: S,

    /// Peer address for logging
    peer: String,

    engine: Engine,

    config: &'a Config,

    log: &'a dyn LogSink,

    state: SessionState,
}

impl<'a> StreamSession<'a, TcpStream> {
    /// Wrap an accepted TCP connection
    pub fn accept(stream: TcpStream, config: &'a Config, log: &'a dyn LogSink) -> Result<Self> {
        let peer = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm; every frame is a full request or reply
        stream.set_nodelay(true)?;

        Ok(Self::new(stream, peer, config, log))
    }
}

impl<'a, S: Read + Write> StreamSession<'a, S> {
    pub fn new(stream: S, peer: impl Into<String>, config: &'a Config, log: &'a dyn LogSink) -> Self {
        Self {
            stream,
            peer: peer.into(),
            engine: Engine::new(config.encoder_mode),
            config,
            log,
            state: SessionState::Connected,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Give the connection back, e.g. to inspect a test stream
    pub fn into_stream(self) -> S {
        self.stream
    }

    /// Serve the connection until it closes (blocking)
    ///
    /// Whatever the outcome, the session is `Closed` afterwards and no more
    /// bytes are read from the stream.
    pub fn run(&mut self) -> Result<SessionEnd> {
        tracing::debug!("Session started with {}", self.peer);

        let result = self.serve();
        self.state = SessionState::Closed;

        match &result {
            Ok(end) => tracing::debug!("Session with {} ended: {:?}", self.peer, end),
            Err(e) => tracing::warn!("Session with {} failed: {}", self.peer, e),
        }
        self.log.log(&format!("Closing connection with {}", self.peer));

        result
    }

    fn serve(&mut self) -> Result<SessionEnd> {
        let config = self.config;
        if let Some(end) = self.send(&config.welcome_message)? {
            return Ok(end);
        }

        loop {
            self.state = SessionState::AwaitingRequest;

            let request = match self.receive()? {
                Some(request) => request,
                None => {
                    self.log.log("Client has closed the connection.");
                    return Ok(SessionEnd::PeerClosed);
                }
            };

            self.state = SessionState::Processing;
            self.log.log(&format!("Client {} sent: {}", self.peer, request));

            let response = self.engine.execute(&request);
            let reply = self.engine.encode(&response);
            self.log.log(&format!("Server replied to {}: {}", self.peer, reply));

            if let Some(end) = self.send(&reply)? {
                return Ok(end);
            }

            if response.is_bye() {
                return Ok(SessionEnd::Terminated);
            }
        }
    }

    /// Read the next request, `None` once the peer has gone
    fn receive(&mut self) -> Result<Option<String>> {
        match read_frame(&mut self.stream, self.config.buffer_size) {
            Ok(Some(frame)) => Ok(Some(decode_frame(&frame))),
            Ok(None) => Ok(None),
            Err(CalcError::Io(ref e)) if is_disconnect(e.kind()) => {
                tracing::debug!("Connection with {} dropped: {}", self.peer, e);
                Ok(None)
            }
            Err(e) => {
                self.log.log(&format!("Error reading from {}: {}", self.peer, e));
                Err(e)
            }
        }
    }

    /// Send one frame; `Some(PeerClosed)` if the client is already gone
    fn send(&mut self, text: &str) -> Result<Option<SessionEnd>> {
        let frame = encode_frame(text, self.config.buffer_size);

        match write_frame(&mut self.stream, &frame) {
            Ok(()) => Ok(None),
            Err(CalcError::Io(ref e)) if is_disconnect(e.kind()) => {
                tracing::debug!(
                    "Client {} disconnected before response could be sent: {}",
                    self.peer, e
                );
                Ok(Some(SessionEnd::PeerClosed))
            }
            Err(e) => {
                self.log.log(&format!("Error writing to {}: {}", self.peer, e));
                Err(e)
            }
        }
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe
    )
}
