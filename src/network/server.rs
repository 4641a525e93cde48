//! TCP Server
//!
//! Accepts connections and serves them one at a time.
//!
//! A connection is served to completion before the next one is accepted,
//! so a silent client holds up everyone queued behind it.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::log::LogSink;
use super::session::{SessionEnd, StreamSession};

/// TCP server for the calculator
pub struct StreamServer {
    config: Config,
    listener: TcpListener,
    log: Arc<dyn LogSink>,
}

impl StreamServer {
    /// Bind the listener described by `config`
    pub fn bind(config: Config, log: Arc<dyn LogSink>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr)?;
        log.log(&format!("Listening on {}", listener.local_addr()?));

        Ok(Self {
            config,
            listener,
            log,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Wait for the next connection
    pub fn accept(&self) -> Result<(TcpStream, SocketAddr)> {
        self.log.log("Searching for a client...");

        let (stream, peer) = self.listener.accept().map_err(|e| {
            self.log.log(&format!("accept() failed: {}", e));
            e
        })?;

        self.log.log(&format!("Connection established with {}", peer));
        Ok((stream, peer))
    }

    /// Serve one accepted connection until it closes
    pub fn serve(&self, stream: TcpStream) -> Result<SessionEnd> {
        let mut session = StreamSession::accept(stream, &self.config, self.log.as_ref())?;
        session.run()
    }

    /// Accept and fully serve exactly one connection
    pub fn accept_one(&self) -> Result<SessionEnd> {
        let (stream, _) = self.accept()?;
        self.serve(stream)
    }

    /// Serve connections forever (blocking)
    ///
    /// A failed session only ends that connection. A failed accept ends
    /// the server.
    pub fn run(&self) -> Result<()> {
        loop {
            let (stream, peer) = self.accept()?;

            if let Err(e) = self.serve(stream) {
                tracing::warn!("Connection with {} ended with error: {}", peer, e);
            }
        }
    }
}
