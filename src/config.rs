//! Configuration for calcnet
//!
//! Centralized configuration with per-transport deployment defaults.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::error::{CalcError, Result};

/// Default TCP port for the stream deployment
pub const DEFAULT_STREAM_PORT: u16 = 53199;

/// Default UDP port for the datagram deployment
pub const DEFAULT_DATAGRAM_PORT: u16 = 56700;

/// Default wire message size for the stream deployment
pub const DEFAULT_STREAM_BUFFER_SIZE: usize = 512;

/// Default wire message size for the datagram deployment
pub const DEFAULT_DATAGRAM_BUFFER_SIZE: usize = 256;

/// Smallest buffer that still fits a command and a short reply
pub const MIN_BUFFER_SIZE: usize = 8;

/// Banner sent on every new stream connection
pub const DEFAULT_WELCOME_MESSAGE: &str = "\n\
* * * * * * * * * * * * * * * * * * * * * * * *\n\
*               Basic Calculator              *\n\
*      Supported operations: +, -, *, /       *\n\
*      Enter = to close the connection        *\n\
* * * * * * * * * * * * * * * * * * * * * * * *";

/// Transport discipline a deployment runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Connection-oriented, one session per connection (TCP)
    Stream,

    /// Connectionless, one exchange per datagram (UDP)
    Datagram,
}

/// How successful results are rendered on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderMode {
    /// Just the value: `7.00`
    Plain,

    /// The whole operation: `3.00 + 4.00 = 7.00`
    Echo,
}

/// What to do when a datagram arrives from an unexpected address
///
/// `Abort` is the historical behavior and is stricter than most
/// deployments need: a single stray packet stops the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerPolicy {
    /// Fail with `PeerAddressMismatch`, terminating the listener
    Abort,

    /// Log the stray datagram, drop it and keep serving
    Ignore,
}

/// Main configuration for a calcnet server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Listen address (host:port)
    pub listen_addr: String,

    /// Stream (TCP) or datagram (UDP)
    pub transport: Transport,

    /// Size of one wire message in bytes. Client and server must agree.
    pub buffer_size: usize,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Result rendering
    pub encoder_mode: EncoderMode,

    /// Banner sent when a stream connection is accepted
    pub welcome_message: String,

    // -------------------------------------------------------------------------
    // Datagram Peer Checking
    // -------------------------------------------------------------------------
    /// Only serve datagrams from this address, if set
    pub allowed_peer: Option<IpAddr>,

    /// Reaction to a datagram from any other address
    pub peer_policy: PeerPolicy,

    // -------------------------------------------------------------------------
    // Logging
    // -------------------------------------------------------------------------
    /// Append the protocol log to this file instead of tracing output
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::for_transport(Transport::Stream)
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Deployment defaults for the given transport
    pub fn for_transport(transport: Transport) -> Self {
        let (port, buffer_size, encoder_mode) = match transport {
            Transport::Stream => (DEFAULT_STREAM_PORT, DEFAULT_STREAM_BUFFER_SIZE, EncoderMode::Plain),
            Transport::Datagram => (DEFAULT_DATAGRAM_PORT, DEFAULT_DATAGRAM_BUFFER_SIZE, EncoderMode::Echo),
        };

        Self {
            listen_addr: format!("127.0.0.1:{}", port),
            transport,
            buffer_size,
            encoder_mode,
            welcome_message: DEFAULT_WELCOME_MESSAGE.to_string(),
            allowed_peer: None,
            peer_policy: PeerPolicy::Abort,
            log_file: None,
        }
    }

    /// Check the settings that would otherwise fail deep inside a session
    pub fn validate(&self) -> Result<()> {
        if self.buffer_size < MIN_BUFFER_SIZE {
            return Err(CalcError::Config(format!(
                "buffer size {} is below the minimum of {}",
                self.buffer_size, MIN_BUFFER_SIZE
            )));
        }

        self.listen_addr.parse::<SocketAddr>().map_err(|e| {
            CalcError::Config(format!("invalid listen address '{}': {}", self.listen_addr, e))
        })?;

        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Start from the deployment defaults of a transport
    ///
    /// Resets every field, so call it first.
    pub fn transport(mut self, transport: Transport) -> Self {
        self.config = Config::for_transport(transport);
        self
    }

    /// Set the listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the wire message size (in bytes)
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.config.buffer_size = size;
        self
    }

    /// Set the result rendering mode
    pub fn encoder_mode(mut self, mode: EncoderMode) -> Self {
        self.config.encoder_mode = mode;
        self
    }

    /// Set the stream welcome banner
    pub fn welcome_message(mut self, message: impl Into<String>) -> Self {
        self.config.welcome_message = message.into();
        self
    }

    /// Restrict the datagram server to a single peer address
    pub fn allowed_peer(mut self, peer: Option<IpAddr>) -> Self {
        self.config.allowed_peer = peer;
        self
    }

    /// Set the reaction to datagrams from unexpected peers
    pub fn peer_policy(mut self, policy: PeerPolicy) -> Self {
        self.config.peer_policy = policy;
        self
    }

    /// Send the protocol log to a file
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.log_file = Some(path.into());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
