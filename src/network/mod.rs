//! Network Module
//!
//! TCP and UDP servers and clients.
//!
//! ## Architecture
//! - Stream: single acceptor, one [`StreamSession`] at a time
//! - Datagram: one receive/reply exchange per datagram, no session state
//! - Both hand request lines to the shared [`Engine`](crate::Engine)

mod server;
mod session;
mod datagram;
mod transport;
mod client;

pub use server::StreamServer;
pub use session::{SessionEnd, SessionState, StreamSession};
pub use datagram::{DatagramServer, Exchange};
pub use transport::{verify_peer, DatagramTransport};
pub use client::{resolve_endpoint, DatagramClient, StreamClient};
