//! # calcnet
//!
//! A remote calculator speaking a small text protocol:
//! - `OP A B` requests (`+ - * /`), `=` to end the session
//! - Fixed-size frames over TCP, one-shot exchanges over UDP
//! - One request pipeline shared by both transports
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────┐      ┌──────────────────────────┐
//! │      StreamServer        │      │     DatagramServer       │
//! │ (one session at a time)  │      │  (one exchange/datagram) │
//! └────────────┬─────────────┘      └─────────────┬────────────┘
//!              │ frames                           │ datagrams
//!              └────────────────┬─────────────────┘
//!                               ▼
//!                  ┌──────────────────────────┐
//!                  │          Engine          │
//!                  │ parse → evaluate → encode│
//!                  └────────────┬─────────────┘
//!                               ▼
//!                  ┌──────────────────────────┐
//!                  │         LogSink          │
//!                  │ (tracing / file / memory)│
//!                  └──────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod log;

pub mod protocol;
pub mod network;
pub mod console;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CalcError, ProtocolError, Result};
pub use config::{Config, EncoderMode, PeerPolicy, Transport};
pub use engine::Engine;
pub use log::{LogSink, Role};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of calcnet
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
