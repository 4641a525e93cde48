//! Error types for calcnet
//!
//! Two layers of errors live here:
//! - [`ProtocolError`]: recoverable request errors. Their `Display` text is
//!   exactly what gets sent back to the requester.
//! - [`CalcError`]: transport and setup failures that end a session,
//!   an exchange or the whole process.

use std::net::SocketAddr;

use thiserror::Error;

/// Result type alias using CalcError
pub type Result<T> = std::result::Result<T, CalcError>;

/// Errors raised while parsing or evaluating a request
///
/// All of these are answered on the wire; the session continues afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Invalid operand format: {0}")]
    InvalidOperand(String),

    #[error("Insufficient number of operands")]
    InsufficientOperands,

    #[error("Unknown operator: {0}")]
    UnknownOperator(char),

    #[error("|Error| - Division by Zero")]
    DivisionByZero,
}

/// Unified error type for calcnet transport and setup operations
#[derive(Debug, Error)]
pub enum CalcError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Short read: expected {expected} bytes, received {received}")]
    TransportShortRead { expected: usize, received: usize },

    #[error("Short write: expected {expected} bytes, wrote {written}")]
    TransportShortWrite { expected: usize, written: usize },

    #[error("Received a packet from unknown source {actual} (expected {expected})")]
    PeerAddressMismatch { expected: String, actual: SocketAddr },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
