//! Tests for StreamSession
//!
//! These tests verify:
//! - Welcome banner before the first request
//! - Serial request/reply cycles
//! - `=` closes the session and nothing further is read
//! - Peer close, short reads and short writes
//! - Protocol log lines

use std::io::{self, Cursor, Read, Write};

use calcnet::config::{Config, EncoderMode};
use calcnet::log::MemoryLog;
use calcnet::network::{SessionEnd, SessionState, StreamSession};
use calcnet::protocol::{decode_frame, encode_frame};
use calcnet::CalcError;

const SIZE: usize = 64;

// =============================================================================
// Helper Types
// =============================================================================

/// In-memory duplex stream: scripted input, captured output
struct Duplex {
    input: Cursor<Vec<u8>>,
    output: Vec<u8>,
    /// Fail writes after this many bytes, if set
    write_limit: Option<usize>,
}

impl Duplex {
    fn with_requests(requests: &[&str]) -> Self {
        let mut input = Vec::new();
        for request in requests {
            input.extend_from_slice(&encode_frame(request, SIZE));
        }
        Self {
            input: Cursor::new(input),
            output: Vec::new(),
            write_limit: None,
        }
    }

    fn with_raw_input(bytes: &[u8]) -> Self {
        Self {
            input: Cursor::new(bytes.to_vec()),
            output: Vec::new(),
            write_limit: None,
        }
    }

    /// Every frame the session wrote, decoded
    fn replies(&self) -> Vec<String> {
        self.output.chunks(SIZE).map(decode_frame).collect()
    }

    fn bytes_consumed(&self) -> u64 {
        self.input.position()
    }
}

impl Read for Duplex {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for Duplex {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = match self.write_limit {
            Some(limit) => buf.len().min(limit.saturating_sub(self.output.len())),
            None => buf.len(),
        };
        self.output.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Fails every read with the given error kind
struct Broken(io::ErrorKind);

impl Read for Broken {
    fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(self.0, "broken"))
    }
}

impl Write for Broken {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn test_config() -> Config {
    Config::builder()
        .buffer_size(SIZE)
        .welcome_message("Welcome")
        .build()
}

fn run_session(stream: Duplex, config: &Config, log: &MemoryLog) -> (calcnet::Result<SessionEnd>, Duplex) {
    let mut session = StreamSession::new(stream, "test-peer", config, log);
    assert_eq!(session.state(), SessionState::Connected);

    let result = session.run();
    assert_eq!(session.state(), SessionState::Closed);

    (result, session.into_stream())
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_welcome_sent_before_any_request() {
    let config = test_config();
    let log = MemoryLog::new();

    let (result, stream) = run_session(Duplex::with_requests(&[]), &config, &log);

    assert_eq!(result.unwrap(), SessionEnd::PeerClosed);
    assert_eq!(stream.replies(), vec!["Welcome".to_string()]);
}

#[test]
fn test_every_frame_is_buffer_sized() {
    let config = test_config();
    let log = MemoryLog::new();

    let (_, stream) = run_session(Duplex::with_requests(&["+ 3 4", "="]), &config, &log);

    // Welcome + two replies
    assert_eq!(stream.output.len(), 3 * SIZE);
}

#[test]
fn test_request_reply_cycle() {
    let config = test_config();
    let log = MemoryLog::new();

    let requests = ["+ 3 4", "/ 5 0", "& 1 2", "* 2.5 2", "="];
    let (result, stream) = run_session(Duplex::with_requests(&requests), &config, &log);

    assert_eq!(result.unwrap(), SessionEnd::Terminated);
    assert_eq!(
        stream.replies(),
        vec![
            "Welcome".to_string(),
            "7.00".to_string(),
            "|Error| - Division by Zero".to_string(),
            "Unknown operator: &".to_string(),
            "5.00".to_string(),
            "Bye".to_string(),
        ]
    );
}

#[test]
fn test_terminate_stops_reading() {
    let config = test_config();
    let log = MemoryLog::new();

    let (result, stream) = run_session(Duplex::with_requests(&["= ", "+ 1 2", "- 5 1"]), &config, &log);

    assert_eq!(result.unwrap(), SessionEnd::Terminated);
    assert_eq!(stream.replies(), vec!["Welcome".to_string(), "Bye".to_string()]);
    // Only the terminator frame was consumed
    assert_eq!(stream.bytes_consumed(), SIZE as u64);
}

#[test]
fn test_errors_do_not_end_session() {
    let config = test_config();
    let log = MemoryLog::new();

    let (result, stream) = run_session(Duplex::with_requests(&["+ 3", "", "- 9 3"]), &config, &log);

    assert_eq!(result.unwrap(), SessionEnd::PeerClosed);
    assert_eq!(
        stream.replies(),
        vec![
            "Welcome".to_string(),
            "Insufficient number of operands".to_string(),
            "Invalid operand format: ".to_string(),
            "6.00".to_string(),
        ]
    );
}

#[test]
fn test_echo_mode_session() {
    let config = Config::builder()
        .buffer_size(SIZE)
        .welcome_message("Welcome")
        .encoder_mode(EncoderMode::Echo)
        .build();
    let log = MemoryLog::new();

    let (_, stream) = run_session(Duplex::with_requests(&["- 10 4", "="]), &config, &log);

    assert_eq!(stream.replies()[1], "10.00 - 4.00 = 6.00");
}

// =============================================================================
// Transport Failure Tests
// =============================================================================

#[test]
fn test_short_read_closes_session() {
    let config = test_config();
    let log = MemoryLog::new();

    let mut input = encode_frame("+ 1 1", SIZE).to_vec();
    input.extend_from_slice(b"+ 2");

    let (result, stream) = run_session(Duplex::with_raw_input(&input), &config, &log);

    match result {
        Err(CalcError::TransportShortRead { expected, received }) => {
            assert_eq!(expected, SIZE);
            assert_eq!(received, 3);
        }
        other => panic!("Expected TransportShortRead, got {:?}", other),
    }
    assert_eq!(stream.replies(), vec!["Welcome".to_string(), "2.00".to_string()]);
    assert!(log.contains("Error reading from test-peer"));
}

#[test]
fn test_short_write_closes_session() {
    let config = test_config();
    let log = MemoryLog::new();

    let mut stream = Duplex::with_requests(&["+ 1 1", "+ 2 2"]);
    // Room for the welcome and half a reply
    stream.write_limit = Some(SIZE + SIZE / 2);

    let (result, stream) = run_session(stream, &config, &log);

    assert!(matches!(result, Err(CalcError::TransportShortWrite { .. })));
    // The second request was never read
    assert_eq!(stream.bytes_consumed(), SIZE as u64);
}

#[test]
fn test_connection_reset_is_peer_close() {
    let config = test_config();
    let log = MemoryLog::new();

    let mut session = StreamSession::new(Broken(io::ErrorKind::ConnectionReset), "peer", &config, &log);
    assert_eq!(session.run().unwrap(), SessionEnd::PeerClosed);
}

#[test]
fn test_other_read_errors_are_fatal() {
    let config = test_config();
    let log = MemoryLog::new();

    let mut session = StreamSession::new(Broken(io::ErrorKind::Other), "peer", &config, &log);
    assert!(matches!(session.run(), Err(CalcError::Io(_))));
    assert_eq!(session.state(), SessionState::Closed);
}

// =============================================================================
// Logging Tests
// =============================================================================

#[test]
fn test_session_logs_requests_and_replies() {
    let config = test_config();
    let log = MemoryLog::new();

    run_session(Duplex::with_requests(&["* 3 3", "="]), &config, &log);

    assert!(log.contains("Client test-peer sent: * 3 3"));
    assert!(log.contains("Server replied to test-peer: 9.00"));
    assert!(log.contains("Server replied to test-peer: Bye"));
    assert_eq!(log.lines().last().unwrap(), "Closing connection with test-peer");
}

#[test]
fn test_peer_close_is_logged() {
    let config = test_config();
    let log = MemoryLog::new();

    run_session(Duplex::with_requests(&[]), &config, &log);

    assert!(log.contains("Client has closed the connection."));
}
