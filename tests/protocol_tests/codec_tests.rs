//! Codec Tests
//!
//! Tests for frame encoding/decoding and stream frame I/O.

use std::io::{self, Cursor, Read, Write};

use calcnet::protocol::{
    decode_frame, encode_datagram, encode_frame, read_frame, write_frame,
};
use calcnet::CalcError;

// =============================================================================
// Helper Types
// =============================================================================

/// Hands out at most `chunk` bytes per read
struct Trickle {
    data: Cursor<Vec<u8>>,
    chunk: usize,
}

impl Read for Trickle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.chunk);
        self.data.read(&mut buf[..n])
    }
}

/// Accepts `capacity` bytes, then reports zero-length writes
struct Stalled {
    written: Vec<u8>,
    capacity: usize,
}

impl Write for Stalled {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = buf.len().min(self.capacity - self.written.len());
        self.written.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// Frame Encoding Tests
// =============================================================================

#[test]
fn test_encode_decode_frame() {
    let frame = encode_frame("+ 3 4", 512);
    assert_eq!(frame.len(), 512);
    assert_eq!(decode_frame(&frame), "+ 3 4");
}

#[test]
fn test_encode_empty_frame() {
    let frame = encode_frame("", 32);
    assert_eq!(frame.len(), 32);
    assert!(frame.iter().all(|&b| b == 0));
    assert_eq!(decode_frame(&frame), "");
}

#[test]
fn test_oversized_text_is_truncated_to_frame() {
    let long = "9".repeat(2000);
    let frame = encode_frame(&long, 256);

    assert_eq!(frame.len(), 256);
    assert_eq!(frame[255], 0);
    assert_eq!(decode_frame(&frame), "9".repeat(255));
}

#[test]
fn test_oversized_datagram_is_truncated() {
    let long = "+ 1 ".to_string() + &"2".repeat(600);
    let payload = encode_datagram(&long, 256);

    assert_eq!(payload.len(), 256);
    assert_eq!(decode_frame(&payload), long[..256]);
}

#[test]
fn test_decode_stops_at_first_nul() {
    assert_eq!(decode_frame(b"Bye\0garbage\0"), "Bye");
}

#[test]
fn test_decode_full_buffer_without_nul() {
    let bytes = [b'7'; 64];
    assert_eq!(decode_frame(&bytes), "7".repeat(64));
}

#[test]
fn test_decode_non_ascii_is_lossy_not_fatal() {
    let decoded = decode_frame(&[b'+', b' ', 0xff, 0xfe, b' ', b'1']);
    assert!(decoded.starts_with("+ "));
    assert!(decoded.ends_with(" 1"));
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_write_then_read_frames() {
    let mut wire = Vec::new();
    write_frame(&mut wire, &encode_frame("+ 1 2", 16)).unwrap();
    write_frame(&mut wire, &encode_frame("=", 16)).unwrap();
    assert_eq!(wire.len(), 32);

    let mut reader = Cursor::new(wire);
    let first = read_frame(&mut reader, 16).unwrap().unwrap();
    let second = read_frame(&mut reader, 16).unwrap().unwrap();

    assert_eq!(decode_frame(&first), "+ 1 2");
    assert_eq!(decode_frame(&second), "=");
    assert!(read_frame(&mut reader, 16).unwrap().is_none());
}

#[test]
fn test_read_frame_across_partial_reads() {
    let mut reader = Trickle {
        data: Cursor::new(encode_frame("* 6 7", 64).to_vec()),
        chunk: 5,
    };

    let frame = read_frame(&mut reader, 64).unwrap().unwrap();
    assert_eq!(decode_frame(&frame), "* 6 7");
}

#[test]
fn test_read_frame_clean_eof() {
    let mut reader = Cursor::new(Vec::new());
    assert!(read_frame(&mut reader, 16).unwrap().is_none());
}

#[test]
fn test_read_frame_short_read() {
    let mut reader = Cursor::new(b"+ 1 2".to_vec());

    match read_frame(&mut reader, 16) {
        Err(CalcError::TransportShortRead { expected, received }) => {
            assert_eq!(expected, 16);
            assert_eq!(received, 5);
        }
        other => panic!("Expected TransportShortRead, got {:?}", other),
    }
}

#[test]
fn test_write_frame_short_write() {
    let mut writer = Stalled {
        written: Vec::new(),
        capacity: 10,
    };

    match write_frame(&mut writer, &encode_frame("7.00", 16)) {
        Err(CalcError::TransportShortWrite { expected, written }) => {
            assert_eq!(expected, 16);
            assert_eq!(written, 10);
        }
        other => panic!("Expected TransportShortWrite, got {:?}", other),
    }
}
