//! Protocol codec
//!
//! Framing of text messages for both transports.
//!
//! ## Wire Format
//!
//! ### Stream Frame
//! ```text
//! ┌──────────────────────────────┬─────────────────────┐
//! │ ASCII text (≤ size - 1)      │ NUL padding (≥ 1)   │
//! └──────────────────────────────┴─────────────────────┘
//!  exactly `size` bytes, every message, both directions
//! ```
//!
//! ### Datagram
//! ```text
//! ┌──────────────────────────────┐
//! │ ASCII text (≤ size)          │   length given by the datagram
//! └──────────────────────────────┘
//! ```
//!
//! Text longer than the frame is cut silently at the boundary.

use std::io::{ErrorKind, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{CalcError, Result};

// =============================================================================
// Frame Encoding/Decoding
// =============================================================================

/// Encode text into a fixed-size, NUL-terminated stream frame
pub fn encode_frame(text: &str, size: usize) -> Bytes {
    let body = truncate(text.as_bytes(), size.saturating_sub(1));

    let mut frame = BytesMut::with_capacity(size);
    frame.put_slice(body);
    frame.put_bytes(0, size - body.len());
    frame.freeze()
}

/// Encode text into a datagram payload of at most `size` bytes
pub fn encode_datagram(text: &str, size: usize) -> Bytes {
    Bytes::copy_from_slice(truncate(text.as_bytes(), size))
}

/// Decode a received frame or datagram into text
///
/// Reads up to the first NUL (or the end of the buffer) and strips the
/// line ending a console client may have left on the request.
pub fn decode_frame(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let text = String::from_utf8_lossy(&bytes[..end]);
    text.trim_end_matches(&['\r', '\n'][..]).to_string()
}

/// Cut `bytes` down to `max` bytes
pub fn truncate(bytes: &[u8], max: usize) -> &[u8] {
    &bytes[..bytes.len().min(max)]
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one complete frame of `size` bytes
///
/// Returns `Ok(None)` when the peer closed the connection cleanly before
/// sending anything. A close part-way through a frame is a short read.
pub fn read_frame<R: Read>(reader: &mut R, size: usize) -> Result<Option<BytesMut>> {
    let mut frame = BytesMut::zeroed(size);
    let mut received = 0;

    while received < size {
        match reader.read(&mut frame[received..]) {
            Ok(0) if received == 0 => return Ok(None),
            Ok(0) => {
                return Err(CalcError::TransportShortRead {
                    expected: size,
                    received,
                })
            }
            Ok(n) => received += n,
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(Some(frame))
}

/// Write one complete frame
pub fn write_frame<W: Write>(writer: &mut W, frame: &[u8]) -> Result<()> {
    let mut written = 0;

    while written < frame.len() {
        match writer.write(&frame[written..]) {
            Ok(0) => {
                return Err(CalcError::TransportShortWrite {
                    expected: frame.len(),
                    written,
                })
            }
            Ok(n) => written += n,
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }

    writer.flush()?;
    Ok(())
}
