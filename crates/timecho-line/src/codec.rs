use bytes::{BufMut, BytesMut};

use crate::error::{LineError, Result};

/// Line terminator appended to every outgoing line.
pub const TERMINATOR: u8 = b'\n';

const CARRIAGE_RETURN: u8 = b'\r';

/// Default maximum line length: 64 KiB (terminator excluded).
pub const DEFAULT_MAX_LINE: usize = 64 * 1024;

/// Encode one line into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────────────────┬──────┐
/// │ UTF-8 text (no \n)       │ \n   │
/// └──────────────────────────┴──────┘
/// ```
pub fn encode_line(line: &str, dst: &mut BytesMut) -> Result<()> {
    if line.bytes().any(|b| b == TERMINATOR) {
        return Err(LineError::EmbeddedTerminator);
    }
    dst.reserve(line.len() + 1);
    dst.put_slice(line.as_bytes());
    dst.put_u8(TERMINATOR);
    Ok(())
}

/// Decode one line from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete line yet.
/// On success, consumes the line and its terminator from the buffer. A `\r`
/// directly before the `\n` is dropped as well.
pub fn decode_line(src: &mut BytesMut, max_line: usize) -> Result<Option<String>> {
    let Some(pos) = src.iter().position(|b| *b == TERMINATOR) else {
        // Leave room for a trailing '\r' that may precede the terminator.
        if src.len() > max_line.saturating_add(1) {
            return Err(LineError::LineTooLong {
                size: src.len(),
                max: max_line,
            });
        }
        return Ok(None); // Need more data
    };

    let raw = src.split_to(pos + 1);
    let text = strip_cr(&raw[..pos]);
    if text.len() > max_line {
        return Err(LineError::LineTooLong {
            size: text.len(),
            max: max_line,
        });
    }

    Ok(Some(String::from_utf8_lossy(text).into_owned()))
}

/// Decode whatever is left in the buffer once the stream has ended.
///
/// An unterminated tail still counts as a line; an empty buffer yields `None`.
pub fn decode_tail(src: &mut BytesMut, max_line: usize) -> Result<Option<String>> {
    if src.is_empty() {
        return Ok(None);
    }

    let raw = src.split();
    let text = strip_cr(&raw);
    if text.len() > max_line {
        return Err(LineError::LineTooLong {
            size: text.len(),
            max: max_line,
        });
    }

    Ok(Some(String::from_utf8_lossy(text).into_owned()))
}

fn strip_cr(bytes: &[u8]) -> &[u8] {
    match bytes.split_last() {
        Some((&CARRIAGE_RETURN, rest)) => rest,
        _ => bytes,
    }
}

/// Configuration for line reading and writing.
#[derive(Debug, Clone)]
pub struct LineConfig {
    /// Maximum line length in bytes, terminator excluded. Default: 64 KiB.
    pub max_line_length: usize,
    /// Read timeout for blocking operations. Default: none (block forever).
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE,
            read_timeout: None,
            write_timeout: None,
        }
    }
}
