//! Newline-terminated text framing over blocking streams.
//!
//! Every message on the wire is one line of UTF-8 text followed by `\n`.
//! Callers read and write whole lines; partial reads and flushing are handled
//! here.

pub mod channel;
pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use channel::LineChannel;
pub use codec::{decode_line, decode_tail, encode_line, LineConfig, DEFAULT_MAX_LINE, TERMINATOR};
pub use error::{LineError, Result};
pub use reader::LineReader;
pub use writer::LineWriter;
