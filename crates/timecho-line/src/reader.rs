use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use timecho_transport::NetStream;

use crate::codec::{decode_line, decode_tail, LineConfig};
use crate::error::{LineError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 4 * 1024;
const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Reads complete lines from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete lines.
/// Bytes past the current line stay buffered for the next call.
pub struct LineReader<T> {
    inner: T,
    buf: BytesMut,
    config: LineConfig,
}

impl<T: Read> LineReader<T> {
    /// Create a new line reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, LineConfig::default())
    }

    /// Create a new line reader with explicit configuration.
    pub fn with_config(inner: T, config: LineConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete line (blocking).
    ///
    /// Returns `Ok(None)` once the peer has closed the stream and every
    /// buffered line has been handed out.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(line) = decode_line(&mut self.buf, self.config.max_line_length)? {
                return Ok(Some(line));
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(LineError::Io(err)),
            };

            if read == 0 {
                return decode_tail(&mut self.buf, self.config.max_line_length);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }
}

impl LineReader<NetStream> {
    /// Create a line reader for `NetStream` and apply read timeout from config.
    pub fn with_config_net(inner: NetStream, config: LineConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_line_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_line_error(err: timecho_transport::TransportError) -> LineError {
    match err {
        timecho_transport::TransportError::Io(io)
        | timecho_transport::TransportError::Accept(io) => LineError::Io(io),
        timecho_transport::TransportError::Bind { source, .. }
        | timecho_transport::TransportError::Connect { source, .. } => LineError::Io(source),
    }
}
