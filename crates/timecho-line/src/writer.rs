use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use timecho_transport::NetStream;

use crate::codec::{encode_line, LineConfig};
use crate::error::{LineError, Result};
use crate::reader::transport_to_line_error;

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Writes complete lines to any `Write` stream.
///
/// Every line is flushed before `write_line` returns, so the peer sees it
/// immediately.
pub struct LineWriter<T> {
    inner: T,
    buf: BytesMut,
    config: LineConfig,
}

impl<T: Write> LineWriter<T> {
    /// Create a new line writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, LineConfig::default())
    }

    /// Create a new line writer with explicit configuration.
    pub fn with_config(inner: T, config: LineConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Encode and send one line, appending the terminator (blocking).
    ///
    /// An expired write timeout surfaces as [`LineError::Io`].
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        if line.len() > self.config.max_line_length {
            return Err(LineError::LineTooLong {
                size: line.len(),
                max: self.config.max_line_length,
            });
        }

        self.buf.clear();
        encode_line(line, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(LineError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(LineError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(LineError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

}

impl LineWriter<NetStream> {
    /// Create a line writer for `NetStream` and apply write timeout from config.
    pub fn with_config_net(inner: NetStream, config: LineConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_line_error)?;
        Ok(Self::with_config(inner, config))
    }
}
