//! A bidirectional line channel over one TCP connection.

use std::net::SocketAddr;

use timecho_transport::NetStream;
use tracing::debug;

use crate::codec::LineConfig;
use crate::error::{LineError, Result};
use crate::reader::{transport_to_line_error, LineReader};
use crate::writer::LineWriter;

/// Read-one-line / write-one-line over a single connected stream.
///
/// The channel owns the connection. [`LineChannel::close`] shuts the socket
/// down; it may be called any number of times and also runs on drop, so the
/// stream is closed exactly once whichever path gets there first.
pub struct LineChannel {
    reader: LineReader<NetStream>,
    writer: LineWriter<NetStream>,
    peer: Option<SocketAddr>,
    closed: bool,
}

impl LineChannel {
    /// Wrap a connected stream with default configuration.
    pub fn new(stream: NetStream) -> Result<Self> {
        Self::with_config(stream, LineConfig::default())
    }

    /// Wrap a connected stream, applying timeouts and limits from `config`.
    pub fn with_config(stream: NetStream, config: LineConfig) -> Result<Self> {
        let peer = stream.peer_addr().ok();
        let reader_stream = stream.try_clone().map_err(transport_to_line_error)?;

        let reader = LineReader::with_config_net(reader_stream, config.clone())?;
        let writer = LineWriter::with_config_net(stream, config)?;

        Ok(Self {
            reader,
            writer,
            peer,
            closed: false,
        })
    }

    /// Read the next line, or `Ok(None)` once the peer has closed the stream.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        if self.closed {
            return Err(LineError::Closed);
        }
        self.reader.read_line()
    }

    /// Write one line and flush it onto the transport.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        if self.closed {
            return Err(LineError::Closed);
        }
        self.writer.write_line(line)
    }

    /// Remote address captured when the channel was opened.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Shut the connection down. Later calls are no-ops.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        debug!(peer = ?self.peer, "closing line channel");

        let flushed = self.writer.flush();
        self.writer
            .get_ref()
            .shutdown()
            .map_err(transport_to_line_error)?;
        flushed
    }
}

impl Drop for LineChannel {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            debug!(peer = ?self.peer, error = %err, "error while closing line channel");
        }
    }
}

impl std::fmt::Debug for LineChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineChannel")
            .field("peer", &self.peer)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};

    use super::*;

    fn channel_and_peer() -> (LineChannel, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let peer = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        let channel = LineChannel::new(NetStream::from_tcp(server)).unwrap();
        (channel, peer)
    }

    #[test]
    fn reads_and_writes_lines() {
        let (mut channel, mut peer) = channel_and_peer();

        peer.write_all(b"echo hi\n").unwrap();
        assert_eq!(channel.read_line().unwrap().as_deref(), Some("echo hi"));

        channel.write_line("hi").unwrap();
        let mut reply = String::new();
        BufReader::new(&peer).read_line(&mut reply).unwrap();
        assert_eq!(reply, "hi\n");
    }

    #[test]
    fn peer_close_is_end_of_stream() {
        let (mut channel, peer) = channel_and_peer();
        drop(peer);

        assert_eq!(channel.read_line().unwrap(), None);
    }

    #[test]
    fn close_is_idempotent() {
        let (mut channel, mut peer) = channel_and_peer();

        channel.close().unwrap();
        channel.close().unwrap();
        assert!(channel.closed);

        let mut buf = [0u8; 1];
        assert_eq!(peer.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn operations_after_close_fail() {
        let (mut channel, _peer) = channel_and_peer();
        channel.close().unwrap();

        assert!(matches!(channel.read_line(), Err(LineError::Closed)));
        assert!(matches!(channel.write_line("x"), Err(LineError::Closed)));
    }

    #[test]
    fn drop_closes_connection() {
        let (channel, mut peer) = channel_and_peer();
        drop(channel);

        let mut buf = [0u8; 1];
        assert_eq!(peer.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn records_peer_address() {
        let (channel, peer) = channel_and_peer();
        assert_eq!(channel.peer_addr(), Some(peer.local_addr().unwrap()));
    }
}
