use std::net::{SocketAddr, ToSocketAddrs};

use timecho_line::{LineChannel, LineConfig};
use timecho_transport::TcpTransport;
use tracing::debug;

use crate::command::{ECHO, QUIT, TIME};
use crate::error::{Result, ServerError};

/// Client end of the line protocol: one request line out, one reply line back.
#[derive(Debug)]
pub struct ClientSession {
    channel: LineChannel,
}

impl ClientSession {
    /// Connect with default line configuration.
    pub fn connect(addr: impl ToSocketAddrs + std::fmt::Display) -> Result<Self> {
        Self::connect_with_config(addr, LineConfig::default())
    }

    /// Connect with explicit limits and timeouts.
    pub fn connect_with_config(
        addr: impl ToSocketAddrs + std::fmt::Display,
        config: LineConfig,
    ) -> Result<Self> {
        let stream = TcpTransport::connect(addr)?;
        let channel = LineChannel::with_config(stream, config)?;
        debug!(peer = ?channel.peer_addr(), "session opened");
        Ok(Self { channel })
    }

    /// Send one request line and wait for its reply.
    ///
    /// Every request gets exactly one reply, unknown ones included, so the
    /// session never falls out of step with the server.
    pub fn request(&mut self, line: &str) -> Result<String> {
        self.channel.write_line(line)?;
        match self.channel.read_line()? {
            Some(reply) => Ok(reply),
            None => Err(ServerError::Disconnected(format!(
                "no reply to {:?}",
                truncate(line)
            ))),
        }
    }

    pub fn time(&mut self) -> Result<String> {
        self.request(TIME)
    }

    pub fn echo(&mut self, message: &str) -> Result<String> {
        self.request(&format!("{ECHO} {message}"))
    }

    /// Say goodbye. The server closes the connection afterwards unless it
    /// runs with the keep-open quit policy.
    pub fn quit(&mut self) -> Result<String> {
        self.request(QUIT)
    }

    /// Read one more line without sending anything; `None` once the server
    /// has closed the connection.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.channel.read_line()?)
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.channel.peer_addr()
    }

    pub fn close(mut self) -> Result<()> {
        Ok(self.channel.close()?)
    }
}

fn truncate(line: &str) -> &str {
    const MAX: usize = 32;
    match line.char_indices().nth(MAX) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}
