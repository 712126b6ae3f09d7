//! Per-connection request/response loop.

use std::net::SocketAddr;
use std::sync::Arc;

use timecho_line::{LineChannel, LineConfig};
use tracing::{debug, warn};

use crate::command::{parse, Command};
use crate::error::ServerError;
use crate::responder::{Clock, Responder, SystemClock};

/// Process-local connection number, assigned at accept time. Never sent on the wire.
pub type ConnectionId = u64;

/// What a handler does after answering `quit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuitPolicy {
    /// Send the farewell, then close the connection.
    #[default]
    Close,
    /// Send the farewell and keep serving until the peer hangs up.
    KeepOpen,
}

/// Per-connection behavior.
#[derive(Debug, Clone, Default)]
pub struct HandlerConfig {
    pub line: LineConfig,
    pub quit_policy: QuitPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    Active,
    Closing,
    Closed,
}

/// Why a handler stopped.
#[derive(Debug)]
pub enum HandlerOutcome {
    /// The peer closed its end of the stream.
    Disconnected,
    /// `quit` was answered under [`QuitPolicy::Close`].
    Quit,
    /// A read or write failed; only this connection is affected.
    Failed(ServerError),
}

/// Owns one accepted connection and serves it until it ends.
pub struct ConnectionHandler<C = SystemClock> {
    id: ConnectionId,
    channel: LineChannel,
    responder: Arc<Responder<C>>,
    quit_policy: QuitPolicy,
    state: HandlerState,
    requests: u64,
}

impl<C: Clock> ConnectionHandler<C> {
    pub fn new(
        id: ConnectionId,
        channel: LineChannel,
        responder: Arc<Responder<C>>,
        quit_policy: QuitPolicy,
    ) -> Self {
        Self {
            id,
            channel,
            responder,
            quit_policy,
            state: HandlerState::Active,
            requests: 0,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.channel.peer_addr()
    }

    /// Serve requests until the peer hangs up, `quit` ends the session, or
    /// I/O fails. The connection is closed before this returns.
    ///
    /// If the loop unwinds instead, dropping the handler drops the channel,
    /// which closes the socket on that path too.
    pub fn run(mut self) -> HandlerOutcome {
        let outcome = self.serve();

        self.state = HandlerState::Closing;
        if let Err(err) = self.channel.close() {
            debug!(connection = self.id, error = %err, "error while closing connection");
        }
        self.state = HandlerState::Closed;

        match &outcome {
            HandlerOutcome::Failed(err) => {
                warn!(
                    connection = self.id,
                    requests = self.requests,
                    state = ?self.state,
                    error = %err,
                    "connection failed"
                );
            }
            other => {
                debug!(
                    connection = self.id,
                    requests = self.requests,
                    state = ?self.state,
                    outcome = ?other,
                    "connection closed"
                );
            }
        }

        outcome
    }

    fn serve(&mut self) -> HandlerOutcome {
        loop {
            let line = match self.channel.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => return HandlerOutcome::Disconnected,
                Err(err) => return HandlerOutcome::Failed(err.into()),
            };

            let command = parse(&line);
            debug!(connection = self.id, command = command.name(), "request received");

            let reply = self.responder.respond(&command);
            if let Err(err) = self.channel.write_line(&reply) {
                return HandlerOutcome::Failed(err.into());
            }
            self.requests += 1;

            if command == Command::Quit && self.quit_policy == QuitPolicy::Close {
                return HandlerOutcome::Quit;
            }
        }
    }
}

impl<C> std::fmt::Debug for ConnectionHandler<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandler")
            .field("id", &self.id)
            .field("channel", &self.channel)
            .field("quit_policy", &self.quit_policy)
            .field("state", &self.state)
            .finish()
    }
}
