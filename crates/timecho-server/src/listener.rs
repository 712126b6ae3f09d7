use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use timecho_line::LineChannel;
use timecho_transport::TcpTransport;
use tracing::{debug, error, warn};

use crate::error::{Result, ServerError};
use crate::handler::{ConnectionHandler, HandlerConfig, HandlerOutcome};
use crate::responder::{Clock, Responder, SystemClock};

/// Accepts connections and runs one handler thread per connection.
pub struct Listener<C = SystemClock> {
    transport: TcpTransport,
    responder: Arc<Responder<C>>,
    handler_config: HandlerConfig,
    next_connection_id: AtomicU64,
}

impl Listener<SystemClock> {
    /// Bind to a TCP address.
    pub fn bind(addr: impl ToSocketAddrs + std::fmt::Display) -> Result<Self> {
        let transport = TcpTransport::bind(addr)?;
        Ok(Self {
            transport,
            responder: Arc::new(Responder::new()),
            handler_config: HandlerConfig::default(),
            next_connection_id: AtomicU64::new(1),
        })
    }
}

impl<C: Clock + Send + Sync + 'static> Listener<C> {
    /// Replace the responder, e.g. to pin the clock.
    pub fn with_responder<D: Clock>(self, responder: Responder<D>) -> Listener<D> {
        Listener {
            transport: self.transport,
            responder: Arc::new(responder),
            handler_config: self.handler_config,
            next_connection_id: self.next_connection_id,
        }
    }

    /// Override per-connection behavior.
    pub fn with_handler_config(mut self, config: HandlerConfig) -> Self {
        self.handler_config = config;
        self
    }

    /// Accept the next connection and wrap it in a handler (blocking).
    pub fn accept(&self) -> Result<ConnectionHandler<C>> {
        let (stream, peer) = self.transport.accept()?;
        let id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);

        let channel = LineChannel::with_config(stream, self.handler_config.line.clone())?;
        debug!(connection = id, %peer, "client connected");

        Ok(ConnectionHandler::new(
            id,
            channel,
            Arc::clone(&self.responder),
            self.handler_config.quit_policy,
        ))
    }

    /// Accept connections forever, one thread each.
    ///
    /// Only returns when accepting fails, which means the listening socket is
    /// no longer usable.
    pub fn serve(&self) -> Result<()> {
        let always = AtomicBool::new(true);
        self.serve_while(&always)
    }

    /// Accept connections until `running` is cleared.
    ///
    /// The flag is checked after each accept, so a stop request takes effect
    /// once the next connection arrives.
    pub fn serve_while(&self, running: &AtomicBool) -> Result<()> {
        while running.load(Ordering::SeqCst) {
            let handler = match self.accept() {
                Ok(handler) => handler,
                // The peer vanished between accept and setup; only that connection is lost.
                Err(ServerError::Line(err)) => {
                    warn!(error = %err, "failed to set up connection");
                    continue;
                }
                Err(err) => {
                    error!(error = %err, "accept failed");
                    return Err(err);
                }
            };

            if !running.load(Ordering::SeqCst) {
                break;
            }

            if let Err(err) = spawn_handler(handler) {
                warn!(error = %err, "dropping connection");
            }
        }

        Ok(())
    }

    /// Bound address (reports the real port when bound to port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    /// Number of connections accepted so far.
    pub fn accepted(&self) -> u64 {
        self.next_connection_id.load(Ordering::Relaxed) - 1
    }
}

fn spawn_handler<C: Clock + Send + Sync + 'static>(
    handler: ConnectionHandler<C>,
) -> Result<thread::JoinHandle<HandlerOutcome>> {
    let id = handler.id();
    thread::Builder::new()
        .name(format!("timecho-conn-{id}"))
        .spawn(move || handler.run())
        .map_err(ServerError::Spawn)
}

impl<C> std::fmt::Debug for Listener<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listener")
            .field("transport", &self.transport)
            .field("handler_config", &self.handler_config)
            .finish()
    }
}
