/// Errors that can occur while serving or talking the line protocol.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] timecho_transport::TransportError),

    /// Line-level error.
    #[error("line error: {0}")]
    Line(#[from] timecho_line::LineError),

    /// Peer disconnected before a reply arrived.
    #[error("peer disconnected: {0}")]
    Disconnected(String),

    /// A connection thread could not be started.
    #[error("failed to spawn connection thread: {0}")]
    Spawn(std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
