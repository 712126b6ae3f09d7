/// Errors that can occur while reading or writing lines.
#[derive(Debug, thiserror::Error)]
pub enum LineError {
    /// A line exceeded the configured maximum length.
    #[error("line too long ({size} bytes, max {max})")]
    LineTooLong { size: usize, max: usize },

    /// An outgoing line contained a line terminator.
    #[error("line contains an embedded terminator")]
    EmbeddedTerminator,

    /// An I/O error occurred while reading or writing lines.
    #[error("line I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer stopped accepting bytes mid-write.
    #[error("connection closed (incomplete write)")]
    ConnectionClosed,

    /// The channel was already closed locally.
    #[error("channel closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, LineError>;
