//! Time/echo line protocol over TCP.
//!
//! A toy request/response service: a client sends one line, the server
//! answers with one line. `time` returns the server's time of day,
//! `echo <message>` returns the message, `quit` says goodbye, and anything
//! else is met with a fixed error line.
//!
//! # Crate Structure
//!
//! - [`transport`]: Blocking TCP bind/accept/connect
//! - [`line`]: Newline-terminated framing and the per-connection line channel
//! - [`server`]: Command parsing, replies, connection handlers, listener and client session

/// Re-export transport types.
pub mod transport {
    pub use timecho_transport::*;
}

/// Re-export line framing types.
pub mod line {
    pub use timecho_line::*;
}

/// Re-export protocol and server types.
pub mod server {
    pub use timecho_server::*;
}
