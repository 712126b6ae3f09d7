//! Blocking TCP transport.
//!
//! This is the lowest layer of timecho. It binds, accepts and connects plain
//! TCP sockets and hands out [`NetStream`] values that everything above reads
//! lines from and writes lines to.

pub mod error;
pub mod stream;
pub mod tcp;

pub use error::{Result, TransportError};
pub use stream::NetStream;
pub use tcp::{TcpTransport, DEFAULT_ADDR, DEFAULT_PORT};
