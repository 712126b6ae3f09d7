//! The time/echo line protocol.
//!
//! A [`Listener`] accepts TCP connections and hands each one to its own
//! [`ConnectionHandler`] thread. The handler reads one line, classifies it
//! with [`parse`], answers with a [`Responder`] and repeats until the peer
//! goes away or says `quit`. [`ClientSession`] is the other end of the wire.

pub mod client;
pub mod command;
pub mod error;
pub mod handler;
pub mod listener;
pub mod responder;

pub use client::ClientSession;
pub use command::{parse, Command, ECHO, QUIT, TIME};
pub use error::{Result, ServerError};
pub use handler::{
    ConnectionHandler, ConnectionId, HandlerConfig, HandlerOutcome, HandlerState, QuitPolicy,
};
pub use listener::Listener;
pub use responder::{Clock, Responder, SystemClock, FAREWELL, UNKNOWN_REQUEST};
