//! In-process server and client session.
//!
//! Run with:
//!   cargo run --example session
//!
//! Against a running server instead:
//!   cargo run -- serve --addr 127.0.0.1:8888
//!   cargo run -- send --addr 127.0.0.1:8888 time "echo hello" quit

use std::thread;

use timecho::server::{ClientSession, Listener};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let listener = Listener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr();
    eprintln!("Listening on {addr}");

    thread::spawn(move || {
        if let Err(err) = listener.serve() {
            eprintln!("Listener stopped: {err}");
        }
    });

    let mut session = ClientSession::connect(addr)?;
    println!("time         -> {}", session.time()?);
    println!("echo hello   -> {}", session.echo("hello")?);
    println!("what is this -> {}", session.request("what is this")?);
    println!("quit         -> {}", session.quit()?);

    // The server hangs up after the farewell.
    assert!(session.read_line()?.is_none());
    Ok(())
}
