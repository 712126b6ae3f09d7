use std::time::Duration;

use clap::{Args, Subcommand};
use timecho_line::DEFAULT_MAX_LINE;
use timecho_transport::DEFAULT_ADDR;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod client;
pub mod send;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the time/echo server until interrupted.
    Serve(ServeArgs),
    /// Send request lines over one session and print each reply.
    Send(SendArgs),
    /// Interactive session: forward stdin lines and print replies.
    Client(ClientArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Client(args) => client::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = "TIMECHO_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: String,
    /// Answer `quit` but keep the connection open until the client hangs up.
    #[arg(long)]
    pub keep_open_on_quit: bool,
    /// Maximum request line length in bytes.
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_LINE)]
    pub max_line: usize,
    /// Drop connections that stay silent this long (e.g. 30s, 500ms).
    #[arg(long, value_name = "DURATION")]
    pub read_timeout: Option<String>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Request lines, sent in order over one connection.
    #[arg(required = true, value_name = "LINE")]
    pub lines: Vec<String>,
    /// Server address.
    #[arg(long, env = "TIMECHO_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: String,
    /// Maximum time to wait for each reply (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct ClientArgs {
    /// Server address.
    #[arg(long, env = "TIMECHO_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `5s`, `150ms` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    if millis {
        Ok(Duration::from_millis(value))
    } else {
        Ok(Duration::from_secs(value))
    }
}
