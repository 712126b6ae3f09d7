use std::io::{self, BufRead, IsTerminal, Write};
use std::net::SocketAddr;

use timecho_server::{ClientSession, ServerError, QUIT};

use crate::cmd::ClientArgs;
use crate::exit::{io_error, server_error, CliResult, SUCCESS};
use crate::output::{print_reply, OutputFormat};

pub fn run(args: ClientArgs, format: OutputFormat) -> CliResult<i32> {
    let mut session = ClientSession::connect(args.addr.as_str())
        .map_err(|err| server_error("connect failed", err))?;

    let stdin = io::stdin();
    let prompt = stdin.is_terminal();
    interact(&mut session, stdin.lock(), prompt, format)?;

    session
        .close()
        .map_err(|err| server_error("close failed", err))?;
    Ok(SUCCESS)
}

trait Requester {
    fn request(&mut self, line: &str) -> Result<String, ServerError>;
    fn peer(&self) -> Option<SocketAddr>;
}

impl Requester for ClientSession {
    fn request(&mut self, line: &str) -> Result<String, ServerError> {
        ClientSession::request(self, line)
    }

    fn peer(&self) -> Option<SocketAddr> {
        self.peer_addr()
    }
}

/// Forward input lines until stdin ends or a `quit` has been answered.
/// Returns the number of requests sent.
fn interact<R: Requester, I: BufRead>(
    requester: &mut R,
    mut input: I,
    prompt: bool,
    format: OutputFormat,
) -> CliResult<usize> {
    let mut sent = 0usize;
    let mut line = String::new();

    loop {
        if prompt {
            eprint!("> ");
            let _ = io::stderr().flush();
        }

        line.clear();
        let read = input
            .read_line(&mut line)
            .map_err(|err| io_error("stdin read failed", err))?;
        if read == 0 {
            break;
        }

        let request = line.trim_end_matches(['\n', '\r']);
        let reply = requester
            .request(request)
            .map_err(|err| server_error("request failed", err))?;
        sent += 1;
        print_reply(request, &reply, requester.peer(), format);

        if request.starts_with(QUIT) {
            break;
        }
    }

    Ok(sent)
}
