use timecho_line::LineConfig;
use timecho_server::ClientSession;

use crate::cmd::{parse_duration, SendArgs};
use crate::exit::{server_error, CliResult, SUCCESS};
use crate::output::{print_reply, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let config = LineConfig {
        read_timeout: Some(timeout),
        write_timeout: Some(timeout),
        ..LineConfig::default()
    };

    let mut session = ClientSession::connect_with_config(args.addr.as_str(), config)
        .map_err(|err| server_error("connect failed", err))?;
    let peer = session.peer_addr();

    for line in &args.lines {
        let reply = session
            .request(line)
            .map_err(|err| server_error("request failed", err))?;
        print_reply(line, &reply, peer, format);
    }

    session
        .close()
        .map_err(|err| server_error("close failed", err))?;
    Ok(SUCCESS)
}
