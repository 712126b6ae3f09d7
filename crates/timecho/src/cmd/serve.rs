use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use timecho_line::LineConfig;
use timecho_server::{HandlerConfig, Listener, QuitPolicy};
use tracing::{debug, info};

use crate::cmd::{parse_duration, ServeArgs};
use crate::exit::{server_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};
use crate::output::{print_listening, OutputFormat};

pub fn run(args: ServeArgs, format: OutputFormat) -> CliResult<i32> {
    let config = handler_config(&args)?;
    let quit_policy = config.quit_policy;

    let listener = Listener::bind(args.addr.as_str())
        .map_err(|err| server_error("bind failed", err))?
        .with_handler_config(config);
    let addr = listener.local_addr();

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(Arc::clone(&running), addr)?;

    print_listening(addr, policy_name(quit_policy), format);

    listener
        .serve_while(&running)
        .map_err(|err| server_error("accept failed", err))?;

    info!(accepted = listener.accepted(), "server stopped");
    Ok(SUCCESS)
}

fn handler_config(args: &ServeArgs) -> CliResult<HandlerConfig> {
    if args.max_line == 0 {
        return Err(CliError::new(USAGE, "--max-line must be greater than zero"));
    }

    let read_timeout = args.read_timeout.as_deref().map(parse_duration).transpose()?;

    Ok(HandlerConfig {
        line: LineConfig {
            max_line_length: args.max_line,
            read_timeout,
            ..LineConfig::default()
        },
        quit_policy: if args.keep_open_on_quit {
            QuitPolicy::KeepOpen
        } else {
            QuitPolicy::Close
        },
    })
}

fn policy_name(policy: QuitPolicy) -> &'static str {
    match policy {
        QuitPolicy::Close => "close",
        QuitPolicy::KeepOpen => "keep-open",
    }
}

/// Clear the running flag, then poke the listener so the blocked accept
/// returns and the loop sees the flag.
fn install_ctrlc_handler(running: Arc<AtomicBool>, addr: SocketAddr) -> CliResult<()> {
    let wake = wake_addr(addr);
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
        if let Err(err) = TcpStream::connect_timeout(&wake, Duration::from_secs(1)) {
            debug!(error = %err, "wake-up connection failed");
        }
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

fn wake_addr(addr: SocketAddr) -> SocketAddr {
    match addr {
        SocketAddr::V4(v4) if v4.ip().is_unspecified() => {
            SocketAddr::from((Ipv4Addr::LOCALHOST, v4.port()))
        }
        SocketAddr::V6(v6) if v6.ip().is_unspecified() => {
            SocketAddr::from((Ipv6Addr::LOCALHOST, v6.port()))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ServeArgs {
        ServeArgs {
            addr: "127.0.0.1:0".to_string(),
            keep_open_on_quit: false,
            max_line: 128,
            read_timeout: None,
        }
    }

    #[test]
    fn builds_handler_config_from_flags() {
        let config = handler_config(&ServeArgs {
            keep_open_on_quit: true,
            read_timeout: Some("250ms".to_string()),
            ..args()
        })
        .unwrap();

        assert_eq!(config.quit_policy, QuitPolicy::KeepOpen);
        assert_eq!(config.line.max_line_length, 128);
        assert_eq!(config.line.read_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.line.write_timeout, None);
    }

    #[test]
    fn default_flags_close_on_quit() {
        let config = handler_config(&args()).unwrap();
        assert_eq!(config.quit_policy, QuitPolicy::Close);
        assert_eq!(config.line.read_timeout, None);
    }

    #[test]
    fn rejects_zero_max_line() {
        let err = handler_config(&ServeArgs {
            max_line: 0,
            ..args()
        })
        .unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn rejects_bad_read_timeout() {
        let err = handler_config(&ServeArgs {
            read_timeout: Some("soon".to_string()),
            ..args()
        })
        .unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn wake_addr_replaces_unspecified_host() {
        let any: SocketAddr = "0.0.0.0:8888".parse().unwrap();
        assert_eq!(wake_addr(any), "127.0.0.1:8888".parse().unwrap());

        let any6: SocketAddr = "[::]:9000".parse().unwrap();
        assert_eq!(wake_addr(any6), "[::1]:9000".parse().unwrap());

        let fixed: SocketAddr = "10.1.2.3:7".parse().unwrap();
        assert_eq!(wake_addr(fixed), fixed);
    }
}
