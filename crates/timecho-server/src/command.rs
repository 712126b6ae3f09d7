//! Request classification.
//!
//! Commands are recognised by literal, case-sensitive prefix: `"timetable"`
//! is a `time` request and `"echoes"` echoes `"s"`.

/// Prefix of the time-of-day request.
pub const TIME: &str = "time";
/// Prefix of the echo request.
pub const ECHO: &str = "echo";
/// Prefix of the farewell request.
pub const QUIT: &str = "quit";

/// Length of `"echo "`; the echoed message starts right after it.
const ECHO_PAYLOAD_OFFSET: usize = ECHO.len() + 1;

/// One parsed request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Current time of day.
    Time,
    /// Send `message` back unchanged.
    Echo { message: String },
    /// Say goodbye.
    Quit,
    /// Anything else, kept verbatim.
    Unknown { raw: String },
}

impl Command {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Time => TIME,
            Command::Echo { .. } => ECHO,
            Command::Quit => QUIT,
            Command::Unknown { .. } => "unknown",
        }
    }
}

/// Classify one request line.
pub fn parse(line: &str) -> Command {
    if line.starts_with(TIME) {
        Command::Time
    } else if line.starts_with(ECHO) {
        Command::Echo {
            message: echo_payload(line).to_string(),
        }
    } else if line.starts_with(QUIT) {
        Command::Quit
    } else {
        Command::Unknown {
            raw: line.to_string(),
        }
    }
}

// `line` starts with "echo". A bare "echo" has no payload; when byte 5 is not a
// char boundary, fall back to the text after "echo" minus one leading space.
fn echo_payload(line: &str) -> &str {
    match line.get(ECHO_PAYLOAD_OFFSET..) {
        Some(message) => message,
        None => {
            let rest = &line[ECHO.len()..];
            rest.strip_prefix(' ').unwrap_or(rest)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_time() {
        assert_eq!(parse("time"), Command::Time);
    }

    #[test]
    fn time_is_a_prefix_match() {
        assert_eq!(parse("timetable"), Command::Time);
        assert_eq!(parse("time please"), Command::Time);
    }

    #[test]
    fn parses_echo_message() {
        assert_eq!(
            parse("echo hello"),
            Command::Echo {
                message: "hello".to_string()
            }
        );
    }

    #[test]
    fn echo_keeps_message_verbatim() {
        assert_eq!(
            parse("echo   spaced  out "),
            Command::Echo {
                message: "  spaced  out ".to_string()
            }
        );
    }

    #[test]
    fn bare_echo_has_empty_message() {
        assert_eq!(
            parse("echo"),
            Command::Echo {
                message: String::new()
            }
        );
        assert_eq!(
            parse("echo "),
            Command::Echo {
                message: String::new()
            }
        );
    }

    #[test]
    fn echo_prefix_drops_fifth_byte_whatever_it_is() {
        assert_eq!(
            parse("echoes"),
            Command::Echo {
                message: "s".to_string()
            }
        );
    }

    #[test]
    fn echo_followed_by_multibyte_char_does_not_panic() {
        assert_eq!(
            parse("echoé"),
            Command::Echo {
                message: "é".to_string()
            }
        );
    }

    #[test]
    fn parses_quit() {
        assert_eq!(parse("quit"), Command::Quit);
        assert_eq!(parse("quitting"), Command::Quit);
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(
            parse("Time"),
            Command::Unknown {
                raw: "Time".to_string()
            }
        );
        assert_eq!(
            parse("ECHO hi"),
            Command::Unknown {
                raw: "ECHO hi".to_string()
            }
        );
    }

    #[test]
    fn everything_else_is_unknown() {
        for line in ["", "garbage", " time", "tim", "hello echo", "qui"] {
            assert_eq!(
                parse(line),
                Command::Unknown {
                    raw: line.to_string()
                },
                "line {line:?}"
            );
        }
    }

    #[test]
    fn names_for_logging() {
        assert_eq!(parse("time").name(), "time");
        assert_eq!(parse("echo x").name(), "echo");
        assert_eq!(parse("quit").name(), "quit");
        assert_eq!(parse("nope").name(), "unknown");
    }
}
