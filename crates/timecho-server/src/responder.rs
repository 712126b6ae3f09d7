use chrono::{Local, NaiveTime};

use crate::command::Command;

/// Reply to `quit`.
pub const FAREWELL: &str = "Sorry to see you leaving. Goodbye.";

/// Reply to any request that is not `time`, `echo` or `quit`.
pub const UNKNOWN_REQUEST: &str = "error I'm sorry I don't understand your request";

/// Source of the time of day reported by `time`.
pub trait Clock {
    fn time_of_day(&self) -> NaiveTime;
}

/// Host wall clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn time_of_day(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Maps each command to its single reply line.
#[derive(Debug, Clone, Default)]
pub struct Responder<C = SystemClock> {
    clock: C,
}

impl Responder<SystemClock> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Clock> Responder<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Produce the reply for `command`. Only `time` touches anything outside
    /// the command itself.
    pub fn respond(&self, command: &Command) -> String {
        match command {
            Command::Time => format_time_of_day(self.clock.time_of_day()),
            Command::Echo { message } => message.clone(),
            Command::Quit => FAREWELL.to_string(),
            Command::Unknown { .. } => UNKNOWN_REQUEST.to_string(),
        }
    }
}

/// `HH:MM:SS` plus a 3, 6 or 9 digit fraction when it is non-zero.
pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format("%H:%M:%S%.f").to_string()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::command::parse;

    struct FixedClock(NaiveTime);

    impl Clock for FixedClock {
        fn time_of_day(&self) -> NaiveTime {
            self.0
        }
    }

    struct SteppingClock {
        next: Cell<NaiveTime>,
    }

    impl Clock for SteppingClock {
        fn time_of_day(&self) -> NaiveTime {
            let now = self.next.get();
            self.next.set(now + chrono::TimeDelta::milliseconds(1));
            now
        }
    }

    fn time(h: u32, m: u32, s: u32, milli: u32) -> NaiveTime {
        NaiveTime::from_hms_milli_opt(h, m, s, milli).unwrap()
    }

    #[test]
    fn time_uses_clock() {
        let responder = Responder::with_clock(FixedClock(time(13, 5, 9, 250)));
        assert_eq!(responder.respond(&Command::Time), "13:05:09.250");
    }

    #[test]
    fn whole_seconds_have_no_fraction() {
        let responder = Responder::with_clock(FixedClock(time(0, 0, 7, 0)));
        assert_eq!(responder.respond(&Command::Time), "00:00:07");
    }

    #[test]
    fn system_clock_output_is_time_of_day() {
        let reply = Responder::new().respond(&Command::Time);
        assert!(
            NaiveTime::parse_from_str(&reply, "%H:%M:%S%.f").is_ok(),
            "unexpected time reply {reply:?}"
        );
    }

    #[test]
    fn repeated_time_replies_never_go_backwards() {
        let responder = Responder::with_clock(SteppingClock {
            next: Cell::new(time(9, 59, 59, 998)),
        });

        let mut previous = time(0, 0, 0, 0);
        for _ in 0..5 {
            let reply = responder.respond(&Command::Time);
            let parsed = NaiveTime::parse_from_str(&reply, "%H:%M:%S%.f").unwrap();
            assert!(parsed >= previous, "{parsed} went back from {previous}");
            previous = parsed;
        }
    }

    #[test]
    fn echo_returns_message_unchanged() {
        let responder = Responder::new();
        assert_eq!(responder.respond(&parse("echo hello")), "hello");
        assert_eq!(responder.respond(&parse("echo")), "");
    }

    #[test]
    fn quit_says_goodbye() {
        assert_eq!(Responder::new().respond(&Command::Quit), FAREWELL);
    }

    #[test]
    fn unknown_reply_ignores_content() {
        let responder = Responder::new();
        for line in ["garbage", "", "TIME", "hello world"] {
            assert_eq!(responder.respond(&parse(line)), UNKNOWN_REQUEST);
        }
    }
}
