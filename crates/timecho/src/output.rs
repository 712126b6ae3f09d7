use std::io::{IsTerminal, Write};
use std::net::SocketAddr;

use chrono::{SecondsFormat, Utc};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ReplyOutput<'a> {
    event: &'static str,
    request: &'a str,
    reply: &'a str,
    peer: Option<String>,
    timestamp: String,
}

#[derive(Serialize)]
struct ListeningOutput {
    event: &'static str,
    addr: String,
    quit_policy: &'static str,
    timestamp: String,
}

pub fn print_reply(request: &str, reply: &str, peer: Option<SocketAddr>, format: OutputFormat) {
    let peer = peer.map(|addr| addr.to_string());
    match format {
        OutputFormat::Json => {
            let out = ReplyOutput {
                event: "reply",
                request,
                reply,
                peer,
                timestamp: now_rfc3339(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["REQUEST", "REPLY", "PEER"])
                .add_row(vec![
                    request.to_string(),
                    reply.to_string(),
                    peer.unwrap_or_else(|| "-".to_string()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "request={:?} reply={:?} peer={}",
                request,
                reply,
                peer.as_deref().unwrap_or("-")
            );
        }
        OutputFormat::Raw => print_raw(reply),
    }
}

/// First stdout record of `serve`; scripts read the bound address from it.
pub fn print_listening(addr: SocketAddr, quit_policy: &'static str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ListeningOutput {
                event: "listening",
                addr: addr.to_string(),
                quit_policy,
                timestamp: now_rfc3339(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_header(vec!["LISTENING", "QUIT POLICY"])
                .add_row(vec![addr.to_string(), quit_policy.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("listening on {addr} (quit policy: {quit_policy})"),
        OutputFormat::Raw => print_raw(&addr.to_string()),
    }
    let _ = std::io::stdout().flush();
}

pub fn print_raw(line: &str) {
    let mut out = std::io::stdout();
    let _ = writeln!(out, "{line}");
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
