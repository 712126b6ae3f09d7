#![cfg(feature = "cli")]

use std::io::{BufRead, BufReader};
use std::net::{SocketAddr, TcpListener};
use std::process::{Child, Command, Stdio};

use timecho_server::{ClientSession, FAREWELL, UNKNOWN_REQUEST};

struct ServerProcess {
    child: Child,
    addr: SocketAddr,
}

impl Drop for ServerProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn spawn_server(extra: &[&str]) -> ServerProcess {
    let mut child = Command::new(env!("CARGO_BIN_EXE_timecho"))
        .args(["--log-level", "error", "--format", "json", "serve", "--addr", "127.0.0.1:0"])
        .args(extra)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("serve command should start");

    let stdout = child.stdout.take().expect("stdout should be piped");
    let mut first = String::new();
    BufReader::new(stdout)
        .read_line(&mut first)
        .expect("listening record should be printed");

    let record: serde_json::Value =
        serde_json::from_str(&first).expect("listening record should be json");
    assert_eq!(record["event"], "listening");
    let addr = record["addr"]
        .as_str()
        .expect("addr should be a string")
        .parse()
        .expect("addr should parse");

    ServerProcess { child, addr }
}

#[test]
fn serve_answers_the_line_protocol() {
    let server = spawn_server(&[]);
    let mut session = ClientSession::connect(server.addr).expect("connect should succeed");

    assert_eq!(session.echo("over the wire").unwrap(), "over the wire");
    assert_eq!(session.request("garbage").unwrap(), UNKNOWN_REQUEST);

    let time = session.time().unwrap();
    let hms = time.split('.').next().unwrap();
    assert_eq!(hms.len(), 8, "unexpected time reply: {time}");
    assert_eq!(hms.matches(':').count(), 2, "unexpected time reply: {time}");

    assert_eq!(session.quit().unwrap(), FAREWELL);
    assert_eq!(session.read_line().unwrap(), None);
}

#[test]
fn serve_handles_several_clients_at_once() {
    let server = spawn_server(&[]);

    let mut sessions: Vec<_> = (0..8)
        .map(|_| ClientSession::connect(server.addr).expect("connect should succeed"))
        .collect();

    for (id, session) in sessions.iter_mut().enumerate().rev() {
        let message = format!("client {id}");
        assert_eq!(session.echo(&message).unwrap(), message);
    }
}

#[test]
fn keep_open_on_quit_flag_keeps_session() {
    let server = spawn_server(&["--keep-open-on-quit"]);
    let mut session = ClientSession::connect(server.addr).expect("connect should succeed");

    assert_eq!(session.quit().unwrap(), FAREWELL);
    assert_eq!(session.echo("still here").unwrap(), "still here");
}

#[test]
fn max_line_flag_drops_oversized_requests() {
    let server = spawn_server(&["--max-line", "16"]);

    let mut big = ClientSession::connect(server.addr).expect("connect should succeed");
    assert!(big.request(&format!("echo {}", "x".repeat(64))).is_err());

    let mut small = ClientSession::connect(server.addr).expect("connect should succeed");
    assert_eq!(small.echo("fits").unwrap(), "fits");
}

#[test]
fn serve_bind_in_use_exits_with_transport_error() {
    let taken = TcpListener::bind("127.0.0.1:0").expect("probe bind should succeed");
    let addr = taken.local_addr().unwrap().to_string();

    let output = Command::new(env!("CARGO_BIN_EXE_timecho"))
        .args(["--log-level", "error", "serve", "--addr", &addr])
        .output()
        .expect("serve should run");

    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("bind failed"), "stderr: {stderr}");
}

#[test]
fn serve_rejects_bad_read_timeout() {
    let output = Command::new(env!("CARGO_BIN_EXE_timecho"))
        .args(["serve", "--addr", "127.0.0.1:0", "--read-timeout", "later"])
        .output()
        .expect("serve should run");

    assert_eq!(output.status.code(), Some(64));
}
