//! Minimal HTTP/1.1 server that replays a script of responses for integration tests.
//!
//! Each accepted connection consumes the next step of the script; once the
//! script is exhausted the last step repeats. Every request line is recorded
//! so tests can count attempts.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub enum Step {
    /// Respond with this status and JSON body.
    Reply(u16, String),
    /// Hold the connection open without answering for this long.
    Stall(Duration),
    /// Stay silent for this long, then reply.
    Late(Duration, u16, String),
}

pub fn reply(status: u16, body: &str) -> Step {
    Step::Reply(status, body.to_string())
}

#[derive(Debug, Clone)]
pub struct Seen {
    pub request_line: String,
    pub at: Instant,
}

pub struct ScriptedServer {
    pub base_url: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl ScriptedServer {
    pub fn requests(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn hits(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

/// Starts a server in a background thread. The server runs until the process exits.
pub fn start(script: Vec<Step>) -> ScriptedServer {
    assert!(!script.is_empty(), "script needs at least one step");
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_srv = Arc::clone(&seen);
    thread::spawn(move || {
        let mut next = 0usize;
        for stream in listener.incoming().flatten() {
            let step = script[next.min(script.len() - 1)].clone();
            next += 1;
            let seen = Arc::clone(&seen_srv);
            thread::spawn(move || handle(stream, step, &seen));
        }
    });
    ScriptedServer {
        base_url: format!("http://127.0.0.1:{}", port),
        seen,
    }
}

fn handle(mut stream: std::net::TcpStream, step: Step, seen: &Mutex<Vec<Seen>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]);
    let request_line = request.lines().next().unwrap_or("").to_string();
    seen.lock().unwrap().push(Seen {
        request_line,
        at: Instant::now(),
    });
    match step {
        Step::Reply(status, body) => respond(&mut stream, status, &body),
        Step::Stall(d) => thread::sleep(d),
        Step::Late(d, status, body) => {
            thread::sleep(d);
            respond(&mut stream, status, &body);
        }
    }
}

fn respond(stream: &mut std::net::TcpStream, status: u16, body: &str) {
    let response = format!(
        "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}
