//! One-shot HTTP/1.1 server for integration tests.
//!
//! Answers every request with the same canned reply and records the request
//! head (request line plus headers) so tests can inspect what was sent.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Reply {
    pub status: &'static str,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// Send the body `n` bytes at a time, sleeping before each piece.
    pub pace: Option<(usize, Duration)>,
}

impl Reply {
    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            status: "200 OK",
            content_type: "application/octet-stream",
            body,
            pace: None,
        }
    }

    pub fn paced(body: Vec<u8>, step: usize, delay: Duration) -> Self {
        Self {
            pace: Some((step, delay)),
            ..Self::ok(body)
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: "404 Not Found",
            content_type: "text/plain",
            body: b"no such tree".to_vec(),
            pace: None,
        }
    }
}

pub struct TestServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    /// Request heads received so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Starts serving `reply` in a background thread until the process exits.
pub fn start(reply: Reply) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);
    let reply = Arc::new(reply);

    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let seen = Arc::clone(&seen);
            let reply = Arc::clone(&reply);
            thread::spawn(move || handle(stream, &reply, &seen));
        }
    });

    TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        requests,
    }
}

/// URL of a local port nobody listens on.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/export", port)
}

fn handle(mut stream: TcpStream, reply: &Reply, seen: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(10)));

    let mut head = Vec::new();
    let mut buf = [0u8; 4096];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    seen.lock()
        .unwrap()
        .push(String::from_utf8_lossy(&head).into_owned());

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        reply.status,
        reply.content_type,
        reply.body.len()
    );
    let _ = stream.write_all(response.as_bytes());

    match reply.pace {
        None => {
            let _ = stream.write_all(&reply.body);
        }
        Some((step, delay)) => {
            let _ = stream.set_nodelay(true);
            for piece in reply.body.chunks(step) {
                thread::sleep(delay);
                if stream.write_all(piece).is_err() {
                    return;
                }
            }
        }
    }
}
