//! Minimal HTTP/1.1 server with canned per-path responses for integration tests.
//!
//! Routes are matched on the full request target (path plus query). Unknown
//! targets get 404. Every request target is recorded in arrival order so tests
//! can assert on request sequencing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Reply {
    /// Status code, content type and body.
    Body(u16, &'static str, Vec<u8>),
    /// Close the connection without sending anything (curl: empty reply).
    Drop,
}

impl Reply {
    pub fn json(value: serde_json::Value) -> Self {
        Reply::Body(200, "application/json", value.to_string().into_bytes())
    }

    pub fn text(status: u16, body: &str) -> Self {
        Reply::Body(status, "text/plain", body.as_bytes().to_vec())
    }

    pub fn image(bytes: Vec<u8>) -> Self {
        Reply::Body(200, "image/jpeg", bytes)
    }
}

#[derive(Clone)]
pub struct CatalogServer {
    base: String,
    routes: Arc<Mutex<HashMap<String, Reply>>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl CatalogServer {
    /// Starts a server in a background thread. It runs until the process exits.
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let server = CatalogServer {
            base: format!("http://127.0.0.1:{}/", port),
            routes: Arc::new(Mutex::new(HashMap::new())),
            log: Arc::new(Mutex::new(Vec::new())),
        };
        let routes = Arc::clone(&server.routes);
        let log = Arc::clone(&server.log);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&routes);
                let log = Arc::clone(&log);
                thread::spawn(move || handle(stream, &routes, &log));
            }
        });
        server
    }

    /// Base URL ending in `/`.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Absolute URL for a target such as `img/a.jpg`.
    pub fn url(&self, target: &str) -> String {
        format!("{}{}", self.base, target.trim_start_matches('/'))
    }

    /// Register a reply for a target (leading `/` optional).
    pub fn route(&self, target: &str, reply: Reply) {
        let key = format!("/{}", target.trim_start_matches('/'));
        self.routes.lock().unwrap().insert(key, reply);
    }

    /// Request targets in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

fn handle(
    mut stream: TcpStream,
    routes: &Mutex<HashMap<String, Reply>>,
    log: &Mutex<Vec<String>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let request = String::from_utf8_lossy(&buf);
    let target = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    log.lock().unwrap().push(target.clone());

    let reply = routes
        .lock()
        .unwrap()
        .get(&target)
        .cloned()
        .unwrap_or_else(|| Reply::text(404, "not found"));
    match reply {
        Reply::Drop => {}
        Reply::Body(status, content_type, body) => {
            let head = format!(
                "HTTP/1.1 {} X\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                content_type,
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
        }
    }
}
