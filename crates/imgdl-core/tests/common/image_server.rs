//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves HEAD and GET for a fixed set of routes. Each route has a status,
//! an optional Content-Type, a body, an optional redirect target and an
//! optional delay before HEAD responses, and an optional pause partway
//! through a GET body. Every request is counted per
//! method and path. Connections are closed after one response.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub location: Option<String>,
    /// Sleep before answering HEAD; used to provoke client timeouts.
    pub head_delay: Option<Duration>,
    /// Status for GET when it differs from HEAD.
    pub get_status: Option<u16>,
    /// After this many GET body bytes, sleep for the duration before sending the rest.
    pub body_stall: Option<(usize, Duration)>,
}

impl Route {
    pub fn image(content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: Some(content_type.to_string()),
            body,
            location: None,
            head_delay: None,
            get_status: None,
            body_stall: None,
        }
    }

    pub fn page(content_type: &str, body: &str) -> Self {
        Self::image(content_type, body.as_bytes().to_vec())
    }

    pub fn redirect(to: &str) -> Self {
        Self {
            status: 302,
            content_type: None,
            body: Vec::new(),
            location: Some(to.to_string()),
            head_delay: None,
            get_status: None,
            body_stall: None,
        }
    }

    pub fn with_head_delay(mut self, delay: Duration) -> Self {
        self.head_delay = Some(delay);
        self
    }

    /// Send headers and the first `after` body bytes, then go quiet for `pause`.
    pub fn with_body_stall(mut self, after: usize, pause: Duration) -> Self {
        self.body_stall = Some((after, pause));
        self
    }

    pub fn with_get_status(mut self, status: u16) -> Self {
        self.get_status = Some(status);
        self
    }
}

/// Running server. It stays up until the process exits.
pub struct ImageServer {
    base: String,
    hits: Arc<Mutex<HashMap<(String, String), usize>>>,
}

impl ImageServer {
    /// Absolute URL for `path` (which must start with `/`).
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Number of `method` requests received for `path`.
    pub fn hits(&self, method: &str, path: &str) -> usize {
        self.hits
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

/// Starts a server in a background thread serving `routes` (path -> route).
/// Unknown paths get 404.
pub fn start(routes: Vec<(&str, Route)>) -> ImageServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(p, r)| (p.to_string(), r))
            .collect(),
    );
    let hits = Arc::new(Mutex::new(HashMap::new()));
    let server_hits = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&server_hits);
            thread::spawn(move || handle(stream, &routes, &hits));
        }
    });
    ImageServer {
        base: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

fn handle(
    mut stream: TcpStream,
    routes: &HashMap<String, Route>,
    hits: &Mutex<HashMap<(String, String), usize>>,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, target) = parse_request_line(request);
    let path = target.split('?').next().unwrap_or("").to_string();
    *hits
        .lock()
        .unwrap()
        .entry((method.to_ascii_uppercase(), path.clone()))
        .or_insert(0) += 1;

    let is_head = method.eq_ignore_ascii_case("HEAD");
    if !is_head && !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nConnection: close\r\n\r\n");
        return;
    }

    let Some(route) = routes.get(&path) else {
        let _ = stream.write_all(
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        return;
    };

    if is_head {
        if let Some(delay) = route.head_delay {
            thread::sleep(delay);
        }
    }

    let status = if is_head {
        route.status
    } else {
        route.get_status.unwrap_or(route.status)
    };
    let body: &[u8] = if status == route.status { &route.body } else { b"" };

    let mut head = format!("HTTP/1.1 {} {}\r\n", status, reason(status));
    if let Some(ct) = &route.content_type {
        head.push_str(&format!("Content-Type: {}\r\n", ct));
    }
    if let Some(location) = &route.location {
        head.push_str(&format!("Location: {}\r\n", location));
    }
    head.push_str(&format!("Content-Length: {}\r\nConnection: close\r\n\r\n", body.len()));
    let _ = stream.write_all(head.as_bytes());
    if is_head {
        return;
    }
    match route.body_stall {
        Some((after, pause)) => {
            let (first, rest) = body.split_at(after.min(body.len()));
            if stream.write_all(first).is_err() {
                return;
            }
            let _ = stream.flush();
            thread::sleep(pause);
            let _ = stream.write_all(rest);
        }
        None => {
            let _ = stream.write_all(body);
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Returns (method, request target) from the first request line.
fn parse_request_line(request: &str) -> (&str, &str) {
    let line = request.lines().next().unwrap_or("");
    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or("");
    let target = parts.next().unwrap_or("");
    (method, target)
}
