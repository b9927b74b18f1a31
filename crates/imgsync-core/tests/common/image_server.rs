//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed set of routes by exact request target (path plus query).
//! Unknown targets get 404.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Route {
    /// 200 with the given content type (omitted if `None`) and body.
    Ok {
        content_type: Option<&'static str>,
        body: Vec<u8>,
    },
    /// Bare status line with an empty body.
    Status(u16),
    /// 302 to another target on the same server.
    Redirect(&'static str),
    /// Sleeps before answering 200, to trigger client timeouts.
    Slow(Duration),
}

impl Route {
    pub fn image(content_type: &'static str, body: &[u8]) -> Self {
        Route::Ok {
            content_type: Some(content_type),
            body: body.to_vec(),
        }
    }
}

/// Starts a server in a background thread. Returns the base URL without a
/// trailing slash (e.g. "http://127.0.0.1:12345"). Runs until the process exits.
pub fn start(routes: Vec<(&'static str, Route)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<&'static str, Route>> = Arc::new(routes.into_iter().collect());
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            thread::spawn(move || handle(stream, &routes));
        }
    });
    format!("http://127.0.0.1:{}", port)
}

/// A base URL on which nothing listens.
pub fn unreachable_base() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn handle(mut stream: TcpStream, routes: &HashMap<&'static str, Route>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

    let mut request = Vec::new();
    let mut buf = [0u8; 4096];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }
    let request = String::from_utf8_lossy(&request);
    let target = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");

    match routes.get(target) {
        Some(Route::Ok { content_type, body }) => respond(&mut stream, "200 OK", *content_type, body),
        Some(Route::Status(code)) => {
            let status = format!("{} Status", code);
            respond(&mut stream, &status, None, b"");
        }
        Some(Route::Redirect(location)) => {
            let response = format!(
                "HTTP/1.1 302 Found\r\nLocation: {}\r\nContent-Type: text/html\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                location
            );
            let _ = stream.write_all(response.as_bytes());
        }
        Some(Route::Slow(delay)) => {
            thread::sleep(*delay);
            respond(&mut stream, "200 OK", Some("image/png"), b"late");
        }
        None => respond(&mut stream, "404 Not Found", Some("text/plain"), b"not found"),
    }
}

fn respond(stream: &mut TcpStream, status: &str, content_type: Option<&str>, body: &[u8]) {
    let content_type = content_type
        .map(|ct| format!("Content-Type: {}\r\n", ct))
        .unwrap_or_default();
    let head = format!(
        "HTTP/1.1 {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        content_type,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}
