//! Minimal HTTP/1.1 server that imitates the CDN version redirect.
//!
//! Any request whose path differs from `redirect_to` is answered with a 302
//! pointing there; requests for `redirect_to` itself get `final_status`.
//! Every request is counted so tests can assert how often the network was hit.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[derive(Debug, Clone)]
pub struct RedirectServerOptions {
    /// Path to redirect to, e.g. "/1/xyz/tinymce/6.1.2/plugins.min.js".
    /// `None` answers every request directly with `final_status`.
    pub redirect_to: Option<String>,
    /// Status of the terminal response.
    pub final_status: u16,
}

impl Default for RedirectServerOptions {
    fn default() -> Self {
        Self {
            redirect_to: None,
            final_status: 200,
        }
    }
}

pub struct RedirectServer {
    /// e.g. "http://127.0.0.1:12345"
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl RedirectServer {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Starts the server on a background thread; it runs until the process exits.
pub fn start(opts: RedirectServerOptions) -> RedirectServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let base_url = format!("http://127.0.0.1:{}", port);
    let hits = Arc::new(AtomicUsize::new(0));
    let server_hits = Arc::clone(&hits);
    let origin = base_url.clone();
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            server_hits.fetch_add(1, Ordering::SeqCst);
            let opts = opts.clone();
            let origin = origin.clone();
            thread::spawn(move || handle(stream, &origin, &opts));
        }
    });
    RedirectServer { base_url, hits }
}

/// Returns a base URL nothing is listening on.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn handle(mut stream: std::net::TcpStream, origin: &str, opts: &RedirectServerOptions) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
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
    let path = request_path(request);

    let response = match &opts.redirect_to {
        Some(target) if path != target.as_str() => format!(
            "HTTP/1.1 302 Found\r\nLocation: {}{}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            origin, target
        ),
        _ => format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/javascript\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            opts.final_status,
            reason(opts.final_status)
        ),
    };
    let _ = stream.write_all(response.as_bytes());
}

/// Path from the request line ("GET /path HTTP/1.1").
fn request_path(request: &str) -> &str {
    request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
