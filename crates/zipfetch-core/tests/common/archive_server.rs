//! Minimal HTTP/1.1 archive server for integration tests.
//!
//! Serves registered paths with HEAD, plain GET and `Range: bytes=a-b` GET.
//! Each path can carry a script of replies consumed by successive full-body
//! GETs (errors, truncated bodies, missing Content-Length, slow bodies); once
//! the script is used up the path answers normally. Unknown paths are 404.

use std::collections::{HashMap, VecDeque};
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// How one full-body GET is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Ok,
    /// Status line only, no body.
    Status(u16),
    /// Declares the full Content-Length, sends half, then closes.
    Truncated,
    /// Full body without Content-Length; the connection close ends it.
    NoLength,
    /// Full body in 1 KiB chunks with a pause between chunks.
    Slow(Duration),
}

#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// If false, HEAD returns 405 (servers that block HEAD).
    pub head_allowed: bool,
    /// If false, HEAD omits Content-Length.
    pub head_reports_length: bool,
    /// Sleep before answering each full-body GET.
    pub latency: Duration,
    /// Sleep before answering each HEAD.
    pub head_latency: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            head_allowed: true,
            head_reports_length: true,
            latency: Duration::ZERO,
            head_latency: Duration::ZERO,
        }
    }
}

#[derive(Default)]
struct Route {
    body: Vec<u8>,
    script: VecDeque<Reply>,
    heads: usize,
    gets: usize,
    range_gets: usize,
}

struct State {
    opts: ServerOptions,
    routes: Mutex<HashMap<String, Route>>,
    active_gets: AtomicUsize,
    peak_gets: AtomicUsize,
}

pub struct ArchiveServer {
    base: String,
    state: Arc<State>,
}

impl ArchiveServer {
    pub fn start() -> Self {
        Self::start_with_options(ServerOptions::default())
    }

    /// Binds an ephemeral port and serves in a background thread until the
    /// process exits.
    pub fn start_with_options(opts: ServerOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(State {
            opts,
            routes: Mutex::new(HashMap::new()),
            active_gets: AtomicUsize::new(0),
            peak_gets: AtomicUsize::new(0),
        });
        let accept_state = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&accept_state);
                thread::spawn(move || handle(stream, &state));
            }
        });
        Self {
            base: format!("http://127.0.0.1:{}", port),
            state,
        }
    }

    /// Registers `path` (e.g. "/a.zip") with `body`.
    pub fn add(&self, path: &str, body: Vec<u8>) {
        self.state.routes.lock().unwrap().insert(
            path.to_string(),
            Route {
                body,
                ..Route::default()
            },
        );
    }

    /// Queues replies for the next full-body GETs of `path`.
    pub fn script(&self, path: &str, replies: &[Reply]) {
        let mut routes = self.state.routes.lock().unwrap();
        let route = routes.get_mut(path).expect("script on unregistered path");
        route.script.extend(replies.iter().copied());
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn heads(&self, path: &str) -> usize {
        self.counter(path, |r| r.heads)
    }

    /// Full-body GETs (range probes excluded).
    pub fn gets(&self, path: &str) -> usize {
        self.counter(path, |r| r.gets)
    }

    pub fn range_gets(&self, path: &str) -> usize {
        self.counter(path, |r| r.range_gets)
    }

    pub fn total_gets(&self) -> usize {
        self.state.routes.lock().unwrap().values().map(|r| r.gets).sum()
    }

    /// Most full-body GETs the server handled at the same time.
    pub fn peak_concurrent_gets(&self) -> usize {
        self.state.peak_gets.load(Ordering::SeqCst)
    }

    fn counter(&self, path: &str, f: impl Fn(&Route) -> usize) -> usize {
        self.state.routes.lock().unwrap().get(path).map(f).unwrap_or(0)
    }
}

struct Request {
    method: String,
    path: String,
    range: Option<(u64, u64)>,
}

fn handle(mut stream: TcpStream, state: &State) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let Some(req) = read_request(&mut stream) else {
        return;
    };

    let method = req.method.to_ascii_uppercase();
    let (body, reply) = {
        let mut routes = state.routes.lock().unwrap();
        let Some(route) = routes.get_mut(&req.path) else {
            write_status(&mut stream, 404);
            return;
        };
        match (method.as_str(), req.range) {
            ("HEAD", _) => route.heads += 1,
            ("GET", Some(_)) => route.range_gets += 1,
            ("GET", None) => route.gets += 1,
            _ => {}
        }
        let reply = if method == "GET" && req.range.is_none() {
            route.script.pop_front().unwrap_or(Reply::Ok)
        } else {
            Reply::Ok
        };
        (route.body.clone(), reply)
    };

    match (method.as_str(), req.range) {
        ("HEAD", _) => {
            if !state.opts.head_latency.is_zero() {
                thread::sleep(state.opts.head_latency);
            }
            head(&mut stream, &body, state.opts)
        }
        ("GET", Some(range)) => range_get(&mut stream, &body, range),
        ("GET", None) => {
            let now = state.active_gets.fetch_add(1, Ordering::SeqCst) + 1;
            state.peak_gets.fetch_max(now, Ordering::SeqCst);
            if !state.opts.latency.is_zero() {
                thread::sleep(state.opts.latency);
            }
            full_get(&mut stream, &body, reply);
            state.active_gets.fetch_sub(1, Ordering::SeqCst);
        }
        _ => write_status(&mut stream, 405),
    }
}

fn head(stream: &mut TcpStream, body: &[u8], opts: ServerOptions) {
    if !opts.head_allowed {
        write_status(stream, 405);
        return;
    }
    let length = if opts.head_reports_length {
        format!("Content-Length: {}\r\n", body.len())
    } else {
        String::new()
    };
    let response = format!("HTTP/1.1 200 OK\r\n{}Connection: close\r\n\r\n", length);
    let _ = stream.write_all(response.as_bytes());
}

fn range_get(stream: &mut TcpStream, body: &[u8], (start, end_incl): (u64, u64)) {
    let total = body.len() as u64;
    let end_incl = end_incl.min(total.saturating_sub(1));
    if total == 0 || start > end_incl {
        let response = format!(
            "HTTP/1.1 416 Range Not Satisfiable\r\nContent-Range: bytes */{}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            total
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }
    let slice = &body[start as usize..=end_incl as usize];
    let response = format!(
        "HTTP/1.1 206 Partial Content\r\nContent-Length: {}\r\nContent-Range: bytes {}-{}/{}\r\nConnection: close\r\n\r\n",
        slice.len(),
        start,
        end_incl,
        total
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(slice);
}

fn full_get(stream: &mut TcpStream, body: &[u8], reply: Reply) {
    match reply {
        Reply::Ok => {
            write_head(stream, Some(body.len()));
            let _ = stream.write_all(body);
        }
        Reply::Status(code) => write_status(stream, code),
        Reply::Truncated => {
            write_head(stream, Some(body.len()));
            let _ = stream.write_all(&body[..body.len() / 2]);
            let _ = stream.flush();
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }
        Reply::NoLength => {
            write_head(stream, None);
            let _ = stream.write_all(body);
        }
        Reply::Slow(pause) => {
            write_head(stream, Some(body.len()));
            for chunk in body.chunks(1024) {
                if stream.write_all(chunk).is_err() || stream.flush().is_err() {
                    return;
                }
                thread::sleep(pause);
            }
        }
    }
}

fn write_head(stream: &mut TcpStream, length: Option<usize>) {
    let length = length
        .map(|n| format!("Content-Length: {}\r\n", n))
        .unwrap_or_default();
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/zip\r\n{}Connection: close\r\n\r\n",
        length
    );
    let _ = stream.write_all(response.as_bytes());
}

fn write_status(stream: &mut TcpStream, code: u16) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        code,
        reason(code)
    );
    let _ = stream.write_all(response.as_bytes());
}

fn reason(code: u16) -> &'static str {
    match code {
        404 => "Not Found",
        405 => "Method Not Allowed",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

fn read_request(stream: &mut TcpStream) -> Option<Request> {
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => return None,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        if buf.len() > 16 * 1024 {
            return None;
        }
    }
    parse_request(std::str::from_utf8(&buf).ok()?)
}

fn parse_request(request: &str) -> Option<Request> {
    let mut lines = request.lines();
    let mut first = lines.next()?.split_whitespace();
    let method = first.next()?.to_string();
    let path = first.next()?.to_string();
    let mut range = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("range") {
                range = parse_range(value.trim());
            }
        }
    }
    Some(Request {
        method,
        path,
        range,
    })
}

/// `bytes=a-b` or `bytes=a-`.
fn parse_range(value: &str) -> Option<(u64, u64)> {
    let spec = value.strip_prefix("bytes=")?;
    let (a, b) = spec.split_once('-')?;
    let start = a.trim().parse().ok()?;
    let end = match b.trim() {
        "" => u64::MAX,
        s => s.parse().ok()?,
    };
    Some((start, end))
}
