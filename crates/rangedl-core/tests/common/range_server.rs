//! Minimal HTTP/1.1 server that supports HEAD and Range GET for integration tests.
//!
//! Serves a single static body, one request per connection. Knobs let tests
//! hide range support, lie about the size, ignore `Range`, fail or truncate a
//! chosen segment, and count the requests it received.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// What the HEAD response says about the size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthHeader {
    Actual,
    Omit,
    Zero,
}

#[derive(Debug, Clone, Copy)]
pub struct RangeServerOptions {
    /// If false, omit `Accept-Ranges: bytes`.
    pub advertise_ranges: bool,
    /// If false, GET ignores Range and always returns 200 with the full body.
    pub honor_ranges: bool,
    pub head_length: LengthHeader,
    /// GETs whose range starts here get `500 Internal Server Error`.
    pub fail_range_start: Option<u64>,
    /// GETs whose range starts here get half the slice, with a matching
    /// Content-Length, so the transport sees a clean response.
    pub truncate_range_start: Option<u64>,
}

impl Default for RangeServerOptions {
    fn default() -> Self {
        Self {
            advertise_ranges: true,
            honor_ranges: true,
            head_length: LengthHeader::Actual,
            fail_range_start: None,
            truncate_range_start: None,
        }
    }
}

pub struct RangeServer {
    pub url: String,
    heads: Arc<AtomicUsize>,
    gets: Arc<AtomicUsize>,
}

impl RangeServer {
    pub fn head_requests(&self) -> usize {
        self.heads.load(Ordering::SeqCst)
    }

    pub fn get_requests(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

/// Starts a server in a background thread serving `body`. Runs until the process exits.
pub fn start(body: Vec<u8>) -> RangeServer {
    start_with_options(body, RangeServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: RangeServerOptions) -> RangeServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let heads = Arc::new(AtomicUsize::new(0));
    let gets = Arc::new(AtomicUsize::new(0));
    {
        let heads = Arc::clone(&heads);
        let gets = Arc::clone(&gets);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let body = Arc::clone(&body);
                let heads = Arc::clone(&heads);
                let gets = Arc::clone(&gets);
                thread::spawn(move || handle(stream, &body, opts, &heads, &gets));
            }
        });
    }
    RangeServer {
        url: format!("http://127.0.0.1:{}/data.bin", port),
        heads,
        gets,
    }
}

/// A URL nobody listens on.
pub fn closed_port_url() -> String {
    let port = {
        let l = TcpListener::bind("127.0.0.1:0").expect("bind");
        l.local_addr().unwrap().port()
    };
    format!("http://127.0.0.1:{}/data.bin", port)
}

/// Deterministic test payload.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 251) as u8).collect()
}

fn read_request(stream: &mut TcpStream) -> Option<String> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    while !data.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut buf) {
            Ok(0) | Err(_) => return None,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
        if data.len() > 64 * 1024 {
            return None;
        }
    }
    String::from_utf8(data).ok()
}

fn handle(
    mut stream: TcpStream,
    body: &[u8],
    opts: RangeServerOptions,
    heads: &AtomicUsize,
    gets: &AtomicUsize,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let Some(request) = read_request(&mut stream) else {
        return;
    };
    let (method, range) = parse_request(&request);
    let total = body.len() as u64;
    let accept_ranges = if opts.advertise_ranges {
        "Accept-Ranges: bytes\r\n"
    } else {
        ""
    };

    if method.eq_ignore_ascii_case("HEAD") {
        heads.fetch_add(1, Ordering::SeqCst);
        let length = match opts.head_length {
            LengthHeader::Actual => format!("Content-Length: {}\r\n", total),
            LengthHeader::Zero => "Content-Length: 0\r\n".to_string(),
            LengthHeader::Omit => String::new(),
        };
        let response = format!(
            "HTTP/1.1 200 OK\r\n{}{}Connection: close\r\n\r\n",
            length, accept_ranges
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
        return;
    }
    gets.fetch_add(1, Ordering::SeqCst);

    let requested = range.filter(|_| opts.honor_ranges);
    if let Some((start, _)) = requested {
        if opts.fail_range_start == Some(start) {
            let _ = stream.write_all(
                b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
            return;
        }
    }

    let (status, slice) = match requested {
        Some((start, end_incl)) => {
            let end_incl = end_incl.min(total.saturating_sub(1));
            if start > end_incl {
                let response = format!(
                    "HTTP/1.1 416 Range Not Satisfiable\r\nContent-Range: bytes */{}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                    total
                );
                let _ = stream.write_all(response.as_bytes());
                return;
            }
            let slice = &body[start as usize..=end_incl as usize];
            if opts.truncate_range_start == Some(start) {
                ("206 Partial Content", &slice[..slice.len() / 2])
            } else {
                ("206 Partial Content", slice)
            }
        }
        None => ("200 OK", body),
    };

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
        status,
        slice.len(),
        accept_ranges
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.write_all(slice);
}

/// Returns (method, optional (start, end_inclusive) for `Range: bytes=X-Y`).
fn parse_request(request: &str) -> (&str, Option<(u64, u64)>) {
    let mut lines = request.lines();
    let method = lines
        .next()
        .and_then(|l| l.split_whitespace().next())
        .unwrap_or("");
    let mut range = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if !name.trim().eq_ignore_ascii_case("range") {
            continue;
        }
        if let Some(spec) = value.trim().strip_prefix("bytes=") {
            if let Some((a, b)) = spec.split_once('-') {
                let start = a.trim().parse::<u64>().unwrap_or(0);
                let end = b.trim().parse::<u64>().unwrap_or(u64::MAX);
                range = Some((start, end));
            }
        }
    }
    (method, range)
}
