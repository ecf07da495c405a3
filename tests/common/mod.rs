#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::time::timeout;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_REQUEST_BYTES: usize = 64 * 1024;

pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub query: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is not valid JSON")
    }
}

/// Binds an ephemeral listener that answers exactly one request with
/// `response` and hands the parsed request back through the channel.
pub async fn serve_once(
    response: impl AsRef<[u8]>,
) -> (String, oneshot::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (tx, rx) = oneshot::channel();
    let response = response.as_ref().to_vec();

    tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            let req = match timeout(REQUEST_TIMEOUT, read_request(&mut stream)).await {
                Ok(req) => req,
                Err(_) => panic!("timed out reading request"),
            };
            let _ = tx.send(req);
            let _ = stream.write_all(&response).await;
        }
    });

    (format!("http://{}", addr), rx)
}

pub fn response_with_body(status: &str, headers: &[(&str, &str)], body: &str) -> String {
    let mut response = format!("HTTP/1.1 {status}\r\n");
    for (name, value) in headers {
        response.push_str(&format!("{name}: {value}\r\n"));
    }
    response.push_str(&format!("Content-Length: {}\r\n\r\n{}", body.len(), body));
    response
}

pub fn json_response(status: &str, body: &str) -> String {
    response_with_body(status, &[("Content-Type", "application/json")], body)
}

pub fn empty_response(status: &str) -> String {
    format!("HTTP/1.1 {status}\r\nContent-Length: 0\r\n\r\n")
}

pub fn created_response(location: &str) -> String {
    format!("HTTP/1.1 201 Created\r\nLocation: {location}\r\nContent-Length: 0\r\n\r\n")
}

async fn read_request(stream: &mut TcpStream) -> CapturedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    // Headers first.
    let header_end = loop {
        let read = stream.read(&mut chunk).await.expect("read request");
        if read == 0 {
            panic!("connection closed before headers were complete");
        }
        buf.extend_from_slice(&chunk[..read]);
        if buf.len() > MAX_REQUEST_BYTES {
            panic!("request too large");
        }
        if let Some(pos) = find_header_end(&buf) {
            break pos;
        }
    };

    let header_str = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = header_str.split("\r\n");
    let request_line = lines.next().unwrap_or("");
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let full_path = parts.next().unwrap_or("");

    let (path, query_str) = match full_path.split_once('?') {
        Some((path, query)) => (path.to_string(), query),
        None => (full_path.to_string(), ""),
    };
    let mut query = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(query_str.as_bytes()) {
        query.insert(key.to_string(), value.to_string());
    }

    let mut headers = Vec::new();
    let mut content_length: usize = 0;
    for line in lines {
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("Content-Length") {
                content_length = value.parse().unwrap_or(0);
            }
            headers.push((name.to_string(), value.to_string()));
        }
    }
    if content_length > MAX_REQUEST_BYTES {
        panic!("request body too large: {content_length} bytes");
    }

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let read = stream.read(&mut chunk).await.expect("read request body");
        if read == 0 {
            panic!(
                "connection closed mid-body: expected {content_length} bytes, got {}",
                body.len()
            );
        }
        body.extend_from_slice(&chunk[..read]);
    }
    body.truncate(content_length);

    CapturedRequest {
        method,
        path,
        headers,
        query,
        body,
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|window| window == b"\r\n\r\n")
        .map(|pos| pos + 4)
}
