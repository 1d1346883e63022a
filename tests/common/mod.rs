//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chat_completion_client::{RawResponse, Result, Transport};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Transport returning a canned reply and remembering what it was sent.
#[derive(Clone)]
pub struct MockTransport {
    status: u16,
    body: Vec<u8>,
    pub calls: Arc<Mutex<Vec<RecordedCall>>>,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub api_key: String,
    pub body: Vec<u8>,
}

impl MockTransport {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self::with_bytes(status, body.into().into_bytes())
    }

    pub fn with_bytes(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            body,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn last_body_json(&self) -> serde_json::Value {
        let calls = self.calls.lock().unwrap();
        serde_json::from_slice(&calls.last().expect("no calls recorded").body).unwrap()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_json(&self, url: &str, api_key: &str, body: Vec<u8>) -> Result<RawResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            url: url.to_string(),
            api_key: api_key.to_string(),
            body,
        });
        Ok(RawResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

/// Shared in-memory sink for the debug side channel.
#[derive(Clone, Default)]
pub struct CapturedOutput(pub Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn completion_body(contents: &[&str]) -> String {
    let choices: Vec<serde_json::Value> = contents
        .iter()
        .enumerate()
        .map(|(index, content)| {
            serde_json::json!({
                "index": index,
                "message": { "role": "assistant", "content": content }
            })
        })
        .collect();

    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "choices": choices,
    })
    .to_string()
}

/// Raw HTTP request as seen by [`serve_once`].
#[derive(Debug)]
pub struct CapturedRequest {
    pub head: String,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<String> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim().to_string())
        })
    }

    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }
}

/// Accepts one connection, answers it with `status` and `body`, and hands
/// back what the client sent. Returns the base URL to point a client at.
pub async fn serve_once(status: u16, body: String) -> (String, oneshot::Receiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        let _ = tx.send(request);
    });

    (format!("http://{}", addr), rx)
}

/// Accepts connections and never answers them.
pub async fn serve_silence() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{}", addr)
}

/// Base URL of a port nothing is listening on.
pub async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> CapturedRequest {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "connection closed before headers were complete");
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let length = head
        .lines()
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    let mut body = buf[head_end + 4..].to_vec();
    while body.len() < length {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    CapturedRequest { head, body }
}
