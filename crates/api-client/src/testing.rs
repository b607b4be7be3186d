//! Scripted HTTP stub of the inventory API for integration tests.
//!
//! Listens on an ephemeral localhost port, answers each request from a
//! route table keyed by method and path, and records what it received.
//! One request per connection (`Connection: close`).

use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Path prefix every stubbed route lives under.
pub const API_PREFIX: &str = "/api";

/// Canned response for one route.
#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
    pub delay: Option<Duration>,
}

impl StubResponse {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A request as seen by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path relative to [`API_PREFIX`], without query string.
    pub path: String,
    /// Header names lowercased.
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn json_body(&self) -> Option<serde_json::Value> {
        serde_json::from_str(&self.body).ok()
    }
}

#[derive(Default)]
struct StubState {
    routes: Mutex<HashMap<(String, String), StubResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Running stub server. Stops when dropped.
pub struct StubServer {
    addr: SocketAddr,
    state: Arc<StubState>,
    handle: JoinHandle<()>,
}

impl StubServer {
    /// Bind to `127.0.0.1:0` and start serving.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(StubState::default());

        let handle = tokio::spawn({
            let state = state.clone();
            async move {
                loop {
                    match listener.accept().await {
                        Ok((socket, _)) => {
                            let state = state.clone();
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(socket, state).await {
                                    error!("Stub connection error: {}", e);
                                }
                            });
                        }
                        Err(e) => {
                            error!("Stub accept error: {}", e);
                            break;
                        }
                    }
                }
            }
        });

        debug!(%addr, "Stub API server listening");
        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// Base address to hand to the client, e.g. `http://127.0.0.1:5555/api`.
    pub fn base_url(&self) -> String {
        format!("http://{}{}", self.addr, API_PREFIX)
    }

    /// Answer `method path` with `response` from now on.
    pub fn respond(&self, method: &str, path: &str, response: StubResponse) {
        self.state
            .routes
            .lock()
            .insert((method.to_ascii_uppercase(), normalize(path)), response);
    }

    /// Shorthand for a JSON response.
    pub fn respond_json(&self, method: &str, path: &str, status: u16, body: serde_json::Value) {
        self.respond(method, path, StubResponse::json(status, body));
    }

    /// All requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().clone()
    }

    /// Requests received for one route.
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        let method = method.to_ascii_uppercase();
        let path = normalize(path);
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn normalize(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

async fn handle_connection(socket: TcpStream, state: Arc<StubState>) -> std::io::Result<()> {
    let (read_half, mut write_half) = socket.into_split();
    let mut reader = BufReader::new(read_half);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await? == 0 {
        return Ok(());
    }

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default();
    let target_path = target.split_once('?').map(|(p, _)| p).unwrap_or(target);
    let path = normalize(target_path.strip_prefix(API_PREFIX).unwrap_or(target_path));

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).await?;

    let response = state
        .routes
        .lock()
        .get(&(method.clone(), path.clone()))
        .cloned()
        .unwrap_or_else(|| StubResponse::json(404, serde_json::json!({ "message": "Not found" })));

    state.requests.lock().push(RecordedRequest {
        method,
        path,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    });

    if let Some(delay) = response.delay {
        tokio::time::sleep(delay).await;
    }

    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        reason_phrase(response.status),
        response.body.len()
    );
    write_half.write_all(head.as_bytes()).await?;
    write_half.write_all(response.body.as_bytes()).await?;
    write_half.flush().await?;
    Ok(())
}
