//! Embedded HTTP server for Prometheus scraping and admin kill requests.
//!
//! Request routing lives in [`handle_request`], which does no I/O. The
//! tokio listener behind the `server` feature only parses the request line,
//! headers and body and writes the reply back.

use super::SharedMetrics;
use serde::Deserialize;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Admin kills held for the game at most; older ones are dropped first.
pub const MAX_PENDING_KILLS: usize = 64;

/// An admin asking for a monster to be killed, queued until the game drains it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdminKillRequest {
    #[serde(rename = "monsterID")]
    pub monster_id: i32,
    #[serde(rename = "monsterName")]
    pub monster_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct AdminKillQueue {
    inner: Arc<Mutex<VecDeque<AdminKillRequest>>>,
}

impl AdminKillQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<AdminKillRequest>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, request: AdminKillRequest) {
        let mut queue = self.lock();
        if queue.len() >= MAX_PENDING_KILLS {
            if let Some(dropped) = queue.pop_front() {
                log::warn!(
                    "Admin kill queue full, dropping kill of {} ({})",
                    dropped.monster_name,
                    dropped.monster_id
                );
            }
        }
        queue.push_back(request);
    }

    /// Take every pending request, oldest first.
    pub fn drain(&self) -> Vec<AdminKillRequest> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpReply {
    fn new(status: u16, content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    fn json(status: u16, body: serde_json::Value) -> Self {
        Self::new(status, "application/json", body.to_string())
    }

    pub fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Internal Server Error",
        }
    }

    /// Full HTTP/1.1 response, connection closed after.
    pub fn to_http(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status,
            self.reason(),
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

/// Route one request.
pub fn handle_request(
    method: &str,
    path: &str,
    body: &[u8],
    metrics: &SharedMetrics,
    admin_kills: &AdminKillQueue,
) -> HttpReply {
    let path = path.split('?').next().unwrap_or(path);
    match (method, path) {
        ("GET", "/metrics") => {
            HttpReply::new(200, PROMETHEUS_CONTENT_TYPE, metrics.render_prometheus())
        }
        ("POST", "/monsters/admin-kill") => {
            match serde_json::from_slice::<AdminKillRequest>(body) {
                Ok(request) => {
                    log::info!(
                        "Admin kill requested for monster {} ({})",
                        request.monster_id,
                        request.monster_name
                    );
                    let reply = json!({
                        "status": "success",
                        "monsterID": request.monster_id,
                        "monsterName": request.monster_name,
                    });
                    admin_kills.push(request);
                    HttpReply::json(200, reply)
                }
                Err(e) => {
                    log::warn!("Rejected admin kill body: {}", e);
                    HttpReply::json(400, json!({"error": "Invalid JSON payload"}))
                }
            }
        }
        _ => HttpReply::new(404, "text/plain", "Not Found"),
    }
}

#[cfg(feature = "server")]
mod listener {
    use super::{handle_request, AdminKillQueue, SharedMetrics};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::{TcpListener, TcpStream};

    /// Bodies larger than this are truncated; admin kill payloads are tiny.
    const MAX_BODY: usize = 64 * 1024;

    struct ServerState {
        metrics: SharedMetrics,
        admin_kills: AdminKillQueue,
    }

    /// Serve until the listener fails.
    pub async fn start_metrics_server(
        listener: TcpListener,
        metrics: SharedMetrics,
        admin_kills: AdminKillQueue,
    ) -> std::io::Result<()> {
        let state = Arc::new(ServerState {
            metrics,
            admin_kills,
        });
        log::info!("Metrics server listening on {}", listener.local_addr()?);

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &state).await {
                            log::debug!("Connection error from {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    log::warn!("Accept error: {}", e);
                }
            }
        }
    }

    /// Bind `port` on all interfaces and serve from a dedicated thread with
    /// its own runtime. Bind errors are returned before the thread starts.
    pub fn spawn_metrics_server(
        port: u16,
        metrics: SharedMetrics,
        admin_kills: AdminKillQueue,
    ) -> std::io::Result<(SocketAddr, std::thread::JoinHandle<()>)> {
        let std_listener = std::net::TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port)))?;
        std_listener.set_nonblocking(true)?;
        let addr = std_listener.local_addr()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let handle = std::thread::Builder::new()
            .name("metrics-server".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    let result = match TcpListener::from_std(std_listener) {
                        Ok(listener) => start_metrics_server(listener, metrics, admin_kills).await,
                        Err(e) => Err(e),
                    };
                    if let Err(e) = result {
                        log::error!("Metrics server stopped: {}", e);
                    }
                });
            })?;
        Ok((addr, handle))
    }

    async fn handle_connection(stream: TcpStream, state: &ServerState) -> std::io::Result<()> {
        let mut reader = BufReader::new(stream);

        let mut request_line = String::new();
        reader.read_line(&mut request_line).await?;
        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap_or_default().to_string();
        let path = parts.next().unwrap_or_default().to_string();

        let mut content_length = 0usize;
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
                if name.trim().eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
        }

        let mut body = vec![0u8; content_length.min(MAX_BODY)];
        reader.read_exact(&mut body).await?;

        let reply = handle_request(&method, &path, &body, &state.metrics, &state.admin_kills);
        let mut stream = reader.into_inner();
        stream.write_all(reply.to_http().as_bytes()).await?;
        stream.shutdown().await?;
        Ok(())
    }
}

#[cfg(feature = "server")]
pub use listener::{spawn_metrics_server, start_metrics_server};

#[cfg(test)]
mod tests {
    use super::*;

    fn route(method: &str, path: &str, body: &str) -> (HttpReply, AdminKillQueue) {
        let metrics = SharedMetrics::new();
        let kills = AdminKillQueue::new();
        let reply = handle_request(method, path, body.as_bytes(), &metrics, &kills);
        (reply, kills)
    }

    #[test]
    fn test_get_metrics_returns_prometheus_text() {
        let (reply, _) = route("GET", "/metrics", "");
        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, PROMETHEUS_CONTENT_TYPE);
        assert!(reply.body.contains("# TYPE brogue_depth_level gauge"));
    }

    #[test]
    fn test_query_string_is_ignored() {
        let (reply, _) = route("GET", "/metrics?x=1", "");
        assert_eq!(reply.status, 200);
    }

    #[test]
    fn test_admin_kill_is_queued_and_echoed() {
        let (reply, kills) = route(
            "POST",
            "/monsters/admin-kill",
            r#"{"monsterID": 17, "monsterName": "goblin"}"#,
        );
        assert_eq!(reply.status, 200);
        let body: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(
            body,
            json!({"status": "success", "monsterID": 17, "monsterName": "goblin"})
        );
        assert_eq!(
            kills.drain(),
            vec![AdminKillRequest {
                monster_id: 17,
                monster_name: "goblin".to_string()
            }]
        );
        assert!(kills.is_empty());
    }

    #[test]
    fn test_kill_queue_keeps_only_the_newest() {
        let kills = AdminKillQueue::new();
        for id in 0..(MAX_PENDING_KILLS as i32 + 10) {
            kills.push(AdminKillRequest {
                monster_id: id,
                monster_name: "rat".to_string(),
            });
        }

        assert_eq!(kills.len(), MAX_PENDING_KILLS);
        let drained = kills.drain();
        assert_eq!(drained[0].monster_id, 10);
        assert_eq!(drained.last().map(|r| r.monster_id), Some(MAX_PENDING_KILLS as i32 + 9));
    }

    #[test]
    fn test_admin_kill_rejects_bad_json() {
        let (reply, kills) = route("POST", "/monsters/admin-kill", "{\"monsterID\": \"x\"}");
        assert_eq!(reply.status, 400);
        assert_eq!(reply.body, r#"{"error":"Invalid JSON payload"}"#);
        assert_eq!(kills.len(), 0);
    }

    #[test]
    fn test_unknown_routes_are_404() {
        assert_eq!(route("GET", "/", "").0.status, 404);
        assert_eq!(route("POST", "/metrics", "").0.status, 404);
        assert_eq!(route("GET", "/monsters/admin-kill", "").0.status, 404);
    }

    #[test]
    fn test_http_response_framing() {
        let reply = HttpReply::new(404, "text/plain", "Not Found");
        let text = reply.to_http();
        assert!(text.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(text.contains("Content-Length: 9\r\n"));
        assert!(text.ends_with("\r\n\r\nNot Found"));
    }

    #[cfg(feature = "server")]
    #[test]
    fn test_server_answers_over_tcp() {
        use std::io::{Read, Write};

        let metrics = SharedMetrics::new();
        metrics.record_posts(4, 0);
        let (addr, _handle) = spawn_metrics_server(0, metrics, AdminKillQueue::new()).unwrap();

        let mut stream = std::net::TcpStream::connect(("127.0.0.1", addr.port())).unwrap();
        stream
            .write_all(b"GET /metrics HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).unwrap();

        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("brogue_portal_posts_total 4"));
    }
}
