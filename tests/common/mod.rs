//! In-process mock of the SecMon backend for integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

/// What the mock answers on each endpoint
pub struct MockData {
    pub events: Value,
    pub stats: Value,
    /// Force `/api/stats` to fail with this status
    pub stats_status: Option<StatusCode>,
    /// Serve a non-JSON body on `/api/events`
    pub events_garbage: bool,
    pub analysis: Vec<(u64, Value)>,
    pub tree: Value,
}

impl Default for MockData {
    fn default() -> Self {
        Self {
            events: json!([]),
            stats: json!({"total_events": 0, "high_severity": 0, "medium_severity": 0, "suspicious_processes": 0}),
            stats_status: None,
            events_garbage: false,
            analysis: Vec::new(),
            tree: json!({"nodes": [], "links": []}),
        }
    }
}

#[derive(Clone, Debug)]
pub enum FeedCommand {
    Send(String),
    /// Close every open feed connection
    Kick,
}

#[derive(Clone)]
pub struct MockBackend {
    pub addr: SocketAddr,
    pub data: Arc<Mutex<MockData>>,
    feed: broadcast::Sender<FeedCommand>,
    connections: Arc<Mutex<usize>>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (feed, _) = broadcast::channel(64);
        let backend = MockBackend {
            addr,
            data: Arc::new(Mutex::new(MockData::default())),
            feed,
            connections: Arc::new(Mutex::new(0)),
        };

        let app = Router::new()
            .route("/api/events", get(events))
            .route("/api/stats", get(stats))
            .route("/api/processes/tree", get(tree))
            .route("/api/analysis/:id", get(analysis))
            .route("/ws/feed", get(feed_ws))
            .with_state(backend.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        backend
    }

    pub fn api_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Total feed connections accepted so far
    pub fn connection_count(&self) -> usize {
        *self.connections.lock()
    }

    /// Number of feed connections currently listening
    pub fn listeners(&self) -> usize {
        self.feed.receiver_count()
    }

    pub fn push(&self, text: impl Into<String>) {
        let _ = self.feed.send(FeedCommand::Send(text.into()));
    }

    pub fn kick(&self) {
        let _ = self.feed.send(FeedCommand::Kick);
    }

    /// Wait until at least `n` feed connections have been accepted and one is listening
    pub async fn wait_for_connections(&self, n: usize) {
        for _ in 0..500 {
            if self.connection_count() >= n && self.listeners() > 0 {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("backend never saw {} feed connections", n);
    }
}

pub fn event_json(id: u64, ts: &str, severity: &str, pid: i64) -> Value {
    json!({
        "id": id,
        "timestamp": ts,
        "pid": pid,
        "parent_pid": 1,
        "process_name": format!("proc{}", pid),
        "severity": severity,
        "type": "PRIV_ESC",
        "details": format!("event {}", id),
    })
}

async fn events(State(backend): State<MockBackend>) -> Response {
    let data = backend.data.lock();
    if data.events_garbage {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }
    Json(data.events.clone()).into_response()
}

async fn stats(State(backend): State<MockBackend>) -> Response {
    let data = backend.data.lock();
    match data.stats_status {
        Some(status) => (status, "unavailable").into_response(),
        None => Json(data.stats.clone()).into_response(),
    }
}

async fn tree(State(backend): State<MockBackend>) -> Response {
    Json(backend.data.lock().tree.clone()).into_response()
}

async fn analysis(State(backend): State<MockBackend>, Path(id): Path<u64>) -> Response {
    let data = backend.data.lock();
    match data.analysis.iter().find(|(aid, _)| *aid == id) {
        Some((_, value)) => Json(value.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"error": "Event not found"}))).into_response(),
    }
}

async fn feed_ws(ws: WebSocketUpgrade, State(backend): State<MockBackend>) -> Response {
    ws.on_upgrade(move |socket| serve_feed(socket, backend))
}

async fn serve_feed(mut socket: WebSocket, backend: MockBackend) {
    let mut rx = backend.feed.subscribe();
    *backend.connections.lock() += 1;

    loop {
        tokio::select! {
            cmd = rx.recv() => match cmd {
                Ok(FeedCommand::Send(text)) => {
                    if socket.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Ok(FeedCommand::Kick) | Err(_) => {
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
            },
            msg = socket.recv() => match msg {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => {}
            },
        }
    }
}
