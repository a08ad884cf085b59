//! Shared fixtures for integration tests.
//!
//! - [`StubApi`]: a minimal HTTP/1.1 server standing in for the Web API
//! - [`MockConnector`]: transports driven directly from the test
//! - [`init_tracing`]: opt-in log output via `RUST_LOG`

#![allow(dead_code)]

use std::future::{self, Ready};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use url::Url;

use socket_mode_bot::{
    ConnectionId, Connector, Envelope, Error, Notification, NotificationSender, Result, Transport,
    TransportEvent,
};

// ============================================================================
// Tracing
// ============================================================================

/// Installs a subscriber honoring `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Upper bound for anything a test waits on.
pub const WAIT: Duration = Duration::from_secs(5);

// ============================================================================
// StubApi
// ============================================================================

/// One request seen by [`StubApi`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path without the query, e.g. `/api/auth.test`.
    pub path: String,
    pub query: Option<String>,
    /// Header names lowercased.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// Returns the Web API method name (last path segment).
    pub fn api_method(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn json_body(&self) -> Value {
        serde_json::from_slice(&self.body).expect("json body")
    }
}

type Responder = dyn Fn(&RecordedRequest) -> Value + Send + Sync;

/// In-process Web API answering every request with `responder`.
pub struct StubApi {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubApi {
    /// Binds an ephemeral port and starts serving.
    pub async fn start(responder: impl Fn(&RecordedRequest) -> Value + Send + Sync + 'static) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub api");
        let addr = listener.local_addr().expect("addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let responder: Arc<Responder> = Arc::new(responder);

        let recorded = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = Arc::clone(&recorded);
                let responder = Arc::clone(&responder);
                tokio::spawn(async move {
                    let _ = serve_one(stream, &recorded, &*responder).await;
                });
            }
        });

        Self {
            base_url: format!("http://{addr}/api/"),
            requests,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Number of calls to the given Web API method.
    pub fn count(&self, api_method: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.api_method() == api_method)
            .count()
    }
}

/// Reads one request, answers it, and closes the connection.
async fn serve_one(
    stream: TcpStream,
    recorded: &Mutex<Vec<RecordedRequest>>,
    responder: &Responder,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_owned();
    let target = parts.next().unwrap_or_default().to_owned();
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_owned(), Some(query.to_owned())),
        None => (target, None),
    };

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).await?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_owned()));
        }
    }

    let length = headers
        .iter()
        .find(|(k, _)| k == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    reader.read_exact(&mut body).await?;

    let request = RecordedRequest {
        method,
        path,
        query,
        headers,
        body,
    };
    let response = responder(&request).to_string();
    recorded.lock().push(request);

    let mut stream = reader.into_inner();
    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.len()
    );
    stream.write_all(head.as_bytes()).await?;
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

/// Answers like the platform: `auth.test` identifies `testbot`,
/// `apps.connections.open` returns `ws_url`, everything else is `ok`.
pub fn platform(ws_url: impl Into<String>) -> impl Fn(&RecordedRequest) -> Value + Send + Sync + 'static {
    let ws_url = ws_url.into();
    move |request: &RecordedRequest| match request.api_method() {
        "auth.test" => json!({
            "ok": true,
            "url": "https://example.test/",
            "team": "Example",
            "user": "testbot",
            "team_id": "T1",
            "user_id": "UBOT"
        }),
        "apps.connections.open" => json!({"ok": true, "url": ws_url}),
        _ => json!({"ok": true}),
    }
}

// ============================================================================
// MockConnector
// ============================================================================

/// Test-side view of one mock transport.
pub struct MockHandle {
    pub id: ConnectionId,
    pub url: Url,
    sent: Mutex<Vec<String>>,
    tracked: AtomicBool,
    close_requested: AtomicBool,
    notifications: NotificationSender,
}

impl MockHandle {
    /// Frames the bot sent on this connection.
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().clone()
    }

    pub fn sent_json(&self) -> Vec<Value> {
        self.sent()
            .iter()
            .map(|s| serde_json::from_str(s).expect("json frame"))
            .collect()
    }

    pub fn is_tracked(&self) -> bool {
        self.tracked.load(Ordering::SeqCst)
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested.load(Ordering::SeqCst)
    }

    /// Delivers a frame as if the platform had sent it.
    pub fn push_frame(&self, frame: impl Into<String>) {
        let _ = self.notifications.send(Notification::new(
            self.id,
            TransportEvent::Message(frame.into()),
        ));
    }

    /// Ends the connection as if the platform had dropped it.
    pub fn remote_close(&self) {
        if self.tracked.swap(false, Ordering::SeqCst) {
            let _ = self
                .notifications
                .send(Notification::new(self.id, TransportEvent::Close));
        }
    }
}

struct MockTransport {
    handle: Arc<MockHandle>,
}

impl Transport for MockTransport {
    fn id(&self) -> ConnectionId {
        self.handle.id
    }

    fn send(&self, text: String) -> Result<()> {
        if !self.handle.is_tracked() {
            return Err(Error::ConnectionClosed);
        }
        self.handle.sent.lock().push(text);
        Ok(())
    }

    fn close(&self) {
        self.handle.close_requested.store(true, Ordering::SeqCst);
        self.handle.remote_close();
    }

    fn is_tracked(&self) -> bool {
        self.handle.is_tracked()
    }
}

/// Connector whose transports are controlled through [`MockHandle`]s.
#[derive(Clone, Default)]
pub struct MockConnector {
    handles: Arc<Mutex<Vec<Arc<MockHandle>>>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every transport opened so far, oldest first.
    pub fn handles(&self) -> Vec<Arc<MockHandle>> {
        self.handles.lock().clone()
    }

    pub fn handle(&self, index: usize) -> Arc<MockHandle> {
        Arc::clone(&self.handles.lock()[index])
    }

    pub fn opened(&self) -> usize {
        self.handles.lock().len()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(
        &self,
        id: ConnectionId,
        url: Url,
        notifications: NotificationSender,
    ) -> Result<Box<dyn Transport>> {
        let handle = Arc::new(MockHandle {
            id,
            url,
            sent: Mutex::new(Vec::new()),
            tracked: AtomicBool::new(true),
            close_requested: AtomicBool::new(false),
            notifications,
        });
        let _ = handle
            .notifications
            .send(Notification::new(id, TransportEvent::Open));

        self.handles.lock().push(Arc::clone(&handle));
        Ok(Box::new(MockTransport { handle }))
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Handler that forwards every envelope to a channel and replies `{foo: 1}`.
pub fn recording_handler() -> (
    impl Fn(Envelope) -> Ready<Option<Value>> + Send + Sync + 'static,
    mpsc::UnboundedReceiver<Envelope>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handler = move |envelope: Envelope| {
        let _ = tx.send(envelope);
        future::ready(Some(json!({"foo": 1})))
    };
    (handler, rx)
}

/// An `events_api` frame.
pub fn event_frame(envelope_id: &str, event_id: &str, accepts_response_payload: bool) -> String {
    json!({
        "type": "events_api",
        "envelope_id": envelope_id,
        "accepts_response_payload": accepts_response_payload,
        "retry_attempt": 0,
        "retry_reason": "",
        "payload": {
            "type": "event_callback",
            "event_id": event_id,
            "event_time": unix_now(),
            "event": {"type": "app_mention", "channel": "C1", "text": "<@UBOT> ping"}
        }
    })
    .to_string()
}

/// Current unix time in seconds.
pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
