//! Mock provider backend for integration tests
//!
//! Answers every path with a canned reply and records what it received.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

/// One request as the mock saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

/// Canned reply
#[derive(Debug, Clone)]
enum Reply {
    /// Body sent as-is with `application/json`
    Json { status: StatusCode, body: String },
    /// Body sent as-is with `text/plain`
    Text { status: StatusCode, body: String },
    /// Chunks written one at a time with a short pause between them
    Stream { content_type: Option<&'static str>, chunks: Vec<String> },
    /// Event stream that only ends when the reader goes away
    Endless,
    /// Never answers within any reasonable timeout
    Hang,
}

struct MockState {
    reply: Reply,
    requests: Mutex<Vec<RecordedRequest>>,
    released_streams: AtomicUsize,
}

/// Counts an endless stream as released once hyper drops it
struct ReleaseGuard(Arc<MockState>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.released_streams.fetch_add(1, Ordering::SeqCst);
    }
}

/// Mock upstream provider
pub struct MockUpstream {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

impl MockUpstream {
    /// Reply with a JSON body
    pub async fn json(status: u16, body: &str) -> Self {
        Self::start(Reply::Json {
            status: StatusCode::from_u16(status).expect("valid status"),
            body: body.to_owned(),
        })
        .await
    }

    /// Reply with a plain text body
    pub async fn text(status: u16, body: &str) -> Self {
        Self::start(Reply::Text {
            status: StatusCode::from_u16(status).expect("valid status"),
            body: body.to_owned(),
        })
        .await
    }

    /// Reply with an event stream made of `chunks`
    pub async fn stream(chunks: &[&str]) -> Self {
        Self::start(Reply::Stream {
            content_type: Some("text/event-stream"),
            chunks: chunks.iter().map(|&c| c.to_owned()).collect(),
        })
        .await
    }

    /// Reply with a stream that carries no content type
    pub async fn untyped_stream(chunks: &[&str]) -> Self {
        Self::start(Reply::Stream {
            content_type: None,
            chunks: chunks.iter().map(|&c| c.to_owned()).collect(),
        })
        .await
    }

    /// Reply with an event stream that never finishes
    pub async fn endless_stream() -> Self {
        Self::start(Reply::Endless).await
    }

    /// Accept requests but never answer
    pub async fn hang() -> Self {
        Self::start(Reply::Hang).await
    }

    async fn start(reply: Reply) -> Self {
        let state = Arc::new(MockState {
            reply,
            requests: Mutex::new(Vec::new()),
            released_streams: AtomicUsize::new(0),
        });

        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock upstream");
        let addr = listener.local_addr().expect("mock upstream address");
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Self { addr, shutdown, state }
    }

    /// URL of `path` on the mock
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().expect("lock").clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.state.requests.lock().expect("lock").len()
    }

    /// Number of endless streams whose reader has gone away
    pub fn released_streams(&self) -> usize {
        self.state.released_streams.load(Ordering::SeqCst)
    }

    /// The single request received, panicking if there is not exactly one
    pub fn only_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one upstream request");
        requests.into_iter().next().expect("one request")
    }
}

impl Drop for MockUpstream {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle(State(state): State<Arc<MockState>>, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    state.requests.lock().expect("lock").push(RecordedRequest {
        path: uri.path().to_owned(),
        query: uri.query().map(str::to_owned),
        headers,
        body: serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null),
    });

    match state.reply.clone() {
        Reply::Json { status, body } => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Reply::Text { status, body } => (status, [(header::CONTENT_TYPE, "text/plain")], body).into_response(),
        Reply::Stream { content_type, chunks } => {
            let stream = futures_util::stream::iter(chunks).then(|chunk| async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok::<_, Infallible>(Bytes::from(chunk))
            });

            let mut response = Body::from_stream(stream).into_response();
            if let Some(content_type) = content_type {
                response
                    .headers_mut()
                    .insert(header::CONTENT_TYPE, header::HeaderValue::from_static(content_type));
            }
            response
        }
        Reply::Endless => {
            let guard = ReleaseGuard(Arc::clone(&state));
            let stream = futures_util::stream::unfold(guard, |guard| async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                Some((Ok::<_, Infallible>(Bytes::from_static(b"data: tick\n\n")), guard))
            });

            (
                [(header::CONTENT_TYPE, "text/event-stream")],
                Body::from_stream(stream),
            )
                .into_response()
        }
        Reply::Hang => {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            StatusCode::NO_CONTENT.into_response()
        }
    }
}
