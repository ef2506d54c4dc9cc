//! Upstream response to client response
//!
//! Bodies are never reshaped. Buffered bodies are re-emitted as JSON and
//! streamed bodies are forwarded chunk by chunk as they arrive, so a slow
//! client slows the upstream read instead of growing a buffer.

use std::io;

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::StreamExt;
use futures_util::stream;
use http::StatusCode;
use http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE, HeaderValue};

use crate::invoke::{ByteStream, UpstreamBody, UpstreamResponse};

/// Turn an upstream response into the client response
pub fn relay(response: UpstreamResponse, model: &str) -> Response {
    match response {
        UpstreamResponse::Buffered { status, body } => relay_buffered(status, body),
        UpstreamResponse::Streaming {
            status,
            content_type,
            body,
        } => relay_stream(status, content_type, body, model),
    }
}

/// Re-emit a buffered body with the upstream status
///
/// JSON goes out unchanged and other UTF-8 text as a JSON string. A body
/// that cannot be represented is replaced by `{"error", "status"}`, still
/// with the upstream status.
pub fn relay_buffered(status: StatusCode, body: UpstreamBody) -> Response {
    let payload = match body {
        UpstreamBody::Json(bytes) => Some(bytes),
        UpstreamBody::Text(text) => serde_json::to_vec(&text).ok().map(Bytes::from),
        UpstreamBody::Opaque(_) => None,
    };

    let payload = payload.unwrap_or_else(|| {
        tracing::warn!(status = %status, "upstream body is not representable as JSON");
        synthetic_error(status)
    });

    (status, [(CONTENT_TYPE, HeaderValue::from_static("application/json"))], payload).into_response()
}

fn synthetic_error(status: StatusCode) -> Bytes {
    let body = serde_json::json!({
        "error": "upstream response could not be encoded",
        "status": status.as_u16(),
    });
    Bytes::from(body.to_string())
}

/// Forward a streamed body without buffering or reframing
///
/// The upstream content type is kept when present, falling back to
/// `text/event-stream`.
pub fn relay_stream(
    status: StatusCode,
    content_type: Option<HeaderValue>,
    body: ByteStream,
    model: &str,
) -> Response {
    let progress = StreamProgress::new(model);

    let forwarded = stream::unfold((body, progress), |(mut body, mut progress)| async move {
        match body.next().await {
            Some(Ok(chunk)) => {
                progress.record(&chunk);
                Some((Ok(chunk), (body, progress)))
            }
            Some(Err(e)) => {
                progress.fail(&e);
                Some((Err::<Bytes, io::Error>(e), (body, progress)))
            }
            None => {
                progress.finish();
                None
            }
        }
    });

    (
        status,
        [
            (CONTENT_TYPE, content_type.unwrap_or_else(|| HeaderValue::from_static("text/event-stream"))),
            (CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            (CONNECTION, HeaderValue::from_static("keep-alive")),
        ],
        Body::from_stream(Box::pin(forwarded)),
    )
        .into_response()
}

/// Logs a summary when the relayed stream is dropped
struct StreamProgress {
    model: String,
    chunks: usize,
    bytes: usize,
    completed: bool,
    failed: bool,
}

impl StreamProgress {
    fn new(model: &str) -> Self {
        Self {
            model: model.to_owned(),
            chunks: 0,
            bytes: 0,
            completed: false,
            failed: false,
        }
    }

    fn record(&mut self, chunk: &Bytes) {
        self.chunks += 1;
        self.bytes += chunk.len();
    }

    fn fail(&mut self, error: &io::Error) {
        tracing::warn!(model = %self.model, error = %error, "upstream stream failed");
        self.failed = true;
    }

    /// Upstream reached end of stream
    fn finish(&mut self) {
        self.completed = true;
    }
}

impl Drop for StreamProgress {
    fn drop(&mut self) {
        if self.completed || self.failed {
            tracing::debug!(
                model = %self.model,
                chunks = self.chunks,
                bytes = self.bytes,
                failed = self.failed,
                "stream finished"
            );
        } else {
            // Client went away before the upstream finished
            tracing::debug!(
                model = %self.model,
                chunks = self.chunks,
                bytes = self.bytes,
                "stream closed by client"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use futures_util::TryStreamExt;

    use super::*;

    fn chunks(parts: &[&'static str]) -> ByteStream {
        let items: Vec<Result<Bytes, io::Error>> =
            parts.iter().map(|part| Ok(Bytes::from_static(part.as_bytes()))).collect();
        Box::pin(stream::iter(items))
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn stream_bytes_are_forwarded_in_order() {
        let parts = [
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n",
            "data: [DONE]\n\n",
        ];

        let response = relay_stream(StatusCode::OK, None, chunks(&parts), "fast-llm");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/event-stream");
        assert_eq!(response.headers()[CACHE_CONTROL], "no-cache");
        assert_eq!(response.headers()[CONNECTION], "keep-alive");
        assert_eq!(body_text(response).await, parts.concat());
    }

    #[tokio::test]
    async fn chunk_boundaries_are_preserved() {
        let parts = ["data: {\"partial", "\":true}\n", "\n"];

        let response = relay_stream(StatusCode::OK, None, chunks(&parts), "fast-llm");
        let frames: Vec<Bytes> = response.into_body().into_data_stream().try_collect().await.unwrap();

        assert_eq!(frames, parts.map(|p| Bytes::from_static(p.as_bytes())));
    }

    #[tokio::test]
    async fn upstream_content_type_is_kept() {
        let content_type = HeaderValue::from_static("text/event-stream; charset=utf-8");

        let response = relay_stream(StatusCode::OK, Some(content_type), chunks(&["data: x\n\n"]), "gemini");

        assert_eq!(response.headers()[CONTENT_TYPE], "text/event-stream; charset=utf-8");
    }

    #[tokio::test]
    async fn stream_error_ends_body() {
        let items: Vec<Result<Bytes, io::Error>> = vec![
            Ok(Bytes::from_static(b"data: a\n\n")),
            Err(io::Error::other("connection reset")),
        ];

        let response = relay_stream(StatusCode::OK, None, Box::pin(stream::iter(items)), "fast-llm");

        assert!(axum::body::to_bytes(response.into_body(), usize::MAX).await.is_err());
    }

    /// Upstream stub that yields forever and records how it is consumed
    struct Upstream {
        pulled: Arc<AtomicUsize>,
        released: Arc<AtomicBool>,
    }

    impl Drop for Upstream {
        fn drop(&mut self) {
            self.released.store(true, Ordering::SeqCst);
        }
    }

    fn endless(pulled: &Arc<AtomicUsize>, released: &Arc<AtomicBool>) -> ByteStream {
        let upstream = Upstream {
            pulled: Arc::clone(pulled),
            released: Arc::clone(released),
        };

        Box::pin(stream::unfold(upstream, |upstream| async move {
            upstream.pulled.fetch_add(1, Ordering::SeqCst);
            Some((Ok::<_, io::Error>(Bytes::from_static(b"data: tick\n\n")), upstream))
        }))
    }

    #[tokio::test]
    async fn upstream_is_pulled_only_as_the_client_reads() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let released = Arc::new(AtomicBool::new(false));

        let response = relay_stream(StatusCode::OK, None, endless(&pulled, &released), "fast-llm");
        let mut frames = response.into_body().into_data_stream();

        frames.next().await.unwrap().unwrap();
        frames.next().await.unwrap().unwrap();

        assert_eq!(pulled.load(Ordering::SeqCst), 2);
        assert!(!released.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn client_disconnect_releases_upstream() {
        let pulled = Arc::new(AtomicUsize::new(0));
        let released = Arc::new(AtomicBool::new(false));

        let response = relay_stream(StatusCode::OK, None, endless(&pulled, &released), "fast-llm");
        let mut frames = response.into_body().into_data_stream();
        frames.next().await.unwrap().unwrap();

        drop(frames);

        assert!(released.load(Ordering::SeqCst));
        assert_eq!(pulled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn buffered_json_is_verbatim() {
        let raw = r#"{"id":"chatcmpl-1","choices":[{"message":{"content":"Hello"}}]}"#;

        let response = relay_buffered(StatusCode::OK, UpstreamBody::Json(Bytes::from_static(raw.as_bytes())));

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_text(response).await, raw);
    }

    #[tokio::test]
    async fn buffered_text_becomes_json_string() {
        let response = relay_buffered(StatusCode::BAD_GATEWAY, UpstreamBody::Text("upstream down".to_owned()));

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_text(response).await, "\"upstream down\"");
    }

    #[tokio::test]
    async fn opaque_body_is_replaced_but_status_kept() {
        let response = relay_buffered(
            StatusCode::SERVICE_UNAVAILABLE,
            UpstreamBody::Opaque(Bytes::from_static(&[0xff, 0x00])),
        );

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["status"], 503);
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn relay_dispatches_on_variant() {
        let buffered = UpstreamResponse::Buffered {
            status: StatusCode::CREATED,
            body: UpstreamBody::Json(Bytes::from_static(b"{}")),
        };
        assert_eq!(relay(buffered, "m").status(), StatusCode::CREATED);

        let streaming = UpstreamResponse::Streaming {
            status: StatusCode::OK,
            content_type: None,
            body: chunks(&["data: x\n\n"]),
        };
        let response = relay(streaming, "m");
        assert_eq!(response.headers()[CONTENT_TYPE], "text/event-stream");
    }
}
