//! Chat transport and the stream drive loop.
//!
//! One user-initiated send is one POST whose response body is an SSE byte
//! stream. The loop here wires the pipeline together: bytes → decoder →
//! framer → interpreter → reducer, notifying the renderer after every log
//! change. Taking the session by `&mut` serializes sends: a second send on
//! the same session cannot overlap a live stream.

use crate::chat::{Applied, ChatSession, Turn};
use crate::error::{Error, Result};
use crate::render::Renderer;
use crate::stream::{SseFramer, Utf8Decoder, parse_frame};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use std::time::Duration;

/// HTTP request timeout.
const TIMEOUT: Duration = Duration::from_secs(120);
/// Connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Outbound chat request body.
///
/// `session_id` and `history` are caller-supplied opaque fields; this core
/// does not manage them.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub content: String,
    pub history: Vec<serde_json::Value>,
    pub role: String,
}

impl ChatRequest {
    /// Build a request with an empty history and the `user` role.
    pub fn new(session_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            content: content.into(),
            history: Vec::new(),
            role: "user".to_string(),
        }
    }
}

/// HTTP client for the chat backend.
#[derive(Debug)]
pub struct ChatClient {
    client: reqwest::Client,
    base_url: String,
    path: String,
}

impl ChatClient {
    /// Create a client for a backend base URL and chat endpoint path.
    pub fn new(base_url: impl Into<String>, path: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into(),
            path: path.into(),
        }
    }

    /// Send one message and fold the streamed response into the session.
    ///
    /// The user turn is appended before any network activity. Transport
    /// failures are terminal for the stream: one error turn is appended,
    /// the error propagated, and no partial normalization is attempted.
    pub async fn send(
        &self,
        request: &ChatRequest,
        session: &mut ChatSession,
        renderer: &mut dyn Renderer,
    ) -> Result<()> {
        session.push_user(&request.content);
        session.begin_stream();
        renderer.render_log(session.log());

        tracing::debug!(session_id = %request.session_id, "chat stream request");

        let url = format!("{}{}", self.base_url, self.path);
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

        let response = match self
            .client
            .post(&url)
            .headers(headers)
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                session.push_error(&format!("Connection failed: {err}"));
                renderer.render_log(session.log());
                return Err(err.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            session.push_error(&format!("Connection failed: HTTP {status}"));
            renderer.render_log(session.log());
            return Err(Error::Api(format!("HTTP {status}: {body}")));
        }

        // The byte stream is scoped to the pump; it is dropped (and the
        // connection released) on every exit path.
        pump(response.bytes_stream(), session, renderer).await
    }
}

/// Drive an SSE byte stream into the session until it ends or fails.
///
/// Generic over the byte source so hosts and tests can feed the pipeline
/// without a live connection.
pub async fn pump<S, E>(
    stream: S,
    session: &mut ChatSession,
    renderer: &mut dyn Renderer,
) -> Result<()>
where
    S: Stream<Item = std::result::Result<Bytes, E>>,
    E: std::fmt::Display,
{
    futures::pin_mut!(stream);
    let mut decoder = Utf8Decoder::new();
    let mut framer = SseFramer::new();

    while let Some(chunk) = stream.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                session.push_error(&format!("Connection failed: {err}"));
                renderer.render_log(session.log());
                return Err(Error::Stream(err.to_string()));
            }
        };

        let text = decoder.feed(&chunk);
        for frame in framer.push(&text) {
            dispatch(&frame, session, renderer);
        }
    }

    // Transport closed: flush held-back bytes through the framer. An
    // unterminated trailing frame is discarded, matching backends that
    // always delimit before closing.
    let rest = decoder.finish();
    for frame in framer.push(&rest) {
        dispatch(&frame, session, renderer);
    }
    if framer.has_pending() {
        tracing::debug!("Discarding unterminated trailing frame");
    }

    session.finalize();
    renderer.render_log(session.log());
    Ok(())
}

/// Interpret one frame, fold it into the session, and notify the renderer.
fn dispatch(frame: &str, session: &mut ChatSession, renderer: &mut dyn Renderer) {
    let Some(event) = parse_frame(frame) else {
        return;
    };

    match session.apply(event) {
        Applied::Chart { index } => {
            let mounted = match &session.log().turns()[index] {
                Turn::Chart { id, title, payload } => renderer.mount_chart(id, title, payload),
                Turn::Text { .. } => Ok(()),
            };
            if let Err(err) = mounted {
                tracing::warn!("Chart mount failed: {err}");
                session.push_error("Chart rendering failed.");
            }
            renderer.render_log(session.log());
        }
        Applied::Text => renderer.render_log(session.log()),
        Applied::Terminated => {}
    }
}
