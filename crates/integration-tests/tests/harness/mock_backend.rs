//! Mock LLM backend for integration tests
//!
//! Serves both the `OpenAI` chat completions route and the Anthropic messages
//! route with canned batched responses, and records what each request looked
//! like so tests can assert on the wire format.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Canned reply text for successful responses
pub const REPLY: &str = "Hello from mock backend";

/// How the mock answers every request
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Plain text answer, optionally with token usage
    Text { usage: bool },
    /// Ask for one tool call
    ToolCall { name: String, arguments: Value },
    /// Answer after a delay
    Slow(Duration),
    /// Fail with a 500 and an error envelope
    Fail,
}

/// Request as seen by the mock
#[derive(Debug, Clone)]
pub struct Captured {
    pub path: &'static str,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Mock backend accepting a single API key
pub struct MockBackend {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    api_key: String,
    behavior: Behavior,
    request_count: AtomicU32,
    captured: Mutex<Vec<Captured>>,
}

impl MockBackend {
    /// Start a backend answering with text and usage
    pub async fn start(api_key: &str) -> anyhow::Result<Self> {
        Self::start_with(api_key, Behavior::Text { usage: true }).await
    }

    pub async fn start_with(api_key: &str, behavior: Behavior) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            api_key: api_key.to_owned(),
            behavior,
            request_count: AtomicU32::new(0),
            captured: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .route("/v1/messages", routing::post(handle_messages))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
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

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as a provider
    ///
    /// Includes `/v1` since adapters append paths like `/chat/completions`
    pub fn base_url(&self) -> url::Url {
        url::Url::parse(&format!("http://{}/v1", self.addr)).expect("valid mock URL")
    }

    /// Number of requests that reached a route handler
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    /// Most recent request
    pub fn last_request(&self) -> Option<Captured> {
        self.state.captured.lock().expect("capture lock").last().cloned()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl MockState {
    fn record(&self, path: &'static str, headers: &HeaderMap, body: &Value) {
        self.request_count.fetch_add(1, Ordering::Relaxed);
        self.captured.lock().expect("capture lock").push(Captured {
            path,
            headers: headers.clone(),
            body: body.clone(),
        });
    }
}

fn error_response(status: StatusCode, error_type: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "type": "error",
            "error": {
                "message": message,
                "type": error_type
            }
        })),
    )
        .into_response()
}

// -- OpenAI chat completions --

async fn handle_chat_completions(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("/v1/chat/completions", &headers, &body);

    let expected = format!("Bearer {}", state.api_key);
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return error_response(StatusCode::UNAUTHORIZED, "invalid_request_error", "Incorrect API key provided");
    }

    let model = body["model"].clone();
    let (message, finish_reason, usage) = match &state.behavior {
        Behavior::Fail => {
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "server_error", "mock backend exploded");
        }
        Behavior::Slow(delay) => {
            tokio::time::sleep(*delay).await;
            (json!({"role": "assistant", "content": REPLY}), "stop", true)
        }
        Behavior::Text { usage } => (json!({"role": "assistant", "content": REPLY}), "stop", *usage),
        Behavior::ToolCall { name, arguments } => (
            json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_mock_1",
                    "type": "function",
                    "function": {"name": name, "arguments": arguments.to_string()}
                }]
            }),
            "tool_calls",
            true,
        ),
    };

    let mut response = json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": model,
        "choices": [{"index": 0, "message": message, "finish_reason": finish_reason}]
    });
    if usage {
        response["usage"] = json!({
            "prompt_tokens": 10,
            "completion_tokens": 5,
            "total_tokens": 15,
            "prompt_tokens_details": {"cached_tokens": 4}
        });
    }

    Json(response).into_response()
}

// -- Anthropic messages --

async fn handle_messages(State(state): State<Arc<MockState>>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    state.record("/v1/messages", &headers, &body);

    if headers.get("x-api-key").and_then(|v| v.to_str().ok()) != Some(state.api_key.as_str()) {
        return error_response(StatusCode::UNAUTHORIZED, "authentication_error", "invalid x-api-key");
    }
    if headers.get("anthropic-version").is_none() {
        return error_response(StatusCode::BAD_REQUEST, "invalid_request_error", "missing anthropic-version");
    }

    let model = body["model"].clone();
    let (content, stop_reason, usage) = match &state.behavior {
        Behavior::Fail => {
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "api_error", "mock backend exploded");
        }
        Behavior::Slow(delay) => {
            tokio::time::sleep(*delay).await;
            (json!([{"type": "text", "text": REPLY}]), "end_turn", true)
        }
        Behavior::Text { usage } => (json!([{"type": "text", "text": REPLY}]), "end_turn", *usage),
        Behavior::ToolCall { name, arguments } => (
            json!([
                {"type": "thinking", "thinking": "need a tool", "signature": "sig"},
                {"type": "tool_use", "id": "toolu_mock_1", "name": name, "input": arguments}
            ]),
            "tool_use",
            true,
        ),
    };

    let mut response = json!({
        "id": "msg_mock",
        "type": "message",
        "role": "assistant",
        "model": model,
        "content": content,
        "stop_reason": stop_reason
    });
    if usage {
        response["usage"] = json!({"input_tokens": 12, "output_tokens": 6});
    }

    Json(response).into_response()
}
