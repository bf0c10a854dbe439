//! HTTP endpoint handlers.

use attune::RelayError;
use attune::relay::{ChatInput, Relay};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

/// Response header reporting how emotion data was handled.
pub const EMOTION_CONTEXT_HEADER: &str = "x-emotion-context";

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
}

// ── Errors ─────────────────────────────────────────────────────────

/// Error response rendered as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::MalformedInput(msg) => ApiError::bad_request(msg),
            // Provider details stay in the log.
            RelayError::Provider(_) => ApiError::internal("Failed to generate a response"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

// ── Handlers ───────────────────────────────────────────────────────

/// Response body for POST /api/chat.
#[derive(Serialize)]
pub struct ChatResponse {
    pub message: String,
}

/// POST /api/chat: relay a conversation to the model.
///
/// Body: `{"messages": [...], "emotions": [...]?}`. Returns 200 with
/// `{"message": ...}`, 400 if the body or `messages` is malformed (no provider
/// call is made), or 500 if the provider call fails.
pub async fn post_chat(
    State(app): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|e| {
        warn!("Rejected chat request body: {e}");
        ApiError::bad_request(format!("invalid JSON body: {}", e.body_text()))
    })?;

    let input = ChatInput::from_json(body).inspect_err(|e| warn!("Rejected chat request: {e}"))?;
    debug!("Chat request with {} messages", input.messages.len());

    let reply = app.relay.handle(input).await?;

    let headers = [(
        HeaderName::from_static(EMOTION_CONTEXT_HEADER),
        HeaderValue::from_static(reply.emotion_context.kind()),
    )];
    Ok((
        headers,
        Json(ChatResponse {
            message: reply.message,
        }),
    )
        .into_response())
}

/// GET /health: liveness probe.
pub async fn get_health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "attune-web",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/test: readiness smoke test reporting the configured model.
pub async fn get_test(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "message": "attune relay is running",
        "model": app.relay.model(),
    }))
}
