use super::state::AppState;
use crate::error::{LlmError, SummaryError};
use crate::session::SessionStatus;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub status: &'static str,
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub running: bool,
    pub state: crate::session::SessionState,
    pub viewers: usize,
    pub lines: usize,
    pub session: SessionStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryRequest {
    /// Lines to summarize; the buffered final lines when absent
    pub lines: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(super) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/start
/// Start a URL-pull session, replacing any running one
pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartRequest>,
) -> Response {
    let url = req.url.trim();
    if url.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "url is required");
    }

    info!("Start requested for {}", url);
    let session_id = state.controller.start(url).await;

    (
        StatusCode::OK,
        Json(StartResponse {
            status: "started",
            session_id: session_id.to_string(),
        }),
    )
        .into_response()
}

/// POST /api/stop
/// Stop the URL-pull session (no-op when idle)
pub async fn stop_session(State(state): State<AppState>) -> impl IntoResponse {
    if state.controller.stop().await {
        info!("Session stopped");
    }
    Json(StopResponse { status: "stopped" })
}

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.controller.status();
    Json(StatusResponse {
        running: session.state.is_active(),
        state: session.state,
        viewers: state.hub.viewer_count().await,
        lines: state.hub.replay_len().await,
        session,
    })
}

/// An absent body means "summarize the buffer"; a present one must be valid.
fn parse_summary_request(body: &[u8]) -> Result<SummaryRequest, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SummaryRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| format!("invalid summary request: {}", e))
}

/// POST /api/summary
/// Summarize the given lines, or the buffered final lines
pub async fn create_summary(State(state): State<AppState>, body: Bytes) -> Response {
    let req = match parse_summary_request(&body) {
        Ok(req) => req,
        Err(message) => {
            warn!("{}", message);
            return error_response(StatusCode::BAD_REQUEST, message);
        }
    };
    let lines = match req.lines {
        Some(lines) => lines,
        None => state.hub.final_lines().await,
    };

    match state.summarizer.summarize(&lines).await {
        Ok(summary) => (StatusCode::OK, Json(SummaryResponse { summary })).into_response(),
        Err(e) => {
            let status = summary_error_status(&e);
            if status == StatusCode::BAD_REQUEST {
                warn!("Summary rejected: {}", e);
            } else {
                error!("Summary failed: {}", e);
            }
            error_response(status, e.to_string())
        }
    }
}

fn summary_error_status(error: &SummaryError) -> StatusCode {
    match error {
        SummaryError::NothingToSummarize => StatusCode::BAD_REQUEST,
        SummaryError::Llm(
            LlmError::Unavailable(_)
            | LlmError::Timeout
            | LlmError::Upstream { .. }
            | LlmError::BadResponse,
        ) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
