use super::state::AppState;
use crate::error::PipelineError;
use crate::pipeline::{RecordingStatus, TimelineEntry};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::{error, info};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StartRecordingResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StopRecordingResponse {
    pub status: String,
    pub message: String,
    pub timeline: Vec<TimelineEntry>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: RecordingStatus,
    pub status_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /recording/start
/// Start a new recording session
pub async fn start_recording(State(state): State<AppState>) -> impl IntoResponse {
    match state.pipeline.start().await {
        Ok(session_id) => {
            info!("Recording started via HTTP (session {})", session_id);
            (
                StatusCode::OK,
                Json(StartRecordingResponse {
                    session_id,
                    status: "recording".to_string(),
                    message: "Recording started".to_string(),
                }),
            )
                .into_response()
        }
        Err(e @ PipelineError::SessionAlreadyActive) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to start recording: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// POST /recording/stop
/// Stop the active recording session (no-op when idle)
pub async fn stop_recording(State(state): State<AppState>) -> impl IntoResponse {
    match state.pipeline.stop().await {
        Ok(()) => {
            let timeline = state.pipeline.timeline_snapshot().await;
            (
                StatusCode::OK,
                Json(StopRecordingResponse {
                    status: "stopped".to_string(),
                    message: "Recording stopped".to_string(),
                    timeline,
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to stop recording: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// GET /recording/status
/// Current recording status and display text
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.pipeline.status();
    let response = StatusResponse {
        status_text: status.status_text(),
        status,
        session_id: state.pipeline.active_session_id().await,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /recording/timeline
/// Most-recent-first classification history
pub async fn get_timeline(State(state): State<AppState>) -> impl IntoResponse {
    let timeline = state.pipeline.timeline_snapshot().await;
    (StatusCode::OK, Json(timeline)).into_response()
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
