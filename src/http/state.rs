use crate::session::RecordingPipeline;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// The single recording pipeline (one active recording at a time).
    pub pipeline: Arc<RecordingPipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<RecordingPipeline>) -> Self {
        Self { pipeline }
    }
}
