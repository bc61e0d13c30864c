use serde::{Deserialize, Serialize};

use super::timeline::TimelineEntry;
use crate::classifier::AnalysisResult;

/// Events emitted by the dispatch worker, consumed by the result aggregator.
#[derive(Debug, Clone)]
pub enum DispatchEvent {
    /// The worker began sending a segment to the classifier.
    Analyzing,
    /// The classifier declined the segment (server-side silence heuristic).
    Skipped,
    /// A classification arrived.
    Completed(AnalysisResult),
    /// Transmission or classification failed for one segment.
    Failed(String),
}

/// What the presentation layer receives on every observable change.
///
/// The core never touches rendering; a UI subscribes to a broadcast of
/// these and draws whatever it likes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationUpdate {
    pub status_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion_update: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline_snapshot: Option<Vec<TimelineEntry>>,
    /// Coarse signal level for waveform drawing, when one is being tracked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<f32>,
}

impl PresentationUpdate {
    pub fn status_only(status_text: impl Into<String>) -> Self {
        Self {
            status_text: status_text.into(),
            emotion_update: None,
            timeline_snapshot: None,
            level: None,
        }
    }
}
