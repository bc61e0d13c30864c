use serde::Serialize;

use crate::classifier::Emotion;

/// What the recording is currently doing, shown inside the `Recording`
/// state. Sub-status affects the rendered text only; it never blocks a
/// transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    /// Capturing, nothing in flight.
    Listening,
    /// A segment is being classified.
    Analyzing,
    /// The most recent segment classified as this emotion.
    Detected(Emotion),
    /// The most recent dispatch failed; capture continues.
    Faulted,
}

/// Authoritative user-visible recording state.
///
/// `Idle -> Recording -> Stopped` is the primary arc; `Stopped` awaits a new
/// start. `Error` is reserved for conditions that prevent recording at all
/// (capture device unavailable, classifier service not configured) and is
/// cleared by a successful start.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum RecordingStatus {
    Idle,
    Recording(Activity),
    Stopped,
    Error(String),
}

impl RecordingStatus {
    pub fn can_start(&self) -> bool {
        // Error is retryable: a denied permission prompt or an unconfigured
        // service can be fixed and start tried again.
        !self.is_recording()
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, RecordingStatus::Recording(_))
    }

    pub fn status_text(&self) -> String {
        match self {
            RecordingStatus::Idle => "Ready to record".to_string(),
            RecordingStatus::Recording(Activity::Listening) => "Recording...".to_string(),
            RecordingStatus::Recording(Activity::Analyzing) => "Analyzing...".to_string(),
            RecordingStatus::Recording(Activity::Detected(emotion)) => {
                format!("Recording (detected: {})", emotion)
            }
            RecordingStatus::Recording(Activity::Faulted) => {
                "Recording (analysis error)".to_string()
            }
            RecordingStatus::Stopped => "Recording stopped".to_string(),
            RecordingStatus::Error(message) => message.clone(),
        }
    }
}

impl Default for RecordingStatus {
    fn default() -> Self {
        RecordingStatus::Idle
    }
}
