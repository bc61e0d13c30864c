use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ClassifierError;

/// Fixed emotion vocabulary the classification service answers from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Fearful,
    Surprised,
    Neutral,
    Confident,
    Nervous,
    Calm,
    Frustrated,
    Excited,
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Fearful => "fearful",
            Emotion::Surprised => "surprised",
            Emotion::Neutral => "neutral",
            Emotion::Confident => "confident",
            Emotion::Nervous => "nervous",
            Emotion::Calm => "calm",
            Emotion::Frustrated => "frustrated",
            Emotion::Excited => "excited",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PitchLabel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaceLabel {
    Slow,
    Moderate,
    Fast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLabel {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClarityLabel {
    Poor,
    Fair,
    Good,
    Excellent,
}

/// Qualitative voice characteristics attached to every classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceFeatures {
    pub pitch: PitchLabel,
    pub pace: PaceLabel,
    pub energy: EnergyLabel,
    pub clarity: ClarityLabel,
}

/// A complete classification for one audio segment.
///
/// Only ever constructed from a successful service response, never locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub emotion: Emotion,
    /// Confidence in [0, 1].
    pub confidence: f32,
    pub voice_features: VoiceFeatures,
    /// One-sentence free-text summary from the service.
    pub analysis: String,
}

// ============================================================================
// Wire types
// ============================================================================

/// POST /api/analyze-chunk request body.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Base64-encoded segment bytes with a data-URI prefix.
    pub audio: String,
    pub session_id: String,
}

/// POST /api/analyze-chunk success body.
///
/// When `skipped` is true the classification fields are absent.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion: Option<Emotion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_features: Option<VoiceFeatures>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

/// GET /api/check-status body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub configured: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// POST /api/end-session request body.
#[derive(Debug, Serialize, Deserialize)]
pub struct EndSessionRequest {
    pub session_id: String,
}

/// Error body the service attaches to non-success responses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    pub error: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

/// Outcome of one analyze call: either a declined ("skipped") segment or a
/// full classification.
#[derive(Debug, Clone)]
pub enum AnalyzeOutcome {
    Skipped,
    Analyzed(AnalysisResult),
}

impl TryFrom<AnalyzeResponse> for AnalyzeOutcome {
    type Error = ClassifierError;

    fn try_from(response: AnalyzeResponse) -> Result<Self, Self::Error> {
        if response.skipped {
            return Ok(AnalyzeOutcome::Skipped);
        }

        let emotion = response
            .emotion
            .ok_or_else(|| ClassifierError::InvalidResponse("missing emotion".to_string()))?;
        let confidence = response
            .confidence
            .ok_or_else(|| ClassifierError::InvalidResponse("missing confidence".to_string()))?;
        let voice_features = response.voice_features.ok_or_else(|| {
            ClassifierError::InvalidResponse("missing voice_features".to_string())
        })?;
        let analysis = response.analysis.unwrap_or_default();

        Ok(AnalyzeOutcome::Analyzed(AnalysisResult {
            emotion,
            confidence: confidence.clamp(0.0, 1.0),
            voice_features,
            analysis,
        }))
    }
}
