//! Boundary to the remote emotion classification service.
//!
//! The service is opaque: it receives base64 audio with a session id and
//! answers with either a classification or a "skipped" decline. The trait
//! exists so the dispatch queue can be exercised against scripted doubles.

mod client;
mod types;

pub use client::HttpClassifier;
pub use types::{
    AnalysisResult, AnalyzeOutcome, AnalyzeRequest, AnalyzeResponse, ClarityLabel, Emotion,
    EndSessionRequest, EnergyLabel, PaceLabel, PitchLabel, ServiceErrorBody, ServiceStatus,
    VoiceFeatures,
};

use crate::error::ClassifierError;

#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    /// Startup probe: whether the service is configured and reachable.
    async fn check_status(&self) -> Result<ServiceStatus, ClassifierError>;

    /// Submit one segment for classification.
    async fn analyze_segment(
        &self,
        request: AnalyzeRequest,
    ) -> Result<AnalyzeOutcome, ClassifierError>;

    /// Best-effort session termination notice.
    async fn end_session(&self, session_id: &str) -> Result<(), ClassifierError>;
}
