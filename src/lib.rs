pub mod audio;
pub mod classifier;
pub mod config;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod session;

pub use audio::{
    AudioCapture, CaptureBackendFactory, CaptureConfig, CaptureSource, CapturedChunk, LevelTap,
    SyntheticCapture,
};
pub use classifier::{
    AnalysisResult, AnalyzeOutcome, AnalyzeRequest, Classifier, Emotion, HttpClassifier,
    ServiceStatus, VoiceFeatures,
};
pub use config::Config;
pub use error::{CaptureError, ClassifierError, PipelineError};
pub use http::{create_router, AppState};
pub use pipeline::{
    Activity, DispatchQueue, DispatchTuning, EmotionTimeline, PresentationUpdate, RecordingStatus,
    Segment, SegmentFilter, TimelineEntry,
};
pub use session::{RecordingPipeline, Session, SessionManager};
