use thiserror::Error;

/// Errors from the audio capture layer.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The capture device could not be acquired (missing hardware,
    /// permission denied, backend not linked into this build).
    #[error("audio capture unavailable: {0}")]
    Unavailable(String),

    #[error("capture already running")]
    AlreadyCapturing,
}

/// Errors from the remote emotion classifier service.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Network-level failure talking to the service.
    #[error("classifier transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("classifier rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The service answered 200 but the payload did not parse.
    #[error("invalid classifier response: {0}")]
    InvalidResponse(String),

    /// The service reports it has no API key / model configured.
    #[error("classifier service is not configured")]
    NotConfigured,
}

/// Errors surfaced by the recording pipeline itself.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// `start` was called while a session is already open.
    #[error("a recording session is already active")]
    SessionAlreadyActive,

    /// The classifier status probe failed; recording cannot start.
    #[error("classifier service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error(transparent)]
    Capture(#[from] CaptureError),
}
