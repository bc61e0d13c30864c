mod backend;
mod level;
mod synthetic;

pub use backend::{
    AudioCapture, CaptureBackendFactory, CaptureConfig, CaptureSource, CapturedChunk,
};
pub use level::LevelTap;
pub use synthetic::SyntheticCapture;
