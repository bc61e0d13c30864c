mod manager;
mod session;

pub use manager::{Session, SessionManager};
pub use session::RecordingPipeline;
