//! HTTP API for external control of the recording pipeline:
//! - POST /recording/start - Start a new recording session
//! - POST /recording/stop - Stop the active session
//! - GET /recording/status - Current status and display text
//! - GET /recording/timeline - Bounded classification history
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
