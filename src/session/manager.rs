use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::classifier::Classifier;
use crate::error::PipelineError;

/// The logical grouping of all segments between a start and a stop.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub active: bool,
}

/// Issues session identifiers and delivers the end-of-session notice.
///
/// At most one session is active at a time. Segments reference their session
/// by id only; the session never holds the segments.
pub struct SessionManager {
    classifier: Arc<dyn Classifier>,
    active: Mutex<Option<Session>>,
}

impl SessionManager {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            classifier,
            active: Mutex::new(None),
        }
    }

    /// Open a new session.
    ///
    /// Fails with [`PipelineError::SessionAlreadyActive`] while one is open;
    /// the existing session is left untouched.
    pub async fn begin(&self) -> Result<Session, PipelineError> {
        let mut active = self.active.lock().await;
        if active.is_some() {
            return Err(PipelineError::SessionAlreadyActive);
        }

        let started_at = Utc::now();
        // Timestamp plus randomness: unique within a process run and
        // readable in service logs.
        let id = format!(
            "session-{}-{}",
            started_at.timestamp_millis(),
            &Uuid::new_v4().simple().to_string()[..8]
        );

        let session = Session {
            id: id.clone(),
            started_at,
            active: true,
        };
        *active = Some(session.clone());

        info!("Session started: {}", id);
        Ok(session)
    }

    /// Id of the currently open session, if any.
    pub async fn active_id(&self) -> Option<String> {
        self.active.lock().await.as_ref().map(|s| s.id.clone())
    }

    /// Roll back a session whose capture never started.
    ///
    /// No termination notice is sent: the collaborator never saw a segment
    /// from this id, and the notice belongs to the stop transition only.
    pub async fn discard(&self) {
        let mut active = self.active.lock().await;
        if let Some(session) = active.take() {
            info!("Session discarded before capture started: {}", session.id);
        }
    }

    /// Close the active session and send the termination notice.
    ///
    /// The local transition always succeeds; a failed notice is logged and
    /// swallowed. Exactly one notice is attempted per open session. Returns
    /// the ended session id, or None if no session was open.
    pub async fn end(&self) -> Option<String> {
        let session = {
            let mut active = self.active.lock().await;
            active.take()
        }?;

        if let Err(e) = self.classifier.end_session(&session.id).await {
            warn!("Session end notice failed for {}: {}", session.id, e);
        } else {
            info!("Session ended: {}", session.id);
        }

        Some(session.id)
    }
}
